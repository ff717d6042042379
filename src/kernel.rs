//! Kernel Bootstrap
//!
//! Brings every service up against one set of [`Limits`] and one clock,
//! and gates IPC on the caller's session.
//!
//! # Boot Order
//! ```text
//! config ──▶ devices ──▶ security ──▶ userdata ──▶ ipc
//! ```
//!
//! # Access-Checked IPC
//! A channel is the resource numbered by its identity. Sending needs
//! `WRITE` on it, receiving needs `READ`. A denied call fails with
//! `PermissionDenied` and leaves the channel untouched.

use alloc::sync::Arc;

use log::info;

use crate::attr::AttributeStats;
use crate::error::{Error, Result};
use crate::ipc::{ChannelId, Delivery, Ipc, IpcStats, MessageId};
use crate::limits::Limits;
use crate::registry::ProcessId;
use crate::security::{AccessControl, Permissions, SecurityStats, SessionId};
use crate::services::{ConfigStore, DeviceManager, DeviceStats, UserData, UserDataStats};
use crate::time::TickClock;

/// Aggregate statistics of every service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemStats {
    pub config: AttributeStats,
    pub devices: DeviceStats,
    pub security: SecurityStats,
    pub userdata: UserDataStats,
    pub ipc: IpcStats,
}

/// The running set of kernel services.
#[derive(Debug)]
pub struct Kernel {
    pub config: ConfigStore,
    pub devices: DeviceManager,
    pub security: AccessControl,
    pub userdata: UserData,
    pub ipc: Ipc,
    clock: Arc<TickClock>,
}

impl Kernel {
    /// Bring up all services.
    pub fn boot(limits: Limits) -> Result<Self> {
        info!("kernel: booting services");
        let clock = Arc::new(TickClock::new());

        let config = ConfigStore::new(&limits);
        info!("kernel: config store up ({} entries)", limits.max_configs);

        let devices = DeviceManager::new(&limits);
        info!(
            "kernel: device manager up ({} drivers, {} devices)",
            limits.max_drivers, limits.max_devices
        );

        let security = AccessControl::new(&limits, clock.clone())?;
        info!("kernel: access control up ({} users)", limits.max_users);

        let userdata = UserData::new(&limits, clock.clone());
        info!("kernel: user data up ({} contacts)", limits.max_contacts);

        let ipc = Ipc::new(&limits);
        info!("kernel: ipc up ({} channels)", limits.max_channels);

        Ok(Self {
            config,
            devices,
            security,
            userdata,
            ipc,
            clock,
        })
    }

    /// The clock sessions and user messages are stamped with.
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    fn require(
        &self,
        session: SessionId,
        channel: ChannelId,
        requested: Permissions,
    ) -> Result<()> {
        if self
            .security
            .check_permission(session, channel.get(), requested)
        {
            Ok(())
        } else {
            Err(Error::PermissionDenied)
        }
    }

    /// Send on behalf of `session`, which must hold `WRITE` on `channel`.
    pub fn send_as(
        &self,
        session: SessionId,
        channel: ChannelId,
        sender: ProcessId,
        receiver: ProcessId,
        payload: &[u8],
    ) -> Result<MessageId> {
        self.require(session, channel, Permissions::WRITE)?;
        self.ipc.send(channel, sender, receiver, payload)
    }

    /// Receive on behalf of `session`, which must hold `READ` on `channel`.
    pub fn receive_as(
        &self,
        session: SessionId,
        channel: ChannelId,
        receiver: ProcessId,
        out: &mut [u8],
    ) -> Result<Delivery> {
        self.require(session, channel, Permissions::READ)?;
        self.ipc.receive_message(channel, receiver, out)
    }

    /// Statistics of every service.
    pub fn stats(&self) -> SystemStats {
        SystemStats {
            config: self.config.stats(),
            devices: self.devices.stats(),
            security: self.security.stats(),
            userdata: self.userdata.stats(),
            ipc: self.ipc.stats(),
        }
    }
}
