//! Channel Table
//!
//! The IPC service: every channel lives in one locked registry, and message
//! identities come from a single counter shared by all channels.
//!
//! # Channel Lifecycle
//! ```text
//! create_channel ──▶ Active ──(send / receive / clear)──▶ Active
//!                      │
//!                      └── destroy_channel ──▶ Destroyed (terminal)
//! ```
//! No operation blocks. A receiver that wants to wait polls `receive` and
//! treats `NoMessage` as "nothing yet".

use alloc::vec::Vec;
use core::num::NonZeroU64;

use log::{debug, trace, warn};
use spin::Mutex;

use super::channel::{Channel, ChannelStats};
use super::message::{Delivery, Message, MessageId, MessageInfo};
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::registry::{Id, ProcessId, Registry};

pub type ChannelId = Id<Channel>;

/// Read-only aggregate counts across all channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IpcStats {
    pub total_channels: usize,
    pub active_channels: usize,
    pub total_messages: usize,
    pub undelivered_messages: usize,
}

#[derive(Debug)]
struct ChannelTable {
    channels: Registry<Channel>,
    next_message: Option<NonZeroU64>,
}

impl ChannelTable {
    fn channel(&self, id: ChannelId) -> Result<&Channel> {
        self.channels.get(id).ok_or(Error::NotFound)
    }

    fn channel_mut(&mut self, id: ChannelId) -> Result<&mut Channel> {
        self.channels.get_mut(id).ok_or(Error::NotFound)
    }
}

/// The channel IPC service.
#[derive(Debug)]
pub struct Ipc {
    table: Mutex<ChannelTable>,
    channel_capacity: usize,
    max_payload: usize,
}

impl Ipc {
    /// Empty channel table sized by `limits`.
    pub fn new(limits: &Limits) -> Self {
        Self {
            table: Mutex::new(ChannelTable {
                channels: Registry::with_capacity(limits.max_channels),
                next_message: Some(NonZeroU64::MIN),
            }),
            channel_capacity: limits.channel_capacity,
            max_payload: limits.max_payload,
        }
    }

    #[inline]
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Create an empty channel owned by `owner`.
    pub fn create_channel(&self, owner: ProcessId) -> Result<ChannelId> {
        let result = self
            .table
            .lock()
            .channels
            .create(Channel::new(owner, self.channel_capacity));
        match result {
            Ok(id) => debug!("ipc: channel {} created for {}", id, owner),
            Err(err) => warn!("ipc: channel create for {} failed: {}", owner, err),
        }
        result
    }

    /// Destroy a channel and free every queued payload.
    pub fn destroy_channel(&self, channel: ChannelId) -> Result<()> {
        let destroyed = self.table.lock().channels.destroy(channel)?;
        debug!(
            "ipc: channel {} destroyed with {} messages",
            channel,
            destroyed.len()
        );
        Ok(())
    }

    /// Queue `payload` for `receiver`.
    ///
    /// Fails with `NotFound`, `PayloadTooLarge`, or `ChannelFull`, checked
    /// in that order. A failed send changes nothing.
    pub fn send(
        &self,
        channel: ChannelId,
        sender: ProcessId,
        receiver: ProcessId,
        payload: &[u8],
    ) -> Result<MessageId> {
        let mut table = self.table.lock();
        let next = table.next_message;

        let target = table.channel_mut(channel)?;
        if payload.len() > self.max_payload {
            return Err(Error::PayloadTooLarge {
                max: self.max_payload,
            });
        }
        if target.is_full() {
            warn!("ipc: channel {} full", channel);
            return Err(Error::ChannelFull);
        }
        let id = MessageId::new(next.ok_or(Error::IdentitiesExhausted)?);
        target.push(Message {
            sender,
            receiver,
            id,
            payload: payload.to_vec(),
            delivered: false,
        })?;

        table.next_message = next.and_then(|n| n.checked_add(1));
        trace!(
            "ipc: message {} {} -> {} on channel {} ({} bytes)",
            id.get(),
            sender,
            receiver,
            channel,
            payload.len()
        );
        Ok(id)
    }

    /// Receive the oldest pending message for `receiver` into `out`,
    /// returning its length.
    pub fn receive(
        &self,
        channel: ChannelId,
        receiver: ProcessId,
        out: &mut [u8],
    ) -> Result<usize> {
        self.receive_message(channel, receiver, out).map(|d| d.len)
    }

    /// Like [`receive`](Self::receive), also reporting sender and id.
    ///
    /// If `out` is too small the required size is reported and the message
    /// stays pending.
    pub fn receive_message(
        &self,
        channel: ChannelId,
        receiver: ProcessId,
        out: &mut [u8],
    ) -> Result<Delivery> {
        let mut table = self.table.lock();
        let delivery = table.channel_mut(channel)?.deliver(receiver, out)?;
        trace!(
            "ipc: message {} delivered to {} on channel {}",
            delivery.id.get(),
            receiver,
            channel
        );
        Ok(delivery)
    }

    /// Remove every message from a channel, keeping the channel.
    pub fn clear_channel(&self, channel: ChannelId) -> Result<()> {
        self.table.lock().channel_mut(channel)?.clear();
        debug!("ipc: channel {} cleared", channel);
        Ok(())
    }

    /// Process that created `channel`.
    pub fn channel_owner(&self, channel: ChannelId) -> Result<ProcessId> {
        self.table.lock().channel(channel).map(Channel::owner)
    }

    /// Check whether `channel` is active.
    pub fn channel_exists(&self, channel: ChannelId) -> bool {
        self.table.lock().channels.contains(channel)
    }

    /// Messages held by `channel`, delivered or not.
    pub fn message_count(&self, channel: ChannelId) -> Result<usize> {
        self.table.lock().channel(channel).map(Channel::len)
    }

    /// Messages in `channel` still waiting for `receiver`.
    pub fn undelivered_count(&self, channel: ChannelId, receiver: ProcessId) -> Result<usize> {
        self.table
            .lock()
            .channel(channel)
            .map(|c| c.undelivered_count(receiver))
    }

    /// Message counts of one channel.
    pub fn channel_stats(&self, channel: ChannelId) -> Result<ChannelStats> {
        self.table.lock().channel(channel).map(Channel::stats)
    }

    /// Header of the message at `index` in send order.
    pub fn message_info(&self, channel: ChannelId, index: usize) -> Result<MessageInfo> {
        self.table
            .lock()
            .channel(channel)?
            .message_info(index)
            .ok_or(Error::NotFound)
    }

    /// Write channel identities into `out`, in slot order.
    pub fn list_channels(&self, out: &mut [ChannelId]) -> usize {
        self.table.lock().channels.list(out)
    }

    /// Channels owned by `owner`.
    pub fn channels_owned_by(&self, owner: ProcessId) -> Vec<ChannelId> {
        self.table
            .lock()
            .channels
            .iter()
            .filter(|(_, c)| c.owner() == owner)
            .map(|(id, _)| id)
            .collect()
    }

    /// Channel and message counts across every channel.
    pub fn stats(&self) -> IpcStats {
        let table = self.table.lock();
        let registry = table.channels.stats();
        let (total_messages, undelivered_messages) = table
            .channels
            .iter()
            .map(|(_, c)| c.stats())
            .fold((0, 0), |(total, pending), s| {
                (total + s.message_count, pending + s.undelivered_count)
            });
        IpcStats {
            total_channels: registry.capacity,
            active_channels: registry.active,
            total_messages,
            undelivered_messages,
        }
    }
}
