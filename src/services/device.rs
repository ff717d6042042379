//! Device Manager
//!
//! Drivers register with the manager; device nodes are created against a
//! driver and carry typed properties.
//!
//! # Binding
//! - A device node names exactly one driver
//! - The driver's `probe` runs when the node is created and may reject it
//! - The driver's `remove` runs before the node is destroyed
//! - A driver cannot be unregistered while nodes are bound to it
//!
//! # Locking
//! The driver table is always locked before the device table. Driver hooks
//! run with neither table locked, so a hook may call back into the manager.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use log::{debug, warn};
use spin::Mutex;

use crate::attr::{AttributeInfo, AttributeStats, AttributeStore, EntryId, Value};
use crate::error::{check_name, Error, Result};
use crate::limits::{Limits, MAX_NAME_LEN};
use crate::registry::{Id, Registry, RegistryStats};

/// Class of a device or of the devices a driver serves.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum DeviceClass {
    Char = 0,
    Block = 1,
    Network = 2,
    Display = 3,
    Input = 4,
    Other = 5,
}

/// Driver callbacks.
///
/// Hooks take `&self`; a driver keeps its own state behind atomics or a
/// lock of its own.
pub trait DeviceDriver: Send + Sync {
    /// A node bound to this driver was created. Returning false rejects it.
    fn probe(&self, _device: DeviceId) -> bool {
        true
    }

    /// A node bound to this driver is about to be destroyed.
    fn remove(&self, _device: DeviceId) {}
}

/// A registered driver.
pub struct Driver {
    name: String,
    class: DeviceClass,
    ops: Arc<dyn DeviceDriver>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

pub type DriverId = Id<Driver>;

/// Metadata of a device node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceNode {
    pub name: String,
    pub class: DeviceClass,
    pub driver: DriverId,
}

pub type DeviceId = EntryId<DeviceNode>;

/// Summary of one driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub name: String,
    pub class: DeviceClass,
    pub device_count: usize,
}

/// Summary of one device node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub node: DeviceNode,
    pub property_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStats {
    pub drivers: RegistryStats,
    pub devices: AttributeStats,
}

/// The device manager service.
#[derive(Debug)]
pub struct DeviceManager {
    drivers: Mutex<Registry<Driver>>,
    devices: AttributeStore<DeviceNode>,
}

impl DeviceManager {
    /// Empty driver and device tables sized by `limits`.
    pub fn new(limits: &Limits) -> Self {
        Self {
            drivers: Mutex::new(Registry::with_capacity(limits.max_drivers)),
            devices: AttributeStore::new(limits.max_devices, limits.max_attributes),
        }
    }

    // --- drivers ----------------------------------------------------------

    /// Register a driver. Driver names are unique.
    pub fn register_driver(
        &self,
        name: &str,
        class: DeviceClass,
        ops: Arc<dyn DeviceDriver>,
    ) -> Result<DriverId> {
        check_name(name, MAX_NAME_LEN)?;
        let mut drivers = self.drivers.lock();
        if drivers.find(|d| d.name == name).is_some() {
            return Err(Error::NameTaken);
        }
        let id = drivers.create(Driver {
            name: String::from(name),
            class,
            ops,
        })?;
        debug!("device: driver {} '{}' registered", id, name);
        Ok(id)
    }

    /// Unregister a driver with no bound devices.
    pub fn unregister_driver(&self, id: DriverId) -> Result<()> {
        let mut drivers = self.drivers.lock();
        if !drivers.contains(id) {
            return Err(Error::NotFound);
        }
        if self.devices.find(|node| node.driver == id).is_some() {
            return Err(Error::InUse);
        }
        drivers.destroy(id)?;
        debug!("device: driver {} unregistered", id);
        Ok(())
    }

    /// Name, class and bound device count of a driver.
    pub fn driver_info(&self, id: DriverId) -> Result<DriverInfo> {
        let drivers = self.drivers.lock();
        let driver = drivers.get(id).ok_or(Error::NotFound)?;
        Ok(DriverInfo {
            name: driver.name.clone(),
            class: driver.class,
            device_count: self.devices.filter(|node| node.driver == id).len(),
        })
    }

    /// Look up a driver by name.
    pub fn find_driver(&self, name: &str) -> Option<DriverId> {
        self.drivers
            .lock()
            .find(|d| d.name == name)
            .map(|(id, _)| id)
    }

    /// Number of registered drivers.
    pub fn driver_count(&self) -> usize {
        self.drivers.lock().count()
    }

    /// Number of registered drivers serving `class`.
    pub fn driver_count_by_class(&self, class: DeviceClass) -> usize {
        self.drivers
            .lock()
            .iter()
            .filter(|(_, d)| d.class == class)
            .count()
    }

    /// Write identities of drivers serving `class` into `out`, in slot order.
    pub fn list_drivers_by_class(&self, class: DeviceClass, out: &mut [DriverId]) -> usize {
        let drivers = self.drivers.lock();
        let matching = drivers
            .iter()
            .filter(|(_, d)| d.class == class)
            .map(|(id, _)| id);
        let mut written = 0;
        for (dst, id) in out.iter_mut().zip(matching) {
            *dst = id;
            written += 1;
        }
        written
    }

    fn driver_ops(&self, id: DriverId) -> Result<Arc<dyn DeviceDriver>> {
        self.drivers
            .lock()
            .get(id)
            .map(|d| Arc::clone(&d.ops))
            .ok_or(Error::NotFound)
    }

    // --- devices ----------------------------------------------------------

    /// Create a device node bound to `driver` and probe it.
    ///
    /// A rejected probe leaves no node behind and fails with `InvalidEntry`.
    pub fn register_device(
        &self,
        driver: DriverId,
        name: &str,
        class: DeviceClass,
    ) -> Result<DeviceId> {
        check_name(name, MAX_NAME_LEN)?;
        let (id, ops) = {
            let drivers = self.drivers.lock();
            let bound = drivers.get(driver).ok_or(Error::NotFound)?;
            let id = self.devices.create(DeviceNode {
                name: String::from(name),
                class,
                driver,
            })?;
            (id, Arc::clone(&bound.ops))
        };

        if !ops.probe(id) {
            self.devices.destroy(id)?;
            warn!("device: driver {} rejected '{}'", driver, name);
            return Err(Error::InvalidEntry);
        }
        debug!("device: {} '{}' bound to driver {}", id, name, driver);
        Ok(id)
    }

    /// Run the driver's `remove` hook, then destroy the node.
    pub fn unregister_device(&self, id: DeviceId) -> Result<()> {
        let driver = self.devices.with(id, |entry| entry.meta().driver)?;
        if let Ok(ops) = self.driver_ops(driver) {
            ops.remove(id);
        }
        self.devices.destroy(id)?;
        debug!("device: {} unregistered", id);
        Ok(())
    }

    /// Check whether `id` names an active device node.
    pub fn device_exists(&self, id: DeviceId) -> bool {
        self.devices.exists(id)
    }

    /// Metadata and property count of a device node.
    pub fn device_info(&self, id: DeviceId) -> Result<DeviceInfo> {
        self.devices.with(id, |entry| DeviceInfo {
            node: entry.meta().clone(),
            property_count: entry.attributes().len(),
        })
    }

    /// Rename a device node.
    pub fn rename_device(&self, id: DeviceId, name: &str) -> Result<()> {
        check_name(name, MAX_NAME_LEN)?;
        self.devices
            .with_meta_mut(id, |node| node.name = String::from(name))
    }

    /// Number of device nodes of `class`.
    pub fn count_by_class(&self, class: DeviceClass) -> usize {
        self.devices.filter(|node| node.class == class).len()
    }

    /// Write identities of devices of `class` into `out`, in slot order.
    pub fn list_by_class(&self, class: DeviceClass, out: &mut [DeviceId]) -> usize {
        let matching = self.devices.filter(|node| node.class == class);
        let written = matching.len().min(out.len());
        out[..written].copy_from_slice(&matching[..written]);
        written
    }

    // --- properties -------------------------------------------------------

    /// Attach a property to a device node.
    pub fn add_property(&self, id: DeviceId, name: &str, value: Value) -> Result<()> {
        self.devices.add_attribute(id, name, value)
    }

    /// Copy a property's encoded value into `out`.
    pub fn get_value(&self, id: DeviceId, name: &str, out: &mut [u8]) -> Result<usize> {
        self.devices.get_value(id, name, out)
    }

    /// Clone a property's value.
    pub fn value(&self, id: DeviceId, name: &str) -> Result<Value> {
        self.devices.value(id, name)
    }

    /// Replace a property's value. The kind must match.
    pub fn set_value(&self, id: DeviceId, name: &str, value: Value) -> Result<()> {
        self.devices.set_value(id, name, value)
    }

    /// Remove a property, returning its value.
    pub fn remove_property(&self, id: DeviceId, name: &str) -> Result<Value> {
        self.devices.remove_attribute(id, name)
    }

    /// Name, kind and encoded size of a property.
    pub fn property_info(&self, id: DeviceId, name: &str) -> Result<AttributeInfo> {
        self.devices.attribute_info(id, name)
    }

    /// Property names of a device node, in insertion order.
    pub fn property_names(&self, id: DeviceId) -> Result<Vec<String>> {
        self.devices.attribute_names(id)
    }

    /// Number of properties on a device node.
    pub fn property_count(&self, id: DeviceId) -> Result<usize> {
        self.devices.attribute_count(id)
    }

    /// Driver and device table counts.
    pub fn stats(&self) -> DeviceStats {
        DeviceStats {
            drivers: self.drivers.lock().stats(),
            devices: self.devices.stats(),
        }
    }
}
