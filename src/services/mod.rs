//! Kernel Services
//!
//! Services built on the registries and the attributed record store.

pub mod config;
pub mod device;
pub mod userdata;

pub use config::{ConfigId, ConfigInfo, ConfigMeta, ConfigStore};
pub use device::{
    DeviceClass, DeviceDriver, DeviceId, DeviceInfo, DeviceManager, DeviceNode, DeviceStats,
    Driver, DriverId, DriverInfo,
};
pub use userdata::{
    AppPrefs, Contact, ContactId, UserData, UserDataStats, UserMessage, UserMessageId,
};
