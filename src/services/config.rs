//! Configuration Entries
//!
//! Named configuration entries, each carrying a description and a bounded
//! set of typed properties.

use alloc::string::String;
use alloc::vec::Vec;

use log::debug;

use crate::attr::{AttributeInfo, AttributeStats, AttributeStore, EntryId, Value};
use crate::error::{check_name, Error, Result};
use crate::limits::{Limits, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

/// Metadata of a configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMeta {
    pub name: String,
    pub description: String,
}

pub type ConfigId = EntryId<ConfigMeta>;

/// Summary of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigInfo {
    pub name: String,
    pub description: String,
    pub property_count: usize,
}

/// Configuration entry service.
#[derive(Debug)]
pub struct ConfigStore {
    entries: AttributeStore<ConfigMeta>,
}

impl ConfigStore {
    /// Empty store sized by `limits`.
    pub fn new(limits: &Limits) -> Self {
        Self {
            entries: AttributeStore::new(limits.max_configs, limits.max_attributes),
        }
    }

    /// Create an entry. Names are unique among active entries.
    pub fn create(&self, name: &str, description: &str) -> Result<ConfigId> {
        check_name(name, MAX_NAME_LEN)?;
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(Error::NameTooLong {
                max: MAX_DESCRIPTION_LEN,
            });
        }
        let meta = ConfigMeta {
            name: String::from(name),
            description: String::from(description),
        };
        let id = self.entries.create_unique(meta, |m| m.name == name)?;
        debug!("config: entry {} '{}' created", id, name);
        Ok(id)
    }

    /// Destroy an entry and its properties.
    pub fn destroy(&self, id: ConfigId) -> Result<()> {
        let meta = self.entries.destroy(id)?;
        debug!("config: entry {} '{}' destroyed", id, meta.name);
        Ok(())
    }

    /// Look up an entry by name.
    pub fn find_by_name(&self, name: &str) -> Option<ConfigId> {
        self.entries.find(|meta| meta.name == name)
    }

    /// Name, description and property count of an entry.
    pub fn info(&self, id: ConfigId) -> Result<ConfigInfo> {
        self.entries.with(id, |entry| ConfigInfo {
            name: entry.meta().name.clone(),
            description: entry.meta().description.clone(),
            property_count: entry.attributes().len(),
        })
    }

    /// Attach a property to an entry.
    pub fn add_property(&self, id: ConfigId, name: &str, value: Value) -> Result<()> {
        self.entries.add_attribute(id, name, value)
    }

    /// Copy a property's encoded value into `out`.
    pub fn get_value(&self, id: ConfigId, name: &str, out: &mut [u8]) -> Result<usize> {
        self.entries.get_value(id, name, out)
    }

    /// Clone a property's value.
    pub fn value(&self, id: ConfigId, name: &str) -> Result<Value> {
        self.entries.value(id, name)
    }

    /// Replace a property's value. The kind must match.
    pub fn set_value(&self, id: ConfigId, name: &str, value: Value) -> Result<()> {
        self.entries.set_value(id, name, value)
    }

    /// Name, kind and encoded size of a property.
    pub fn property_info(&self, id: ConfigId, name: &str) -> Result<AttributeInfo> {
        self.entries.attribute_info(id, name)
    }

    /// Property names of an entry, in insertion order.
    pub fn property_names(&self, id: ConfigId) -> Result<Vec<String>> {
        self.entries.attribute_names(id)
    }

    /// Number of active entries.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Write entry identities into `out`, in slot order.
    pub fn list(&self, out: &mut [ConfigId]) -> usize {
        self.entries.list(out)
    }

    /// Entry and property counts.
    pub fn stats(&self) -> AttributeStats {
        self.entries.stats()
    }
}
