//! Attributed Record Store
//!
//! A registry whose records each carry caller metadata plus a bounded
//! [`AttributeSet`]. Configuration entries and device nodes are both
//! built on it.
//!
//! The whole table sits behind one spinlock, held for exactly one public
//! operation.

use alloc::string::String;
use alloc::vec::Vec;

use spin::Mutex;

use super::set::{AttributeInfo, AttributeSet};
use super::value::Value;
use crate::error::{Error, Result};
use crate::registry::{Id, Registry};

/// A record with metadata `M` and attributes.
#[derive(Debug)]
pub struct Entry<M> {
    meta: M,
    attributes: AttributeSet,
}

impl<M> Entry<M> {
    #[inline]
    pub fn meta(&self) -> &M {
        &self.meta
    }

    #[inline]
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }
}

/// Identity of an entry in an [`AttributeStore<M>`].
pub type EntryId<M> = Id<Entry<M>>;

/// Read-only aggregate counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeStats {
    pub total_records: usize,
    pub active_records: usize,
    /// Attribute capacity summed over active records.
    pub total_attributes: usize,
    pub active_attributes: usize,
}

/// Locked registry of attributed records.
#[derive(Debug)]
pub struct AttributeStore<M> {
    table: Mutex<Registry<Entry<M>>>,
    max_attributes: usize,
}

impl<M> AttributeStore<M> {
    /// Create a store of `capacity` records with up to `max_attributes`
    /// attributes each.
    pub fn new(capacity: usize, max_attributes: usize) -> Self {
        Self {
            table: Mutex::new(Registry::with_capacity(capacity)),
            max_attributes,
        }
    }

    /// Create a record with no attributes.
    pub fn create(&self, meta: M) -> Result<EntryId<M>> {
        self.create_unique(meta, |_| false)
    }

    /// Create a record unless an active record's metadata `conflicts`
    /// with it, in which case `NameTaken` is returned.
    pub fn create_unique(
        &self,
        meta: M,
        mut conflicts: impl FnMut(&M) -> bool,
    ) -> Result<EntryId<M>> {
        let mut table = self.table.lock();
        if table.find(|entry| conflicts(&entry.meta)).is_some() {
            return Err(Error::NameTaken);
        }
        table.create(Entry {
            meta,
            attributes: AttributeSet::with_capacity(self.max_attributes),
        })
    }

    /// Identity of the first record matching `pred`, creating one from
    /// `make` if none does.
    pub fn find_or_create(
        &self,
        mut pred: impl FnMut(&M) -> bool,
        make: impl FnOnce() -> M,
    ) -> Result<EntryId<M>> {
        let mut table = self.table.lock();
        if let Some((id, _)) = table.find(|entry| pred(&entry.meta)) {
            return Ok(id);
        }
        table.create(Entry {
            meta: make(),
            attributes: AttributeSet::with_capacity(self.max_attributes),
        })
    }

    /// Destroy a record and everything it owns, returning its metadata.
    pub fn destroy(&self, id: EntryId<M>) -> Result<M> {
        self.table.lock().destroy(id).map(|entry| entry.meta)
    }

    /// Check whether `id` names an active record.
    pub fn exists(&self, id: EntryId<M>) -> bool {
        self.table.lock().contains(id)
    }

    /// Run `f` against a record while the table is locked.
    pub fn with<R>(&self, id: EntryId<M>, f: impl FnOnce(&Entry<M>) -> R) -> Result<R> {
        let table = self.table.lock();
        table.get(id).map(f).ok_or(Error::NotFound)
    }

    /// Run `f` against a record's metadata for mutation.
    pub fn with_meta_mut<R>(&self, id: EntryId<M>, f: impl FnOnce(&mut M) -> R) -> Result<R> {
        let mut table = self.table.lock();
        table
            .get_mut(id)
            .map(|entry| f(&mut entry.meta))
            .ok_or(Error::NotFound)
    }

    fn with_attributes<R>(
        &self,
        id: EntryId<M>,
        f: impl FnOnce(&mut AttributeSet) -> Result<R>,
    ) -> Result<R> {
        let mut table = self.table.lock();
        let entry = table.get_mut(id).ok_or(Error::NotFound)?;
        f(&mut entry.attributes)
    }

    /// Attach an attribute to `owner`.
    pub fn add_attribute(&self, owner: EntryId<M>, name: &str, value: Value) -> Result<()> {
        self.with_attributes(owner, |set| set.add(name, value))
    }

    /// Copy an attribute's encoded value into `out`.
    ///
    /// On `BufferTooSmall` the caller retries with the reported size.
    pub fn get_value(&self, owner: EntryId<M>, name: &str, out: &mut [u8]) -> Result<usize> {
        self.with(owner, |entry| entry.attributes.read_into(name, out))?
    }

    /// Clone an attribute's value out of the store.
    pub fn value(&self, owner: EntryId<M>, name: &str) -> Result<Value> {
        self.with(owner, |entry| entry.attributes.get(name).cloned())?
            .ok_or(Error::NotFound)
    }

    /// Replace an attribute's value. The kind must match.
    pub fn set_value(&self, owner: EntryId<M>, name: &str, value: Value) -> Result<()> {
        self.with_attributes(owner, |set| set.set(name, value))
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&self, owner: EntryId<M>, name: &str) -> Result<Value> {
        self.with_attributes(owner, |set| set.remove(name))
    }

    /// Number of attributes on a record.
    pub fn attribute_count(&self, owner: EntryId<M>) -> Result<usize> {
        self.with(owner, |entry| entry.attributes.len())
    }

    /// Attribute names of a record, in insertion order.
    pub fn attribute_names(&self, owner: EntryId<M>) -> Result<Vec<String>> {
        self.with(owner, |entry| {
            entry.attributes.names().map(String::from).collect()
        })
    }

    /// Name, kind and encoded size of an attribute.
    pub fn attribute_info(&self, owner: EntryId<M>, name: &str) -> Result<AttributeInfo> {
        self.with(owner, |entry| entry.attributes.info(name))?
            .ok_or(Error::NotFound)
    }

    /// Number of active records.
    pub fn count(&self) -> usize {
        self.table.lock().count()
    }

    /// Write active identities into `out`, in slot order.
    pub fn list(&self, out: &mut [EntryId<M>]) -> usize {
        self.table.lock().list(out)
    }

    /// Identities of every record whose metadata matches `pred`.
    pub fn filter(&self, mut pred: impl FnMut(&M) -> bool) -> Vec<EntryId<M>> {
        self.table
            .lock()
            .iter()
            .filter(|(_, entry)| pred(&entry.meta))
            .map(|(id, _)| id)
            .collect()
    }

    /// First record whose metadata matches `pred`.
    pub fn find(&self, mut pred: impl FnMut(&M) -> bool) -> Option<EntryId<M>> {
        self.table
            .lock()
            .find(|entry| pred(&entry.meta))
            .map(|(id, _)| id)
    }

    /// Record and attribute counts.
    pub fn stats(&self) -> AttributeStats {
        let table = self.table.lock();
        let registry = table.stats();
        AttributeStats {
            total_records: registry.capacity,
            active_records: registry.active,
            total_attributes: registry.active * self.max_attributes,
            active_attributes: table.iter().map(|(_, e)| e.attributes.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AttributeStore<&'static str> {
        AttributeStore::new(2, 3)
    }

    #[test]
    fn test_attribute_round_trip() {
        let store = store();
        let id = store.create("node").unwrap();
        store.add_attribute(id, "x", Value::Integer(42)).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(store.get_value(id, "x", &mut buf), Ok(8));
        assert_eq!(i64::from_le_bytes(buf), 42);

        store.set_value(id, "x", Value::Integer(7)).unwrap();
        assert_eq!(store.value(id, "x"), Ok(Value::Integer(7)));
    }

    #[test]
    fn test_unknown_owner_and_name() {
        let store = store();
        let id = store.create("node").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(store.get_value(id, "nope", &mut buf), Err(Error::NotFound));
        store.destroy(id).unwrap();
        assert_eq!(
            store.add_attribute(id, "x", Value::Boolean(true)),
            Err(Error::NotFound)
        );
        assert_eq!(store.get_value(id, "x", &mut buf), Err(Error::NotFound));
    }

    #[test]
    fn test_buffer_too_small_reports_size() {
        let store = store();
        let id = store.create("node").unwrap();
        store.add_attribute(id, "blob", Value::from(vec![9u8; 20])).unwrap();
        let mut small = [0u8; 8];
        assert_eq!(
            store.get_value(id, "blob", &mut small),
            Err(Error::BufferTooSmall { required: 20 })
        );
        assert_eq!(
            store.get_value(id, "blob", &mut small),
            Err(Error::BufferTooSmall { required: 20 })
        );
        let mut buf = vec![0u8; 20];
        assert_eq!(store.get_value(id, "blob", &mut buf), Ok(20));
    }

    #[test]
    fn test_stats_and_listing() {
        let store = store();
        let a = store.create("a").unwrap();
        let b = store.create("b").unwrap();
        store.add_attribute(a, "k", Value::Boolean(true)).unwrap();
        store.add_attribute(b, "k", Value::Boolean(true)).unwrap();
        store.add_attribute(b, "j", Value::Integer(1)).unwrap();

        assert_eq!(
            store.stats(),
            AttributeStats {
                total_records: 2,
                active_records: 2,
                total_attributes: 6,
                active_attributes: 3,
            }
        );
        assert_eq!(store.find(|m| *m == "b"), Some(b));
        assert_eq!(store.attribute_names(b).unwrap(), vec!["k", "j"]);
        assert_eq!(store.attribute_count(a), Ok(1));

        assert_eq!(store.destroy(a), Ok("a"));
        assert_eq!(store.stats().active_attributes, 2);
        assert_eq!(store.create("c").map(|_| ()), Ok(()));
        assert_eq!(store.create("d"), Err(Error::RegistryFull));
    }

    #[test]
    fn test_find_or_create_reuses_match() {
        let store = store();
        let a = store.find_or_create(|m| *m == "a", || "a").unwrap();
        assert_eq!(store.find_or_create(|m| *m == "a", || "a"), Ok(a));
        assert_eq!(store.count(), 1);

        let b = store.find_or_create(|m| *m == "b", || "b").unwrap();
        assert_ne!(a, b);
        assert_eq!(
            store.find_or_create(|m| *m == "c", || "c"),
            Err(Error::RegistryFull)
        );
        assert_eq!(store.find_or_create(|m| *m == "b", || "b"), Ok(b));
    }
}
