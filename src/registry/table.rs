//! Identity Registry
//!
//! A bounded table of records, each named by an [`Id`] that is never reused.
//!
//! # Design
//! - Fixed number of slots, chosen at construction
//! - A slot is either empty or holds one active record
//! - Identities come from a per-registry counter starting at 1
//! - Lookups scan the slots linearly; capacity bounds the cost
//!
//! Destroying a record empties its slot, which becomes eligible for the
//! next `create` under a fresh identity. A stale identity therefore resolves
//! to nothing rather than to the slot's new occupant.

use alloc::vec::Vec;
use core::num::NonZeroU64;

use super::id::Id;
use crate::error::{Error, Result};

/// One occupied slot.
#[derive(Debug)]
struct Record<T> {
    identity: Id<T>,
    payload: T,
}

/// Read-only aggregate counts for a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    /// Number of slots.
    pub capacity: usize,
    /// Number of active records.
    pub active: usize,
}

/// Bounded-capacity identity registry.
#[derive(Debug)]
pub struct Registry<T> {
    /// Record slots; `None` is an inactive slot.
    slots: Vec<Option<Record<T>>>,
    /// Next identity to hand out.
    next: NonZeroU64,
    /// Cached number of occupied slots.
    active: usize,
    /// Set once the counter has handed out `u64::MAX`.
    exhausted: bool,
}

impl<T> Registry<T> {
    /// Create a registry with `capacity` inactive slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            next: NonZeroU64::MIN,
            active: 0,
            exhausted: false,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active records.
    #[inline]
    pub fn count(&self) -> usize {
        self.active
    }

    /// Check whether no slot is free.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.active == self.slots.len()
    }

    /// Find the first free slot.
    ///
    /// Slot 0 is an ordinary slot; absence is reported as None.
    fn find_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    fn position(&self, id: Id<T>) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(record) if record.identity == id))
    }

    /// Store `init` in the first free slot under a fresh identity.
    pub fn create(&mut self, init: T) -> Result<Id<T>> {
        let index = self.find_free().ok_or(Error::RegistryFull)?;
        if self.exhausted {
            return Err(Error::IdentitiesExhausted);
        }

        let identity = Id::from_nonzero(self.next);
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }

        self.slots[index] = Some(Record {
            identity,
            payload: init,
        });
        self.active += 1;
        Ok(identity)
    }

    /// Look up an active record.
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.slots.iter().find_map(|slot| match slot {
            Some(record) if record.identity == id => Some(&record.payload),
            _ => None,
        })
    }

    /// Look up an active record for mutation.
    pub fn get_mut(&mut self, id: Id<T>) -> Option<&mut T> {
        self.slots.iter_mut().find_map(|slot| match slot {
            Some(record) if record.identity == id => Some(&mut record.payload),
            _ => None,
        })
    }

    /// Check whether `id` names an active record.
    #[inline]
    pub fn contains(&self, id: Id<T>) -> bool {
        self.position(id).is_some()
    }

    /// Destroy a record, returning its payload.
    ///
    /// Dropping the returned payload reclaims everything the record owned.
    pub fn destroy(&mut self, id: Id<T>) -> Result<T> {
        let index = self.position(id).ok_or(Error::NotFound)?;
        let record = self.slots[index].take().ok_or(Error::NotFound)?;
        self.active -= 1;
        Ok(record.payload)
    }

    /// Write active identities, in slot order, into `out`.
    ///
    /// Returns how many were written; never writes past `out.len()`.
    pub fn list(&self, out: &mut [Id<T>]) -> usize {
        let mut written = 0;
        for (dst, id) in out.iter_mut().zip(self.iter().map(|(id, _)| id)) {
            *dst = id;
            written += 1;
        }
        written
    }

    /// Iterate over active records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|r| (r.identity, &r.payload)))
    }

    /// Iterate mutably over active records in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Id<T>, &mut T)> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.as_mut().map(|r| (r.identity, &mut r.payload)))
    }

    /// Find the first active record matching `pred`.
    pub fn find<F>(&self, mut pred: F) -> Option<(Id<T>, &T)>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().find(|(_, payload)| pred(payload))
    }

    /// Aggregate counts.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            capacity: self.capacity(),
            active: self.active,
        }
    }
}
