//! Identities
//!
//! An identity names one record for its entire existence.
//!
//! # Identity Structure
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Id<T>                             │
//! ├──────────────────────────────────────────────────────────┤
//! │  raw: NonZeroU64        - Counter value, never 0         │
//! │  _kind: PhantomData<T>  - Registry the identity came from │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Zero is the reserved "no such identity" value, so it is unrepresentable.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::num::NonZeroU64;

/// Identity of a record held in a [`Registry<T>`](super::Registry).
///
/// The type parameter ties an identity to the kind of record it names, so
/// a user identity cannot be handed to a channel operation.
pub struct Id<T> {
    raw: NonZeroU64,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Rebuild an identity from its raw value.
    ///
    /// Returns None for 0, which never names a record.
    #[inline]
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self {
                raw,
                _kind: PhantomData,
            }),
            None => None,
        }
    }

    #[inline]
    pub(crate) const fn from_nonzero(raw: NonZeroU64) -> Self {
        Self {
            raw,
            _kind: PhantomData,
        }
    }

    /// Get the raw identity value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.raw.get()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.raw)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Opaque process identifier supplied by process management.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct ProcessId(u64);

impl ProcessId {
    /// Wrap a raw process identifier.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid:{}", self.0)
    }
}
