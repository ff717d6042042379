//! Kernel Service Errors
//!
//! Every fallible operation in this crate returns [`Error`]. Errors are
//! always recoverable: a failed call leaves the subsystem exactly as it was.

use core::fmt;

/// Error type shared by all kernel service subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The identity or name does not resolve to an active record.
    NotFound,
    /// Every slot of the registry is occupied.
    RegistryFull,
    /// The registry's identity counter has run out of values.
    IdentitiesExhausted,
    /// The owning record already holds the maximum number of attributes.
    AttributeFull,
    /// An attribute with this name already exists with another kind.
    InvalidKind,
    /// The new value's kind differs from the attribute's kind.
    KindMismatch,
    /// The caller's buffer is too small; `required` bytes are needed.
    BufferTooSmall { required: usize },
    /// A name exceeds its maximum length in bytes.
    NameTooLong { max: usize },
    /// The name is already used by another active record.
    NameTaken,
    /// The channel's message sequence is at capacity.
    ChannelFull,
    /// The payload exceeds the maximum message size.
    PayloadTooLarge { max: usize },
    /// No undelivered message is addressed to the receiver.
    NoMessage,
    /// The record is still referenced by other active records.
    InUse,
    /// The request is malformed (empty name, entry without a subject, ...).
    InvalidEntry,
    /// The session lacks the permission bits for the operation.
    PermissionDenied,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no such record"),
            Self::RegistryFull => write!(f, "registry is full"),
            Self::IdentitiesExhausted => write!(f, "identity space exhausted"),
            Self::AttributeFull => write!(f, "attribute set is full"),
            Self::InvalidKind => write!(f, "attribute exists with a different kind"),
            Self::KindMismatch => write!(f, "attribute kind mismatch"),
            Self::BufferTooSmall { required } => {
                write!(f, "buffer too small ({} bytes required)", required)
            }
            Self::NameTooLong { max } => write!(f, "name longer than {} bytes", max),
            Self::NameTaken => write!(f, "name already in use"),
            Self::ChannelFull => write!(f, "channel is full"),
            Self::PayloadTooLarge { max } => {
                write!(f, "payload larger than {} bytes", max)
            }
            Self::NoMessage => write!(f, "no message pending"),
            Self::InUse => write!(f, "record is in use"),
            Self::InvalidEntry => write!(f, "invalid entry"),
            Self::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Validate a name against a byte limit.
///
/// Names are never truncated: an over-long name is rejected.
pub(crate) fn check_name(name: &str, max: usize) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntry);
    }
    if name.len() > max {
        return Err(Error::NameTooLong { max });
    }
    Ok(())
}
