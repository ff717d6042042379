//! Access Control
//!
//! Principals, groups, sessions, and per-resource permission entries.
//!
//! # Security Properties
//! - Credentials are stored only as digests, wiped on drop
//! - Digest comparison does not exit early
//! - Every unresolvable lookup denies

pub mod access;
pub mod credential;
pub mod permissions;
pub mod zeroize;

pub use access::{
    AccessControl, DefaultGroups, Group, GroupId, PermissionId, ResourcePermission,
    SecurityStats, Session, SessionId, User, UserId, UserInfo,
};
pub use credential::CredentialHash;
pub use permissions::Permissions;
pub use zeroize::{SecureWrapper, Zeroize};
