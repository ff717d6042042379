//! Identity Registries
//!
//! The storage pattern shared by every kernel service: a bounded table of
//! records, each named by a monotonically assigned identity.
//!
//! # Properties
//! - At most one active record holds a given identity
//! - Identities are never reassigned after destruction
//! - Creation beyond capacity fails and leaves the table unchanged

pub mod id;
pub mod table;

pub use id::{Id, ProcessId};
pub use table::{Registry, RegistryStats};
