//! Kernel Services
//!
//! The object registries behind a microkernel's user-facing services.
//!
//! # Services
//! - Identity registries with monotonically assigned, never reused ids
//! - Typed attributes attached to configuration entries and device nodes
//! - Users, groups, sessions, and per-resource permission entries
//! - Bounded message channels between processes
//! - Contacts, stored messages, and per-application preferences
//!
//! # Security Features
//! - Credentials are held only as username-bound digests, wiped on drop
//! - Permission checks deny on anything unresolvable
//! - Every capacity limit is reported to the caller
//!
//! # Environment
//! `no_std` with `alloc`. Each table sits behind its own spinlock; the
//! embedding kernel supplies the heap, the logger, and the clock.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod attr;
pub mod error;
pub mod ipc;
pub mod kernel;
pub mod limits;
pub mod registry;
pub mod security;
pub mod services;
pub mod time;

pub use error::{Error, Result};
pub use kernel::{Kernel, SystemStats};
pub use limits::Limits;
pub use registry::{Id, ProcessId};
