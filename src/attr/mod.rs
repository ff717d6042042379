//! Typed Attribute Store
//!
//! Named, typed values attached to registry records.
//!
//! # Kinds
//! - Integer (`i64`), Float (`f64`), Boolean
//! - Text (UTF-8), Blob (opaque bytes)
//!
//! An attribute keeps the kind it was created with. Reads use a two-phase
//! protocol: an undersized buffer reports the required size and the caller
//! retries.

pub mod set;
pub mod store;
pub mod value;

pub use set::{Attribute, AttributeInfo, AttributeSet};
pub use store::{AttributeStats, AttributeStore, Entry, EntryId};
pub use value::{Kind, Value};
