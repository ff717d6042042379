//! Channel IPC
//!
//! Bounded channels carrying messages addressed to specific receivers.
//!
//! # Guarantees
//! - Send order is preserved per channel
//! - Each message is delivered at most once, only to its receiver
//! - Capacity exhaustion is reported to the sender, never hidden
//! - Message ids are unique across all channels

pub mod channel;
pub mod message;
pub mod table;

pub use channel::{Channel, ChannelStats};
pub use message::{Delivery, Message, MessageId, MessageInfo};
pub use table::{ChannelId, Ipc, IpcStats};
