//! IPC Messages

use alloc::vec::Vec;
use core::num::NonZeroU64;

use crate::registry::ProcessId;

/// Globally unique message identity, for tracing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct MessageId(NonZeroU64);

impl MessageId {
    #[inline]
    pub(crate) const fn new(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

/// A message queued on a channel.
///
/// The payload buffer is owned by the message and freed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) sender: ProcessId,
    pub(crate) receiver: ProcessId,
    pub(crate) id: MessageId,
    pub(crate) payload: Vec<u8>,
    pub(crate) delivered: bool,
}

impl Message {
    #[inline]
    pub fn sender(&self) -> ProcessId {
        self.sender
    }

    #[inline]
    pub fn receiver(&self) -> ProcessId {
        self.receiver
    }

    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[inline]
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    /// Check whether this message is waiting for `receiver`.
    #[inline]
    pub fn is_pending_for(&self, receiver: ProcessId) -> bool {
        !self.delivered && self.receiver == receiver
    }

    /// Header of this message, without the payload.
    pub fn info(&self) -> MessageInfo {
        MessageInfo {
            sender: self.sender,
            receiver: self.receiver,
            id: self.id,
            size: self.payload.len(),
            delivered: self.delivered,
        }
    }
}

/// Message header without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageInfo {
    pub sender: ProcessId,
    pub receiver: ProcessId,
    pub id: MessageId,
    pub size: usize,
    pub delivered: bool,
}

/// Result of a successful receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub sender: ProcessId,
    pub id: MessageId,
    /// Bytes copied into the caller's buffer.
    pub len: usize,
}
