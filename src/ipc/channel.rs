//! IPC Channels
//!
//! A channel owns an ordered, bounded sequence of messages.
//!
//! # Delivery
//! - Messages are kept in send order
//! - Receiving marks the first pending message for the receiver delivered;
//!   delivered messages stay in place until the channel is cleared
//! - A full channel rejects new messages; nothing is evicted

use alloc::vec::Vec;

use super::message::{Delivery, Message, MessageId, MessageInfo};
use crate::error::{Error, Result};
use crate::registry::ProcessId;

/// An IPC channel.
#[derive(Debug)]
pub struct Channel {
    owner: ProcessId,
    messages: Vec<Message>,
    capacity: usize,
}

/// Per-channel counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelStats {
    pub message_count: usize,
    pub undelivered_count: usize,
}

impl Channel {
    pub(crate) fn new(owner: ProcessId, capacity: usize) -> Self {
        Self {
            owner,
            messages: Vec::new(),
            capacity,
        }
    }

    #[inline]
    pub fn owner(&self) -> ProcessId {
        self.owner
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.capacity
    }

    pub(crate) fn push(&mut self, message: Message) -> Result<()> {
        if self.is_full() {
            return Err(Error::ChannelFull);
        }
        self.messages.push(message);
        Ok(())
    }

    /// Deliver the oldest pending message for `receiver` into `out`.
    ///
    /// On `BufferTooSmall` the message stays pending.
    pub(crate) fn deliver(&mut self, receiver: ProcessId, out: &mut [u8]) -> Result<Delivery> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.is_pending_for(receiver))
            .ok_or(Error::NoMessage)?;

        let len = message.payload.len();
        if out.len() < len {
            return Err(Error::BufferTooSmall { required: len });
        }
        out[..len].copy_from_slice(&message.payload);
        message.delivered = true;

        Ok(Delivery {
            sender: message.sender,
            id: message.id,
            len,
        })
    }

    /// Drop every message, delivered or not.
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages still waiting for `receiver`.
    pub fn undelivered_count(&self, receiver: ProcessId) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_pending_for(receiver))
            .count()
    }

    /// Header of the message at `index` in send order.
    pub fn message_info(&self, index: usize) -> Option<MessageInfo> {
        self.messages.get(index).map(Message::info)
    }

    /// Held messages in send order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The next message id expected to be delivered to `receiver`.
    pub fn peek(&self, receiver: ProcessId) -> Option<MessageId> {
        self.messages
            .iter()
            .find(|m| m.is_pending_for(receiver))
            .map(Message::id)
    }

    /// Held and undelivered message counts.
    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            message_count: self.messages.len(),
            undelivered_count: self.messages.iter().filter(|m| !m.delivered).count(),
        }
    }
}
