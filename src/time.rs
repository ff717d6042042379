//! Kernel Time Source
//!
//! Session timestamps are read through the [`Clock`] trait. The timer
//! driver owns real time; it advances a [`TickClock`] from its interrupt
//! handler and the services only ever read it.

use core::sync::atomic::{AtomicU64, Ordering};

/// Millisecond time source.
pub trait Clock: Send + Sync {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

/// A clock advanced explicitly by its owner.
#[derive(Debug, Default)]
pub struct TickClock {
    ms: AtomicU64,
}

impl TickClock {
    /// Create a clock reading zero.
    pub const fn new() -> Self {
        Self {
            ms: AtomicU64::new(0),
        }
    }

    /// Advance the clock by `ms` milliseconds.
    #[inline]
    pub fn tick(&self, ms: u64) {
        self.ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Set the clock to an absolute value.
    #[inline]
    pub fn set(&self, ms: u64) {
        self.ms.store(ms, Ordering::Relaxed);
    }
}

impl Clock for TickClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.ms.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_clock() {
        let clock = TickClock::new();
        assert_eq!(clock.now_ms(), 0);
        clock.tick(10);
        clock.tick(5);
        assert_eq!(clock.now_ms(), 15);
        clock.set(100);
        assert_eq!(clock.now_ms(), 100);
    }
}
