//! Permission Bits
//!
//! Groups and resource permission entries grant a bitmask. A request is
//! satisfied only when every requested bit is granted.

use bitflags::bitflags;

bitflags! {
    /// Permission bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Read permission.
        const READ    = 1 << 0;
        /// Write permission.
        const WRITE   = 1 << 1;
        /// Execute permission.
        const EXECUTE = 1 << 2;
        /// Delete permission.
        const DELETE  = 1 << 3;

        /// Read and write.
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();

        /// Every bit set, including bits other subsystems define.
        const ALL = u64::MAX;
    }
}

impl Permissions {
    /// Check whether this grant satisfies every bit of `requested`.
    #[inline]
    pub const fn grants(self, requested: Self) -> bool {
        self.bits() & requested.bits() == requested.bits()
    }
}
