//! Secure Memory Zeroization
//!
//! Credential digests are wiped when they are dropped so a destroyed user
//! leaves nothing behind in freed heap memory.
//!
//! # Design
//! - `Zeroize` trait for types that can be securely cleared
//! - `SecureWrapper<T>` RAII type that zeros on drop
//! - Volatile writes prevent compiler optimization of zeroing

use core::fmt;
use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};

/// Trait for types that can be securely zeroed.
pub trait Zeroize {
    /// Overwrite this value with zeros.
    ///
    /// This operation is guaranteed to not be optimized away.
    fn zeroize(&mut self);
}

impl Zeroize for [u8] {
    fn zeroize(&mut self) {
        for byte in self.iter_mut() {
            // SAFETY: `byte` is a valid, aligned, exclusive reference.
            unsafe {
                ptr::write_volatile(byte, 0);
            }
        }
        compiler_fence(Ordering::SeqCst);
    }
}

impl<const N: usize> Zeroize for [u8; N] {
    fn zeroize(&mut self) {
        self.as_mut_slice().zeroize();
    }
}

/// A wrapper that securely zeroizes its contents on drop.
///
/// `Debug` never prints the contents.
pub struct SecureWrapper<T: Zeroize> {
    inner: T,
}

impl<T: Zeroize> SecureWrapper<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    #[inline]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Zeroize> fmt::Debug for SecureWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureWrapper(<redacted>)")
    }
}

impl<T: Zeroize> Drop for SecureWrapper<T> {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for SecureWrapper<T> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

/// A 256-bit secret that is wiped on drop.
pub type SecureKey256 = SecureWrapper<[u8; 32]>;

/// Compare two byte strings without an early exit on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    // SAFETY: reading a local through a valid reference.
    unsafe { ptr::read_volatile(&diff) == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroize_slice() {
        let mut data = [0x42u8; 16];
        data.zeroize();
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_secure_wrapper_access() {
        let mut key = SecureKey256::new([0x42u8; 32]);
        key.inner_mut()[0] = 0xFF;
        assert_eq!(key.inner()[0], 0xFF);
        assert_eq!(key.clone().inner(), key.inner());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }
}
