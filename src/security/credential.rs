//! Credential Hashing
//!
//! Only a one-way digest of a credential is ever stored.
//!
//! # Scheme
//! ```text
//! digest = SHA-256( DOMAIN || len(username) as u64 LE || username || credential )
//! ```
//! Binding the username into the digest keeps two accounts with the same
//! credential from sharing a digest. There is no per-account random salt
//! or work factor, so this is not a password-hardening KDF.

use sha2::{Digest, Sha256};

use super::zeroize::{constant_time_eq, SecureKey256};

const DOMAIN: &[u8] = b"kernel-services/credential/v1";

/// Stored digest of a user's credential, wiped on drop.
#[derive(Debug, Clone)]
pub struct CredentialHash(SecureKey256);

impl CredentialHash {
    /// Hash `credential` for `username`.
    pub fn derive(username: &str, credential: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN);
        hasher.update((username.len() as u64).to_le_bytes());
        hasher.update(username.as_bytes());
        hasher.update(credential);

        let mut digest = SecureKey256::new([0u8; 32]);
        digest.inner_mut().copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    /// Check `credential` against this digest in constant time.
    pub fn verify(&self, username: &str, credential: &[u8]) -> bool {
        let candidate = Self::derive(username, credential);
        constant_time_eq(self.0.inner(), candidate.0.inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let hash = CredentialHash::derive("alice", b"hunter2");
        assert!(hash.verify("alice", b"hunter2"));
        assert!(!hash.verify("alice", b"hunter3"));
        assert!(!hash.verify("alice", b""));
    }

    #[test]
    fn test_username_is_bound() {
        let a = CredentialHash::derive("alice", b"same");
        let b = CredentialHash::derive("bob", b"same");
        assert_ne!(a.0.inner(), b.0.inner());
        assert!(!a.verify("bob", b"same"));
    }

    #[test]
    fn test_length_prefix_separates_fields() {
        let a = CredentialHash::derive("ab", b"c");
        let b = CredentialHash::derive("a", b"bc");
        assert_ne!(a.0.inner(), b.0.inner());
    }
}
