//! Passphrase key derivation using PBKDF2-HMAC-SHA256
//!
//! The derived key is 32 bytes (an AES-256 key). The salt is 8 bytes and
//! travels in the clear at the front of every envelope.

use crate::error::{ErrorCategory, ErrorKind, Result, TextSealError};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::fmt;
use tracing::trace;
use zeroize::Zeroizing;

/// Length of salt in bytes
pub const SALT_LEN: usize = 8;

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// Iteration count of the original scheme. Envelopes produced by it can
/// only be opened with [`KdfParams::legacy`].
pub const LEGACY_ITERATIONS: u32 = 1_000;

/// Iteration count used unless the caller asks for something else.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Work factor for key derivation.
///
/// The envelope does not record which parameters were used, so both the
/// encrypting and the decrypting side must agree on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl KdfParams {
    pub fn new(iterations: u32) -> Result<Self> {
        if iterations == 0 {
            return Err(TextSealError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidParams,
                "key derivation requires at least one iteration",
            ));
        }
        Ok(Self { iterations })
    }

    /// Compatibility mode: the fixed 1000-iteration work factor.
    pub const fn legacy() -> Self {
        Self {
            iterations: LEGACY_ITERATIONS,
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// A derived 32-byte key, wiped from memory on drop.
#[derive(Clone)]
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a 32-byte key from a passphrase and salt.
///
/// Deterministic: the same passphrase, salt and params always produce the
/// same key. An empty passphrase is accepted.
pub fn derive_key(passphrase: &[u8], salt: &[u8; SALT_LEN], params: &KdfParams) -> DerivedKey {
    trace!(iterations = params.iterations, "deriving key");

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(passphrase, salt, params.iterations, key.as_mut_slice());

    DerivedKey(key)
}
