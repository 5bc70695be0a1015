//! Authenticated encryption using AES-256-GCM
//!
//! `seal` produces `ciphertext || tag` where the ciphertext is as long as
//! the plaintext and the tag is 16 bytes. No associated data is
//! authenticated. `open` verifies the tag before releasing any plaintext.

use crate::error::{ErrorCategory, ErrorKind, Result, TextSealError};
use crate::kdf::KEY_LEN;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

fn new_cipher(key: &[u8]) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key).map_err(|_| {
        TextSealError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InvalidKey,
            format!("key must be {} bytes, got {}", KEY_LEN, key.len()),
        )
    })
}

fn check_nonce(nonce: &[u8]) -> Result<&Nonce<U12>> {
    if nonce.len() != NONCE_LEN {
        return Err(TextSealError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InvalidNonce,
            format!("nonce must be {} bytes, got {}", NONCE_LEN, nonce.len()),
        ));
    }
    Ok(Nonce::from_slice(nonce))
}

/// Encrypt and authenticate `plaintext` under `key` and `nonce`.
///
/// The caller is responsible for never reusing a nonce with the same key.
pub fn seal(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = new_cipher(key)?;
    let nonce = check_nonce(nonce)?;

    cipher.encrypt(nonce, plaintext).map_err(|e| {
        TextSealError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::SealFailure,
            format!("encryption failed: {}", e),
        )
    })
}

/// Verify and decrypt `sealed` (`ciphertext || tag`).
///
/// A wrong key, a wrong nonce, and modified ciphertext all fail the same
/// way, with [`ErrorKind::AuthenticationFailed`].
pub fn open(key: &[u8], nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    let cipher = new_cipher(key)?;
    let nonce = check_nonce(nonce)?;

    cipher.decrypt(nonce, sealed).map_err(|_| {
        TextSealError::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "corrupt input, tampered-with data, or bad passphrase",
        )
    })
}
