//! Envelope serialization
//!
//! The binary layout is:
//! - salt: 8 bytes
//! - nonce: 12 bytes
//! - sealed: ciphertext followed by the 16-byte GCM tag
//!
//! The textual form is the standard base64 alphabet with padding. Both
//! encryption and decryption go through this module, so the offsets live
//! in exactly one place.

use crate::cipher::NONCE_LEN;
use crate::error::{ErrorCategory, ErrorKind, Result, TextSealError};
use crate::kdf::SALT_LEN;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::borrow::Cow;

/// Smallest decodable envelope: a salt and a nonce with nothing after them.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    sealed: Vec<u8>,
}

impl Envelope {
    pub fn new(salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN], sealed: Vec<u8>) -> Self {
        Self {
            salt,
            nonce,
            sealed,
        }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Ciphertext with the authentication tag appended.
    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_ENVELOPE_LEN + self.sealed.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.sealed);
        out
    }

    /// Split raw envelope bytes into their parts.
    ///
    /// Only the length is checked here; whether the sealed part is long
    /// enough to hold a tag is left to authentication.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let truncated = || {
            TextSealError::with_kind(
                ErrorCategory::User,
                ErrorKind::Decode,
                format!(
                    "envelope too short: need at least {} bytes, got {}",
                    MIN_ENVELOPE_LEN,
                    bytes.len()
                ),
            )
        };

        let (salt, rest) = bytes.split_first_chunk::<SALT_LEN>().ok_or_else(truncated)?;
        let (nonce, sealed) = rest.split_first_chunk::<NONCE_LEN>().ok_or_else(truncated)?;

        Ok(Self::new(*salt, *nonce, sealed.to_vec()))
    }

    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse the textual form.
    ///
    /// Line breaks anywhere in the text are ignored, so an envelope read
    /// from a file or a pipe with a trailing newline still decodes.
    pub fn decode(text: &str) -> Result<Self> {
        let text = if text.contains(['\r', '\n']) {
            Cow::Owned(text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect())
        } else {
            Cow::Borrowed(text)
        };

        let bytes = STANDARD.decode(text.as_bytes()).map_err(|e| {
            TextSealError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Decode,
                "base64 decoding failed",
                e,
            )
        })?;

        Self::from_bytes(&bytes)
    }
}
