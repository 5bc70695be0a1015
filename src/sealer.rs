//! Passphrase-based encryption of text into envelopes
//!
//! Encrypting generates a salt, derives a key from the passphrase, seals
//! the plaintext under a fresh nonce and base64-encodes
//! `salt || nonce || ciphertext || tag`. Decrypting re-derives the key from
//! the embedded salt, so any envelope can be opened with only the
//! passphrase and the same key derivation parameters.

use crate::cipher::{self, NONCE_LEN};
use crate::envelope::Envelope;
use crate::error::{ErrorCategory, ErrorKind, Result, TextSealError};
use crate::kdf::{self, DerivedKey, KdfParams, SALT_LEN};
use crate::random::{OsRandom, RandomSource};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Encrypt `plaintext` with `passphrase` using default key derivation
/// parameters and the system random source.
pub fn encrypt(plaintext: &str, passphrase: &str) -> Result<String> {
    Sealer::default().encrypt(plaintext, passphrase)
}

/// Decrypt an envelope produced by [`encrypt`] (or by a [`Session`] built
/// with default parameters).
pub fn decrypt(envelope: &str, passphrase: &str) -> Result<String> {
    Sealer::default().decrypt(envelope, passphrase)
}

/// Key derivation parameters plus a random source.
///
/// Cheap to clone; clones share the random source.
#[derive(Clone)]
pub struct Sealer {
    params: KdfParams,
    random: Arc<dyn RandomSource>,
}

impl Sealer {
    pub fn new(params: KdfParams) -> Self {
        Self {
            params,
            random: Arc::new(OsRandom),
        }
    }

    /// Compatibility mode for envelopes written with the original
    /// 1000-iteration work factor.
    pub fn legacy() -> Self {
        Self::new(KdfParams::legacy())
    }

    /// Replace the random source used for salts and nonces.
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    pub fn encrypt(&self, plaintext: &str, passphrase: &str) -> Result<String> {
        self.encrypt_bytes(plaintext.as_bytes(), passphrase.as_bytes())
    }

    /// Like [`encrypt`](Self::encrypt), for plaintext and passphrase that
    /// are not necessarily UTF-8.
    pub fn encrypt_bytes(&self, plaintext: &[u8], passphrase: &[u8]) -> Result<String> {
        let (salt, key) = self.new_key(passphrase)?;
        seal_envelope(self.random.as_ref(), &salt, &key, plaintext)
    }

    pub fn decrypt(&self, envelope: &str, passphrase: &str) -> Result<String> {
        let plaintext = self.decrypt_bytes(envelope, passphrase.as_bytes())?;
        String::from_utf8(plaintext).map_err(|e| {
            TextSealError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidUtf8,
                "decrypted plaintext is not valid UTF-8",
                e,
            )
        })
    }

    pub fn decrypt_bytes(&self, envelope: &str, passphrase: &[u8]) -> Result<Vec<u8>> {
        let envelope = Envelope::decode(envelope)?;
        debug!(
            sealed_len = envelope.sealed().len(),
            iterations = self.params.iterations(),
            "opening envelope"
        );

        let key = kdf::derive_key(passphrase, envelope.salt(), &self.params);
        cipher::open(key.as_bytes(), envelope.nonce(), envelope.sealed())
    }

    /// Derive a key once and keep it for any number of encryptions.
    pub fn session(&self, passphrase: &str) -> Result<Session> {
        let (salt, key) = self.new_key(passphrase.as_bytes())?;
        debug!(iterations = self.params.iterations(), "created session");

        Ok(Session {
            salt,
            key,
            random: Arc::clone(&self.random),
        })
    }

    fn new_key(&self, passphrase: &[u8]) -> Result<([u8; SALT_LEN], DerivedKey)> {
        let mut salt = [0u8; SALT_LEN];
        self.random.fill(&mut salt)?;
        let key = kdf::derive_key(passphrase, &salt, &self.params);
        Ok((salt, key))
    }
}

impl Default for Sealer {
    fn default() -> Self {
        Self::new(KdfParams::default())
    }
}

impl fmt::Debug for Sealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sealer")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A derived key and the salt it came from.
///
/// Every envelope a session produces carries the same salt and a fresh
/// nonce, and decrypts with plain [`decrypt`] and the original passphrase.
/// Sessions are immutable after creation, so one can be shared across
/// threads.
pub struct Session {
    salt: [u8; SALT_LEN],
    key: DerivedKey,
    random: Arc<dyn RandomSource>,
}

impl Session {
    /// Create a session with default key derivation parameters and the
    /// system random source.
    pub fn new(passphrase: &str) -> Result<Self> {
        Sealer::default().session(passphrase)
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.encrypt_bytes(plaintext.as_bytes())
    }

    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<String> {
        seal_envelope(self.random.as_ref(), &self.salt, &self.key, plaintext)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("salt", &self.salt)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

fn seal_envelope(
    random: &dyn RandomSource,
    salt: &[u8; SALT_LEN],
    key: &DerivedKey,
    plaintext: &[u8],
) -> Result<String> {
    let mut nonce = [0u8; NONCE_LEN];
    random.fill(&mut nonce)?;

    let sealed = cipher::seal(key.as_bytes(), &nonce, plaintext)?;
    debug!(plaintext_len = plaintext.len(), "sealed envelope");

    Ok(Envelope::new(*salt, nonce, sealed).encode())
}
