//! Textseal - passphrase-based encryption of short text values
//!
//! A key is derived from the passphrase with PBKDF2-HMAC-SHA256 over a
//! random 8-byte salt, the text is sealed with AES-256-GCM under a random
//! 12-byte nonce, and `salt || nonce || ciphertext || tag` is returned as
//! standard base64.
//!
//! ```no_run
//! let envelope = textseal::encrypt("This is my plaintext", "This is my passphrase")?;
//! let plaintext = textseal::decrypt(&envelope, "This is my passphrase")?;
//! assert_eq!(plaintext, "This is my plaintext");
//! # Ok::<(), textseal::TextSealError>(())
//! ```

#![forbid(unsafe_code)]

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod passphrase;
pub mod random;
pub mod sealer;
pub mod text_ops;

pub use error::{ErrorCategory, ErrorKind, Result, TextSealError};
pub use kdf::KdfParams;
pub use sealer::{Sealer, Session, decrypt, encrypt};
