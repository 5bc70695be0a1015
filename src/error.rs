use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// In particular this means that use of Internal is never a guarantee
    /// the error is not, for example, due to a user error - merely that it
    /// cannot be confidently determined by the code.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Closed set of failure conditions. Callers match on these rather than on
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Reading from the random source failed. Nothing can be sealed without
    /// fresh salt and nonce bytes.
    RandomSource,
    /// A key was not exactly 32 bytes.
    InvalidKey,
    /// A nonce was not exactly 12 bytes.
    InvalidNonce,
    /// The envelope text is not valid base64, or decodes to fewer bytes
    /// than a salt plus a nonce.
    Decode,
    /// Authentication failed due to an incorrect passphrase or tampering
    /// or corruption. The two cases are deliberately indistinguishable.
    AuthenticationFailed,
    /// AES-256-GCM refused to seal the plaintext.
    SealFailure,
    /// Key derivation parameters are unusable (zero iterations).
    InvalidParams,
    /// Opened plaintext or a passphrase source was not valid UTF-8.
    InvalidUtf8,
    /// No passphrase source was configured.
    PassphraseUnavailable,
    /// Interaction with the filesystem or stdin failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct TextSealError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Specific condition tag for consumers that need to branch their
    /// behavior.
    pub kind: ErrorKind,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl TextSealError {
    /// Creates a new error tagged with a category and kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind,
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// The message followed by every underlying cause, separated by `": "`.
    pub fn chain_message(&self) -> String {
        let mut msg = self.message().to_owned();
        let mut source = StdError::source(self);
        while let Some(cause) = source {
            msg.push_str(": ");
            msg.push_str(&cause.to_string());
            source = cause.source();
        }
        msg
    }

    /// Wraps the current error with a higher-level message while preserving
    /// the original as source. Category and kind carry over unchanged.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TextSealError>;
