//! Sources of salt and nonce bytes
//!
//! Everything that needs fresh randomness takes it from a [`RandomSource`],
//! so tests can swap in a deterministic source without touching the
//! production code path.

use crate::error::{ErrorCategory, ErrorKind, Result, TextSealError};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fills buffers with random bytes.
///
/// Implementations must be safe to call concurrently; a single source is
/// shared by a `Sealer` and every `Session` it creates.
pub trait RandomSource: Send + Sync {
    /// Fill `buf` completely or fail with [`ErrorKind::RandomSource`].
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// The operating system's cryptographically secure generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(buf).map_err(|e| {
            TextSealError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::RandomSource,
                "failed to read from system random source",
                e,
            )
        })
    }
}

/// Hands out the bytes of a fixed buffer in order (for testing).
///
/// Each call to [`fill`](RandomSource::fill) consumes the next `buf.len()`
/// bytes. Running out is reported as a random source failure.
///
/// NEVER use this in production - it makes every salt and nonce predictable.
#[derive(Debug)]
pub struct SequenceRandom {
    bytes: Vec<u8>,
    pos: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            pos: AtomicUsize::new(0),
        }
    }

    /// Number of bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.bytes
            .len()
            .saturating_sub(self.pos.load(Ordering::SeqCst))
    }
}

impl RandomSource for SequenceRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        let start = self.pos.fetch_add(buf.len(), Ordering::SeqCst);
        let chunk = start
            .checked_add(buf.len())
            .and_then(|end| self.bytes.get(start..end))
            .ok_or_else(|| {
                TextSealError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::RandomSource,
                    "sequence random source exhausted",
                )
            })?;
        buf.copy_from_slice(chunk);
        Ok(())
    }
}
