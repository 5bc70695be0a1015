//! Command-level operations
//!
//! Glue between the command line and the sealer: resolves where the
//! passphrase and the input text come from, then encrypts or decrypts.
//! Passphrase source failures gain context; core errors are passed through
//! unchanged.

use crate::error::{ErrorCategory, ErrorKind, Result, TextSealError};
use crate::passphrase::PassphraseReader;
use crate::sealer::Sealer;
use std::io::Read;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Encrypt or decrypt `input`, or the whole of `stdin` when no input was
/// given.
///
/// The passphrase is read before the input, so when both come from stdin
/// the passphrase consumes it.
pub fn run(
    mode: Mode,
    input: Option<String>,
    stdin: &mut dyn Read,
    passphrase_reader: &mut dyn PassphraseReader,
    sealer: &Sealer,
) -> Result<String> {
    let passphrase = passphrase_reader
        .read_passphrase()
        .map_err(|e| e.with_context("failed to obtain passphrase"))?;
    let input = match input {
        Some(text) => text,
        None => read_input(stdin)?,
    };
    debug!(?mode, input_len = input.len(), "running");

    match mode {
        Mode::Encrypt => sealer.encrypt(&input, &passphrase),
        Mode::Decrypt => sealer.decrypt(&input, &passphrase),
    }
}

fn read_input(stdin: &mut dyn Read) -> Result<String> {
    let mut input = String::new();
    stdin.read_to_string(&mut input).map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::InvalidData {
            ErrorKind::InvalidUtf8
        } else {
            ErrorKind::Io
        };
        TextSealError::with_kind_and_source(
            ErrorCategory::User,
            kind,
            "failed to read input from stdin",
            e,
        )
    })?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passphrase::{
        ConstantPassphraseReader, FilePassphraseReader, ReaderPassphraseReader,
    };
    use tempfile::TempDir;

    fn constant(passphrase: &str) -> ConstantPassphraseReader {
        ConstantPassphraseReader::new(passphrase.to_string())
    }

    #[test]
    fn test_roundtrip_with_explicit_input() {
        let sealer = Sealer::legacy();
        let mut stdin: &[u8] = b"";

        let envelope = run(
            Mode::Encrypt,
            Some("Hello, textseal!".to_string()),
            &mut stdin,
            &mut constant("test password"),
            &sealer,
        )
        .unwrap();
        let plaintext = run(
            Mode::Decrypt,
            Some(envelope),
            &mut stdin,
            &mut constant("test password"),
            &sealer,
        )
        .unwrap();

        assert_eq!(plaintext, "Hello, textseal!");
    }

    #[test]
    fn test_input_from_stdin() {
        let sealer = Sealer::legacy();
        let mut stdin: &[u8] = b"from stdin\n";

        let envelope = run(
            Mode::Encrypt,
            None,
            &mut stdin,
            &mut constant("pw"),
            &sealer,
        )
        .unwrap();

        // Plaintext is taken verbatim, trailing newline included.
        assert_eq!(sealer.decrypt(&envelope, "pw").unwrap(), "from stdin\n");
    }

    #[test]
    fn test_envelope_from_stdin_with_newline() {
        let sealer = Sealer::legacy();
        let envelope = sealer.encrypt("secret", "pw").unwrap();
        let piped = format!("{}\n", envelope);
        let mut stdin = piped.as_bytes();

        let plaintext = run(
            Mode::Decrypt,
            None,
            &mut stdin,
            &mut constant("pw"),
            &sealer,
        )
        .unwrap();
        assert_eq!(plaintext, "secret");
    }

    #[test]
    fn test_passphrase_read_before_input() {
        // Passphrase and input both on stdin: the passphrase takes all of it
        // and the input is empty.
        let sealer = Sealer::legacy();
        let mut passphrase_reader = ReaderPassphraseReader::new(Box::new(&b"pw"[..]));
        let mut stdin: &[u8] = b"";

        let envelope = run(
            Mode::Encrypt,
            None,
            &mut stdin,
            &mut passphrase_reader,
            &sealer,
        )
        .unwrap();
        assert_eq!(sealer.decrypt(&envelope, "pw").unwrap(), "");
    }

    #[test]
    fn test_wrong_passphrase() {
        let sealer = Sealer::legacy();
        let envelope = sealer.encrypt("secret", "correct").unwrap();
        let mut stdin: &[u8] = b"";

        let err = run(
            Mode::Decrypt,
            Some(envelope),
            &mut stdin,
            &mut constant("wrong"),
            &sealer,
        )
        .expect_err("expected authentication failure");
        assert_eq!(err.kind, ErrorKind::AuthenticationFailed);
    }

    #[test]
    fn test_missing_passphrase_file_has_context() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let mut passphrase_reader = FilePassphraseReader::new(&missing);
        let mut stdin: &[u8] = b"";

        let err = run(
            Mode::Encrypt,
            Some("secret".to_string()),
            &mut stdin,
            &mut passphrase_reader,
            &Sealer::legacy(),
        )
        .expect_err("expected io error");

        assert_eq!(err.kind, ErrorKind::Io);
        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.message(), "failed to obtain passphrase");
        let cause = err.source_error().unwrap().to_string();
        assert_eq!(
            cause,
            format!("failed to read passphrase from {}", missing.display())
        );
        assert!(
            err.chain_message()
                .starts_with("failed to obtain passphrase: failed to read passphrase from")
        );
    }

    #[test]
    fn test_core_errors_pass_through() {
        let mut stdin: &[u8] = b"";
        let err = run(
            Mode::Decrypt,
            Some("!!!".to_string()),
            &mut stdin,
            &mut constant("pw"),
            &Sealer::legacy(),
        )
        .expect_err("expected decode error");

        assert_eq!(err.kind, ErrorKind::Decode);
        assert_eq!(err.message(), "base64 decoding failed");
    }

    #[test]
    fn test_non_utf8_stdin() {
        let mut stdin: &[u8] = &[0xff, 0xfe];
        let err = run(
            Mode::Encrypt,
            None,
            &mut stdin,
            &mut constant("pw"),
            &Sealer::legacy(),
        )
        .expect_err("expected utf-8 error");
        assert_eq!(err.kind, ErrorKind::InvalidUtf8);
    }
}
