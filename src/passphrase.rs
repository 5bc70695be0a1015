//! Passphrase sources

use crate::error::{ErrorCategory, ErrorKind, Result, TextSealError};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Trait for reading passphrases from various sources
pub trait PassphraseReader {
    /// Read a passphrase, verbatim, including any trailing newline.
    ///
    /// Returns the passphrase wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>>;
}

/// Returns a fixed passphrase, e.g. one given on the command line
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<String>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: String) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        Ok(self.passphrase.clone())
    }
}

/// Reads the whole contents of a file as the passphrase
pub struct FilePassphraseReader {
    path: PathBuf,
}

impl FilePassphraseReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PassphraseReader for FilePassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        let data = Zeroizing::new(fs::read(&self.path).map_err(|e| read_error(&self.path, e))?);
        utf8_passphrase(&data)
    }
}

/// Reads passphrase from any io::Read source, typically stdin
pub struct ReaderPassphraseReader {
    reader: Box<dyn Read>,
}

impl ReaderPassphraseReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl PassphraseReader for ReaderPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            TextSealError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "error reading passphrase",
                e,
            )
        })?;
        utf8_passphrase(&data)
    }
}

/// Pick the passphrase source: a non-empty explicit passphrase wins,
/// otherwise the file (`-` meaning stdin).
pub fn passphrase_reader(
    passphrase: Option<String>,
    passphrase_file: Option<PathBuf>,
) -> Result<Box<dyn PassphraseReader>> {
    match (passphrase.filter(|p| !p.is_empty()), passphrase_file) {
        (Some(passphrase), _) => Ok(Box::new(ConstantPassphraseReader::new(passphrase))),
        (None, Some(path)) if path.as_os_str() == "-" => {
            Ok(Box::new(ReaderPassphraseReader::new(Box::new(io::stdin()))))
        }
        (None, Some(path)) => Ok(Box::new(FilePassphraseReader::new(path))),
        (None, None) => Err(TextSealError::with_kind(
            ErrorCategory::User,
            ErrorKind::PassphraseUnavailable,
            "must specify passphrase or passphrase file",
        )),
    }
}

fn utf8_passphrase(data: &[u8]) -> Result<Zeroizing<String>> {
    let passphrase = std::str::from_utf8(data).map_err(|e| {
        TextSealError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidUtf8,
            "passphrase is not valid UTF-8",
            e,
        )
    })?;
    Ok(Zeroizing::new(passphrase.to_owned()))
}

fn read_error(path: &Path, err: io::Error) -> TextSealError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    TextSealError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read passphrase from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_constant_reader() {
        let mut reader = ConstantPassphraseReader::new("test123".to_string());
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "test123");
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "test123");
    }

    #[test]
    fn test_reader_passphrase_reader() {
        let data = b"mypassword\n";
        let mut reader = ReaderPassphraseReader::new(Box::new(&data[..]));
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "mypassword\n");
    }

    #[test]
    fn test_reader_passphrase_reader_empty() {
        let data = b"";
        let mut reader = ReaderPassphraseReader::new(Box::new(&data[..]));
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "");
    }

    #[test]
    fn test_reader_passphrase_reader_non_utf8() {
        let data: &'static [u8] = &[0xff, 0xfe, 0x00, 0x01];
        let mut reader = ReaderPassphraseReader::new(Box::new(data));
        let err = reader.read_passphrase().expect_err("expected utf-8 error");
        assert_eq!(err.kind, ErrorKind::InvalidUtf8);
    }

    #[test]
    fn test_file_reader() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("passphrase.txt");
        fs::write(&path, "from a file").unwrap();

        let mut reader = FilePassphraseReader::new(&path);
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "from a file");
    }

    #[test]
    fn test_file_reader_missing() {
        let temp_dir = TempDir::new().unwrap();
        let mut reader = FilePassphraseReader::new(temp_dir.path().join("missing"));
        let err = reader.read_passphrase().expect_err("expected io error");

        assert_eq!(err.kind, ErrorKind::Io);
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_explicit_passphrase_wins() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("passphrase.txt");
        fs::write(&path, "from a file").unwrap();

        let mut reader = passphrase_reader(Some("explicit".to_string()), Some(path)).unwrap();
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "explicit");
    }

    #[test]
    fn test_file_used_without_explicit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("passphrase.txt");
        fs::write(&path, "from a file").unwrap();

        let mut reader = passphrase_reader(None, Some(path)).unwrap();
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "from a file");
    }

    #[test]
    fn test_empty_explicit_is_absent() {
        let err = passphrase_reader(Some(String::new()), None)
            .err()
            .expect("expected missing passphrase error");
        assert_eq!(err.kind, ErrorKind::PassphraseUnavailable);
        assert_eq!(err.message(), "must specify passphrase or passphrase file");
    }

    #[test]
    fn test_empty_explicit_falls_back_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("passphrase.txt");
        fs::write(&path, "from a file").unwrap();

        let mut reader = passphrase_reader(Some(String::new()), Some(path)).unwrap();
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "from a file");
    }

    #[test]
    fn test_no_source() {
        let err = passphrase_reader(None, None)
            .err()
            .expect("expected missing passphrase error");
        assert_eq!(err.kind, ErrorKind::PassphraseUnavailable);
    }
}
