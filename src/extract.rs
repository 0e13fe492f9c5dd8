//! Plain-text extraction from files on disk.

use std::path::Path;

use thiserror::Error;

/// Bytes inspected when sniffing for binary content.
const SNIFF_LEN: usize = 8192;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary content")]
    Binary,

    #[error("content is not valid UTF-8")]
    Encoding,
}

/// Turns a file into plain text suitable for indexing.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Reads UTF-8 text files as-is, rejecting binary content.
#[derive(Debug, Default, Clone)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path)?;

        let sniff = &bytes[..bytes.len().min(SNIFF_LEN)];
        if sniff.contains(&0) {
            return Err(ExtractionError::Binary);
        }

        let mut text = String::from_utf8(bytes).map_err(|_| ExtractionError::Encoding)?;
        if text.starts_with('\u{feff}') {
            text.remove(0);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_utf8_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("note.txt");
        fs::write(&path, "Zażółć gęślą jaźń").unwrap();

        let text = PlainTextExtractor.extract(&path).unwrap();
        assert_eq!(text, "Zażółć gęślą jaźń");
    }

    #[test]
    fn test_extract_strips_bom() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bom.txt");
        fs::write(&path, "\u{feff}hello").unwrap();

        assert_eq!(PlainTextExtractor.extract(&path).unwrap(), "hello");
    }

    #[test]
    fn test_extract_rejects_binary() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blob.bin");
        fs::write(&path, [0x7f, b'E', b'L', b'F', 0, 0, 1]).unwrap();

        assert!(matches!(
            PlainTextExtractor.extract(&path),
            Err(ExtractionError::Binary)
        ));
    }

    #[test]
    fn test_extract_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latin2.txt");
        fs::write(&path, [b'g', 0xea, b's', b'l']).unwrap();

        assert!(matches!(
            PlainTextExtractor.extract(&path),
            Err(ExtractionError::Encoding)
        ));
    }

    #[test]
    fn test_extract_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = PlainTextExtractor.extract(&temp_dir.path().join("gone.txt"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }
}
