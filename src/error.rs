//! Error types for pagemark library.

use std::io;
use thiserror::Error;

/// Result type alias for pagemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur around the normalization pipeline.
///
/// The passes themselves never fail on document content: a document without
/// pages, paragraphs or figures is valid input.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The options cannot be used to build a pipeline.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A pattern derived from the options failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidOptions("indent width must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid options: indent width must be at least 1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_utf8_error_conversion() {
        let bytes = vec![0x66, 0x6f, 0xff];
        let err: Error = String::from_utf8(bytes).unwrap_err().into();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
