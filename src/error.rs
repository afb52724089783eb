//! Error handling and custom error types
//!
//! Provides unified error handling across the pipeline using thiserror.
//! Every error is terminal for the operation that raised it; nothing is
//! retried and no partial result is ever returned alongside one.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Failed to load image: {0}")]
    Decode(String),

    #[error("Failed to encode {format}: {message}")]
    Encode { format: String, message: String },

    #[error("Invalid option '{option}': {message}")]
    InvalidOption { option: String, message: String },

    #[error("Nothing to process: {0}")]
    NothingSelected(String),

    #[error("Processing timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl Error {
    pub fn encode(format: impl Into<String>, message: impl ToString) -> Self {
        Error::Encode {
            format: format.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_option(option: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidOption {
            option: option.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_display() {
        let err = Error::encode("jpeg", "surface too large");
        assert_eq!(err.to_string(), "Failed to encode jpeg: surface too large");
    }

    #[test]
    fn test_invalid_option_display() {
        let err = Error::invalid_option("quality", "must be within 0.0..=1.0");
        assert_eq!(
            err.to_string(),
            "Invalid option 'quality': must be within 0.0..=1.0"
        );
    }

    #[test]
    fn test_timeout_display_keeps_sub_second_precision() {
        let err = Error::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Processing timed out after 250ms");
    }

    #[test]
    fn test_io_error_converts() {
        let err: Error = std::io::Error::other("disk gone").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
