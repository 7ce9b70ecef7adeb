//! Error types for camyuv

use thiserror::Error;

/// Result type alias for camyuv operations
pub type Result<T> = std::result::Result<T, Error>;

/// camyuv error type
#[derive(Error, Debug)]
pub enum Error {
    // Input contract errors
    #[error("Unsupported pixel format: {0}")]
    InvalidFormat(String),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("{what} buffer too small: have={actual}, need={required}")]
    BufferTooSmall {
        what: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{what} buffer size mismatch: have={actual}, need exactly {required}")]
    BufferSizeMismatch {
        what: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Frame size overflows usize: {width}x{height}")]
    SizeOverflow { width: u32, height: u32 },

    // Backend errors
    #[error("Colorspace conversion error: {0}")]
    ColorspaceConversion(String),

    // General errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if the caller passed inconsistent sizes or formats.
    ///
    /// These are never transient: retrying the same call fails the same way.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_)
                | Error::InvalidDimensions(_)
                | Error::BufferTooSmall { .. }
                | Error::BufferSizeMismatch { .. }
                | Error::SizeOverflow { .. }
        )
    }

    pub(crate) fn too_small(what: &'static str, required: usize, actual: usize) -> Self {
        Error::BufferTooSmall {
            what,
            required,
            actual,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_too_small_message() {
        let err = Error::too_small("dst", 12, 8);
        assert_eq!(err.to_string(), "dst buffer too small: have=8, need=12");
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_io_is_not_contract_violation() {
        let err = Error::from(std::io::Error::other("disk"));
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn test_backend_failure_is_not_contract_violation() {
        let err = Error::ColorspaceConversion("scaler".into());
        assert_eq!(err.to_string(), "Colorspace conversion error: scaler");
        assert!(!err.is_contract_violation());
    }
}
