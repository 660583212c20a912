//! Error types for byte-source operations.

use thiserror::Error;

/// Failures raised while opening or draining a byte source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O failure in byte source: {0}")]
    Io(#[from] std::io::Error),

    #[error("One-shot source already consumed")]
    Exhausted,

    #[error("Tape overflow: origin exceeded {limit} bytes")]
    TapeOverflow { limit: u64 },
}

impl SourceError {
    /// Returns true for failures worth retrying (transient I/O).
    ///
    /// [`SourceError::Exhausted`] is not retryable: the origin is gone, not
    /// momentarily unavailable. [`SourceError::TapeOverflow`] is not
    /// retryable under the same configuration.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Io(_))
    }
}

/// Result type alias for byte-source operations.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_and_from() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "socket reset");
        let err = SourceError::from(io);
        let msg = format!("{}", err);
        assert!(msg.contains("I/O failure"));
        assert!(msg.contains("socket reset"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_exhausted_is_not_retryable() {
        let err = SourceError::Exhausted;
        assert!(!err.is_retryable());
        assert!(format!("{}", err).contains("already consumed"));
    }

    #[test]
    fn test_overflow_carries_limit() {
        let err = SourceError::TapeOverflow { limit: 4096 };
        assert!(format!("{}", err).contains("4096"));
        assert!(!err.is_retryable());
    }
}
