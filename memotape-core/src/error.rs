//! Error types for memotape operations.
//!
//! The decorator traits stay generic over caller error types; this module
//! holds the concrete errors this crate raises on its own behalf. The
//! taxonomy follows the two failure classes the layer distinguishes:
//! transient failures travel through the generic error parameter untouched
//! (or translated in kind via [`MapErr`]), while programmer errors - an
//! absent or invalid wrapped result - fail fast through [`ValueError`] and
//! are never silently defaulted.
//!
//! [`MapErr`]: crate::MapErr

use thiserror::Error;

/// Programmer-error failures around deferred values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("Deferred value missing: {what}")]
    Missing { what: String },

    #[error("Deferred value invalid: {reason}")]
    Invalid { reason: String },

    #[error("Evaluation failed: {reason}")]
    EvalFailed { reason: String },
}

impl ValueError {
    /// Build an [`ValueError::EvalFailed`] from any displayable failure.
    ///
    /// The standard translation target for call sites that want a single
    /// concrete error type out of a generic scalar chain.
    pub fn from_failure<E: std::fmt::Display>(err: E) -> Self {
        ValueError::EvalFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for memotape operations.
pub type MemotapeResult<T> = Result<T, ValueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_error_display_missing() {
        let err = ValueError::Missing {
            what: "derived sort key".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Deferred value missing"));
        assert!(msg.contains("derived sort key"));
    }

    #[test]
    fn test_value_error_display_invalid() {
        let err = ValueError::Invalid {
            reason: "negative length".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Deferred value invalid"));
        assert!(msg.contains("negative length"));
    }

    #[test]
    fn test_from_failure_wraps_display() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ValueError::from_failure(io);
        assert!(matches!(err, ValueError::EvalFailed { .. }));
        assert!(format!("{}", err).contains("gone"));
    }
}
