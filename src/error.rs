//! Error types for instance loading and solver setup.
//!
//! The search loop itself has no recoverable failure modes; everything
//! here happens before the first iteration.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fallible crate operations.
pub type Result<T> = std::result::Result<T, QbfError>;

/// Errors raised while building a QBF-PT problem or configuring a run.
#[derive(Error, Debug)]
pub enum QbfError {
    /// The instance file could not be opened or read.
    #[error("failed to read instance {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A token in the instance stream is not a number.
    #[error("invalid token {token:?} at position {position}")]
    Parse {
        /// Zero-based token index in the stream.
        position: usize,
        /// Offending token text.
        token: String,
    },

    /// The leading dimension token is missing, zero or not an integer.
    #[error("invalid instance dimension: {0}")]
    InvalidDimension(String),

    /// The stream ended before the upper triangle was complete.
    #[error("instance truncated: expected {expected} coefficients, found {found}")]
    Truncated {
        /// Coefficients required for the declared dimension, `n(n+1)/2`.
        expected: usize,
        /// Coefficients actually present.
        found: usize,
    },

    /// A dense matrix does not match the declared dimension.
    #[error("matrix has {found} entries, expected {expected}")]
    InvalidMatrix {
        /// `n * n`.
        expected: usize,
        /// Entries supplied.
        found: usize,
    },

    /// Solver configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_message() {
        let err = QbfError::Truncated {
            expected: 10,
            found: 7,
        };
        assert_eq!(
            err.to_string(),
            "instance truncated: expected 10 coefficients, found 7"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = QbfError::Io {
            path: PathBuf::from("missing/qbf020"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("missing/qbf020"));
        assert!(err.source().is_some());
    }
}
