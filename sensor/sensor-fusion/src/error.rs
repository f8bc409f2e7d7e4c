//! Error types for sensor-fusion crate.

use thiserror::Error;

/// Errors that can occur in sensor fusion operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FusionError {
    /// Sample has the wrong shape or carries non-finite components.
    #[error("malformed {kind} sample: {reason}")]
    MalformedSample {
        /// Sensor kind of the rejected sample.
        kind: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Sample kind is not handled by this stage.
    #[error("unexpected sample kind: expected {expected}, got {actual}")]
    UnexpectedKind {
        /// Kind the stage accepts.
        expected: &'static str,
        /// Kind that was delivered.
        actual: &'static str,
    },

    /// Axis remap does not describe a right-handed basis.
    #[error("degenerate axis remap: {0}")]
    DegenerateRemap(String),
}

impl FusionError {
    /// Creates a malformed sample error.
    #[must_use]
    pub fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedSample {
            kind,
            reason: reason.into(),
        }
    }

    /// Creates an unexpected kind error.
    #[must_use]
    pub const fn unexpected_kind(expected: &'static str, actual: &'static str) -> Self {
        Self::UnexpectedKind { expected, actual }
    }

    /// Creates a degenerate remap error.
    #[must_use]
    pub fn degenerate_remap(reason: impl Into<String>) -> Self {
        Self::DegenerateRemap(reason.into())
    }

    /// Returns true if the error rejects a single sample rather than a setup step.
    #[must_use]
    pub const fn is_sample_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedSample { .. } | Self::UnexpectedKind { .. }
        )
    }
}

/// Result type for sensor fusion operations.
pub type Result<T> = std::result::Result<T, FusionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_malformed() {
        let err = FusionError::malformed("rotation_vector", "expected 3 to 5 components, got 2");
        let msg = err.to_string();
        assert!(msg.contains("malformed rotation_vector sample"));
        assert!(msg.contains("got 2"));
        assert!(err.is_sample_error());
    }

    #[test]
    fn error_unexpected_kind() {
        let err = FusionError::unexpected_kind("rotation_vector", "gyro");
        assert!(err.to_string().contains("gyro"));
        assert!(err.is_sample_error());
    }

    #[test]
    fn error_degenerate_remap() {
        let err = FusionError::degenerate_remap("X and -X are collinear");
        assert!(err.to_string().contains("degenerate axis remap"));
        assert!(!err.is_sample_error());
    }
}
