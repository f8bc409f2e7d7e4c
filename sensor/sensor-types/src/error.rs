//! Error types for sensor sample construction.

use thiserror::Error;

/// Errors that can occur when building sensor samples.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorError {
    /// The platform delivered more components than a sample can hold.
    #[error("too many sample values: capacity {capacity}, got {actual}")]
    TooManyValues {
        /// Maximum number of components a sample stores.
        capacity: usize,
        /// Number of components delivered.
        actual: usize,
    },

    /// The sample carries no components at all.
    #[error("empty sample for {0}")]
    EmptySample(String),
}

impl SensorError {
    /// Creates a too-many-values error.
    #[must_use]
    pub const fn too_many_values(capacity: usize, actual: usize) -> Self {
        Self::TooManyValues { capacity, actual }
    }

    /// Creates an empty sample error.
    #[must_use]
    pub fn empty_sample(kind: impl Into<String>) -> Self {
        Self::EmptySample(kind.into())
    }
}

/// Result type for sensor sample operations.
pub type Result<T> = std::result::Result<T, SensorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_too_many_values() {
        let err = SensorError::too_many_values(6, 9);
        let msg = format!("{err}");
        assert!(msg.contains("too many sample values"));
        assert!(msg.contains('6'));
        assert!(msg.contains('9'));
    }

    #[test]
    fn error_empty_sample() {
        let err = SensorError::empty_sample("gyro");
        assert!(err.to_string().contains("gyro"));
    }
}
