//! Error types for gesture configuration.

use thiserror::Error;

/// Errors that can occur when configuring gesture resolution.
///
/// Gesture deltas themselves are never rejected; out-of-range values are
/// clamped or neutralized. Only setup can fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GestureError {
    /// Scale bounds are non-finite, non-positive or inverted.
    #[error("invalid scale bounds [{min}, {max}]: {reason}")]
    InvalidBounds {
        /// Requested lower bound.
        min: f32,
        /// Requested upper bound.
        max: f32,
        /// Why the bounds were refused.
        reason: &'static str,
    },
}

impl GestureError {
    /// Creates an invalid bounds error.
    #[must_use]
    pub const fn invalid_bounds(min: f32, max: f32, reason: &'static str) -> Self {
        Self::InvalidBounds { min, max, reason }
    }
}

/// Result type for gesture configuration.
pub type Result<T> = std::result::Result<T, GestureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_bounds() {
        let err = GestureError::invalid_bounds(5.0, 0.1, "min exceeds max");
        let msg = err.to_string();
        assert!(msg.contains("invalid scale bounds [5, 0.1]"));
        assert!(msg.contains("min exceeds max"));
    }
}
