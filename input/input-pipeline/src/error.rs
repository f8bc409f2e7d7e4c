//! Error types for the input pipeline.

use input_gesture::GestureError;
use sensor_fusion::FusionError;
use thiserror::Error;

/// Errors that can occur while configuring or running the pipeline.
///
/// Per-sample and per-gesture problems never surface here; they are
/// recovered inside the resolvers.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration rejected.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The sensor service refused a subscription.
    #[error("failed to subscribe to {kind}: {reason}")]
    Subscribe {
        /// Sensor kind that was requested.
        kind: &'static str,
        /// Service-provided reason.
        reason: String,
    },

    /// `start` called on a running pipeline.
    #[error("pipeline already started")]
    AlreadyStarted,

    /// Operation requires a running pipeline.
    #[error("pipeline is not running")]
    NotRunning,

    /// Configuration could not be (de)serialized.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Orientation setup error.
    #[error(transparent)]
    Fusion(#[from] FusionError),

    /// Gesture setup error.
    #[error(transparent)]
    Gesture(#[from] GestureError),
}

impl PipelineError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a subscription error.
    #[must_use]
    pub fn subscribe(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Subscribe {
            kind,
            reason: reason.into(),
        }
    }

    /// Returns true for configuration problems detected before start.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::Serialization(_) | Self::Fusion(_) | Self::Gesture(_)
        )
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = PipelineError::invalid_config("no subscriptions");
        assert!(err.to_string().contains("invalid pipeline configuration"));
        assert!(err.is_config_error());
    }

    #[test]
    fn error_subscribe() {
        let err = PipelineError::subscribe("gyro", "sensor not present");
        let msg = err.to_string();
        assert!(msg.contains("failed to subscribe to gyro"));
        assert!(msg.contains("sensor not present"));
        assert!(!err.is_config_error());
    }

    #[test]
    fn error_from_fusion() {
        let err: PipelineError = FusionError::degenerate_remap("X and X are collinear").into();
        assert!(err.to_string().contains("degenerate axis remap"));
        assert!(err.is_config_error());
    }

    #[test]
    fn error_from_gesture() {
        let err: PipelineError = GestureError::invalid_bounds(2.0, 1.0, "min exceeds max").into();
        assert!(matches!(err, PipelineError::Gesture(_)));
    }

    #[test]
    fn error_lifecycle() {
        assert_eq!(PipelineError::AlreadyStarted.to_string(), "pipeline already started");
        assert_eq!(PipelineError::NotRunning.to_string(), "pipeline is not running");
    }
}
