//! Pipeline configuration.

use input_gesture::ScaleBounds;
use sensor_fusion::AxisRemap;
use sensor_types::{Duration, SampleKind};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Largest accepted inertial history window.
pub const MAX_HISTORY_WINDOW: usize = 1 << 16;

/// Requested delivery rate, following the platform delay classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorRate {
    /// 200 ms between samples.
    Normal,
    /// ~66.7 ms between samples, suitable for UI updates.
    Ui,
    /// 20 ms between samples.
    #[default]
    Game,
    /// As fast as the sensor delivers.
    Fastest,
}

impl SensorRate {
    /// Requested delay between samples in microseconds.
    #[must_use]
    pub const fn delay_micros(self) -> u64 {
        match self {
            Self::Normal => 200_000,
            Self::Ui => 66_667,
            Self::Game => 20_000,
            Self::Fastest => 0,
        }
    }

    /// Requested delay between samples.
    #[must_use]
    pub const fn period(self) -> Duration {
        Duration::from_micros(self.delay_micros())
    }
}

/// How the renderer consumes rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationOutput {
    /// Yaw/pitch/roll angles composed into a model matrix.
    #[default]
    Euler,
    /// The rotation matrix used directly.
    Matrix,
}

/// One sensor the pipeline subscribes to at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSubscription {
    /// Sensor kind.
    pub kind: SampleKind,

    /// Requested rate.
    #[serde(default)]
    pub rate: SensorRate,
}

impl SensorSubscription {
    /// Creates a subscription.
    #[must_use]
    pub const fn new(kind: SampleKind, rate: SensorRate) -> Self {
        Self { kind, rate }
    }
}

/// Configuration for a [`Pipeline`](crate::Pipeline).
///
/// # Example
///
/// ```
/// use input_pipeline::{PipelineConfig, RotationOutput, SensorRate};
/// use sensor_types::SampleKind;
///
/// let config = PipelineConfig::default()
///     .with_rotation_output(RotationOutput::Matrix)
///     .with_history_window(128)
///     .with_subscription(SampleKind::Accel, SensorRate::Ui);
///
/// assert!(config.validate().is_ok());
/// let json = config.to_json_string().unwrap();
/// assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Bounds for the accumulated pinch scale.
    pub scale_bounds: ScaleBounds,

    /// Fixed remap applied to every resolved rotation matrix.
    pub remap: Option<AxisRemap>,

    /// How the renderer consumes rotation.
    pub rotation_output: RotationOutput,

    /// Sensors to subscribe to at start.
    pub subscriptions: Vec<SensorSubscription>,

    /// Inertial history length per sensor (0 = disabled).
    pub history_window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scale_bounds: ScaleBounds::DEFAULT,
            remap: None,
            rotation_output: RotationOutput::Euler,
            subscriptions: vec![SensorSubscription::new(
                SampleKind::RotationVector,
                SensorRate::Game,
            )],
            history_window: 0,
        }
    }
}

impl PipelineConfig {
    /// Sets the scale bounds.
    #[must_use]
    pub const fn with_scale_bounds(mut self, bounds: ScaleBounds) -> Self {
        self.scale_bounds = bounds;
        self
    }

    /// Sets the axis remap.
    #[must_use]
    pub const fn with_remap(mut self, remap: AxisRemap) -> Self {
        self.remap = Some(remap);
        self
    }

    /// Sets the rotation output mode.
    #[must_use]
    pub const fn with_rotation_output(mut self, output: RotationOutput) -> Self {
        self.rotation_output = output;
        self
    }

    /// Sets the inertial history window (0 disables history).
    #[must_use]
    pub const fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Adds a subscription, replacing any existing one for the same kind.
    #[must_use]
    pub fn with_subscription(mut self, kind: SampleKind, rate: SensorRate) -> Self {
        self.subscriptions.retain(|s| s.kind != kind);
        self.subscriptions.push(SensorSubscription::new(kind, rate));
        self
    }

    /// Returns the subscription for `kind`, if configured.
    #[must_use]
    pub fn subscription(&self, kind: SampleKind) -> Option<&SensorSubscription> {
        self.subscriptions.iter().find(|s| s.kind == kind)
    }

    /// Returns true if inertial history is enabled.
    #[must_use]
    pub const fn history_enabled(&self) -> bool {
        self.history_window > 0
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for unknown or duplicate
    /// subscriptions, inertial subscriptions without history, or an
    /// oversized history window.
    pub fn validate(&self) -> Result<()> {
        if self.history_window > MAX_HISTORY_WINDOW {
            return Err(PipelineError::invalid_config(format!(
                "history_window {} exceeds {MAX_HISTORY_WINDOW}",
                self.history_window
            )));
        }

        for (i, sub) in self.subscriptions.iter().enumerate() {
            if let SampleKind::Unknown(code) = sub.kind {
                return Err(PipelineError::invalid_config(format!(
                    "unsupported sensor type code {code}"
                )));
            }
            if self.subscriptions[..i].iter().any(|s| s.kind == sub.kind) {
                return Err(PipelineError::invalid_config(format!(
                    "duplicate subscription for {}",
                    sub.kind.name()
                )));
            }
            if sub.kind.is_inertial() && !self.history_enabled() {
                return Err(PipelineError::invalid_config(format!(
                    "{} subscription requires history_window > 0",
                    sub.kind.name()
                )));
            }
        }

        Ok(())
    }

    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Serialization`] for malformed JSON (including
    /// invalid scale bounds or a degenerate remap) and
    /// [`PipelineError::InvalidConfig`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Serialization`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use sensor_fusion::Axis;

    #[test]
    fn sensor_rate_delays() {
        assert_eq!(SensorRate::Normal.delay_micros(), 200_000);
        assert_eq!(SensorRate::Ui.delay_micros(), 66_667);
        assert_eq!(SensorRate::Game.delay_micros(), 20_000);
        assert_eq!(SensorRate::Fastest.delay_micros(), 0);
        assert_eq!(SensorRate::Game.period().as_millis(), 20);
    }

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.history_enabled());
        assert_eq!(
            config.subscription(SampleKind::RotationVector).map(|s| s.rate),
            Some(SensorRate::Game)
        );
        assert_eq!(config.scale_bounds, ScaleBounds::DEFAULT);
    }

    #[test]
    fn with_subscription_replaces_same_kind() {
        let config = PipelineConfig::default()
            .with_subscription(SampleKind::RotationVector, SensorRate::Fastest);
        assert_eq!(config.subscriptions.len(), 1);
        assert_eq!(config.subscriptions[0].rate, SensorRate::Fastest);
    }

    #[test]
    fn inertial_subscription_needs_history() {
        let config = PipelineConfig::default().with_subscription(SampleKind::Gyro, SensorRate::Ui);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(config.with_history_window(64).validate().is_ok());
    }

    #[test]
    fn rejects_unknown_duplicate_and_oversized() {
        let mut config = PipelineConfig::default();
        config
            .subscriptions
            .push(SensorSubscription::new(SampleKind::Unknown(8), SensorRate::Normal));
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.subscriptions.push(SensorSubscription::new(
            SampleKind::RotationVector,
            SensorRate::Normal,
        ));
        assert!(config.validate().unwrap_err().to_string().contains("duplicate"));

        let config = PipelineConfig::default().with_history_window(MAX_HISTORY_WINDOW + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        let config = PipelineConfig::default()
            .with_remap(AxisRemap::from_axes(Axis::Y, Axis::MinusX).unwrap())
            .with_scale_bounds(ScaleBounds::new(0.5, 3.0).unwrap())
            .with_history_window(256)
            .with_subscription(SampleKind::Mag, SensorRate::Normal);

        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"minus_x\""));
        assert!(json.contains("\"rotation_vector\""));

        let parsed = PipelineConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn json_partial_uses_defaults() {
        let config = PipelineConfig::from_json_str(r#"{"rotation_output":"matrix"}"#).unwrap();
        assert_eq!(config.rotation_output, RotationOutput::Matrix);
        assert_eq!(config.scale_bounds, ScaleBounds::DEFAULT);
        assert_eq!(config.subscriptions.len(), 1);
    }

    #[test]
    fn json_rejects_bad_values() {
        let bad_bounds = r#"{"scale_bounds":{"min":2.0,"max":1.0}}"#;
        assert!(matches!(
            PipelineConfig::from_json_str(bad_bounds),
            Err(PipelineError::Serialization(_))
        ));

        let bad_remap = r#"{"remap":{"x":"x","y":"minus_x"}}"#;
        assert!(PipelineConfig::from_json_str(bad_remap).is_err());

        let no_history = r#"{"subscriptions":[{"kind":"accel"}]}"#;
        assert!(matches!(
            PipelineConfig::from_json_str(no_history),
            Err(PipelineError::InvalidConfig(_))
        ));
    }
}
