//! Scale and pan state.

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, Result};

/// Default lower scale bound.
pub const DEFAULT_MIN_SCALE: f32 = 0.1;

/// Default upper scale bound.
pub const DEFAULT_MAX_SCALE: f32 = 5.0;

#[derive(Serialize, Deserialize)]
struct BoundsRepr {
    min: f32,
    max: f32,
}

/// Inclusive bounds for the accumulated scale factor.
///
/// Always finite, strictly positive and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundsRepr", into = "BoundsRepr")]
pub struct ScaleBounds {
    min: f32,
    max: f32,
}

impl ScaleBounds {
    /// Bounds `[0.1, 5.0]`.
    pub const DEFAULT: Self = Self {
        min: DEFAULT_MIN_SCALE,
        max: DEFAULT_MAX_SCALE,
    };

    /// Creates validated bounds.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidBounds`] if either bound is non-finite
    /// or non-positive, or if `min > max`.
    pub fn new(min: f32, max: f32) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GestureError::invalid_bounds(min, max, "bounds must be finite"));
        }
        if min <= 0.0 {
            return Err(GestureError::invalid_bounds(min, max, "min must be positive"));
        }
        if min > max {
            return Err(GestureError::invalid_bounds(min, max, "min exceeds max"));
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Clamps `value` into the bounds.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Returns true if `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<BoundsRepr> for ScaleBounds {
    type Error = GestureError;

    fn try_from(repr: BoundsRepr) -> Result<Self> {
        Self::new(repr.min, repr.max)
    }
}

impl From<ScaleBounds> for BoundsRepr {
    fn from(bounds: ScaleBounds) -> Self {
        Self {
            min: bounds.min,
            max: bounds.max,
        }
    }
}

/// Accumulated pinch scale, kept within its bounds after every update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleState {
    factor: f32,
    bounds: ScaleBounds,
}

impl ScaleState {
    /// Creates a state at 1.0, clamped into `bounds`.
    #[must_use]
    pub fn new(bounds: ScaleBounds) -> Self {
        Self {
            factor: bounds.clamp(1.0),
            bounds,
        }
    }

    /// Creates a state at `factor`, clamped into `bounds`.
    ///
    /// A non-finite factor starts at 1.0.
    #[must_use]
    pub fn with_factor(factor: f32, bounds: ScaleBounds) -> Self {
        let factor = if factor.is_finite() { factor } else { 1.0 };
        Self {
            factor: bounds.clamp(factor),
            bounds,
        }
    }

    /// Current factor.
    #[must_use]
    pub const fn factor(&self) -> f32 {
        self.factor
    }

    /// Bounds the factor is kept within.
    #[must_use]
    pub const fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// Multiplies by `delta` and clamps. Returns true if the product was clamped.
    ///
    /// Non-finite deltas leave the factor unchanged; non-positive deltas
    /// drive it to the lower bound.
    pub fn apply_delta(&mut self, delta: f32) -> bool {
        if !delta.is_finite() {
            return false;
        }
        let raw = if delta <= 0.0 {
            self.bounds.min
        } else {
            self.factor * delta
        };
        self.factor = self.bounds.clamp(raw);
        self.factor != raw
    }

    /// Returns the factor to 1.0, clamped into the bounds.
    pub fn reset(&mut self) {
        self.factor = self.bounds.clamp(1.0);
    }
}

impl Default for ScaleState {
    fn default() -> Self {
        Self::new(ScaleBounds::DEFAULT)
    }
}

/// Additive screen-space pan offset. Unclamped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanState {
    /// Horizontal offset.
    pub dx: f32,
    /// Vertical offset.
    pub dy: f32,
}

impl PanState {
    /// Zero offset.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Creates an offset.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Adds a delta. A component that is non-finite, or whose sum would
    /// overflow to infinity, leaves that axis unchanged.
    pub fn offset(&mut self, dx: f32, dy: f32) {
        self.dx = finite_sum(self.dx, dx);
        self.dy = finite_sum(self.dy, dy);
    }

    /// Returns true at the origin.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

fn finite_sum(current: f32, delta: f32) -> f32 {
    let sum = current + delta;
    if sum.is_finite() { sum } else { current }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn bounds_validation() {
        assert_eq!(ScaleBounds::default(), ScaleBounds::new(0.1, 5.0).unwrap());
        assert!(ScaleBounds::new(0.0, 5.0).is_err());
        assert!(ScaleBounds::new(-1.0, 5.0).is_err());
        assert!(ScaleBounds::new(2.0, 1.0).is_err());
        assert!(ScaleBounds::new(0.1, f32::INFINITY).is_err());
        assert!(ScaleBounds::new(f32::NAN, 1.0).is_err());
        assert!(ScaleBounds::new(2.0, 2.0).is_ok());
    }

    #[test]
    fn bounds_serde_validates() {
        let json = serde_json::to_string(&ScaleBounds::DEFAULT).unwrap();
        let parsed: ScaleBounds = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ScaleBounds::DEFAULT);

        let bad: std::result::Result<ScaleBounds, _> =
            serde_json::from_str(r#"{"min":3.0,"max":1.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn scale_starts_at_one_clamped() {
        assert_eq!(ScaleState::default().factor(), 1.0);
        let high = ScaleBounds::new(2.0, 4.0).unwrap();
        assert_eq!(ScaleState::new(high).factor(), 2.0);
        assert_eq!(ScaleState::with_factor(f32::NAN, high).factor(), 2.0);
        assert_eq!(ScaleState::with_factor(9.0, high).factor(), 4.0);
    }

    #[test]
    fn scale_delta_multiplies_and_clamps() {
        let mut state = ScaleState::default();
        assert!(!state.apply_delta(2.0));
        assert_eq!(state.factor(), 2.0);

        assert!(state.apply_delta(10.0));
        assert_eq!(state.factor(), 5.0);

        assert!(state.apply_delta(0.0001));
        assert_eq!(state.factor(), 0.1);
    }

    #[test]
    fn scale_delta_edge_values() {
        let mut state = ScaleState::default();
        assert!(!state.apply_delta(f32::NAN));
        assert!(!state.apply_delta(f32::INFINITY));
        assert_eq!(state.factor(), 1.0);

        state.apply_delta(-3.0);
        assert_eq!(state.factor(), 0.1);
    }

    #[test]
    fn scale_reset() {
        let mut state = ScaleState::default();
        state.apply_delta(3.0);
        state.reset();
        assert_eq!(state.factor(), 1.0);
    }

    #[test]
    fn pan_offset_ignores_non_finite() {
        let mut pan = PanState::ZERO;
        pan.offset(3.0, -4.0);
        pan.offset(f32::NAN, 1.0);
        pan.offset(2.0, f32::NEG_INFINITY);
        assert_eq!(pan, PanState::new(5.0, -3.0));
        assert!(!pan.is_zero());
    }

    #[test]
    fn pan_offset_never_overflows() {
        let mut pan = PanState::ZERO;
        pan.offset(f32::MAX, -f32::MAX);
        pan.offset(f32::MAX, -f32::MAX);
        assert_eq!(pan, PanState::new(f32::MAX, -f32::MAX));

        pan.offset(-1.0e38, 1.0e38);
        assert!(pan.dx < f32::MAX);
        assert!(pan.dx.is_finite() && pan.dy.is_finite());
    }
}
