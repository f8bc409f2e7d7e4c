//! Gesture resolution: multiplicative clamped scale and additive pan.

use tracing::debug;

use crate::event::{GestureEvent, GestureUpdate, ResetTarget};
use crate::state::{PanState, ScaleBounds, ScaleState};

/// Turns raw gesture deltas into bounded scale and pan state.
///
/// Deltas are never rejected: scale is clamped into its bounds, and
/// non-finite inputs are neutralized.
///
/// # Example
///
/// ```
/// use input_gesture::GestureResolver;
///
/// let mut resolver = GestureResolver::default();
/// for _ in 0..3 {
///     resolver.on_scale_delta(10.0);
/// }
/// assert_eq!(resolver.scale().factor(), 5.0);
///
/// resolver.on_pan_delta(4.0, -1.0);
/// assert_eq!(resolver.reset_pan().dx, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureResolver {
    scale: ScaleState,
    pan: PanState,
}

impl GestureResolver {
    /// Creates a resolver at scale 1.0 (clamped into `bounds`) and zero pan.
    #[must_use]
    pub fn new(bounds: ScaleBounds) -> Self {
        Self {
            scale: ScaleState::new(bounds),
            pan: PanState::ZERO,
        }
    }

    /// Creates a resolver continuing from existing state.
    #[must_use]
    pub const fn from_parts(scale: ScaleState, pan: PanState) -> Self {
        Self { scale, pan }
    }

    /// Current scale state.
    #[must_use]
    pub const fn scale(&self) -> ScaleState {
        self.scale
    }

    /// Current pan state.
    #[must_use]
    pub const fn pan(&self) -> PanState {
        self.pan
    }

    /// Multiplies the scale by `factor`, clamped into the bounds.
    pub fn on_scale_delta(&mut self, factor: f32) -> ScaleState {
        if self.scale.apply_delta(factor) {
            debug!(
                factor,
                scale = self.scale.factor(),
                "scale clamped to bounds"
            );
        }
        self.scale
    }

    /// Adds `(dx, dy)` to the pan offset.
    pub fn on_pan_delta(&mut self, dx: f32, dy: f32) -> PanState {
        self.pan.offset(dx, dy);
        self.pan
    }

    /// Zeroes the pan offset. Scale is untouched.
    pub fn reset_pan(&mut self) -> PanState {
        self.pan = PanState::ZERO;
        self.pan
    }

    /// Returns the scale to 1.0, clamped into the bounds. Pan is untouched.
    pub fn reset_scale(&mut self) -> ScaleState {
        self.scale.reset();
        self.scale
    }

    /// Dispatches a tagged event and reports what changed.
    pub fn apply(&mut self, event: GestureEvent) -> GestureUpdate {
        let update = self.resolve(event);
        if update.clamped {
            debug!(?event, scale = self.scale.factor(), "scale clamped to bounds");
        }
        update
    }

    /// Same as [`apply`](Self::apply) but without logging.
    ///
    /// For callers that may resolve the same event more than once, such as
    /// a compare-and-swap retry, and report the outcome themselves.
    pub fn resolve(&mut self, event: GestureEvent) -> GestureUpdate {
        match event {
            GestureEvent::Scale { factor } => {
                let clamped = self.scale.apply_delta(factor);
                GestureUpdate {
                    scale: Some(self.scale),
                    pan: None,
                    clamped,
                }
            }
            GestureEvent::Pan { dx, dy } => GestureUpdate {
                scale: None,
                pan: Some(self.on_pan_delta(dx, dy)),
                clamped: false,
            },
            GestureEvent::Reset { target } => {
                let scale = matches!(target, ResetTarget::Scale | ResetTarget::All)
                    .then(|| self.reset_scale());
                let pan = matches!(target, ResetTarget::Pan | ResetTarget::All)
                    .then(|| self.reset_pan());
                GestureUpdate {
                    scale,
                    pan,
                    clamped: false,
                }
            }
        }
    }
}
