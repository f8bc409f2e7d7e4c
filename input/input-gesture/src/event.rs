//! Tagged gesture events.

use serde::{Deserialize, Serialize};

use crate::state::{PanState, ScaleState};

/// Kind of a gesture event, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// Pinch scale delta.
    Scale,
    /// Drag pan delta.
    Pan,
    /// Explicit reset.
    Reset,
}

/// What an explicit reset returns to its neutral value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetTarget {
    /// Pan offset only.
    #[default]
    Pan,
    /// Scale factor only.
    Scale,
    /// Both pan and scale.
    All,
}

/// A single gesture delivered by the touch detector.
///
/// # Example
///
/// ```
/// use input_gesture::{GestureEvent, GestureKind, GestureResolver};
///
/// let mut resolver = GestureResolver::default();
/// let event = GestureEvent::Scale { factor: 2.0 };
/// assert_eq!(event.kind(), GestureKind::Scale);
///
/// let update = resolver.apply(event);
/// assert_eq!(update.scale.map(|s| s.factor()), Some(2.0));
/// assert!(update.pan.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    /// Multiply the scale by `factor`.
    Scale {
        /// Incremental pinch factor.
        factor: f32,
    },
    /// Offset the pan by `(dx, dy)`.
    Pan {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
    /// Return state to neutral.
    Reset {
        /// What to reset.
        #[serde(default)]
        target: ResetTarget,
    },
}

impl GestureEvent {
    /// Returns the event's kind.
    #[must_use]
    pub const fn kind(&self) -> GestureKind {
        match self {
            Self::Scale { .. } => GestureKind::Scale,
            Self::Pan { .. } => GestureKind::Pan,
            Self::Reset { .. } => GestureKind::Reset,
        }
    }

    /// Shorthand for a pan reset.
    #[must_use]
    pub const fn reset_pan() -> Self {
        Self::Reset {
            target: ResetTarget::Pan,
        }
    }
}

/// State changed by one gesture. Unchanged parts are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureUpdate {
    /// New scale state, if the gesture touched it.
    pub scale: Option<ScaleState>,
    /// New pan state, if the gesture touched it.
    pub pan: Option<PanState>,
    /// True if a scale delta hit the bounds and was clamped.
    pub clamped: bool,
}

impl GestureUpdate {
    /// Returns true if nothing changed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.scale.is_none() && self.pan.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn event_kinds() {
        assert_eq!(GestureEvent::Scale { factor: 1.5 }.kind(), GestureKind::Scale);
        assert_eq!(GestureEvent::Pan { dx: 1.0, dy: 0.0 }.kind(), GestureKind::Pan);
        assert_eq!(GestureEvent::reset_pan().kind(), GestureKind::Reset);
    }

    #[test]
    fn event_json_is_tagged() {
        let json = serde_json::to_string(&GestureEvent::Pan { dx: 1.0, dy: -2.0 }).unwrap();
        assert_eq!(json, r#"{"kind":"pan","dx":1.0,"dy":-2.0}"#);

        let reset: GestureEvent = serde_json::from_str(r#"{"kind":"reset"}"#).unwrap();
        assert_eq!(reset, GestureEvent::reset_pan());

        let all: GestureEvent = serde_json::from_str(r#"{"kind":"reset","target":"all"}"#).unwrap();
        assert_eq!(all, GestureEvent::Reset { target: ResetTarget::All });
    }

    #[test]
    fn empty_update() {
        assert!(GestureUpdate::default().is_empty());
    }
}
