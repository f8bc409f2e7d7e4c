//! Touch gesture resolution for the input pipeline.
//!
//! Pinch and drag deltas arrive from a gesture detector and are folded into
//! bounded state:
//!
//! - [`ScaleState`] - Accumulated pinch factor, clamped into [`ScaleBounds`]
//! - [`PanState`] - Additive, unclamped screen-space offset
//! - [`GestureResolver`] - Applies deltas and explicit resets
//! - [`GestureEvent`] - Tagged event dispatched through [`GestureResolver::apply`]
//!
//! # Example
//!
//! ```
//! use input_gesture::{GestureEvent, GestureResolver, PanState};
//!
//! let mut resolver = GestureResolver::default();
//! resolver.apply(GestureEvent::Pan { dx: 2.0, dy: 3.0 });
//! resolver.apply(GestureEvent::reset_pan());
//! assert_eq!(resolver.pan(), PanState::ZERO);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod event;
mod resolver;
mod state;

pub use error::{GestureError, Result};
pub use event::{GestureEvent, GestureKind, GestureUpdate, ResetTarget};
pub use resolver::GestureResolver;
pub use state::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, PanState, ScaleBounds, ScaleState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        GestureError, GestureEvent, GestureKind, GestureResolver, PanState, ScaleBounds,
        ScaleState,
    };
}
