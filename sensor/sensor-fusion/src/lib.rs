//! Orientation resolution and inertial history for the input pipeline.
//!
//! # Orientation
//!
//! - [`rotation_matrix_from_vector`] - Rotation vector to row-major rotation matrix
//! - [`AxisRemap`] - Fixed signed-permutation remap between device and camera bases
//! - [`EulerAngles`] - Yaw/pitch/roll extraction with a gimbal-lock guard
//! - [`OrientationResolver`] - Stateful resolver that keeps the last good [`RotationState`]
//!
//! # Inertial History
//!
//! - [`StreamBuffer`] - Bounded, time-ordered buffer for sensor readings
//! - [`InertialHistory`] - Rolling accelerometer/gyroscope/magnetometer windows
//! - [`InertialTrace`] - Plot-ready snapshot with rescale factors
//!
//! # Example
//!
//! ```
//! use sensor_fusion::{Axis, AxisRemap, OrientationResolver};
//! use sensor_types::{RawSample, Timestamp};
//!
//! let remap = AxisRemap::from_axes(Axis::Y, Axis::MinusX).unwrap();
//! let mut resolver = OrientationResolver::with_remap(remap);
//!
//! let sample = RawSample::rotation_vector([0.0, 0.0, 0.0, 1.0], Timestamp::zero());
//! let state = resolver.resolve(&sample).unwrap();
//! assert_eq!(state.matrix(), remap.permutation());
//! assert!(state.euler().is_finite());
//! ```
//!
//! This crate has no rendering or platform dependencies; samples arrive
//! through [`sensor_types::RawSample`].

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod buffer;
mod error;
mod history;
mod orientation;
mod remap;

// Re-export buffer types
pub use buffer::{BufferStats, StreamBuffer};

// Re-export orientation types
pub use orientation::{
    EulerAngles, GIMBAL_LOCK_EPSILON, MAX_ROTATION_VECTOR_LEN, MIN_ROTATION_VECTOR_LEN,
    OrientationResolver, RotationState, rotation_matrix_from_vector,
};

// Re-export remap types
pub use remap::{Axis, AxisRemap, RemapAxes};

// Re-export history types
pub use history::{ChannelTrace, DEFAULT_HISTORY_WINDOW, InertialHistory, InertialTrace};

// Re-export error types
pub use error::{FusionError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Axis, AxisRemap, EulerAngles, FusionError, InertialHistory, InertialTrace,
        OrientationResolver, RotationState, StreamBuffer, rotation_matrix_from_vector,
    };
}
