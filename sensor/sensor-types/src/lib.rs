//! Raw platform sensor sample types.
//!
//! This crate provides the immutable input records pushed by a platform
//! sensor service into the orientation pipeline:
//! - Accelerometer, gyroscope and magnetometer triples
//! - Rotation-vector samples (the platform's fused orientation output)
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero engine dependencies**. It can be used in:
//! - Platform adapters (JNI, NDK sensor queues)
//! - Simulated sensor feeds in tests and demos
//! - Recorded sample replays
//!
//! # Sample Kinds
//!
//! - [`SampleKind::Accel`] - Linear acceleration in m/s²
//! - [`SampleKind::Gyro`] - Angular velocity in rad/s
//! - [`SampleKind::Mag`] - Ambient magnetic field in µT
//! - [`SampleKind::RotationVector`] - Orientation as `(x, y, z[, w[, accuracy]])`
//! - [`SampleKind::Unknown`] - Any other platform type code; dropped by ingest
//!
//! # Time
//!
//! All samples carry a [`Timestamp`] with nanosecond precision, matching the
//! platform event clock.
//!
//! # Example
//!
//! ```
//! use sensor_types::{RawSample, SampleKind, Timestamp};
//!
//! let sample = RawSample::new(
//!     SampleKind::RotationVector,
//!     &[0.0, 0.0, 0.0, 1.0],
//!     Timestamp::from_secs_f64(1.0),
//! )
//! .unwrap();
//!
//! assert_eq!(sample.len(), 4);
//! assert!(sample.kind.is_orientation());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod sample;
mod time;

pub use error::{Result, SensorError};
pub use sample::{MAX_SAMPLE_VALUES, RawSample, SampleKind};
pub use time::{Duration, Timestamp};
