//! Orientation and gesture input pipeline.
//!
//! Turns raw sensor and touch events into a stable, bounded stream of
//! transform parameters for a render loop.
//!
//! # Producers
//!
//! - [`SensorPort`] - Single entry point for raw sensor samples
//! - [`GesturePort`] - Pinch-scale, pan and reset gestures
//! - [`FramePort`] - Tags camera frames with the transform revision
//!
//! # Shared State
//!
//! - [`TransformSink`] - Lock-free snapshot with a monotonic revision
//! - [`SnapshotCell`] - The epoch-reclaimed atomic cell behind it
//!
//! # Consumer
//!
//! - [`RenderHandle`] - Non-blocking reads for the render tick
//!
//! # Lifecycle
//!
//! - [`Pipeline`] - Owns everything above; bound to `start` / `stop`
//! - [`PipelineConfig`] - Scale bounds, axis remap, subscriptions, history
//!
//! Producers and the render tick never block each other: every write
//! swaps in a whole new snapshot and every read copies the newest one.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cell;
mod config;
mod error;
mod ingest;
mod pipeline;
mod ports;
mod sink;
mod snapshot;

pub use cell::SnapshotCell;
pub use config::{
    MAX_HISTORY_WINDOW, PipelineConfig, RotationOutput, SensorRate, SensorSubscription,
};
pub use error::{PipelineError, Result};
pub use ingest::{IngestOutcome, SensorPort};
pub use pipeline::{GesturePort, Pipeline, RenderHandle};
pub use ports::{FramePort, NullSensorService, RenderBackend, SensorService, TaggedFrame};
pub use sink::TransformSink;
pub use snapshot::{TransformSnapshot, TransformUpdate};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        GesturePort, IngestOutcome, Pipeline, PipelineConfig, PipelineError, RenderBackend,
        RenderHandle, SensorPort, SensorService, TransformSnapshot, TransformUpdate,
    };
}
