//! Seams to the platform: sensor service, render backend and camera frames.

use std::sync::Arc;

use sensor_types::{SampleKind, Timestamp};
use serde::{Deserialize, Serialize};

use crate::config::SensorRate;
use crate::error::Result;
use crate::pipeline::Shared;
use crate::snapshot::TransformSnapshot;

/// Platform sensor service the pipeline subscribes through.
///
/// Samples flow back through a [`SensorPort`](crate::SensorPort); the
/// service only manages subscriptions.
pub trait SensorService {
    /// Starts delivery of `kind` at roughly `rate`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Subscribe`](crate::PipelineError::Subscribe)
    /// if the sensor is missing or refuses the rate.
    fn subscribe(&self, kind: SampleKind, rate: SensorRate) -> Result<()>;

    /// Stops delivery of `kind`. Unsubscribing an inactive kind is a no-op.
    fn unsubscribe(&self, kind: SampleKind);
}

impl<S: SensorService + ?Sized> SensorService for Arc<S> {
    fn subscribe(&self, kind: SampleKind, rate: SensorRate) -> Result<()> {
        (**self).subscribe(kind, rate)
    }

    fn unsubscribe(&self, kind: SampleKind) {
        (**self).unsubscribe(kind);
    }
}

/// A sensor service that accepts every subscription and delivers nothing.
///
/// For hosts that feed samples into the [`SensorPort`](crate::SensorPort)
/// themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSensorService;

impl SensorService for NullSensorService {
    fn subscribe(&self, _kind: SampleKind, _rate: SensorRate) -> Result<()> {
        Ok(())
    }

    fn unsubscribe(&self, _kind: SampleKind) {}
}

/// A renderer driven by the render tick.
pub trait RenderBackend {
    /// Called when the drawing surface is (re)created.
    fn init(&mut self, width: u32, height: u32);

    /// Draws one frame with `snapshot`.
    fn step(&mut self, snapshot: &TransformSnapshot);
}

/// An opaque camera buffer tagged with the transform revision current at capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedFrame {
    /// Opaque buffer handle owned by the camera source.
    pub handle: u64,

    /// Transform revision at capture.
    pub revision: u64,

    /// Capture time.
    pub timestamp: Timestamp,
}

/// Tags camera frames with the current transform revision.
///
/// The frame stream is otherwise independent of the transform pipeline.
#[derive(Debug, Clone)]
pub struct FramePort {
    shared: Arc<Shared>,
}

impl FramePort {
    pub(crate) const fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Tags `handle` with the current revision. `None` after teardown.
    #[must_use]
    pub fn tag(&self, handle: u64, timestamp: Timestamp) -> Option<TaggedFrame> {
        if !self.shared.is_running() {
            return None;
        }
        let revision = self.shared.sink.revision()?;
        Some(TaggedFrame {
            handle,
            revision,
            timestamp,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn null_service_accepts_everything() {
        let service = NullSensorService;
        assert!(service.subscribe(SampleKind::Gyro, SensorRate::Fastest).is_ok());
        service.unsubscribe(SampleKind::Gyro);

        let shared: Arc<dyn SensorService> = Arc::new(NullSensorService);
        assert!(shared.subscribe(SampleKind::RotationVector, SensorRate::Game).is_ok());
    }

    #[test]
    fn tagged_frame_serializes() {
        let frame = TaggedFrame {
            handle: 42,
            revision: 7,
            timestamp: Timestamp::from_nanos(1_000),
        };
        let json = serde_json::to_string(&frame).unwrap();
        let parsed: TaggedFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frame);
    }
}
