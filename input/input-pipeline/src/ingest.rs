//! Sensor ingest: the single entry point for raw samples.

use std::sync::Arc;

use sensor_fusion::{FusionError, InertialHistory, OrientationResolver};
use sensor_types::{RawSample, SampleKind, Timestamp};
use tracing::{debug, warn};

use crate::pipeline::Shared;
use crate::snapshot::TransformUpdate;

/// What ingest did with one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Rotation resolved and published at this revision.
    Published(u64),

    /// Inertial sample appended to the history.
    Recorded(SampleKind),

    /// Sample rejected; previous state kept.
    Rejected(FusionError),

    /// Inertial sample received while history is disabled.
    Ignored(SampleKind),

    /// Unsupported platform type code.
    Dropped(i32),

    /// Pipeline stopped; nothing was written.
    Inactive,
}

impl IngestOutcome {
    /// Returns true if shared state changed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Published(_) | Self::Recorded(_))
    }
}

/// Producer port for the sensor delivery context.
///
/// Delivery is serialized by the platform, so the port takes `&mut self`
/// and holds no lock. Create one port per delivery context.
#[derive(Debug)]
pub struct SensorPort {
    shared: Arc<Shared>,
    resolver: OrientationResolver,
    history: Option<InertialHistory>,
}

impl SensorPort {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        let config = &shared.config;
        let resolver = config
            .remap
            .map_or_else(OrientationResolver::new, OrientationResolver::with_remap);
        let history = config
            .history_enabled()
            .then(|| InertialHistory::new(config.history_window));
        Self {
            shared,
            resolver,
            history,
        }
    }

    /// Tags and dispatches one sample.
    pub fn on_raw_sample(&mut self, sample: &RawSample) -> IngestOutcome {
        if !self.shared.is_running() {
            return IngestOutcome::Inactive;
        }

        match sample.kind {
            SampleKind::RotationVector => self.ingest_rotation(sample),
            SampleKind::Accel | SampleKind::Gyro | SampleKind::Mag => self.ingest_inertial(sample),
            SampleKind::Unknown(code) => {
                warn!(code, "dropping sample with unsupported sensor type");
                IngestOutcome::Dropped(code)
            }
        }
    }

    /// Builds a sample from a platform event and dispatches it.
    ///
    /// `timestamp_nanos` is the platform's signed event time; negative
    /// values clamp to zero.
    pub fn on_platform_event(
        &mut self,
        type_code: i32,
        values: &[f32],
        timestamp_nanos: i64,
    ) -> IngestOutcome {
        if !self.shared.is_running() {
            return IngestOutcome::Inactive;
        }
        let kind = SampleKind::from_platform_code(type_code);
        if let SampleKind::Unknown(code) = kind {
            warn!(code, "dropping sample with unsupported sensor type");
            return IngestOutcome::Dropped(code);
        }
        match RawSample::new(kind, values, Timestamp::from_event_nanos(timestamp_nanos)) {
            Ok(sample) => self.on_raw_sample(&sample),
            Err(err) => {
                debug!(kind = kind.name(), error = %err, "platform event rejected");
                IngestOutcome::Rejected(FusionError::malformed(kind.name(), err.to_string()))
            }
        }
    }

    /// Orientation resolver state held by this port.
    #[must_use]
    pub const fn resolver(&self) -> &OrientationResolver {
        &self.resolver
    }

    /// Inertial history held by this port, if enabled.
    #[must_use]
    pub const fn history(&self) -> Option<&InertialHistory> {
        self.history.as_ref()
    }

    fn ingest_rotation(&mut self, sample: &RawSample) -> IngestOutcome {
        match self.resolver.resolve(sample) {
            Ok(rotation) => self
                .shared
                .sink
                .publish(TransformUpdate::new().with_rotation(rotation))
                .map_or(IngestOutcome::Inactive, |snapshot| {
                    IngestOutcome::Published(snapshot.revision)
                }),
            Err(err) => IngestOutcome::Rejected(err),
        }
    }

    fn ingest_inertial(&mut self, sample: &RawSample) -> IngestOutcome {
        let (Some(history), Some(trace)) = (self.history.as_mut(), self.shared.trace.as_ref())
        else {
            return IngestOutcome::Ignored(sample.kind);
        };

        if let Err(err) = history.record(sample) {
            debug!(kind = sample.kind.name(), error = %err, "inertial sample rejected");
            return IngestOutcome::Rejected(err);
        }

        if trace.store(history.trace()) {
            IngestOutcome::Recorded(sample.kind)
        } else {
            IngestOutcome::Inactive
        }
    }
}
