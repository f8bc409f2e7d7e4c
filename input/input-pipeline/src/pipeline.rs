//! The pipeline object: owns the sink, the subscriptions and the ports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Mat4;
use input_gesture::{GestureEvent, GestureResolver, PanState, ScaleBounds, ScaleState};
use sensor_fusion::{InertialTrace, RotationState};
use tracing::{debug, info, warn};

use crate::cell::SnapshotCell;
use crate::config::{PipelineConfig, RotationOutput};
use crate::error::{PipelineError, Result};
use crate::ingest::SensorPort;
use crate::ports::{FramePort, RenderBackend, SensorService};
use crate::sink::TransformSink;
use crate::snapshot::TransformSnapshot;

/// State shared between the pipeline and its ports for one run.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) config: PipelineConfig,
    pub(crate) sink: TransformSink,
    pub(crate) trace: Option<SnapshotCell<InertialTrace>>,
    running: AtomicBool,
}

impl Shared {
    fn new(config: PipelineConfig) -> Self {
        let trace = config
            .history_enabled()
            .then(|| SnapshotCell::new(InertialTrace::empty(config.history_window)));
        let sink = TransformSink::with_bounds(config.scale_bounds);
        Self {
            config,
            sink,
            trace,
            running: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn teardown(&self) {
        self.running.store(false, Ordering::Release);
        self.sink.close();
        if let Some(trace) = &self.trace {
            trace.close();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    Stopped,
}

/// Orientation and gesture input pipeline.
///
/// Constructed explicitly and bound to [`start`](Self::start) /
/// [`stop`](Self::stop). Each run gets a fresh sink; ports and handles from
/// an earlier run stay inert.
///
/// # Example
///
/// ```
/// use input_pipeline::{NullSensorService, Pipeline, PipelineConfig};
/// use sensor_types::{RawSample, Timestamp};
///
/// let mut pipeline = Pipeline::new(PipelineConfig::default(), NullSensorService).unwrap();
/// pipeline.start().unwrap();
///
/// let mut sensors = pipeline.sensor_port().unwrap();
/// let gestures = pipeline.gesture_port().unwrap();
/// let mut render = pipeline.render_handle().unwrap();
///
/// sensors.on_raw_sample(&RawSample::rotation_vector([0.0, 0.0, 0.0, 1.0], Timestamp::zero()));
/// gestures.on_scale_delta(2.0);
///
/// let snapshot = render.read_if_changed().unwrap();
/// assert_eq!(snapshot.revision, 2);
/// assert_eq!(snapshot.scale, 2.0);
/// assert!(render.read_if_changed().is_none());
///
/// pipeline.stop().unwrap();
/// assert!(gestures.on_scale_delta(2.0).is_none());
/// ```
#[derive(Debug)]
pub struct Pipeline<S: SensorService> {
    config: PipelineConfig,
    service: S,
    shared: Arc<Shared>,
    lifecycle: Lifecycle,
}

impl<S: SensorService> Pipeline<S> {
    /// Creates an idle pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: PipelineConfig, service: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(config.clone())),
            config,
            service,
            lifecycle: Lifecycle::Idle,
        })
    }

    /// Subscribes to every configured sensor and opens the ports.
    ///
    /// On a subscription failure the sensors already subscribed are
    /// released again and the pipeline stays stopped.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AlreadyStarted`] while running and
    /// [`PipelineError::Subscribe`] if the service refuses a sensor.
    pub fn start(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Running {
            return Err(PipelineError::AlreadyStarted);
        }

        let shared = Arc::new(Shared::new(self.config.clone()));
        for (i, sub) in self.config.subscriptions.iter().enumerate() {
            if let Err(err) = self.service.subscribe(sub.kind, sub.rate) {
                warn!(kind = sub.kind.name(), error = %err, "subscription failed, rolling back");
                for done in self.config.subscriptions[..i].iter().rev() {
                    self.service.unsubscribe(done.kind);
                }
                shared.teardown();
                return Err(err);
            }
            debug!(
                kind = sub.kind.name(),
                delay_us = sub.rate.delay_micros(),
                "subscribed"
            );
        }

        shared.running.store(true, Ordering::Release);
        self.shared = shared;
        self.lifecycle = Lifecycle::Running;
        info!(
            subscriptions = self.config.subscriptions.len(),
            history_window = self.config.history_window,
            "pipeline started"
        );
        Ok(())
    }

    /// Tears the pipeline down.
    ///
    /// Cancels subscriptions first, then marks every port inert, then closes
    /// the sink. After this returns no port can publish.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotRunning`] if the pipeline is not running.
    pub fn stop(&mut self) -> Result<()> {
        if self.lifecycle != Lifecycle::Running {
            return Err(PipelineError::NotRunning);
        }

        for sub in self.config.subscriptions.iter().rev() {
            self.service.unsubscribe(sub.kind);
        }
        self.shared.teardown();
        self.lifecycle = Lifecycle::Stopped;
        info!("pipeline stopped");
        Ok(())
    }

    /// Returns true between `start` and `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The sensor service.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Creates a sensor port for one delivery context.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotRunning`] if the pipeline is not running.
    pub fn sensor_port(&self) -> Result<SensorPort> {
        self.running_shared().map(SensorPort::new)
    }

    /// Creates a gesture port.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotRunning`] if the pipeline is not running.
    pub fn gesture_port(&self) -> Result<GesturePort> {
        self.running_shared().map(|shared| GesturePort {
            bounds: shared.config.scale_bounds,
            shared,
        })
    }

    /// Creates a camera frame tagging port.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotRunning`] if the pipeline is not running.
    pub fn frame_port(&self) -> Result<FramePort> {
        self.running_shared().map(FramePort::new)
    }

    /// Creates a render handle.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotRunning`] if the pipeline is not running.
    pub fn render_handle(&self) -> Result<RenderHandle> {
        self.running_shared().map(|shared| RenderHandle {
            shared,
            last_revision: None,
        })
    }

    fn running_shared(&self) -> Result<Arc<Shared>> {
        if self.is_running() {
            Ok(Arc::clone(&self.shared))
        } else {
            Err(PipelineError::NotRunning)
        }
    }
}

impl<S: SensorService> Drop for Pipeline<S> {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.stop();
        }
    }
}

/// Producer port for the gesture detector.
///
/// Each gesture is resolved against the snapshot it is published onto, so
/// several gesture contexts can share the sink without losing deltas.
/// Every method returns the published snapshot, or `None` after teardown.
#[derive(Debug, Clone)]
pub struct GesturePort {
    shared: Arc<Shared>,
    bounds: ScaleBounds,
}

impl GesturePort {
    /// Multiplies the scale by `factor`, clamped into the configured bounds.
    pub fn on_scale_delta(&self, factor: f32) -> Option<TransformSnapshot> {
        self.apply(GestureEvent::Scale { factor })
    }

    /// Adds `(dx, dy)` to the pan offset.
    pub fn on_pan_delta(&self, dx: f32, dy: f32) -> Option<TransformSnapshot> {
        self.apply(GestureEvent::Pan { dx, dy })
    }

    /// Zeroes the pan offset.
    pub fn reset_pan(&self) -> Option<TransformSnapshot> {
        self.apply(GestureEvent::reset_pan())
    }

    /// Dispatches a tagged gesture event.
    pub fn apply(&self, event: GestureEvent) -> Option<TransformSnapshot> {
        if !self.shared.is_running() {
            return None;
        }
        let mut clamped = false;
        let published = self.shared.sink.publish_with(|current| {
            let scale = ScaleState::with_factor(current.scale, self.bounds);
            let mut resolver = GestureResolver::from_parts(scale, current.pan);
            let update = resolver.resolve(event);
            clamped = update.clamped;
            Some(update.into())
        })?;
        if clamped {
            debug!(?event, scale = published.scale, "scale clamped to bounds");
        }
        Some(published)
    }
}

/// Consumer handle for the render tick.
#[derive(Debug, Clone)]
pub struct RenderHandle {
    shared: Arc<Shared>,
    last_revision: Option<u64>,
}

impl RenderHandle {
    /// Newest snapshot, or `None` after teardown.
    #[must_use]
    pub fn read_latest(&self) -> Option<TransformSnapshot> {
        self.shared.sink.read_latest()
    }

    /// Newest snapshot if its revision differs from the last one returned here.
    pub fn read_if_changed(&mut self) -> Option<TransformSnapshot> {
        let snapshot = self.read_latest()?;
        if self.last_revision == Some(snapshot.revision) {
            return None;
        }
        self.last_revision = Some(snapshot.revision);
        Some(snapshot)
    }

    /// Current rotation.
    #[must_use]
    pub fn get_rotation(&self) -> Option<RotationState> {
        self.read_latest().map(|s| s.rotation)
    }

    /// Current scale factor.
    #[must_use]
    pub fn get_scale(&self) -> Option<f32> {
        self.read_latest().map(|s| s.scale)
    }

    /// Current pan offset.
    #[must_use]
    pub fn get_pan(&self) -> Option<PanState> {
        self.read_latest().map(|s| s.pan)
    }

    /// Model matrix for the configured rotation output.
    #[must_use]
    pub fn model_matrix(&self) -> Option<Mat4> {
        let output: RotationOutput = self.shared.config.rotation_output;
        self.read_latest().map(|s| s.model_matrix(output))
    }

    /// Latest inertial trace, if history is enabled and the pipeline runs.
    #[must_use]
    pub fn inertial_trace(&self) -> Option<InertialTrace> {
        self.shared.trace.as_ref()?.load()
    }

    /// Steps `backend` if the snapshot changed since the last tick.
    ///
    /// Returns true if a frame was drawn.
    pub fn render_tick<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        match self.read_if_changed() {
            Some(snapshot) => {
                backend.step(&snapshot);
                true
            }
            None => false,
        }
    }
}
