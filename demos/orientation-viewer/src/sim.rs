//! Simulated sensor service and gesture script.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use glam::{EulerRot, Quat};
use input_gesture::{GestureEvent, ResetTarget};
use input_pipeline::{
    GesturePort, IngestOutcome, PipelineError, SensorPort, SensorRate, SensorService,
};
use sensor_types::SampleKind;
use tracing::{debug, info};

/// Floor on the simulated delivery period; `Fastest` would otherwise spin.
const MIN_PERIOD: Duration = Duration::from_millis(2);

/// Sensor service that records subscriptions for the simulated device.
#[derive(Debug, Default)]
pub struct SimulatedSensorService {
    active: Mutex<Vec<(SampleKind, SensorRate)>>,
}

impl SimulatedSensorService {
    /// Active subscriptions.
    pub fn active(&self) -> Vec<(SampleKind, SensorRate)> {
        self.active
            .lock()
            .map(|active| active.clone())
            .unwrap_or_default()
    }
}

impl SensorService for SimulatedSensorService {
    fn subscribe(&self, kind: SampleKind, rate: SensorRate) -> input_pipeline::Result<()> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| PipelineError::subscribe(kind.name(), "service state poisoned"))?;
        active.retain(|(k, _)| *k != kind);
        active.push((kind, rate));
        info!(kind = kind.name(), delay_us = rate.delay_micros(), "sensor enabled");
        Ok(())
    }

    fn unsubscribe(&self, kind: SampleKind) {
        if let Ok(mut active) = self.active.lock() {
            active.retain(|(k, _)| *k != kind);
        }
        info!(kind = kind.name(), "sensor disabled");
    }
}

/// Counters reported when a producer finishes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProducerStats {
    pub published: u64,
    pub rejected: u64,
    pub other: u64,
}

fn period(rate: SensorRate) -> Duration {
    Duration::from(rate.period()).max(MIN_PERIOD)
}

/// Emits a slow tumbling rotation plus any subscribed inertial streams until `stop` is set.
///
/// Every 97th tick a truncated rotation vector and an unsupported sensor
/// code are injected.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn run_sensors(
    mut port: SensorPort,
    subscriptions: &[(SampleKind, SensorRate)],
    stop: &AtomicBool,
) -> ProducerStats {
    let tick = subscriptions
        .iter()
        .map(|(_, rate)| period(*rate))
        .min()
        .unwrap_or(MIN_PERIOD);
    let started = Instant::now();
    let mut stats = ProducerStats::default();
    let mut n: u64 = 0;

    while !stop.load(Ordering::Acquire) {
        let t = started.elapsed().as_secs_f32();
        let nanos = started.elapsed().as_nanos() as i64;

        for (kind, _) in subscriptions {
            let values: Vec<f32> = match kind {
                SampleKind::RotationVector => {
                    let q = Quat::from_euler(EulerRot::ZXY, 0.6 * t, 0.4 * (0.7 * t).sin(), 0.2 * t.cos());
                    vec![q.x, q.y, q.z, q.w]
                }
                SampleKind::Accel => vec![0.3 * t.sin(), 0.2 * t.cos(), 9.81],
                SampleKind::Gyro => vec![0.6, 0.28 * (0.7 * t).cos(), -0.2 * t.sin()],
                SampleKind::Mag => vec![22.0, -5.0 * t.sin(), -40.0],
                SampleKind::Unknown(_) => continue,
            };
            tally(&mut stats, &port.on_platform_event(kind.platform_code(), &values, nanos));
        }

        if n % 97 == 96 {
            tally(
                &mut stats,
                &port.on_platform_event(SampleKind::ROTATION_VECTOR_CODE, &[0.1, 0.2], nanos),
            );
            tally(&mut stats, &port.on_platform_event(8, &[1.0], nanos));
        }

        n += 1;
        thread::sleep(tick);
    }

    debug!(
        resolved = port.resolver().resolved_count(),
        rejected = port.resolver().rejected_count(),
        "sensor producer finished"
    );
    if let Some(history) = port.history() {
        for kind in [SampleKind::Accel, SampleKind::Gyro, SampleKind::Mag] {
            if let Some(buffer) = history.buffer(kind).filter(|b| !b.is_empty()) {
                let stats = buffer.stats();
                debug!(kind = kind.name(), count = stats.count, rate_hz = ?stats.rate_hz, "inertial stream");
            }
        }
    }
    stats
}

fn tally(stats: &mut ProducerStats, outcome: &IngestOutcome) {
    match outcome {
        IngestOutcome::Published(_) | IngestOutcome::Recorded(_) => stats.published += 1,
        IngestOutcome::Rejected(_) => stats.rejected += 1,
        IngestOutcome::Ignored(_) | IngestOutcome::Dropped(_) | IngestOutcome::Inactive => {
            stats.other += 1;
        }
    }
}

/// Plays a looping pinch/drag/reset script until `stop` is set.
pub fn run_gestures(port: &GesturePort, stop: &AtomicBool) -> ProducerStats {
    let script = [
        GestureEvent::Scale { factor: 1.08 },
        GestureEvent::Scale { factor: 1.08 },
        GestureEvent::Pan { dx: 4.0, dy: -2.0 },
        GestureEvent::Scale { factor: 1.5 },
        GestureEvent::Pan { dx: -1.0, dy: 3.0 },
        GestureEvent::Scale { factor: 0.7 },
        GestureEvent::reset_pan(),
        GestureEvent::Reset {
            target: ResetTarget::Scale,
        },
    ];
    let mut stats = ProducerStats::default();

    for event in script.iter().cycle() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        if port.apply(*event).is_some() {
            stats.published += 1;
        } else {
            stats.other += 1;
        }
        thread::sleep(Duration::from_millis(35));
    }
    stats
}
