//! Rolling inertial history for plotting accelerometer, gyroscope and magnetometer streams.

use sensor_types::{RawSample, SampleKind};
use serde::{Deserialize, Serialize};

use crate::buffer::StreamBuffer;
use crate::error::{FusionError, Result};

/// Default number of readings kept per sensor.
pub const DEFAULT_HISTORY_WINDOW: usize = 256;

/// One sensor's plot-ready window: three channels plus a rescale factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTrace {
    /// X, Y and Z channels, oldest first, zero-padded at the front until full.
    pub channels: [Vec<f32>; 3],

    /// Absolute maximum over all three channels in the window.
    pub abs_max: f32,
}

impl ChannelTrace {
    fn zeroed(window: usize) -> Self {
        Self {
            channels: [vec![0.0; window], vec![0.0; window], vec![0.0; window]],
            abs_max: 0.0,
        }
    }

    /// Factor that fits the window into `[-extent, extent]`.
    ///
    /// Returns `None` while every buffered value is zero.
    #[must_use]
    pub fn plot_scale(&self, extent: f32) -> Option<f32> {
        (self.abs_max > 0.0).then(|| extent / self.abs_max)
    }
}

/// Immutable snapshot of the inertial history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InertialTrace {
    /// Number of readings per channel.
    pub window: usize,

    /// Precomputed plot abscissa, `-1 + 2i / window`.
    pub x_axis: Vec<f32>,

    /// Accelerometer window.
    pub accel: ChannelTrace,

    /// Gyroscope window.
    pub gyro: ChannelTrace,

    /// Magnetometer window.
    pub mag: ChannelTrace,
}

impl InertialTrace {
    /// Creates an all-zero trace.
    #[must_use]
    pub fn empty(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            x_axis: normalized_axis(window),
            accel: ChannelTrace::zeroed(window),
            gyro: ChannelTrace::zeroed(window),
            mag: ChannelTrace::zeroed(window),
        }
    }

    /// Returns the window for an inertial kind.
    #[must_use]
    pub const fn channel(&self, kind: SampleKind) -> Option<&ChannelTrace> {
        match kind {
            SampleKind::Accel => Some(&self.accel),
            SampleKind::Gyro => Some(&self.gyro),
            SampleKind::Mag => Some(&self.mag),
            SampleKind::RotationVector | SampleKind::Unknown(_) => None,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn normalized_axis(window: usize) -> Vec<f32> {
    let step = 2.0 / window as f32;
    (0..window).map(|i| -1.0 + step * i as f32).collect()
}

/// Rolling per-sensor history of three-axis inertial samples.
///
/// # Example
///
/// ```
/// use sensor_fusion::InertialHistory;
/// use sensor_types::{RawSample, SampleKind, Timestamp};
///
/// let mut history = InertialHistory::new(4);
/// let accel = RawSample::from_vector3(SampleKind::Accel, [0.0, -2.0, 9.5], Timestamp::zero());
/// history.record(&accel).unwrap();
///
/// let trace = history.trace();
/// assert_eq!(trace.accel.channels[2], vec![0.0, 0.0, 0.0, 9.5]);
/// assert_eq!(trace.accel.abs_max, 9.5);
/// ```
#[derive(Debug, Clone)]
pub struct InertialHistory {
    window: usize,
    accel: StreamBuffer<[f32; 3]>,
    gyro: StreamBuffer<[f32; 3]>,
    mag: StreamBuffer<[f32; 3]>,
}

impl InertialHistory {
    /// Creates a history keeping `window` readings per sensor (at least 1).
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            accel: StreamBuffer::new(window),
            gyro: StreamBuffer::new(window),
            mag: StreamBuffer::new(window),
        }
    }

    /// Returns the window length.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Returns the buffer for an inertial kind.
    #[must_use]
    pub const fn buffer(&self, kind: SampleKind) -> Option<&StreamBuffer<[f32; 3]>> {
        match kind {
            SampleKind::Accel => Some(&self.accel),
            SampleKind::Gyro => Some(&self.gyro),
            SampleKind::Mag => Some(&self.mag),
            SampleKind::RotationVector | SampleKind::Unknown(_) => None,
        }
    }

    /// Appends an inertial sample to its sensor's window.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::UnexpectedKind`] for non-inertial samples and
    /// [`FusionError::MalformedSample`] for fewer than three or non-finite
    /// components.
    pub fn record(&mut self, sample: &RawSample) -> Result<()> {
        let kind = sample.kind;
        let buffer = match kind {
            SampleKind::Accel => &mut self.accel,
            SampleKind::Gyro => &mut self.gyro,
            SampleKind::Mag => &mut self.mag,
            SampleKind::RotationVector | SampleKind::Unknown(_) => {
                return Err(FusionError::unexpected_kind("inertial", kind.name()));
            }
        };

        let Some(xyz) = sample.vector3() else {
            return Err(FusionError::malformed(
                kind.name(),
                format!("expected 3 components, got {}", sample.len()),
            ));
        };
        if !xyz.iter().all(|v| v.is_finite()) {
            return Err(FusionError::malformed(kind.name(), "non-finite component"));
        }

        buffer.push(sample.timestamp, xyz);
        Ok(())
    }

    /// Clears every window.
    pub fn clear(&mut self) {
        self.accel.clear();
        self.gyro.clear();
        self.mag.clear();
    }

    /// Builds a plot-ready snapshot of all three windows.
    #[must_use]
    pub fn trace(&self) -> InertialTrace {
        InertialTrace {
            window: self.window,
            x_axis: normalized_axis(self.window),
            accel: self.channel_trace(&self.accel),
            gyro: self.channel_trace(&self.gyro),
            mag: self.channel_trace(&self.mag),
        }
    }

    fn channel_trace(&self, buffer: &StreamBuffer<[f32; 3]>) -> ChannelTrace {
        let mut trace = ChannelTrace::zeroed(self.window);
        let offset = self.window - buffer.len();
        for (i, (_, xyz)) in buffer.iter().enumerate() {
            for (channel, value) in trace.channels.iter_mut().zip(xyz) {
                channel[offset + i] = *value;
                trace.abs_max = trace.abs_max.max(value.abs());
            }
        }
        trace
    }
}

impl Default for InertialHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sensor_types::Timestamp;

    fn sample(kind: SampleKind, xyz: [f32; 3], nanos: u64) -> RawSample {
        RawSample::from_vector3(kind, xyz, Timestamp::from_nanos(nanos))
    }

    #[test]
    fn x_axis_spans_minus_one_to_one() {
        let trace = InertialHistory::new(4).trace();
        assert_eq!(trace.x_axis, vec![-1.0, -0.5, 0.0, 0.5]);
        assert_eq!(InertialHistory::default().window(), DEFAULT_HISTORY_WINDOW);
    }

    #[test]
    fn window_rolls_oldest_out() {
        let mut history = InertialHistory::new(3);
        for i in 0..5_u8 {
            let v = f32::from(i);
            history
                .record(&sample(SampleKind::Gyro, [v, -v, 0.0], u64::from(i)))
                .unwrap();
        }

        let trace = history.trace();
        assert_eq!(trace.gyro.channels[0], vec![2.0, 3.0, 4.0]);
        assert_eq!(trace.gyro.channels[1], vec![-2.0, -3.0, -4.0]);
        assert_eq!(trace.gyro.abs_max, 4.0);
        assert_eq!(history.buffer(SampleKind::Gyro).unwrap().len(), 3);
    }

    #[test]
    fn abs_max_tracks_window_not_lifetime() {
        let mut history = InertialHistory::new(2);
        history.record(&sample(SampleKind::Mag, [50.0, 0.0, 0.0], 0)).unwrap();
        history.record(&sample(SampleKind::Mag, [1.0, 0.0, 0.0], 1)).unwrap();
        assert_eq!(history.trace().mag.abs_max, 50.0);

        history.record(&sample(SampleKind::Mag, [0.0, 0.0, -3.0], 2)).unwrap();
        assert_eq!(history.trace().mag.abs_max, 3.0);
    }

    #[test]
    fn kinds_are_kept_apart() {
        let mut history = InertialHistory::new(2);
        history.record(&sample(SampleKind::Accel, [0.0, 0.0, 9.8], 0)).unwrap();

        let trace = history.trace();
        assert_eq!(trace.accel.channels[2], vec![0.0, 9.8]);
        assert_eq!(trace.gyro.abs_max, 0.0);
        assert_eq!(trace.mag.channels[0], vec![0.0, 0.0]);
    }

    #[test]
    fn plot_scale_fits_extent() {
        let mut history = InertialHistory::new(8);
        assert!(history.trace().accel.plot_scale(0.5).is_none());

        history.record(&sample(SampleKind::Accel, [2.0, -4.0, 1.0], 0)).unwrap();
        let scale = history.trace().accel.plot_scale(0.5).unwrap();
        assert_relative_eq!(scale, 0.125);
    }

    #[test]
    fn rejects_non_inertial_and_malformed() {
        let mut history = InertialHistory::new(4);
        let rv = RawSample::rotation_vector([0.0, 0.0, 0.0, 1.0], Timestamp::zero());
        assert!(matches!(
            history.record(&rv),
            Err(FusionError::UnexpectedKind { .. })
        ));

        let short = RawSample::new(SampleKind::Accel, &[1.0, 2.0], Timestamp::zero()).unwrap();
        assert!(matches!(
            history.record(&short),
            Err(FusionError::MalformedSample { .. })
        ));

        let nan = sample(SampleKind::Accel, [f32::INFINITY, 0.0, 0.0], 0);
        assert!(history.record(&nan).is_err());
        assert!(history.buffer(SampleKind::Accel).unwrap().is_empty());
    }

    #[test]
    fn clear_resets_windows() {
        let mut history = InertialHistory::new(4);
        history.record(&sample(SampleKind::Gyro, [1.0, 1.0, 1.0], 0)).unwrap();
        history.clear();
        assert_eq!(history.trace(), InertialTrace::empty(4));
    }

    #[test]
    fn trace_channel_lookup() {
        let trace = InertialTrace::empty(2);
        assert!(trace.channel(SampleKind::Accel).is_some());
        assert!(trace.channel(SampleKind::RotationVector).is_none());
    }
}
