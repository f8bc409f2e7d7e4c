//! Raw sensor samples as delivered by the platform sensor service.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SensorError};
use crate::time::Timestamp;

/// Maximum number of float components a [`RawSample`] stores.
///
/// Rotation vectors deliver up to five (`x, y, z, w, heading accuracy`);
/// uncalibrated inertial streams deliver six.
pub const MAX_SAMPLE_VALUES: usize = 6;

/// The kind of sensor that produced a sample.
///
/// Platform type codes outside the supported set are kept as
/// [`SampleKind::Unknown`] so ingest can drop them with a diagnostic.
///
/// # Example
///
/// ```
/// use sensor_types::SampleKind;
///
/// assert_eq!(SampleKind::from_platform_code(11), SampleKind::RotationVector);
/// assert_eq!(SampleKind::from_platform_code(8), SampleKind::Unknown(8));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SampleKind {
    /// Accelerometer, m/s² including gravity.
    Accel,
    /// Gyroscope, rad/s around the device's local axes.
    Gyro,
    /// Magnetometer, µT.
    Mag,
    /// Fused rotation vector.
    RotationVector,
    /// Unsupported platform type code.
    Unknown(i32),
}

impl SampleKind {
    /// Platform type code of the accelerometer.
    pub const ACCELEROMETER_CODE: i32 = 1;
    /// Platform type code of the magnetometer.
    pub const MAGNETIC_FIELD_CODE: i32 = 2;
    /// Platform type code of the gyroscope.
    pub const GYROSCOPE_CODE: i32 = 4;
    /// Platform type code of the rotation vector.
    pub const ROTATION_VECTOR_CODE: i32 = 11;

    /// Maps a platform sensor type code to a kind.
    #[must_use]
    pub const fn from_platform_code(code: i32) -> Self {
        match code {
            Self::ACCELEROMETER_CODE => Self::Accel,
            Self::MAGNETIC_FIELD_CODE => Self::Mag,
            Self::GYROSCOPE_CODE => Self::Gyro,
            Self::ROTATION_VECTOR_CODE => Self::RotationVector,
            other => Self::Unknown(other),
        }
    }

    /// Returns the platform sensor type code.
    #[must_use]
    pub const fn platform_code(self) -> i32 {
        match self {
            Self::Accel => Self::ACCELEROMETER_CODE,
            Self::Mag => Self::MAGNETIC_FIELD_CODE,
            Self::Gyro => Self::GYROSCOPE_CODE,
            Self::RotationVector => Self::ROTATION_VECTOR_CODE,
            Self::Unknown(code) => code,
        }
    }

    /// Returns true for accelerometer, gyroscope and magnetometer samples.
    #[must_use]
    pub const fn is_inertial(self) -> bool {
        matches!(self, Self::Accel | Self::Gyro | Self::Mag)
    }

    /// Returns true for rotation-vector samples.
    #[must_use]
    pub const fn is_orientation(self) -> bool {
        matches!(self, Self::RotationVector)
    }

    /// Returns a short name for logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Accel => "accel",
            Self::Gyro => "gyro",
            Self::Mag => "mag",
            Self::RotationVector => "rotation_vector",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// A single immutable sample pushed by the platform sensor service.
///
/// Components are stored inline; the sample is `Copy` and never allocates.
/// Shape validation (component count, finiteness) is the consumer's job:
/// a rotation-vector sample with two components is representable here and
/// rejected by the orientation resolver.
///
/// # Example
///
/// ```
/// use sensor_types::{RawSample, SampleKind, Timestamp};
///
/// let accel = RawSample::new(SampleKind::Accel, &[0.0, 0.0, 9.81], Timestamp::zero()).unwrap();
/// assert_eq!(accel.vector3(), Some([0.0, 0.0, 9.81]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawSample {
    /// Sensor that produced the sample.
    pub kind: SampleKind,

    /// Event time.
    pub timestamp: Timestamp,

    values: [f32; MAX_SAMPLE_VALUES],
    len: u8,
}

impl RawSample {
    /// Creates a sample from a component slice.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::EmptySample`] for an empty slice and
    /// [`SensorError::TooManyValues`] if `values` exceeds [`MAX_SAMPLE_VALUES`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(kind: SampleKind, values: &[f32], timestamp: Timestamp) -> Result<Self> {
        if values.is_empty() {
            return Err(SensorError::empty_sample(kind.name()));
        }
        if values.len() > MAX_SAMPLE_VALUES {
            return Err(SensorError::too_many_values(
                MAX_SAMPLE_VALUES,
                values.len(),
            ));
        }

        let mut buf = [0.0; MAX_SAMPLE_VALUES];
        buf[..values.len()].copy_from_slice(values);
        Ok(Self {
            kind,
            timestamp,
            values: buf,
            len: values.len() as u8,
        })
    }

    /// Creates a three-axis sample (accelerometer, gyroscope, magnetometer).
    #[must_use]
    pub const fn from_vector3(kind: SampleKind, xyz: [f32; 3], timestamp: Timestamp) -> Self {
        Self {
            kind,
            timestamp,
            values: [xyz[0], xyz[1], xyz[2], 0.0, 0.0, 0.0],
            len: 3,
        }
    }

    /// Creates a four-component rotation-vector sample `(x, y, z, w)`.
    #[must_use]
    pub const fn rotation_vector(xyzw: [f32; 4], timestamp: Timestamp) -> Self {
        Self {
            kind: SampleKind::RotationVector,
            timestamp,
            values: [xyzw[0], xyzw[1], xyzw[2], xyzw[3], 0.0, 0.0],
            len: 4,
        }
    }

    /// Returns the delivered components.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values[..usize::from(self.len)]
    }

    /// Returns the number of delivered components.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true if the sample has no components.
    ///
    /// Never true for samples built through [`RawSample::new`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }

    /// Returns the first three components, if present.
    #[must_use]
    pub fn vector3(&self) -> Option<[f32; 3]> {
        match self.values() {
            [x, y, z, ..] => Some([*x, *y, *z]),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn kind_platform_codes_round_trip() {
        for kind in [
            SampleKind::Accel,
            SampleKind::Gyro,
            SampleKind::Mag,
            SampleKind::RotationVector,
            SampleKind::Unknown(17),
        ] {
            assert_eq!(SampleKind::from_platform_code(kind.platform_code()), kind);
        }
    }

    #[test]
    fn kind_classification() {
        assert!(SampleKind::Accel.is_inertial());
        assert!(SampleKind::Mag.is_inertial());
        assert!(!SampleKind::RotationVector.is_inertial());
        assert!(SampleKind::RotationVector.is_orientation());
        assert!(!SampleKind::Unknown(3).is_inertial());
        assert_eq!(SampleKind::Unknown(3).name(), "unknown");
    }

    #[test]
    fn sample_new_keeps_components() {
        let sample = RawSample::new(
            SampleKind::RotationVector,
            &[0.1, 0.2, 0.3, 0.9, -1.0],
            Timestamp::from_nanos(5),
        )
        .unwrap();

        assert_eq!(sample.len(), 5);
        assert_eq!(sample.values(), &[0.1_f32, 0.2, 0.3, 0.9, -1.0][..]);
        assert_eq!(sample.timestamp.as_nanos(), 5);
    }

    #[test]
    fn sample_new_rejects_empty_and_oversized() {
        assert!(matches!(
            RawSample::new(SampleKind::Gyro, &[], Timestamp::zero()),
            Err(SensorError::EmptySample(_))
        ));
        assert!(matches!(
            RawSample::new(SampleKind::Gyro, &[0.0; 7], Timestamp::zero()),
            Err(SensorError::TooManyValues {
                capacity: 6,
                actual: 7
            })
        ));
    }

    #[test]
    fn short_sample_is_representable() {
        let sample =
            RawSample::new(SampleKind::RotationVector, &[0.1, 0.2], Timestamp::zero()).unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.vector3(), None);
    }

    #[test]
    fn sample_finiteness() {
        let good = RawSample::from_vector3(SampleKind::Accel, [0.0, 0.0, 9.81], Timestamp::zero());
        let bad = RawSample::from_vector3(SampleKind::Accel, [f32::NAN, 0.0, 0.0], Timestamp::zero());
        assert!(good.is_finite());
        assert!(!bad.is_finite());
    }

    #[test]
    fn rotation_vector_constructor() {
        let sample = RawSample::rotation_vector([0.0, 0.0, 0.0, 1.0], Timestamp::zero());
        assert_eq!(sample.kind, SampleKind::RotationVector);
        assert_eq!(sample.values(), &[0.0_f32, 0.0, 0.0, 1.0][..]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn sample_serialization() {
        let sample = RawSample::from_vector3(SampleKind::Gyro, [0.1, 0.2, 0.3], Timestamp::zero());
        let json = serde_json::to_string(&sample).unwrap();
        let parsed: RawSample = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample);
    }
}
