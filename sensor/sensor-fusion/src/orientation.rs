//! Rotation-vector resolution: quaternion expansion, axis remap, Euler extraction.

use glam::{Mat3, Mat4, Quat};
use sensor_types::{RawSample, SampleKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FusionError, Result};
use crate::remap::AxisRemap;

/// `|m21|` closer than this to 1 is treated as gimbal lock.
pub const GIMBAL_LOCK_EPSILON: f32 = 1e-6;

/// Minimum components of a rotation-vector sample `(x, y, z)`.
pub const MIN_ROTATION_VECTOR_LEN: usize = 3;

/// Maximum components of a rotation-vector sample `(x, y, z, w, accuracy)`.
pub const MAX_ROTATION_VECTOR_LEN: usize = 5;

/// Orientation angles in radians.
///
/// Extracted from a rotation matrix `m` (row-major indices) as
/// `yaw = atan2(m01, m11)`, `pitch = asin(-m21)`, `roll = atan2(-m20, m22)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    /// Rotation about the vertical axis (azimuth).
    pub yaw: f32,
    /// Rotation about the lateral axis, in `[-π/2, π/2]`.
    pub pitch: f32,
    /// Rotation about the longitudinal axis.
    pub roll: f32,
}

impl EulerAngles {
    /// Zero angles.
    pub const ZERO: Self = Self {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    /// Creates angles from radians.
    #[must_use]
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Extracts angles from a rotation matrix.
    ///
    /// Near pitch = ±90° the yaw and roll axes coincide. There roll is
    /// pinned to zero and yaw is taken from `atan2(-m10, m00)`, which stays
    /// well-conditioned while `m01` and `m11` both vanish.
    #[must_use]
    pub fn from_matrix(m: &Mat3) -> Self {
        let at = |row: usize, col: usize| m.col(col)[row];

        let sin_pitch = (-at(2, 1)).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();

        if 1.0 - sin_pitch.abs() < GIMBAL_LOCK_EPSILON {
            let yaw = (-at(1, 0)).atan2(at(0, 0));
            return Self {
                yaw,
                pitch,
                roll: 0.0,
            };
        }

        Self {
            yaw: at(0, 1).atan2(at(1, 1)),
            pitch,
            roll: (-at(2, 0)).atan2(at(2, 2)),
        }
    }

    /// Returns the angles as `[yaw, pitch, roll]` in degrees.
    #[must_use]
    pub fn to_degrees(self) -> [f32; 3] {
        [
            self.yaw.to_degrees(),
            self.pitch.to_degrees(),
            self.roll.to_degrees(),
        ]
    }

    /// Returns true if no angle is NaN or infinite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}

/// A fully resolved orientation: rotation matrix plus derived Euler angles.
///
/// Always replaced as a whole; never merged with a previous state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    matrix: Mat3,
    euler: EulerAngles,
}

impl RotationState {
    /// The identity orientation.
    pub const IDENTITY: Self = Self {
        matrix: Mat3::IDENTITY,
        euler: EulerAngles::ZERO,
    };

    /// Builds a state from a rotation matrix, deriving the Euler angles.
    #[must_use]
    pub fn from_matrix(matrix: Mat3) -> Self {
        Self {
            matrix,
            euler: EulerAngles::from_matrix(&matrix),
        }
    }

    /// Returns the rotation matrix.
    #[must_use]
    pub const fn matrix(&self) -> Mat3 {
        self.matrix
    }

    /// Returns the Euler angles.
    #[must_use]
    pub const fn euler(&self) -> EulerAngles {
        self.euler
    }

    /// Returns the matrix element at `(row, col)`.
    #[must_use]
    pub fn element(&self, row: usize, col: usize) -> f32 {
        self.matrix.col(col)[row]
    }

    /// Returns the matrix as nine row-major floats.
    #[must_use]
    pub fn to_row_major(&self) -> [f32; 9] {
        self.matrix.transpose().to_cols_array()
    }

    /// Returns the 4×4 homogeneous matrix as sixteen row-major floats.
    #[must_use]
    pub fn to_homogeneous_row_major(&self) -> [f32; 16] {
        Mat4::from_mat3(self.matrix).transpose().to_cols_array()
    }

    /// Returns the orientation as a quaternion.
    #[must_use]
    pub fn quaternion(&self) -> Quat {
        Quat::from_mat3(&self.matrix)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Expands a rotation-vector encoding into a rotation matrix.
///
/// Accepts `(x, y, z)`, `(x, y, z, w)` or `(x, y, z, w, accuracy)`. With three
/// components `w = sqrt(max(0, 1 - x² - y² - z²))`; the heading accuracy of a
/// fifth component is ignored. The quaternion is normalized before expansion.
///
/// # Errors
///
/// Returns [`FusionError::MalformedSample`] for the wrong component count,
/// non-finite components or a zero-length quaternion.
///
/// # Example
///
/// ```
/// use glam::Mat3;
/// use sensor_fusion::rotation_matrix_from_vector;
///
/// let m = rotation_matrix_from_vector(&[0.0, 0.0, 0.0, 1.0]).unwrap();
/// assert_eq!(m, Mat3::IDENTITY);
/// assert!(rotation_matrix_from_vector(&[0.1, 0.2]).is_err());
/// ```
pub fn rotation_matrix_from_vector(values: &[f32]) -> Result<Mat3> {
    let kind = SampleKind::RotationVector.name();
    if !(MIN_ROTATION_VECTOR_LEN..=MAX_ROTATION_VECTOR_LEN).contains(&values.len()) {
        return Err(FusionError::malformed(
            kind,
            format!(
                "expected {MIN_ROTATION_VECTOR_LEN} to {MAX_ROTATION_VECTOR_LEN} components, got {}",
                values.len()
            ),
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(FusionError::malformed(kind, "non-finite component"));
    }

    let (x, y, z) = (values[0], values[1], values[2]);
    let w = match values.get(3) {
        Some(w) => *w,
        None => (1.0 - x * x - y * y - z * z).max(0.0).sqrt(),
    };

    let q = Quat::from_xyzw(x, y, z, w);
    let len = q.length();
    if len <= f32::EPSILON {
        return Err(FusionError::malformed(kind, "zero-length quaternion"));
    }
    let q = q / len;

    let (sq_x, sq_y, sq_z) = (2.0 * q.x * q.x, 2.0 * q.y * q.y, 2.0 * q.z * q.z);
    let (xy, zw) = (2.0 * q.x * q.y, 2.0 * q.z * q.w);
    let (xz, yw) = (2.0 * q.x * q.z, 2.0 * q.y * q.w);
    let (yz, xw) = (2.0 * q.y * q.z, 2.0 * q.x * q.w);

    let row_major = [
        1.0 - sq_y - sq_z,
        xy - zw,
        xz + yw,
        xy + zw,
        1.0 - sq_x - sq_z,
        yz - xw,
        xz - yw,
        yz + xw,
        1.0 - sq_x - sq_y,
    ];
    Ok(Mat3::from_cols_array(&row_major).transpose())
}

/// Resolves rotation-vector samples into [`RotationState`]s.
///
/// Holds the last good state: a rejected sample leaves it untouched.
///
/// # Example
///
/// ```
/// use sensor_fusion::{OrientationResolver, RotationState};
/// use sensor_types::{RawSample, SampleKind, Timestamp};
///
/// let mut resolver = OrientationResolver::new();
/// let bad = RawSample::new(SampleKind::RotationVector, &[0.1, 0.2], Timestamp::zero()).unwrap();
///
/// assert!(resolver.resolve(&bad).is_err());
/// assert_eq!(resolver.state(), RotationState::IDENTITY);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrientationResolver {
    remap: Option<AxisRemap>,
    state: RotationState,
    resolved: u64,
    rejected: u64,
}

impl OrientationResolver {
    /// Creates a resolver without axis remap, starting at identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that applies `remap` to every resolved matrix.
    #[must_use]
    pub fn with_remap(remap: AxisRemap) -> Self {
        Self {
            remap: (!remap.is_identity()).then_some(remap),
            ..Self::default()
        }
    }

    /// Returns the configured remap, if any.
    #[must_use]
    pub const fn remap(&self) -> Option<AxisRemap> {
        self.remap
    }

    /// Resolves a rotation-vector sample and replaces the held state.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::UnexpectedKind`] for non-rotation-vector samples
    /// and [`FusionError::MalformedSample`] for bad shapes; in both cases the
    /// previous state is retained.
    pub fn resolve(&mut self, sample: &RawSample) -> Result<RotationState> {
        if sample.kind != SampleKind::RotationVector {
            self.rejected += 1;
            return Err(FusionError::unexpected_kind(
                SampleKind::RotationVector.name(),
                sample.kind.name(),
            ));
        }

        let raw = match rotation_matrix_from_vector(sample.values()) {
            Ok(m) => m,
            Err(err) => {
                self.rejected += 1;
                debug!(error = %err, "rotation vector rejected, keeping previous state");
                return Err(err);
            }
        };

        let matrix = self.remap.map_or(raw, |remap| remap.apply(raw));
        self.state = RotationState::from_matrix(matrix);
        self.resolved += 1;
        Ok(self.state)
    }

    /// Returns the last good state.
    #[must_use]
    pub const fn state(&self) -> RotationState {
        self.state
    }

    /// Number of samples resolved.
    #[must_use]
    pub const fn resolved_count(&self) -> u64 {
        self.resolved
    }

    /// Number of samples rejected.
    #[must_use]
    pub const fn rejected_count(&self) -> u64 {
        self.rejected
    }

    /// Returns the state to identity and clears counters.
    pub fn reset(&mut self) {
        self.state = RotationState::IDENTITY;
        self.resolved = 0;
        self.rejected = 0;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::remap::Axis;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use sensor_types::Timestamp;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn sample_from_quat(q: Quat) -> RawSample {
        RawSample::rotation_vector([q.x, q.y, q.z, q.w], Timestamp::zero())
    }

    fn assert_mat_eq(a: Mat3, b: Mat3) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-5);
        }
    }

    #[test]
    fn identity_vector_gives_identity_matrix() {
        let m = rotation_matrix_from_vector(&[0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(m, Mat3::IDENTITY);
        assert_eq!(EulerAngles::from_matrix(&m), EulerAngles::ZERO);
    }

    #[test]
    fn matrix_matches_quaternion_expansion() {
        let q = Quat::from_euler(glam::EulerRot::ZXY, 0.4, -0.3, 1.1);
        let m = rotation_matrix_from_vector(&[q.x, q.y, q.z, q.w]).unwrap();
        assert_mat_eq(m, Mat3::from_quat(q));
    }

    #[test]
    fn three_component_vector_derives_w() {
        let q = Quat::from_rotation_z(0.8);
        let full = rotation_matrix_from_vector(&[q.x, q.y, q.z, q.w]).unwrap();
        let short = rotation_matrix_from_vector(&[q.x, q.y, q.z]).unwrap();
        assert_mat_eq(full, short);
    }

    #[test]
    fn five_component_vector_ignores_accuracy() {
        let q = Quat::from_rotation_y(-0.6);
        let four = rotation_matrix_from_vector(&[q.x, q.y, q.z, q.w]).unwrap();
        let five = rotation_matrix_from_vector(&[q.x, q.y, q.z, q.w, 0.35]).unwrap();
        assert_eq!(four, five);
    }

    #[test]
    fn matrix_is_row_major_rotation() {
        // 90 degrees about Z maps +X to +Y.
        let q = Quat::from_rotation_z(FRAC_PI_2);
        let m = rotation_matrix_from_vector(&[q.x, q.y, q.z, q.w]).unwrap();
        let v = m * Vec3::X;
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-6);

        let state = RotationState::from_matrix(m);
        let rows = state.to_row_major();
        // Row 0, column 1 is -sin(90°).
        assert_relative_eq!(rows[1], -1.0, epsilon = 1e-6);
        assert_relative_eq!(state.element(0, 1), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn homogeneous_layout() {
        let state = RotationState::from_matrix(Mat3::from_rotation_x(0.25));
        let h = state.to_homogeneous_row_major();
        let r = state.to_row_major();
        assert_eq!(&h[0..3], &r[0..3]);
        assert_eq!(&h[4..7], &r[3..6]);
        assert_eq!(&h[8..11], &r[6..9]);
        assert_eq!([h[3], h[7], h[11]], [0.0, 0.0, 0.0]);
        assert_eq!(&h[12..16], &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn euler_extraction_round_trip() {
        // m = Rz(-yaw) * Rx(-pitch) * Ry(roll) produces (yaw, pitch, roll).
        let (yaw, pitch, roll) = (0.7_f32, -0.4_f32, 0.2_f32);
        let m = Mat3::from_rotation_z(-yaw) * Mat3::from_rotation_x(-pitch) * Mat3::from_rotation_y(roll);
        let e = EulerAngles::from_matrix(&m);
        assert_relative_eq!(e.yaw, yaw, epsilon = 1e-5);
        assert_relative_eq!(e.pitch, pitch, epsilon = 1e-5);
        assert_relative_eq!(e.roll, roll, epsilon = 1e-5);
    }

    #[test]
    fn gimbal_lock_pitch_up_has_finite_yaw() {
        // Rotation of -90 degrees about X gives pitch = +90 degrees.
        let sample = sample_from_quat(Quat::from_rotation_x(-FRAC_PI_2));
        let mut resolver = OrientationResolver::new();
        let state = resolver.resolve(&sample).unwrap();
        let e = state.euler();

        assert!(e.is_finite());
        assert_relative_eq!(e.pitch, FRAC_PI_2, epsilon = 1e-3);
        assert_relative_eq!(e.yaw, 0.0, epsilon = 1e-5);
        assert_eq!(e.roll, 0.0);
    }

    #[test]
    fn gimbal_lock_uses_alternate_branch_for_yaw() {
        let q = Quat::from_rotation_z(0.5) * Quat::from_rotation_x(-FRAC_PI_2);
        let m = rotation_matrix_from_vector(&[q.x, q.y, q.z, q.w]).unwrap();
        let e = EulerAngles::from_matrix(&m);

        assert!(e.is_finite());
        assert_relative_eq!(e.yaw, -0.5, epsilon = 1e-4);
        assert_eq!(e.roll, 0.0);
    }

    #[test]
    fn gimbal_lock_pitch_down() {
        let m = rotation_matrix_from_vector(&{
            let q = Quat::from_rotation_x(FRAC_PI_2);
            [q.x, q.y, q.z, q.w]
        })
        .unwrap();
        let e = EulerAngles::from_matrix(&m);
        assert!(e.is_finite());
        assert_relative_eq!(e.pitch, -FRAC_PI_2, epsilon = 1e-3);
    }

    #[test]
    fn asin_argument_is_clamped() {
        // Slightly denormalized matrix with |m21| > 1.
        let mut m = Mat3::from_rotation_x(-FRAC_PI_2);
        m.y_axis.z = -1.000_001;
        let e = EulerAngles::from_matrix(&m);
        assert!(e.is_finite());
    }

    #[test]
    fn malformed_sample_keeps_previous_state() {
        let mut resolver = OrientationResolver::new();
        let good = sample_from_quat(Quat::from_rotation_y(FRAC_PI_4));
        let before = resolver.resolve(&good).unwrap();

        let bad = RawSample::new(SampleKind::RotationVector, &[0.3, 0.4], Timestamp::zero()).unwrap();
        let err = resolver.resolve(&bad).unwrap_err();

        assert!(matches!(err, FusionError::MalformedSample { .. }));
        assert_eq!(resolver.state(), before);
        assert_eq!(resolver.resolved_count(), 1);
        assert_eq!(resolver.rejected_count(), 1);
    }

    #[test]
    fn nan_sample_rejected() {
        let mut resolver = OrientationResolver::new();
        let bad = RawSample::rotation_vector([f32::NAN, 0.0, 0.0, 1.0], Timestamp::zero());
        assert!(resolver.resolve(&bad).is_err());
        assert_eq!(resolver.state(), RotationState::IDENTITY);
    }

    #[test]
    fn zero_quaternion_rejected() {
        assert!(rotation_matrix_from_vector(&[0.0, 0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn wrong_kind_rejected() {
        let mut resolver = OrientationResolver::new();
        let gyro = RawSample::from_vector3(SampleKind::Gyro, [0.0, 0.0, 1.0], Timestamp::zero());
        assert!(matches!(
            resolver.resolve(&gyro),
            Err(FusionError::UnexpectedKind { .. })
        ));
    }

    #[test]
    fn remap_applied_before_euler() {
        let remap = AxisRemap::from_axes(Axis::Y, Axis::MinusX).unwrap();
        let mut resolver = OrientationResolver::with_remap(remap);
        let q = Quat::from_rotation_x(0.3);
        let state = resolver.resolve(&sample_from_quat(q)).unwrap();

        assert_mat_eq(state.matrix(), remap.permutation() * Mat3::from_quat(q));
        assert_eq!(state.euler(), EulerAngles::from_matrix(&state.matrix()));
    }

    #[test]
    fn identity_remap_is_dropped() {
        let resolver = OrientationResolver::with_remap(AxisRemap::IDENTITY);
        assert!(resolver.remap().is_none());
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut resolver = OrientationResolver::new();
        resolver
            .resolve(&sample_from_quat(Quat::from_rotation_z(1.0)))
            .unwrap();
        resolver.reset();
        assert_eq!(resolver.state(), RotationState::IDENTITY);
        assert_eq!(resolver.resolved_count(), 0);
    }

    #[test]
    fn quaternion_accessor_round_trips() {
        let q = Quat::from_rotation_y(0.9);
        let state = RotationState::from_matrix(Mat3::from_quat(q));
        let back = state.quaternion();
        assert!(back.dot(q).abs() > 0.9999);
    }
}
