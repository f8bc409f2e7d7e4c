//! Transform snapshots and partial updates.

use glam::{Mat4, Vec3};
use input_gesture::{GestureUpdate, PanState, ScaleBounds};
use sensor_fusion::{EulerAngles, RotationState};
use serde::{Deserialize, Serialize};

use crate::config::RotationOutput;

/// The single artifact the render tick consumes.
///
/// Replaced wholesale on every publish; `revision` increases by exactly one
/// per successful publish.
///
/// # Example
///
/// ```
/// use input_gesture::ScaleBounds;
/// use input_pipeline::{TransformSnapshot, TransformUpdate};
///
/// let initial = TransformSnapshot::INITIAL;
/// assert_eq!(initial.revision, 0);
/// assert_eq!(initial.scale, 1.0);
///
/// let next = initial.merged(&TransformUpdate::new().with_scale(2.0), ScaleBounds::DEFAULT);
/// assert_eq!(next.revision, 1);
/// assert_eq!(next.scale, 2.0);
///
/// let clamped = next.merged(&TransformUpdate::new().with_scale(80.0), ScaleBounds::DEFAULT);
/// assert_eq!(clamped.scale, 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    /// Latest resolved orientation.
    pub rotation: RotationState,

    /// Latest scale factor, within the sink's scale bounds.
    pub scale: f32,

    /// Latest pan offset.
    pub pan: PanState,

    /// Publish counter.
    pub revision: u64,
}

impl TransformSnapshot {
    /// Identity rotation, scale 1.0, zero pan, revision 0.
    pub const INITIAL: Self = Self {
        rotation: RotationState::IDENTITY,
        scale: 1.0,
        pan: PanState::ZERO,
        revision: 0,
    };

    /// Returns a copy with `update` applied and the revision advanced.
    ///
    /// The scale is clamped into `bounds`. A NaN scale, or a pan with a
    /// non-finite component, keeps the current value.
    #[must_use]
    pub fn merged(&self, update: &TransformUpdate, bounds: ScaleBounds) -> Self {
        let scale = match update.scale {
            Some(factor) if !factor.is_nan() => bounds.clamp(factor),
            _ => self.scale,
        };
        let pan = update
            .pan
            .filter(|pan| pan.dx.is_finite() && pan.dy.is_finite())
            .unwrap_or(self.pan);
        Self {
            rotation: update.rotation.unwrap_or(self.rotation),
            scale,
            pan,
            revision: self.revision + 1,
        }
    }

    /// Euler angles of the current rotation.
    #[must_use]
    pub const fn euler(&self) -> EulerAngles {
        self.rotation.euler()
    }

    /// Model matrix built from Euler angles.
    ///
    /// `T(pan) · R(-X, roll) · R(-Y, pitch) · R(+Z, yaw) · S(scale)`.
    #[must_use]
    pub fn euler_model_matrix(&self) -> Mat4 {
        let e = self.rotation.euler();
        self.translation()
            * Mat4::from_axis_angle(Vec3::NEG_X, e.roll)
            * Mat4::from_axis_angle(Vec3::NEG_Y, e.pitch)
            * Mat4::from_rotation_z(e.yaw)
            * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Model matrix built from the rotation matrix directly.
    ///
    /// `T(pan) · R · S(scale)`.
    #[must_use]
    pub fn matrix_model_matrix(&self) -> Mat4 {
        self.translation()
            * Mat4::from_mat3(self.rotation.matrix())
            * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Model matrix for the given rotation output.
    #[must_use]
    pub fn model_matrix(&self, output: RotationOutput) -> Mat4 {
        match output {
            RotationOutput::Euler => self.euler_model_matrix(),
            RotationOutput::Matrix => self.matrix_model_matrix(),
        }
    }

    fn translation(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.pan.dx, self.pan.dy, 0.0))
    }
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// A partial update: any subset of rotation, scale and pan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformUpdate {
    /// Replacement rotation.
    pub rotation: Option<RotationState>,

    /// Replacement scale factor.
    pub scale: Option<f32>,

    /// Replacement pan offset.
    pub pan: Option<PanState>,
}

impl TransformUpdate {
    /// An empty update.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rotation: None,
            scale: None,
            pan: None,
        }
    }

    /// Sets the rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: RotationState) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Sets the scale factor.
    #[must_use]
    pub const fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Sets the pan offset.
    #[must_use]
    pub const fn with_pan(mut self, pan: PanState) -> Self {
        self.pan = Some(pan);
        self
    }

    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rotation.is_none() && self.scale.is_none() && self.pan.is_none()
    }
}

impl From<GestureUpdate> for TransformUpdate {
    fn from(update: GestureUpdate) -> Self {
        Self {
            rotation: None,
            scale: update.scale.map(|s| s.factor()),
            pan: update.pan,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Mat3, Vec4};
    use input_gesture::ScaleState;

    const BOUNDS: ScaleBounds = ScaleBounds::DEFAULT;

    #[test]
    fn merge_keeps_untouched_fields() {
        let rotation = RotationState::from_matrix(Mat3::from_rotation_z(0.3));
        let a = TransformSnapshot::INITIAL.merged(&TransformUpdate::new().with_rotation(rotation), BOUNDS);
        let b = a.merged(&TransformUpdate::new().with_pan(PanState::new(1.0, 2.0)), BOUNDS);

        assert_eq!(b.rotation, rotation);
        assert_eq!(b.scale, 1.0);
        assert_eq!(b.pan, PanState::new(1.0, 2.0));
        assert_eq!(b.revision, 2);
    }

    #[test]
    fn merged_scale_stays_within_bounds() {
        let high = TransformSnapshot::INITIAL.merged(&TransformUpdate::new().with_scale(1000.0), BOUNDS);
        assert_eq!(high.scale, 5.0);

        let low = high.merged(&TransformUpdate::new().with_scale(-3.0), BOUNDS);
        assert_eq!(low.scale, 0.1);

        let inf = low.merged(&TransformUpdate::new().with_scale(f32::INFINITY), BOUNDS);
        assert_eq!(inf.scale, 5.0);

        let nan = inf.merged(&TransformUpdate::new().with_scale(f32::NAN), BOUNDS);
        assert_eq!(nan.scale, 5.0);
        assert_eq!(nan.revision, 4);

        let narrow = ScaleBounds::new(0.5, 2.0).unwrap();
        let custom = TransformSnapshot::INITIAL.merged(&TransformUpdate::new().with_scale(9.0), narrow);
        assert_eq!(custom.scale, 2.0);
    }

    #[test]
    fn merged_ignores_non_finite_pan() {
        let a = TransformSnapshot::INITIAL.merged(&TransformUpdate::new().with_pan(PanState::new(1.0, 2.0)), BOUNDS);
        let b = a.merged(&TransformUpdate::new().with_pan(PanState::new(f32::INFINITY, 0.0)), BOUNDS);
        assert_eq!(b.pan, PanState::new(1.0, 2.0));
        assert!(b.model_matrix(RotationOutput::Euler).is_finite());
    }

    #[test]
    fn empty_update_still_advances_revision() {
        let next = TransformSnapshot::INITIAL.merged(&TransformUpdate::new(), BOUNDS);
        assert!(TransformUpdate::new().is_empty());
        assert_eq!(next.revision, 1);
        assert_eq!(next.rotation, RotationState::IDENTITY);
    }

    #[test]
    fn gesture_update_conversion() {
        let update = GestureUpdate {
            scale: Some(ScaleState::default()),
            pan: None,
            clamped: false,
        };
        let update = TransformUpdate::from(update);
        assert_eq!(update.scale, Some(1.0));
        assert!(update.rotation.is_none());
        assert!(update.pan.is_none());
    }

    #[test]
    fn initial_model_matrix_is_identity() {
        let snapshot = TransformSnapshot::default();
        assert_eq!(snapshot.model_matrix(RotationOutput::Euler), Mat4::IDENTITY);
        assert_eq!(snapshot.model_matrix(RotationOutput::Matrix), Mat4::IDENTITY);
    }

    #[test]
    fn euler_model_matrix_applies_yaw_about_z() {
        let yaw = 0.5_f32;
        let rotation = RotationState::from_matrix(Mat3::from_rotation_z(-yaw));
        let snapshot = TransformSnapshot::INITIAL
            .merged(&TransformUpdate::new().with_rotation(rotation).with_scale(2.0), BOUNDS);

        assert_relative_eq!(snapshot.euler().yaw, yaw, epsilon = 1e-5);
        let m = snapshot.euler_model_matrix();
        let expected = Mat4::from_rotation_z(yaw) * Mat4::from_scale(Vec3::splat(2.0));
        for (a, b) in m.to_cols_array().iter().zip(expected.to_cols_array().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn model_matrix_translates_by_pan() {
        let snapshot = TransformSnapshot::INITIAL
            .merged(&TransformUpdate::new().with_pan(PanState::new(3.0, -1.0)).with_scale(0.5), BOUNDS);
        let origin = snapshot.matrix_model_matrix() * Vec4::new(2.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin.x, 4.0);
        assert_relative_eq!(origin.y, -1.0);
        assert_relative_eq!(origin.z, 0.0);
    }
}
