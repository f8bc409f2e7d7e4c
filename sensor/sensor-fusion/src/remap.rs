//! Fixed axis remapping between the sensor basis and the render camera basis.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// A signed coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// +X
    X,
    /// +Y
    Y,
    /// +Z
    Z,
    /// -X
    MinusX,
    /// -Y
    MinusY,
    /// -Z
    MinusZ,
}

impl Axis {
    /// Returns the unit vector of this axis.
    #[must_use]
    pub const fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
            Self::MinusX => Vec3::NEG_X,
            Self::MinusY => Vec3::NEG_Y,
            Self::MinusZ => Vec3::NEG_Z,
        }
    }

    /// Returns the axis with the opposite sign.
    #[must_use]
    pub const fn negated(self) -> Self {
        match self {
            Self::X => Self::MinusX,
            Self::Y => Self::MinusY,
            Self::Z => Self::MinusZ,
            Self::MinusX => Self::X,
            Self::MinusY => Self::Y,
            Self::MinusZ => Self::Z,
        }
    }

    fn from_unit(v: Vec3) -> Option<Self> {
        [
            Self::X,
            Self::Y,
            Self::Z,
            Self::MinusX,
            Self::MinusY,
            Self::MinusZ,
        ]
        .into_iter()
        .find(|axis| axis.unit() == v)
    }
}

/// Serialized form of an [`AxisRemap`]: the two axes that define it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapAxes {
    /// Source axis that becomes the new X axis.
    pub x: Axis,
    /// Source axis that becomes the new Y axis.
    pub y: Axis,
}

/// A fixed signed-permutation remap applied to every resolved rotation matrix.
///
/// The remap is built from the two source axes that become the new X and Y
/// axes; the new Z axis is their cross product, so the result is always a
/// proper rotation. Applying it computes `remapped = permutation × raw`.
///
/// # Example
///
/// ```
/// use glam::Mat3;
/// use sensor_fusion::{Axis, AxisRemap};
///
/// let remap = AxisRemap::from_axes(Axis::Y, Axis::MinusX).unwrap();
/// let out = remap.apply(Mat3::IDENTITY);
/// assert_eq!(out, remap.permutation());
/// assert_eq!(out.determinant(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RemapAxes", into = "RemapAxes")]
pub struct AxisRemap {
    axes: RemapAxes,
    permutation: Mat3,
}

impl AxisRemap {
    /// The identity remap (X stays X, Y stays Y).
    pub const IDENTITY: Self = Self {
        axes: RemapAxes {
            x: Axis::X,
            y: Axis::Y,
        },
        permutation: Mat3::IDENTITY,
    };

    /// Builds a remap from the source axes that become the new X and Y axes.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::DegenerateRemap`] if `x` and `y` lie on the same line.
    pub fn from_axes(x: Axis, y: Axis) -> Result<Self> {
        let ux = x.unit();
        let uy = y.unit();
        let uz = ux.cross(uy);
        if uz == Vec3::ZERO {
            return Err(FusionError::degenerate_remap(format!(
                "{x:?} and {y:?} are collinear"
            )));
        }

        // Rows of the permutation are the chosen source axes.
        let permutation = Mat3::from_cols(ux, uy, uz).transpose();
        Ok(Self {
            axes: RemapAxes { x, y },
            permutation,
        })
    }

    /// Returns the source axis that becomes the new X axis.
    #[must_use]
    pub const fn x(&self) -> Axis {
        self.axes.x
    }

    /// Returns the source axis that becomes the new Y axis.
    #[must_use]
    pub const fn y(&self) -> Axis {
        self.axes.y
    }

    /// Returns the derived new Z axis.
    #[must_use]
    pub fn z(&self) -> Axis {
        Axis::from_unit(self.axes.x.unit().cross(self.axes.y.unit())).unwrap_or(Axis::Z)
    }

    /// Returns the signed permutation matrix.
    #[must_use]
    pub const fn permutation(&self) -> Mat3 {
        self.permutation
    }

    /// Returns true if this remap leaves matrices unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.permutation == Mat3::IDENTITY
    }

    /// Applies the remap: `permutation × raw`.
    #[must_use]
    pub fn apply(&self, raw: Mat3) -> Mat3 {
        self.permutation * raw
    }
}

impl Default for AxisRemap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<RemapAxes> for AxisRemap {
    type Error = FusionError;

    fn try_from(axes: RemapAxes) -> Result<Self> {
        Self::from_axes(axes.x, axes.y)
    }
}

impl From<AxisRemap> for RemapAxes {
    fn from(remap: AxisRemap) -> Self {
        remap.axes
    }
}
