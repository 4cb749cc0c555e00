//! Orbit pose and its conversion to and from a 4×4 transform.
//!
//! A pose is an orientation (pitch, yaw, roll in degrees) plus an offset
//! `(x, y, distance)` expressed in the rotated frame. The rotation is
//! composed as `Ry(yaw) · Rx(pitch) · Rz(roll)`; the translation column is
//! the offset carried through that rotation. For a camera this places the
//! eye `distance` units along its own +Z from the pivot at the origin, so
//! it looks back at the pivot.

use glam::{DMat4, DVec3, DVec4};

/// Orientation and offset of a camera or object relative to an orbit pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    /// `(pitch, yaw, roll)` in degrees.
    pub orientation: DVec3,
    /// `(x, y, distance)` in the rotated frame.
    pub offset: DVec3,
}

impl Default for OrbitPose {
    fn default() -> Self {
        Self {
            orientation: DVec3::ZERO,
            offset: DVec3::new(0.0, 0.0, 50.0),
        }
    }
}

impl OrbitPose {
    /// Create a pose from orientation (degrees) and offset.
    #[must_use]
    pub fn new(orientation: DVec3, offset: DVec3) -> Self {
        Self {
            orientation,
            offset,
        }
    }

    /// Build the transform for this pose.
    #[must_use]
    pub fn to_matrix(&self) -> DMat4 {
        compose_orbit_matrix(self.orientation, self.offset)
    }

    /// Recover a pose from a transform built by [`Self::to_matrix`].
    #[must_use]
    pub fn from_matrix(matrix: &DMat4) -> Self {
        let (orientation, offset) = decompose_orbit_matrix(matrix);
        Self {
            orientation,
            offset,
        }
    }
}

/// Optional per-axis `(min, max)` bounds. NaN means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    /// Lower bounds, NaN where unbounded.
    pub min: DVec3,
    /// Upper bounds, NaN where unbounded.
    pub max: DVec3,
}

impl AxisLimits {
    /// No bounds on any axis.
    pub const UNBOUNDED: Self = Self {
        min: DVec3::NAN,
        max: DVec3::NAN,
    };

    /// Create limits from explicit bounds.
    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Clamp a single component against axis `axis` (0, 1 or 2).
    #[must_use]
    pub fn clamp_axis(&self, axis: usize, value: f64) -> f64 {
        limit(value, self.min[axis], self.max[axis])
    }

    /// Clamp every component of `value`.
    #[must_use]
    pub fn clamp(&self, value: DVec3) -> DVec3 {
        DVec3::new(
            self.clamp_axis(0, value.x),
            self.clamp_axis(1, value.y),
            self.clamp_axis(2, value.z),
        )
    }
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Saturating clamp where a NaN bound leaves that side open.
#[must_use]
pub fn limit(value: f64, min: f64, max: f64) -> f64 {
    if !min.is_nan() && value < min {
        min
    } else if !max.is_nan() && value > max {
        max
    } else {
        value
    }
}

/// Compose an orbit transform from orientation (degrees) and offset.
#[must_use]
pub fn compose_orbit_matrix(orientation: DVec3, offset: DVec3) -> DMat4 {
    let (sx, cx) = orientation.x.to_radians().sin_cos();
    let (sy, cy) = orientation.y.to_radians().sin_cos();
    let (sz, cz) = orientation.z.to_radians().sin_cos();

    // Row-major terms of Ry · Rx · Rz
    let m00 = cy * cz + sy * sx * sz;
    let m01 = sy * sx * cz - cy * sz;
    let m02 = sy * cx;
    let m10 = cx * sz;
    let m11 = cx * cz;
    let m12 = -sx;
    let m20 = cy * sx * sz - sy * cz;
    let m21 = sy * sz + cy * sx * cz;
    let m22 = cy * cx;

    let (ox, oy, oz) = (offset.x, offset.y, offset.z);

    DMat4::from_cols(
        DVec4::new(m00, m10, m20, 0.0),
        DVec4::new(m01, m11, m21, 0.0),
        DVec4::new(m02, m12, m22, 0.0),
        DVec4::new(
            ox * m00 + oy * m01 + oz * m02,
            ox * m10 + oy * m11 + oz * m12,
            ox * m20 + oy * m21 + oz * m22,
            1.0,
        ),
    )
}

/// Above this `|sin(pitch)|` yaw and roll are no longer separable. In f64
/// the regular path stays accurate up to about 0.0001° from the pole.
const GIMBAL_LOCK: f64 = 1.0 - 1e-12;

/// Decompose an orbit transform into orientation (degrees) and offset.
///
/// Euler angles are extracted in the inverse of the compose order; the
/// offset is the negated origin of the inverse transform.
#[must_use]
pub fn decompose_orbit_matrix(matrix: &DMat4) -> (DVec3, DVec3) {
    let m02 = matrix.z_axis.x;
    let m10 = matrix.x_axis.y;
    let m11 = matrix.y_axis.y;
    let m12 = matrix.z_axis.y;
    let m22 = matrix.z_axis.z;

    let pitch = (-m12).clamp(-1.0, 1.0).asin();
    let (yaw, roll) = if m12.abs() < GIMBAL_LOCK {
        (m02.atan2(m22), m10.atan2(m11))
    } else {
        // Gimbal lock: fold roll into yaw.
        let m00 = matrix.x_axis.x;
        let m20 = matrix.x_axis.z;
        ((-m20).atan2(m00), 0.0)
    };

    let origin = matrix.inverse() * DVec4::W;
    let offset = -origin.truncate();

    (
        DVec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees()),
        offset,
    )
}
