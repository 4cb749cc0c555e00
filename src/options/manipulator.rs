use glam::DVec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::camera::AxisLimits;

/// Optional bounds for a single pose axis. Absent means unbounded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct AxisRange {
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AxisRange {
    /// Range with both bounds set.
    #[must_use]
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    fn min_or_nan(self) -> f64 {
        self.min.unwrap_or(f64::NAN)
    }

    fn max_or_nan(self) -> f64 {
        self.max.unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Manipulator", inline)]
#[serde(default)]
/// Orbit manipulator tuning and pose limits.
pub struct ManipulatorOptions {
    /// Orbit the camera around a fixed pivot (`true`) or rotate the object
    /// itself (`false`). Flips the sign of orbit, pan and roll input.
    #[schemars(title = "Camera Mode")]
    pub camera_mode: bool,
    /// Whether input may change the orientation.
    #[schemars(skip)]
    pub orientation_enabled: bool,
    /// Whether input may change the offset.
    #[schemars(skip)]
    pub offset_enabled: bool,
    /// Per-tick decay of the release inertia.
    #[schemars(title = "Inertia", range(min = 0.0, max = 0.99), extend("step" = 0.01))]
    pub damping: f64,
    /// Inertia stops once `|dx| + |dy|` falls below this.
    #[schemars(skip)]
    pub rest_threshold: f64,
    /// Degrees of rotation per viewport height of pointer travel.
    #[schemars(title = "Rotate Speed", range(min = 30.0, max = 1000.0), extend("step" = 10.0))]
    pub rotate_scale: f64,
    /// Pan travel multiplier relative to viewport height.
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 10.0), extend("step" = 0.1))]
    pub pan_scale: f64,
    /// Dolly factor per pixel of vertical drag.
    #[schemars(title = "Dolly Speed", range(min = 0.001, max = 0.05), extend("step" = 0.0005))]
    pub dolly_scale: f64,
    /// Dolly factor per wheel step.
    #[schemars(title = "Wheel Speed", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub wheel_scale: f64,
    /// Scale applied to the pinch ratio before dollying.
    #[schemars(skip)]
    pub pinch_scale: f64,
    /// Pitch limits in degrees.
    #[schemars(skip)]
    pub pitch: AxisRange,
    /// Yaw limits in degrees.
    #[schemars(skip)]
    pub yaw: AxisRange,
    /// Roll limits in degrees.
    #[schemars(skip)]
    pub roll: AxisRange,
    /// Horizontal offset limits.
    #[schemars(skip)]
    pub pan_x: AxisRange,
    /// Vertical offset limits.
    #[schemars(skip)]
    pub pan_y: AxisRange,
    /// Distance (perspective) or size (orthographic) limits.
    #[schemars(skip)]
    pub distance: AxisRange,
}

impl Default for ManipulatorOptions {
    fn default() -> Self {
        Self {
            camera_mode: true,
            orientation_enabled: true,
            offset_enabled: true,
            damping: 0.85,
            rest_threshold: 0.1,
            rotate_scale: 300.0,
            pan_scale: 2.0,
            dolly_scale: 0.0075,
            wheel_scale: 0.07,
            pinch_scale: 0.5,
            pitch: AxisRange::between(-90.0, 90.0),
            yaw: AxisRange::default(),
            roll: AxisRange::default(),
            pan_x: AxisRange::default(),
            pan_y: AxisRange::default(),
            distance: AxisRange::between(0.1, 100.0),
        }
    }
}

impl ManipulatorOptions {
    /// Largest damping that still lets release inertia settle.
    pub const MAX_DAMPING: f64 = 0.99;

    /// Copy with the inertia settings forced into a range where release
    /// always comes to rest: `damping` in `[0, MAX_DAMPING]` and a positive
    /// `rest_threshold`. Non-finite values fall back to the defaults.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let damping = if self.damping.is_finite() {
            self.damping.clamp(0.0, Self::MAX_DAMPING)
        } else {
            defaults.damping
        };
        let rest_threshold = self.rest_threshold;
        let rest_threshold = if rest_threshold.is_finite() && rest_threshold > 0.0 {
            rest_threshold
        } else {
            defaults.rest_threshold
        };
        if damping != self.damping || rest_threshold != self.rest_threshold {
            log::debug!(
                "manipulator inertia adjusted: damping {} -> {damping}, rest threshold {} -> {rest_threshold}",
                self.damping,
                self.rest_threshold
            );
        }
        Self {
            damping,
            rest_threshold,
            ..self.clone()
        }
    }

    /// Orientation limits as NaN-encoded bounds.
    #[must_use]
    pub fn orientation_limits(&self) -> AxisLimits {
        AxisLimits::new(
            DVec3::new(
                self.pitch.min_or_nan(),
                self.yaw.min_or_nan(),
                self.roll.min_or_nan(),
            ),
            DVec3::new(
                self.pitch.max_or_nan(),
                self.yaw.max_or_nan(),
                self.roll.max_or_nan(),
            ),
        )
    }

    /// Offset limits as NaN-encoded bounds.
    #[must_use]
    pub fn offset_limits(&self) -> AxisLimits {
        AxisLimits::new(
            DVec3::new(
                self.pan_x.min_or_nan(),
                self.pan_y.min_or_nan(),
                self.distance.min_or_nan(),
            ),
            DVec3::new(
                self.pan_x.max_or_nan(),
                self.pan_y.max_or_nan(),
                self.distance.max_or_nan(),
            ),
        )
    }
}
