//! Orbit manipulator: turns pointer and wheel input into a damped orbit
//! pose and writes it to a camera or any other transform target.

use glam::{DMat4, DVec3};

use super::core::{CameraModel, ProjectionKind};
use super::orbit::{AxisLimits, OrbitPose};
use crate::input::{
    MouseButton, PointerEvent, PointerEventKind, PointerSource, TriggerEvent,
    TriggerKind,
};
use crate::options::ManipulatorOptions;

/// What a gesture currently does to the pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ManipMode {
    /// No gesture.
    #[default]
    Off,
    /// Translate the offset in the view plane.
    Pan,
    /// Change pitch and yaw.
    Orbit,
    /// Scale the distance (or orthographic size).
    Dolly,
    /// Change roll.
    Roll,
    /// Two-finger pinch dolly combined with pan.
    PanDolly,
}

/// Gesture lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ManipPhase {
    /// Idle.
    #[default]
    Off,
    /// Primary pointer is down; deltas accumulate.
    Active,
    /// Primary pointer released; deltas decay each tick.
    Release,
}

/// Something an [`OrbitManipulator`] can read its pose from and write it to.
///
/// Cameras expose their orthographic size so dolly gestures scale the view
/// volume instead of the distance; plain transforms keep the defaults.
pub trait ManipTarget {
    /// Current transform.
    fn matrix(&self) -> DMat4;
    /// Replace the transform.
    fn set_matrix(&mut self, matrix: DMat4);
    /// Orthographic view size, or `None` for perspective/non-camera targets.
    fn ortho_size(&self) -> Option<f64> {
        None
    }
    /// Store a new orthographic size. Only called when
    /// [`Self::ortho_size`] returned `Some`.
    fn set_ortho_size(&mut self, _size: f64) {}
}

impl ManipTarget for DMat4 {
    fn matrix(&self) -> DMat4 {
        *self
    }

    fn set_matrix(&mut self, matrix: DMat4) {
        *self = matrix;
    }
}

impl ManipTarget for CameraModel {
    fn matrix(&self) -> DMat4 {
        self.matrix
    }

    fn set_matrix(&mut self, matrix: DMat4) {
        self.matrix = matrix;
    }

    fn ortho_size(&self) -> Option<f64> {
        match self.kind {
            ProjectionKind::Orthographic => Some(self.size),
            ProjectionKind::Perspective => None,
        }
    }

    fn set_ortho_size(&mut self, size: f64) {
        self.size = size;
        self.update_projection_matrix();
    }
}

/// Requested pose change for a single tick.
#[derive(Debug, Clone, Copy)]
struct PoseDelta {
    pan_x: f64,
    pan_y: f64,
    scale: f64,
    pitch: f64,
    yaw: f64,
    roll: f64,
}

impl PoseDelta {
    const NONE: Self = Self {
        pan_x: 0.0,
        pan_y: 0.0,
        scale: 1.0,
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };
}

/// Input-driven orbit controller with release inertia.
///
/// Feed it events through [`Self::on_pointer`] and [`Self::on_trigger`],
/// then call [`Self::apply_to`] (or [`Self::update`]) once per frame.
#[derive(Debug, Clone)]
pub struct OrbitManipulator {
    pose: OrbitPose,
    /// Orthographic view size, used instead of the distance when
    /// `orthographic` is set.
    size: f64,
    orthographic: bool,

    orientation_limits: AxisLimits,
    offset_limits: AxisLimits,
    options: ManipulatorOptions,

    mode: ManipMode,
    phase: ManipPhase,
    delta_x: f64,
    delta_y: f64,
    delta_pinch: f64,
    delta_wheel: f64,
    prev_pinch_distance: f64,

    viewport_width: f64,
    viewport_height: f64,
}

impl Default for OrbitManipulator {
    fn default() -> Self {
        Self::new(&ManipulatorOptions::default())
    }
}

impl OrbitManipulator {
    /// Create an idle manipulator with the default pose.
    ///
    /// Inertia settings outside their valid range are corrected, see
    /// [`ManipulatorOptions::sanitized`].
    #[must_use]
    pub fn new(options: &ManipulatorOptions) -> Self {
        let options = options.sanitized();
        Self {
            pose: OrbitPose::default(),
            size: 50.0,
            orthographic: false,
            orientation_limits: options.orientation_limits(),
            offset_limits: options.offset_limits(),
            options,
            mode: ManipMode::Off,
            phase: ManipPhase::Off,
            delta_x: 0.0,
            delta_y: 0.0,
            delta_pinch: 1.0,
            delta_wheel: 0.0,
            prev_pinch_distance: 0.0,
            viewport_width: 100.0,
            viewport_height: 100.0,
        }
    }

    /// Current pose.
    #[must_use]
    pub fn pose(&self) -> &OrbitPose {
        &self.pose
    }

    /// Replace the pose (limits are applied).
    pub fn set_pose(&mut self, pose: OrbitPose) {
        self.pose = pose;
        self.apply_limits();
    }

    /// Orthographic view size.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Whether dolly gestures scale the orthographic size.
    #[must_use]
    pub fn is_orthographic(&self) -> bool {
        self.orthographic
    }

    /// Current gesture mode.
    #[must_use]
    pub fn mode(&self) -> ManipMode {
        self.mode
    }

    /// Current gesture phase.
    #[must_use]
    pub fn phase(&self) -> ManipPhase {
        self.phase
    }

    /// Orientation limits in degrees.
    #[must_use]
    pub fn orientation_limits(&self) -> &AxisLimits {
        &self.orientation_limits
    }

    /// Replace the orientation limits.
    pub fn set_orientation_limits(&mut self, limits: AxisLimits) {
        self.orientation_limits = limits;
        self.apply_limits();
    }

    /// Offset limits; the Z bounds also apply to the orthographic size.
    #[must_use]
    pub fn offset_limits(&self) -> &AxisLimits {
        &self.offset_limits
    }

    /// Replace the offset limits.
    pub fn set_offset_limits(&mut self, limits: AxisLimits) {
        self.offset_limits = limits;
        self.apply_limits();
    }

    /// Toggle camera mode (orbit a camera around the pivot) versus object
    /// mode (rotate the object). Flips the sign of every input mapping.
    pub fn set_camera_mode(&mut self, camera_mode: bool) {
        self.options.camera_mode = camera_mode;
    }

    /// Record the viewport size used to normalize pointer movement.
    /// Non-positive sizes are ignored.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring degenerate manipulator viewport {width}x{height}");
            return;
        }
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Abort any gesture and drop pending deltas.
    pub fn reset(&mut self) {
        self.mode = ManipMode::Off;
        self.phase = ManipPhase::Off;
        self.delta_x = 0.0;
        self.delta_y = 0.0;
        self.delta_pinch = 1.0;
        self.delta_wheel = 0.0;
        self.prev_pinch_distance = 0.0;
    }

    /// Consume a pointer event. Returns `true` if the event was used.
    pub fn on_pointer(&mut self, event: &PointerEvent) -> bool {
        if event.kind == PointerEventKind::Hover {
            return false;
        }

        if event.is_primary {
            match event.kind {
                PointerEventKind::Down => self.phase = ManipPhase::Active,
                PointerEventKind::Up => {
                    self.phase = ManipPhase::Release;
                    log::debug!("manipulator release ({:?})", self.mode);
                    return true;
                }
                _ => {}
            }
        }

        if event.kind == PointerEventKind::Down {
            self.mode = mode_for_event(event);
            log::debug!("manipulator mode {:?}", self.mode);
        }

        self.delta_x += event.movement_x;
        self.delta_y += event.movement_y;

        if event.pointer_count == 2 && event.positions.len() >= 2 {
            let pinch_distance = event.positions[0].distance(event.positions[1]);
            let prev = if self.prev_pinch_distance > 0.0 {
                self.prev_pinch_distance
            } else {
                pinch_distance
            };
            if prev > 0.0 {
                self.delta_pinch *= pinch_distance / prev;
            }
            self.prev_pinch_distance = pinch_distance;
        } else {
            self.delta_pinch = 1.0;
            self.prev_pinch_distance = 0.0;
        }

        true
    }

    /// Consume a trigger event. Returns `true` if the event was used.
    pub fn on_trigger(&mut self, event: &TriggerEvent) -> bool {
        match event.kind {
            TriggerKind::Wheel { delta } => {
                self.delta_wheel += delta.clamp(-1.0, 1.0);
                true
            }
        }
    }

    /// Seed the pose from a target's current transform.
    pub fn read_from<T: ManipTarget + ?Sized>(&mut self, target: &T) {
        self.pose = OrbitPose::from_matrix(&target.matrix());
        match target.ortho_size() {
            Some(size) => {
                self.orthographic = true;
                self.size = size;
            }
            None => self.orthographic = false,
        }
    }

    /// Advance one tick and, if the pose changed, write it to `target`.
    ///
    /// Returns `true` if the target was updated.
    pub fn apply_to<T: ManipTarget + ?Sized>(&mut self, target: &mut T) -> bool {
        if !self.update() {
            return false;
        }
        self.write_to(target);
        true
    }

    /// Write the current pose to `target` without advancing.
    pub fn write_to<T: ManipTarget + ?Sized>(&self, target: &mut T) {
        target.set_matrix(self.pose.to_matrix());
        if self.orthographic && target.ortho_size().is_some() {
            target.set_ortho_size(self.size);
        }
    }

    /// Advance the state machine by one tick.
    ///
    /// Returns `false` when nothing changed (idle, or active with no new
    /// input), in which case the pose is untouched.
    pub fn update(&mut self) -> bool {
        if self.phase == ManipPhase::Off && self.delta_wheel == 0.0 {
            return false;
        }

        if self.delta_wheel != 0.0 {
            let scale = self.delta_wheel * self.options.wheel_scale + 1.0;
            self.update_pose(PoseDelta {
                scale,
                ..PoseDelta::NONE
            });
            self.delta_wheel = 0.0;
            return true;
        }

        match self.phase {
            ManipPhase::Active => {
                if self.delta_x == 0.0
                    && self.delta_y == 0.0
                    && self.delta_pinch == 1.0
                {
                    return false;
                }
                let changed = self.update_by_mode();
                self.delta_x = 0.0;
                self.delta_y = 0.0;
                self.delta_pinch = 1.0;
                changed
            }
            ManipPhase::Release => {
                self.delta_x *= self.options.damping;
                self.delta_y *= self.options.damping;
                self.delta_pinch = 1.0;
                let changed = self.update_by_mode();

                if self.delta_x.abs() + self.delta_y.abs()
                    < self.options.rest_threshold
                {
                    log::debug!("manipulator at rest");
                    self.mode = ManipMode::Off;
                    self.phase = ManipPhase::Off;
                    self.delta_x = 0.0;
                    self.delta_y = 0.0;
                }
                changed
            }
            ManipPhase::Off => false,
        }
    }

    /// Apply the accumulated deltas for the current mode. Returns `false`
    /// if the mode does not move the pose.
    fn update_by_mode(&mut self) -> bool {
        let (dx, dy) = (self.delta_x, self.delta_y);
        let delta = match self.mode {
            ManipMode::Off => return false,
            ManipMode::Orbit => PoseDelta {
                pitch: dy,
                yaw: dx,
                ..PoseDelta::NONE
            },
            ManipMode::Pan => PoseDelta {
                pan_x: dx,
                pan_y: dy,
                ..PoseDelta::NONE
            },
            ManipMode::Roll => PoseDelta {
                roll: dx,
                ..PoseDelta::NONE
            },
            ManipMode::Dolly => PoseDelta {
                scale: dy * self.options.dolly_scale + 1.0,
                ..PoseDelta::NONE
            },
            ManipMode::PanDolly => {
                let pinch_scale =
                    (self.delta_pinch - 1.0) * self.options.pinch_scale + 1.0;
                PoseDelta {
                    pan_x: dx,
                    pan_y: dy,
                    scale: 1.0 / pinch_scale,
                    ..PoseDelta::NONE
                }
            }
        };
        self.update_pose(delta);
        true
    }

    fn update_pose(&mut self, delta: PoseDelta) {
        let sign = if self.options.camera_mode { -1.0 } else { 1.0 };
        let height = self.viewport_height;

        if self.options.orientation_enabled {
            let rotate = sign * self.options.rotate_scale / height;
            self.pose.orientation += DVec3::new(
                delta.pitch * rotate,
                delta.yaw * rotate,
                delta.roll * rotate,
            );
        }

        if self.options.offset_enabled {
            let factor = if self.orthographic {
                self.size *= delta.scale;
                self.size
            } else {
                self.pose.offset.z *= delta.scale;
                self.pose.offset.z
            };

            let pan = factor * sign * self.options.pan_scale / height;
            self.pose.offset.x += delta.pan_x * pan;
            self.pose.offset.y -= delta.pan_y * pan;
        }

        self.apply_limits();
    }

    fn apply_limits(&mut self) {
        self.pose.orientation = self.orientation_limits.clamp(self.pose.orientation);
        let offset = &mut self.pose.offset;
        offset.x = self.offset_limits.clamp_axis(0, offset.x);
        offset.y = self.offset_limits.clamp_axis(1, offset.y);
        if self.orthographic {
            self.size = self.offset_limits.clamp_axis(2, self.size);
        } else {
            offset.z = self.offset_limits.clamp_axis(2, offset.z);
        }
    }
}

/// Gesture mode for a pointer-down, by fixed precedence.
#[must_use]
pub fn mode_for_event(event: &PointerEvent) -> ManipMode {
    match event.source {
        PointerSource::Mouse => match event.button {
            MouseButton::Left if event.modifiers.ctrl => ManipMode::Pan,
            MouseButton::Left if event.modifiers.alt => ManipMode::Dolly,
            MouseButton::Left => ManipMode::Orbit,
            MouseButton::Right if event.modifiers.alt => ManipMode::Roll,
            MouseButton::Right => ManipMode::Pan,
            MouseButton::Middle => ManipMode::Dolly,
            MouseButton::Other(_) => ManipMode::Off,
        },
        PointerSource::Touch => match event.pointer_count {
            0 | 1 => ManipMode::Orbit,
            2 => ManipMode::PanDolly,
            _ => ManipMode::Pan,
        },
    }
}
