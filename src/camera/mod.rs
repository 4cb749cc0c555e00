//! Camera system for 3D viewports.
//!
//! Provides a perspective/orthographic camera model, the orbit pose math
//! it is driven by, and an input-driven orbit manipulator with inertia.

/// Orbit manipulator state machine and the targets it can drive.
pub mod controller;
/// Core camera struct, view presets and GPU uniform types.
pub mod core;
/// Orbit pose composition, decomposition and limits.
pub mod orbit;

pub use controller::{
    mode_for_event, ManipMode, ManipPhase, ManipTarget, OrbitManipulator,
};
pub use self::core::{CameraModel, CameraUniform, ProjectionKind, ViewPreset};
pub use orbit::{
    compose_orbit_matrix, decompose_orbit_matrix, limit, AxisLimits, OrbitPose,
};
