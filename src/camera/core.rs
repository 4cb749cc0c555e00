use glam::{DMat3, DMat4, DVec3, Mat4};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::orbit::OrbitPose;
use crate::options::CameraOptions;
use crate::util::bounds::Bounds;

/// Projection kind shared by every camera in the crate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Perspective projection driven by `fov`.
    #[default]
    Perspective,
    /// Orthographic projection driven by `size`.
    Orthographic,
}

/// Axis-aligned view presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPreset {
    /// Looking along +X from the -X side.
    Left,
    /// Looking along -X from the +X side.
    Right,
    /// Looking down from +Y.
    Top,
    /// Looking up from -Y.
    Bottom,
    /// Looking along -Z from the +Z side.
    Front,
    /// Looking along +Z from the -Z side.
    Back,
}

impl ViewPreset {
    /// Every preset, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
        Self::Front,
        Self::Back,
    ];

    /// Orbit orientation `(pitch, yaw, roll)` in degrees for this preset.
    #[must_use]
    pub fn orientation(self) -> DVec3 {
        match self {
            Self::Left => DVec3::new(0.0, -90.0, 0.0),
            Self::Right => DVec3::new(0.0, 90.0, 0.0),
            Self::Top => DVec3::new(-90.0, 0.0, 0.0),
            Self::Bottom => DVec3::new(90.0, 0.0, 0.0),
            Self::Front => DVec3::ZERO,
            Self::Back => DVec3::new(0.0, 180.0, 0.0),
        }
    }
}

/// Unified perspective/orthographic camera.
///
/// Both projection kinds share one parameter set so a viewport can switch
/// between them without losing `near`, `far` or `zoom`. After mutating any
/// parameter call [`CameraModel::update_projection_matrix`]; the matrix is
/// never recomputed implicitly on read.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModel {
    /// Active projection kind.
    pub kind: ProjectionKind,
    /// Vertical field of view in degrees (perspective).
    pub fov: f64,
    /// Vertical extent of the view volume (orthographic).
    pub size: f64,
    /// Viewport aspect ratio (width / height).
    pub aspect: f64,
    /// Zoom factor applied to both projection kinds.
    pub zoom: f64,
    /// Near clipping plane distance.
    pub near: f64,
    /// Far clipping plane distance.
    pub far: f64,
    /// Film size in millimeters along its larger side.
    pub film_gauge: f64,
    /// Camera-to-world transform.
    pub matrix: DMat4,
    projection: DMat4,
    projection_inverse: DMat4,
}

impl Default for CameraModel {
    fn default() -> Self {
        Self::from_options(&CameraOptions::default())
    }
}

impl CameraModel {
    /// Create a camera of the given kind with default parameters.
    #[must_use]
    pub fn new(kind: ProjectionKind) -> Self {
        let mut camera = Self::default();
        camera.set_projection(kind);
        camera
    }

    /// Create a camera from configuration.
    #[must_use]
    pub fn from_options(options: &CameraOptions) -> Self {
        let mut camera = Self {
            kind: options.projection,
            fov: options.fov,
            size: options.size,
            aspect: 1.0,
            zoom: options.zoom,
            near: options.near,
            far: options.far,
            film_gauge: options.film_gauge,
            matrix: OrbitPose::default().to_matrix(),
            projection: DMat4::IDENTITY,
            projection_inverse: DMat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Switch projection kind and recompute the projection matrix.
    pub fn set_projection(&mut self, kind: ProjectionKind) {
        self.kind = kind;
        self.update_projection_matrix();
    }

    /// Replace the orbit orientation with a preset, keeping the offset.
    pub fn set_preset(&mut self, preset: ViewPreset) {
        let mut pose = OrbitPose::from_matrix(&self.matrix);
        pose.orientation = preset.orientation();
        self.matrix = pose.to_matrix();
    }

    /// Set the aspect ratio. Non-positive or non-finite values are ignored.
    ///
    /// Returns `true` if the aspect changed. The projection matrix is not
    /// updated.
    pub fn set_aspect(&mut self, aspect: f64) -> bool {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::debug!("ignoring degenerate camera aspect {aspect}");
            return false;
        }
        if aspect == self.aspect {
            return false;
        }
        self.aspect = aspect;
        true
    }

    /// Recompute the projection matrix and its inverse from the current
    /// parameters. Idempotent.
    pub fn update_projection_matrix(&mut self) {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        self.projection = match self.kind {
            ProjectionKind::Orthographic => {
                let dy = self.size / (2.0 * zoom);
                let dx = dy * self.aspect;
                DMat4::orthographic_rh(-dx, dx, -dy, dy, self.near, self.far)
            }
            ProjectionKind::Perspective => {
                let dy = self.near * (self.fov.to_radians() * 0.5).tan() / zoom;
                let dx = dy * self.aspect;
                frustum_rh(-dx, dx, -dy, dy, self.near, self.far)
            }
        };
        self.projection_inverse = self.projection.inverse();
    }

    /// Projection matrix as of the last [`Self::update_projection_matrix`].
    #[must_use]
    pub fn projection(&self) -> &DMat4 {
        &self.projection
    }

    /// Inverse of [`Self::projection`].
    #[must_use]
    pub fn projection_inverse(&self) -> &DMat4 {
        &self.projection_inverse
    }

    /// World-to-camera transform.
    #[must_use]
    pub fn view_matrix(&self) -> DMat4 {
        self.matrix.inverse()
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self) -> DMat4 {
        self.projection * self.view_matrix()
    }

    /// Camera position in world space.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.matrix.w_axis.truncate()
    }

    /// Vertical field of view after zoom, in degrees.
    #[must_use]
    pub fn effective_fov(&self) -> f64 {
        let half = (self.fov.to_radians() * 0.5).tan() / self.zoom;
        (2.0 * half.atan()).to_degrees()
    }

    /// Film width in millimeters for the current aspect.
    #[must_use]
    pub fn film_width(&self) -> f64 {
        self.film_gauge * self.aspect.min(1.0)
    }

    /// Film height in millimeters for the current aspect.
    #[must_use]
    pub fn film_height(&self) -> f64 {
        self.film_gauge / self.aspect.max(1.0)
    }

    /// Focal length in millimeters that gives the current vertical
    /// field of view on the film. Zoom is not taken into account.
    #[must_use]
    pub fn focal_length(&self) -> f64 {
        let slope = (self.fov.to_radians() * 0.5).tan();
        0.5 * self.film_height() / slope
    }

    /// Set the vertical field of view from a focal length in millimeters
    /// and recompute the projection. Non-positive lengths are ignored.
    pub fn set_focal_length(&mut self, focal_length: f64) {
        if !(focal_length.is_finite() && focal_length > 0.0) {
            log::debug!("ignoring focal length {focal_length}");
            return;
        }
        let slope = 0.5 * self.film_height() / focal_length;
        self.fov = (2.0 * slope.atan()).to_degrees();
        self.update_projection_matrix();
    }

    /// Frame `bounds` without changing the orientation.
    ///
    /// The orbit pivot moves to the box center; the distance (perspective)
    /// or size (orthographic) is chosen so the bounding sphere fits the
    /// vertical field of view. Boxes without finite extent are ignored.
    pub fn move_to_view(&mut self, bounds: &Bounds) {
        if !bounds.is_finite() {
            log::debug!("move_to_view: bounds not finite, camera unchanged");
            return;
        }

        let radius = bounds.radius().max(f64::EPSILON);
        let mut pose = OrbitPose::from_matrix(&self.matrix);
        let distance = match self.kind {
            ProjectionKind::Perspective => {
                let half_fov = (self.effective_fov().to_radians() * 0.5)
                    .clamp(1e-3, std::f64::consts::FRAC_PI_2 - 1e-3);
                radius / half_fov.sin()
            }
            ProjectionKind::Orthographic => {
                self.size = 2.0 * radius * self.zoom;
                radius * 2.0
            }
        };

        // Keep the eye outside the near plane.
        let distance = distance.max(self.near + radius);
        let rotation = DMat3::from_mat4(pose.to_matrix());
        let center = rotation.transpose() * bounds.center();
        pose.offset = DVec3::new(center.x, center.y, center.z + distance);
        self.matrix = pose.to_matrix();
        self.update_projection_matrix();
    }
}

/// Right-handed off-center perspective frustum with a [0, 1] depth range.
fn frustum_rh(
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
    near: f64,
    far: f64,
) -> DMat4 {
    let inv_w = 1.0 / (right - left);
    let inv_h = 1.0 / (top - bottom);
    let inv_d = 1.0 / (near - far);
    DMat4::from_cols_array(&[
        2.0 * near * inv_w,
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 * near * inv_h,
        0.0,
        0.0,
        (right + left) * inv_w,
        (top + bottom) * inv_h,
        far * inv_d,
        -1.0,
        0.0,
        0.0,
        near * far * inv_d,
        0.0,
    ])
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the view-projection matrix and camera metadata.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Viewport aspect ratio.
    pub aspect: f32,
    /// Camera forward direction for lighting.
    pub forward: [f32; 3],
    /// 1.0 for orthographic projection, 0.0 for perspective.
    pub orthographic: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Create a new camera uniform with identity view-projection.
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            aspect: 1.0,
            forward: [0.0, 0.0, -1.0],
            orthographic: 0.0,
        }
    }

    /// Update uniform fields from the given camera's current state.
    pub fn update_view_proj(&mut self, camera: &CameraModel) {
        self.view_proj = camera.view_projection().as_mat4().to_cols_array_2d();
        self.position = camera.position().as_vec3().to_array();
        self.aspect = camera.aspect as f32;
        let forward = -camera.matrix.z_axis.truncate().normalize_or_zero();
        self.forward = forward.as_vec3().to_array();
        self.orthographic = match camera.kind {
            ProjectionKind::Orthographic => 1.0,
            ProjectionKind::Perspective => 0.0,
        };
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec4;

    use super::*;

    fn project(camera: &CameraModel, p: DVec3) -> DVec3 {
        let clip = *camera.projection() * DVec4::new(p.x, p.y, p.z, 1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn perspective_maps_frustum_corners_to_clip_edges() {
        let mut camera = CameraModel::new(ProjectionKind::Perspective);
        camera.fov = 90.0;
        camera.aspect = 2.0;
        camera.near = 1.0;
        camera.far = 100.0;
        camera.update_projection_matrix();

        // At z = -1 (near plane) the half extents are tan(45°) = 1 by 2.
        let ndc = project(&camera, DVec3::new(2.0, 1.0, -1.0));
        assert!((ndc.x - 1.0).abs() < 1e-12);
        assert!((ndc.y - 1.0).abs() < 1e-12);
        assert!(ndc.z.abs() < 1e-12);

        let far = project(&camera, DVec3::new(0.0, 0.0, -100.0));
        assert!((far.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn orthographic_extent_follows_size_and_zoom() {
        let mut camera = CameraModel::new(ProjectionKind::Orthographic);
        camera.size = 20.0;
        camera.zoom = 2.0;
        camera.aspect = 1.5;
        camera.update_projection_matrix();

        // Half height = 20 / (2 · 2) = 5, half width = 7.5
        let ndc = project(&camera, DVec3::new(7.5, 5.0, -10.0));
        assert!((ndc.x - 1.0).abs() < 1e-12);
        assert!((ndc.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn projection_is_not_recomputed_on_read() {
        let mut camera = CameraModel::new(ProjectionKind::Perspective);
        let before = *camera.projection();
        camera.fov = 20.0;
        assert_eq!(*camera.projection(), before);
        camera.update_projection_matrix();
        assert_ne!(*camera.projection(), before);
        let once = *camera.projection();
        camera.update_projection_matrix();
        assert_eq!(*camera.projection(), once);
    }

    #[test]
    fn switching_projection_keeps_shared_parameters() {
        let mut camera = CameraModel::new(ProjectionKind::Perspective);
        camera.near = 0.5;
        camera.far = 500.0;
        camera.zoom = 3.0;
        camera.set_projection(ProjectionKind::Orthographic);
        camera.set_projection(ProjectionKind::Perspective);
        assert_eq!(camera.near, 0.5);
        assert_eq!(camera.far, 500.0);
        assert_eq!(camera.zoom, 3.0);
    }

    #[test]
    fn presets_keep_offset_and_set_orientation() {
        let mut camera = CameraModel::default();
        camera.matrix = OrbitPose::new(
            DVec3::new(10.0, 20.0, 0.0),
            DVec3::new(1.0, 2.0, 30.0),
        )
        .to_matrix();

        camera.set_preset(ViewPreset::Top);
        let pose = OrbitPose::from_matrix(&camera.matrix);
        assert!((pose.offset - DVec3::new(1.0, 2.0, 30.0)).length() < 1e-9);
        assert!((pose.orientation.x + 90.0).abs() < 1e-9);

        // Top view sits above the pivot.
        assert!(camera.position().y > 29.0);
    }

    #[test]
    fn right_preset_looks_along_negative_x() {
        let mut camera = CameraModel::default();
        camera.set_preset(ViewPreset::Right);
        let forward = -camera.matrix.z_axis.truncate();
        assert!((forward - DVec3::NEG_X).length() < 1e-9);
    }

    #[test]
    fn degenerate_aspect_is_rejected() {
        let mut camera = CameraModel::default();
        assert!(!camera.set_aspect(0.0));
        assert!(!camera.set_aspect(f64::INFINITY));
        assert!(camera.set_aspect(2.0));
        assert!(!camera.set_aspect(2.0));
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn focal_length_matches_film_gauge() {
        let mut camera = CameraModel::default();
        // 35 mm film, square aspect: a 35 mm lens sees 2·atan(0.5) vertically
        camera.set_focal_length(35.0);
        let expected = (2.0 * 0.5_f64.atan()).to_degrees();
        assert!((camera.fov - expected).abs() < 1e-9);
        assert!((camera.focal_length() - 35.0).abs() < 1e-9);

        // Wide aspect shrinks the film height, so the same lens sees less
        assert!(camera.set_aspect(2.0));
        assert_eq!(camera.film_width(), 35.0);
        assert_eq!(camera.film_height(), 17.5);
        camera.set_focal_length(35.0);
        assert!(camera.fov < expected);
        assert!((camera.focal_length() - 35.0).abs() < 1e-9);

        let fov = camera.fov;
        camera.set_focal_length(0.0);
        assert_eq!(camera.fov, fov);
    }

    #[test]
    fn effective_fov_narrows_with_zoom() {
        let mut camera = CameraModel::default();
        camera.fov = 60.0;
        camera.zoom = 1.0;
        assert!((camera.effective_fov() - 60.0).abs() < 1e-9);
        camera.zoom = 2.0;
        assert!(camera.effective_fov() < 60.0);
    }

    #[test]
    fn move_to_view_centers_bounds_in_front_of_camera() {
        let mut camera = CameraModel::default();
        camera.set_preset(ViewPreset::Right);
        let bounds = Bounds::new(
            DVec3::new(9.0, -1.0, -1.0),
            DVec3::new(11.0, 1.0, 1.0),
        );
        camera.move_to_view(&bounds);

        let view = camera.view_matrix();
        let center_in_view = view.transform_point3(bounds.center());
        // Center lies straight ahead on the view axis.
        assert!(center_in_view.x.abs() < 1e-9);
        assert!(center_in_view.y.abs() < 1e-9);
        assert!(center_in_view.z < -bounds.radius());
    }

    #[test]
    fn move_to_view_ignores_empty_bounds() {
        let mut camera = CameraModel::default();
        let before = camera.matrix;
        camera.move_to_view(&Bounds::empty());
        assert_eq!(camera.matrix, before);
    }

    #[test]
    fn uniform_reflects_camera_state() {
        let mut camera = CameraModel::new(ProjectionKind::Orthographic);
        let _ = camera.set_aspect(1.25);
        camera.update_projection_matrix();
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);
        assert_eq!(uniform.aspect, 1.25);
        assert_eq!(uniform.orthographic, 1.0);
        assert_eq!(uniform.forward, [0.0, 0.0, -1.0]);
        assert_eq!(uniform.position, [0.0, 0.0, 50.0]);
    }
}
