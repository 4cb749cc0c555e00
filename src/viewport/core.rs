use glam::DVec2;

use super::rect::{PickRect, ViewportRect};
use crate::camera::{
    CameraModel, ManipTarget, OrbitManipulator, ProjectionKind, ViewPreset,
};
use crate::input::{Located, PointerEvent, TriggerEvent};
use crate::options::Options;
use crate::util::bounds::Bounds;

/// Identifier of a viewport within a [`super::ViewportSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ViewportId(pub u32);

/// Construction parameters for a [`Viewport`]. Extents are fractions of the
/// canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportProps {
    /// Left edge as a fraction of canvas width.
    pub left: f64,
    /// Top edge as a fraction of canvas height.
    pub top: f64,
    /// Width as a fraction of canvas width.
    pub width: f64,
    /// Height as a fraction of canvas height.
    pub height: f64,
    /// Whether the viewport accepts input.
    pub enabled: bool,
}

impl Default for ViewportProps {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 1.0,
            height: 1.0,
            enabled: true,
        }
    }
}

/// An event that passed a viewport hit test, stamped with the viewport and
/// its device coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed<E> {
    /// The original event.
    pub event: E,
    /// Viewport that accepted the event.
    pub viewport: ViewportId,
    /// Event position in device coordinates (`[-1, 1]`, Y up).
    pub device: DVec2,
}

/// A rectangular region of the canvas with its own camera and manipulator.
///
/// The absolute pixel rectangle is recomputed whenever the relative
/// rectangle or the canvas size changes. A built-in camera, if present,
/// keeps its aspect ratio in sync with the rectangle.
#[derive(Debug, Clone)]
pub struct Viewport {
    id: ViewportId,
    relative: ViewportRect,
    absolute: ViewportRect,
    canvas_width: f64,
    canvas_height: f64,
    enabled: bool,
    camera: Option<CameraModel>,
    manip: Option<OrbitManipulator>,
    options: Options,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&ViewportProps::default())
    }
}

impl Viewport {
    /// Create a viewport on a 1×1 canvas with default options.
    #[must_use]
    pub fn new(props: &ViewportProps) -> Self {
        Self::with_options(props, &Options::default())
    }

    /// Create a viewport whose built-in camera and manipulator use
    /// `options`.
    #[must_use]
    pub fn with_options(props: &ViewportProps, options: &Options) -> Self {
        let mut viewport = Self {
            id: ViewportId::default(),
            relative: ViewportRect::FULL,
            absolute: ViewportRect::new(0.0, 0.0, 1.0, 1.0),
            canvas_width: 1.0,
            canvas_height: 1.0,
            enabled: props.enabled,
            camera: None,
            manip: None,
            options: options.clone(),
        };
        viewport.set_relative_rect(props.left, props.top, props.width, props.height);
        viewport
    }

    /// Identifier assigned by the owning set.
    #[must_use]
    pub fn id(&self) -> ViewportId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ViewportId) {
        self.id = id;
    }

    /// Absolute left edge in canvas pixels.
    #[must_use]
    pub fn left(&self) -> f64 {
        self.absolute.left
    }

    /// Absolute top edge in canvas pixels.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.absolute.top
    }

    /// Absolute width in canvas pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.absolute.width
    }

    /// Absolute height in canvas pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.absolute.height
    }

    /// Relative rectangle (fractions of the canvas).
    #[must_use]
    pub fn relative_rect(&self) -> &ViewportRect {
        &self.relative
    }

    /// Absolute rectangle in canvas pixels.
    #[must_use]
    pub fn absolute_rect(&self) -> &ViewportRect {
        &self.absolute
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    /// Whether the viewport accepts input.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable input for this viewport.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Set the relative rectangle. Ignored if the width or height is not
    /// positive.
    pub fn set_relative_rect(&mut self, left: f64, top: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring degenerate viewport rect {width}x{height}");
            return;
        }
        self.relative = ViewportRect::new(left, top, width, height);
        self.update_geometry();
    }

    /// Set the canvas size in pixels. Ignored if either extent is not
    /// positive.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring degenerate canvas size {width}x{height}");
            return;
        }
        self.canvas_width = width;
        self.canvas_height = height;
        self.update_geometry();
    }

    fn update_geometry(&mut self) {
        self.absolute = self
            .relative
            .to_absolute(self.canvas_width, self.canvas_height);
        if let Some(manip) = self.manip.as_mut() {
            manip.set_viewport_size(self.absolute.width, self.absolute.height);
        }
    }

    /// Built-in camera, if any.
    #[must_use]
    pub fn camera(&self) -> Option<&CameraModel> {
        self.camera.as_ref()
    }

    /// Mutable built-in camera, if any.
    pub fn camera_mut(&mut self) -> Option<&mut CameraModel> {
        self.camera.as_mut()
    }

    /// Camera manipulator, if enabled.
    #[must_use]
    pub fn manipulator(&self) -> Option<&OrbitManipulator> {
        self.manip.as_ref()
    }

    /// Mutable camera manipulator, if enabled.
    pub fn manipulator_mut(&mut self) -> Option<&mut OrbitManipulator> {
        self.manip.as_mut()
    }

    /// Create the built-in camera, or switch its projection if it exists,
    /// and optionally apply a view preset.
    pub fn set_built_in_camera(
        &mut self,
        kind: ProjectionKind,
        preset: Option<ViewPreset>,
    ) {
        if let Some(camera) = self.camera.as_mut() {
            camera.set_projection(kind);
        } else {
            let mut camera = CameraModel::from_options(&self.options.camera);
            camera.set_projection(kind);
            self.camera = Some(camera);
        }
        let Some(camera) = self.camera.as_mut() else {
            return;
        };
        if let Some(preset) = preset {
            camera.set_preset(preset);
        }
        if let Some(manip) = self.manip.as_mut() {
            manip.read_from(camera);
        }
    }

    /// Remove the built-in camera. The manipulator goes with it, since it
    /// has nothing left to drive.
    pub fn unset_built_in_camera(&mut self) {
        self.camera = None;
        self.manip = None;
    }

    /// Attach or detach an orbit manipulator for the built-in camera.
    ///
    /// Enabling has no effect without a built-in camera. Returns whether a
    /// manipulator is attached afterwards.
    pub fn enable_camera_manip(&mut self, enabled: bool) -> bool {
        if !enabled {
            self.manip = None;
            return false;
        }
        let Some(camera) = self.camera.as_ref() else {
            log::debug!("enable_camera_manip: no built-in camera");
            return false;
        };
        if self.manip.is_none() {
            let mut manip = OrbitManipulator::new(&self.options.manipulator);
            manip.set_viewport_size(self.absolute.width, self.absolute.height);
            manip.read_from(camera);
            self.manip = Some(manip);
        }
        true
    }

    /// Frame `bounds` with the built-in camera and reseed the manipulator.
    pub fn move_camera_to_view(&mut self, bounds: &Bounds) {
        let Some(camera) = self.camera.as_mut() else {
            return;
        };
        camera.move_to_view(bounds);
        if let Some(manip) = self.manip.as_mut() {
            manip.read_from(camera);
        }
    }

    /// Half-open hit test in canvas pixels.
    #[must_use]
    pub fn is_point_inside(&self, x: f64, y: f64) -> bool {
        self.absolute.contains(x, y)
    }

    /// Canvas pixel to device coordinates (`[-1, 1]`, Y up).
    #[must_use]
    pub fn device_point(&self, x: f64, y: f64) -> DVec2 {
        DVec2::new(self.device_x(x), self.device_y(y))
    }

    /// Canvas X to device X.
    #[must_use]
    pub fn device_x(&self, x: f64) -> f64 {
        (x - self.absolute.left) / self.absolute.width * 2.0 - 1.0
    }

    /// Canvas Y to device Y.
    #[must_use]
    pub fn device_y(&self, y: f64) -> f64 {
        1.0 - (y - self.absolute.top) / self.absolute.height * 2.0
    }

    /// Stamp an event with this viewport, without hit testing.
    #[must_use]
    pub fn to_routed<E: Located>(&self, event: E) -> Routed<E> {
        let position = event.position();
        Routed {
            device: self.device_point(position.x, position.y),
            viewport: self.id,
            event,
        }
    }

    /// Route `event` to this viewport if it is enabled and the event lies
    /// inside it.
    #[must_use]
    pub fn hit_test<E: Located>(&self, event: E) -> Option<Routed<E>> {
        let position = event.position();
        (self.enabled && self.is_point_inside(position.x, position.y))
            .then(|| self.to_routed(event))
    }

    /// Forward a pointer event to the manipulator.
    pub fn on_pointer(&mut self, event: &PointerEvent) -> bool {
        self.manip
            .as_mut()
            .is_some_and(|manip| manip.on_pointer(event))
    }

    /// Forward a trigger event to the manipulator.
    pub fn on_trigger(&mut self, event: &TriggerEvent) -> bool {
        self.manip
            .as_mut()
            .is_some_and(|manip| manip.on_trigger(event))
    }

    /// Advance the manipulator into the built-in camera, then sync the
    /// active camera's aspect to this viewport.
    ///
    /// The built-in camera takes precedence over `scene_camera`. Returns
    /// the active camera, or `None` if there is neither.
    pub fn update_camera<'a>(
        &'a mut self,
        scene_camera: Option<&'a mut CameraModel>,
    ) -> Option<&'a mut CameraModel> {
        let aspect = self.absolute.aspect();
        let camera = match self.camera.as_mut() {
            Some(camera) => {
                if let Some(manip) = self.manip.as_mut() {
                    let _ = manip.apply_to(camera);
                }
                camera
            }
            None => scene_camera?,
        };

        match aspect {
            Some(aspect) if camera.aspect != aspect => {
                if camera.set_aspect(aspect) {
                    camera.update_projection_matrix();
                }
            }
            Some(_) => {}
            None => log::debug!("viewport has no height, aspect sync skipped"),
        }
        Some(camera)
    }

    /// Pick rectangle that lands canvas pixel `(x, y)` at the origin of a
    /// render target of the given size.
    #[must_use]
    pub fn pick_rect(&self, x: f64, y: f64, target_width: u32, target_height: u32) -> PickRect {
        PickRect::new(
            &self.absolute,
            x,
            y,
            f64::from(target_width),
            f64::from(target_height),
        )
    }

    /// Restrict `pass` to this viewport's pixel rectangle.
    pub fn apply_viewport(&self, pass: &mut wgpu::RenderPass<'_>) {
        let rect = &self.absolute;
        pass.set_viewport(
            rect.left as f32,
            rect.top as f32,
            rect.width as f32,
            rect.height as f32,
            0.0,
            1.0,
        );
    }

    /// Whether the manipulator target is orthographic.
    #[must_use]
    pub fn is_orthographic(&self) -> bool {
        self.camera
            .as_ref()
            .is_some_and(|camera| camera.ortho_size().is_some())
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Viewport (left: {}, top: {}, width: {}, height: {})",
            self.absolute.left,
            self.absolute.top,
            self.absolute.width,
            self.absolute.height
        )
    }
}
