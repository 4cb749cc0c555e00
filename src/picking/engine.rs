use glam::{DVec2, DVec3};

use super::codec::{decode_axis, decode_index, decode_normal, ObjectId, PickSample};
use crate::camera::CameraModel;
use crate::error::VantageError;
use crate::options::PickingOptions;
use crate::util::bounds::Bounds;
use crate::viewport::{PickRect, Viewport};

/// Edge length of the pick render targets, in pixels.
pub const PICK_TARGET_SIZE: u32 = 1;

/// Spatial axis selector for position passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// All axes in order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index (0, 1 or 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Scene-wide override material for a pick pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickMaterial {
    /// Flat color encoding each object's identifier.
    Index,
    /// World coordinate along `axis`, normalized into `[min, max]`.
    Position {
        /// Encoded axis.
        axis: Axis,
        /// Coordinate mapped to 0.
        min: f64,
        /// Coordinate mapped to 1.
        max: f64,
    },
    /// Surface normal remapped to `[0, 1]`.
    Normal,
}

/// Rendering backend used by [`PickingEngine`].
///
/// Implementations render a whole scene with an override material into a
/// target and read pixels back synchronously.
pub trait PickRenderer {
    /// Scene type the renderer draws.
    type Scene: ?Sized;
    /// Offscreen render target.
    type Target;

    /// Allocate a render target.
    fn create_target(&mut self, width: u32, height: u32) -> Self::Target;

    /// Current clear color.
    fn clear_color(&self) -> wgpu::Color;

    /// Replace the clear color.
    fn set_clear_color(&mut self, color: wgpu::Color);

    /// Clear `target` and render `scene` into it through `rect`, shading
    /// every object with `material`.
    fn render_scene_override(
        &mut self,
        scene: &Self::Scene,
        camera: &CameraModel,
        material: &PickMaterial,
        target: &Self::Target,
        rect: &PickRect,
    ) -> Result<(), VantageError>;

    /// Read RGBA8 pixels from `target` into `out`, row by row. Blocks until
    /// the GPU is done.
    fn read_pixels(
        &mut self,
        target: &Self::Target,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), VantageError>;
}

/// Everything a full pick found under one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PickResult {
    /// Object under the pixel, if any.
    pub object: Option<ObjectId>,
    /// World position of the surface, if an object was hit.
    pub position: Option<DVec3>,
    /// Unit surface normal, if an object was hit.
    pub normal: Option<DVec3>,
}

impl PickResult {
    /// Whether an object was hit.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.object.is_some()
    }

    /// The result as individual samples, starting with the index pass.
    #[must_use]
    pub fn samples(&self) -> Vec<PickSample> {
        let Some(object) = self.object else {
            return vec![PickSample::Miss];
        };
        let mut samples = vec![PickSample::Object(object)];
        samples.extend(self.position.map(PickSample::Position));
        samples.extend(self.normal.map(PickSample::Normal));
        samples
    }
}

/// Reads object ids, positions and normals under a pixel by rendering the
/// scene with override materials into 1×1 targets.
///
/// Queries on one engine are serialized: the targets and the readback
/// scratch are reused by every pass.
pub struct PickingEngine<T> {
    targets: [T; 3],
    scratch: [u8; 4],
    options: PickingOptions,
}

impl<T> PickingEngine<T> {
    /// Create an engine, allocating its targets from `renderer`.
    pub fn new<R>(renderer: &mut R, options: &PickingOptions) -> Self
    where
        R: PickRenderer<Target = T>,
    {
        Self {
            targets: std::array::from_fn(|_| {
                renderer.create_target(PICK_TARGET_SIZE, PICK_TARGET_SIZE)
            }),
            scratch: [0; 4],
            options: options.clone(),
        }
    }

    /// Picking options in use.
    #[must_use]
    pub fn options(&self) -> &PickingOptions {
        &self.options
    }

    /// Pick rectangle that samples canvas pixel `(x, y)` of `viewport`.
    #[must_use]
    pub fn pick_rect(viewport: &Viewport, x: f64, y: f64) -> PickRect {
        viewport.pick_rect(x, y, PICK_TARGET_SIZE, PICK_TARGET_SIZE)
    }

    /// Raw identifier under the pixel; zero means a miss.
    ///
    /// `camera` is used as given. Its aspect must already match the
    /// viewport `rect` came from ([`Viewport::update_camera`]), or use
    /// [`Self::pick_viewport`] which syncs it.
    pub fn pick_index<R>(
        &mut self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &CameraModel,
        rect: &PickRect,
    ) -> Result<u32, VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        let pixel = self.run_pass(renderer, scene, camera, &PickMaterial::Index, 0, rect)?;
        let id = decode_index(&pixel);
        log::trace!("pick index pass: {id}");
        Ok(id)
    }

    /// Object under the pixel.
    pub fn pick_object<R>(
        &mut self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &CameraModel,
        rect: &PickRect,
    ) -> Result<Option<ObjectId>, VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        let id = self.pick_index(renderer, scene, camera, rect)?;
        Ok((id != 0).then_some(ObjectId(id)))
    }

    /// World position under the pixel, normalized against `range` (or the
    /// default cube when `None`).
    ///
    /// The result is meaningless on a miss; check [`Self::pick_object`]
    /// first or use [`Self::pick`].
    pub fn pick_position<R>(
        &mut self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &CameraModel,
        rect: &PickRect,
        range: Option<&Bounds>,
    ) -> Result<DVec3, VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        let range = range.copied().unwrap_or_else(|| self.options.position_bounds());

        // Render every axis before reading any of them back.
        for axis in Axis::ALL {
            let i = axis.index();
            let material = PickMaterial::Position {
                axis,
                min: range.min[i],
                max: range.max[i],
            };
            self.render(renderer, scene, camera, &material, i, rect)?;
        }

        let mut position = DVec3::ZERO;
        for axis in Axis::ALL {
            let i = axis.index();
            let pixel = self.read(renderer, i)?;
            position[i] = decode_axis(&pixel, range.min[i], range.max[i]);
        }
        log::trace!("pick position pass: {position}");
        Ok(position)
    }

    /// Unit surface normal under the pixel. Meaningless on a miss.
    pub fn pick_normal<R>(
        &mut self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &CameraModel,
        rect: &PickRect,
    ) -> Result<DVec3, VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        let pixel = self.run_pass(renderer, scene, camera, &PickMaterial::Normal, 0, rect)?;
        let normal = decode_normal(&pixel);
        log::trace!("pick normal pass: {normal}");
        Ok(normal)
    }

    /// Object, position and normal under the pixel. Position and normal
    /// passes are skipped on a miss.
    ///
    /// Like the single-pass queries, this trusts `camera` to be in sync
    /// with the viewport.
    pub fn pick<R>(
        &mut self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &CameraModel,
        rect: &PickRect,
        range: Option<&Bounds>,
    ) -> Result<PickResult, VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        let Some(object) = self.pick_object(renderer, scene, camera, rect)? else {
            return Ok(PickResult::default());
        };
        Ok(PickResult {
            object: Some(object),
            position: Some(self.pick_position(renderer, scene, camera, rect, range)?),
            normal: Some(self.pick_normal(renderer, scene, camera, rect)?),
        })
    }

    /// Bring the viewport's active camera up to date, then [`Self::pick`]
    /// canvas pixel `point` through it.
    ///
    /// The built-in camera wins over `scene_camera`, as in
    /// [`Viewport::update_camera`]. Returns `Ok(None)` if the viewport has
    /// no camera to render with.
    pub fn pick_viewport<R>(
        &mut self,
        renderer: &mut R,
        scene: &R::Scene,
        viewport: &mut Viewport,
        scene_camera: Option<&mut CameraModel>,
        point: DVec2,
        range: Option<&Bounds>,
    ) -> Result<Option<PickResult>, VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        let rect = Self::pick_rect(viewport, point.x, point.y);
        let Some(camera) = viewport.update_camera(scene_camera) else {
            log::debug!("pick skipped: viewport has no camera");
            return Ok(None);
        };
        self.pick(renderer, scene, camera, &rect, range).map(Some)
    }

    fn run_pass<R>(
        &mut self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &CameraModel,
        material: &PickMaterial,
        slot: usize,
        rect: &PickRect,
    ) -> Result<[u8; 4], VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        self.render(renderer, scene, camera, material, slot, rect)?;
        self.read(renderer, slot)
    }

    /// Render one pass with a zero clear color, restoring the renderer's
    /// clear color afterwards even on failure.
    fn render<R>(
        &self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &CameraModel,
        material: &PickMaterial,
        slot: usize,
        rect: &PickRect,
    ) -> Result<(), VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        let saved = renderer.clear_color();
        renderer.set_clear_color(wgpu::Color::TRANSPARENT);
        let result =
            renderer.render_scene_override(scene, camera, material, &self.targets[slot], rect);
        renderer.set_clear_color(saved);
        result
    }

    fn read<R>(&mut self, renderer: &mut R, slot: usize) -> Result<[u8; 4], VantageError>
    where
        R: PickRenderer<Target = T>,
    {
        self.scratch = [0; 4];
        renderer.read_pixels(&self.targets[slot], 0, 0, 1, 1, &mut self.scratch)?;
        Ok(self.scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ProjectionKind;
    use crate::picking::codec::{encode_index, encode_normal, encode_unit};

    /// Scene stand-in: what every pass writes into the pixel.
    struct Surface {
        object: u32,
        position: DVec3,
        normal: DVec3,
    }

    /// Renderer that "draws" a single surface covering the queried pixel.
    #[derive(Default)]
    struct FakeRenderer {
        clear: Option<wgpu::Color>,
        pixels: Vec<[u8; 4]>,
        passes: Vec<PickMaterial>,
        reads: usize,
        fail_render: bool,
        aspects: Vec<f64>,
    }

    impl PickRenderer for FakeRenderer {
        type Scene = Surface;
        type Target = usize;

        fn create_target(&mut self, width: u32, height: u32) -> usize {
            assert_eq!((width, height), (1, 1));
            self.pixels.push([9, 9, 9, 9]);
            self.pixels.len() - 1
        }

        fn clear_color(&self) -> wgpu::Color {
            self.clear.unwrap_or(wgpu::Color::WHITE)
        }

        fn set_clear_color(&mut self, color: wgpu::Color) {
            self.clear = Some(color);
        }

        fn render_scene_override(
            &mut self,
            scene: &Surface,
            camera: &CameraModel,
            material: &PickMaterial,
            target: &usize,
            _rect: &PickRect,
        ) -> Result<(), VantageError> {
            assert_eq!(self.clear, Some(wgpu::Color::TRANSPARENT));
            if self.fail_render {
                return Err(VantageError::Readback("device lost".into()));
            }
            self.passes.push(*material);
            self.aspects.push(camera.aspect);
            self.pixels[*target] = match *material {
                _ if scene.object == 0 => [0, 0, 0, 0],
                PickMaterial::Index => encode_index(scene.object),
                PickMaterial::Position { axis, min, max } => {
                    let v = scene.position[axis.index()];
                    encode_unit((v - min) / (max - min))
                }
                PickMaterial::Normal => encode_normal(scene.normal),
            };
            Ok(())
        }

        fn read_pixels(
            &mut self,
            target: &usize,
            _x: u32,
            _y: u32,
            _width: u32,
            _height: u32,
            out: &mut [u8],
        ) -> Result<(), VantageError> {
            self.reads += 1;
            out.copy_from_slice(&self.pixels[*target]);
            Ok(())
        }
    }

    fn rect() -> PickRect {
        let mut viewport = Viewport::default();
        viewport.set_canvas_size(800.0, 600.0);
        PickingEngine::<usize>::pick_rect(&viewport, 400.0, 300.0)
    }

    fn surface() -> Surface {
        Surface {
            object: 42,
            position: DVec3::new(1.25, -3.5, 7.0),
            normal: DVec3::new(0.0, 0.6, 0.8),
        }
    }

    fn engine(renderer: &mut FakeRenderer) -> PickingEngine<usize> {
        PickingEngine::new(renderer, &PickingOptions::default())
    }

    #[test]
    fn index_pass_finds_object() {
        let mut renderer = FakeRenderer::default();
        let mut picker = engine(&mut renderer);
        let camera = CameraModel::default();
        let object = picker
            .pick_object(&mut renderer, &surface(), &camera, &rect())
            .unwrap();
        assert_eq!(object, Some(ObjectId(42)));
        assert_eq!(renderer.passes, vec![PickMaterial::Index]);
    }

    #[test]
    fn clear_color_is_restored() {
        let mut renderer = FakeRenderer::default();
        renderer.set_clear_color(wgpu::Color::RED);
        let mut picker = engine(&mut renderer);
        let _ = picker
            .pick_index(&mut renderer, &surface(), &CameraModel::default(), &rect())
            .unwrap();
        assert_eq!(renderer.clear_color(), wgpu::Color::RED);

        renderer.fail_render = true;
        let err = picker.pick_index(&mut renderer, &surface(), &CameraModel::default(), &rect());
        assert!(matches!(err, Err(VantageError::Readback(_))));
        assert_eq!(renderer.clear_color(), wgpu::Color::RED);
    }

    #[test]
    fn position_uses_three_targets() {
        let mut renderer = FakeRenderer::default();
        let mut picker = engine(&mut renderer);
        let range = Bounds::cube(10.0);
        let position = picker
            .pick_position(
                &mut renderer,
                &surface(),
                &CameraModel::default(),
                &rect(),
                Some(&range),
            )
            .unwrap();
        assert!((position - surface().position).length() < 1e-6);
        assert_eq!(renderer.passes.len(), 3);
        assert_eq!(renderer.reads, 3);
        assert!(matches!(
            renderer.passes[2],
            PickMaterial::Position { axis: Axis::Z, min, max } if min == -10.0 && max == 10.0
        ));
    }

    #[test]
    fn default_range_covers_large_scenes() {
        let mut renderer = FakeRenderer::default();
        let mut picker = engine(&mut renderer);
        let position = picker
            .pick_position(&mut renderer, &surface(), &CameraModel::default(), &rect(), None)
            .unwrap();
        assert!((position - surface().position).length() < 1e-3);
    }

    #[test]
    fn normal_is_unit_length() {
        let mut renderer = FakeRenderer::default();
        let mut picker = engine(&mut renderer);
        let normal = picker
            .pick_normal(&mut renderer, &surface(), &CameraModel::default(), &rect())
            .unwrap();
        assert!((normal.length() - 1.0).abs() < 1e-12);
        assert!(normal.dot(surface().normal) > 0.999);
    }

    #[test]
    fn full_pick_skips_passes_on_miss() {
        let mut renderer = FakeRenderer::default();
        let mut picker = engine(&mut renderer);
        let empty = Surface {
            object: 0,
            ..surface()
        };
        let result = picker
            .pick(&mut renderer, &empty, &CameraModel::default(), &rect(), None)
            .unwrap();
        assert!(!result.is_hit());
        assert_eq!(result.samples(), vec![PickSample::Miss]);
        assert_eq!(renderer.passes, vec![PickMaterial::Index]);
    }

    #[test]
    fn full_pick_collects_everything_on_hit() {
        let mut renderer = FakeRenderer::default();
        let mut picker = engine(&mut renderer);
        let result = picker
            .pick(&mut renderer, &surface(), &CameraModel::default(), &rect(), None)
            .unwrap();
        assert_eq!(result.object, Some(ObjectId(42)));
        assert!(result.position.is_some());
        assert!(result.normal.is_some());
        assert_eq!(result.samples().len(), 3);
        // index + three position passes + normal
        assert_eq!(renderer.passes.len(), 5);
    }

    #[test]
    fn viewport_pick_syncs_aspect_first() {
        let mut renderer = FakeRenderer::default();
        let mut picker = engine(&mut renderer);
        let mut viewport = Viewport::default();
        viewport.set_built_in_camera(ProjectionKind::Perspective, None);
        viewport.set_canvas_size(800.0, 600.0);
        let _ = viewport.update_camera(None);

        // Resized, but no frame has run since
        viewport.set_canvas_size(400.0, 800.0);
        let result = picker
            .pick_viewport(
                &mut renderer,
                &surface(),
                &mut viewport,
                None,
                DVec2::new(200.0, 400.0),
                None,
            )
            .unwrap();
        assert_eq!(result.and_then(|r| r.object), Some(ObjectId(42)));
        assert!(renderer.aspects.iter().all(|&aspect| aspect == 0.5));
        assert_eq!(viewport.camera().unwrap().aspect, 0.5);
    }

    #[test]
    fn viewport_pick_without_camera_is_skipped() {
        let mut renderer = FakeRenderer::default();
        let mut picker = engine(&mut renderer);
        let mut viewport = Viewport::default();
        viewport.set_canvas_size(100.0, 100.0);
        let result = picker
            .pick_viewport(&mut renderer, &surface(), &mut viewport, None, DVec2::ZERO, None)
            .unwrap();
        assert_eq!(result, None);
        assert!(renderer.passes.is_empty());
    }
}
