//! wgpu backend for [`PickingEngine`](super::PickingEngine).
//!
//! Meshes are drawn with `pick.wgsl` into 1×1 `Rgba8Unorm` targets. The
//! pick rectangle is folded into the projection through
//! [`PickRect::clip_transform`], since wgpu viewports cannot start at
//! negative coordinates. Readback blocks on the device.

use std::sync::mpsc;

use glam::Mat4;

use super::engine::{PickMaterial, PickRenderer};
use crate::camera::CameraModel;
use crate::error::VantageError;
use crate::viewport::PickRect;

const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shader mode selectors, matching `pick.wgsl`.
const MODE_INDEX: u32 = 0;
const MODE_POSITION: u32 = 1;
const MODE_NORMAL: u32 = 2;

/// Per-draw uniform block for `pick.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PickUniform {
    /// Clip-adjusted view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Object-to-world transform.
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals.
    pub normal_matrix: [[f32; 4]; 4],
    /// Coordinate mapped to 0 in position passes.
    pub range_min: f32,
    /// Coordinate mapped to 1 in position passes.
    pub range_max: f32,
    /// Axis encoded by position passes.
    pub axis: u32,
    /// 0 = index, 1 = position, 2 = normal.
    pub mode: u32,
    /// Identifier written by index passes.
    pub object_id: u32,
    /// Padding to a 16-byte multiple.
    pub _pad: [u32; 3],
}

impl PickUniform {
    /// Uniform for drawing `mesh` with `material`.
    #[must_use]
    pub fn new(view_proj: Mat4, mesh: &PickMesh, material: &PickMaterial) -> Self {
        let (mode, axis, range_min, range_max) = material_params(material);
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: mesh.model.to_cols_array_2d(),
            normal_matrix: normal_matrix(mesh.model).to_cols_array_2d(),
            range_min,
            range_max,
            axis,
            mode,
            object_id: mesh.object_id,
            _pad: [0; 3],
        }
    }
}

/// Transform that keeps normals perpendicular to surfaces under `model`,
/// including non-uniform scale. Singular models fall back to `model`.
fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() <= f32::EPSILON {
        return model;
    }
    model.inverse().transpose()
}

/// `(mode, axis, range_min, range_max)` uniform fields for a material.
fn material_params(material: &PickMaterial) -> (u32, u32, f32, f32) {
    match *material {
        PickMaterial::Index => (MODE_INDEX, 0, 0.0, 1.0),
        PickMaterial::Position { axis, min, max } => {
            (MODE_POSITION, axis.index() as u32, min as f32, max as f32)
        }
        PickMaterial::Normal => (MODE_NORMAL, 0, 0.0, 1.0),
    }
}

/// Vertex layout expected by the pick pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PickVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
}

impl PickVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Vertex buffer layout for [`PickVertex`].
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One pickable indexed mesh.
#[derive(Debug, Clone)]
pub struct PickMesh {
    /// Identifier written by index passes. Must be non-zero and fit 24 bits.
    pub object_id: u32,
    /// Object-to-world transform.
    pub model: Mat4,
    /// [`PickVertex`] buffer.
    pub vertices: wgpu::Buffer,
    /// `u32` index buffer.
    pub indices: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
}

/// A scene the wgpu pick renderer can draw.
pub trait GpuPickScene {
    /// Meshes to draw in every pick pass.
    fn pick_meshes(&self) -> &[PickMesh];
}

impl GpuPickScene for [PickMesh] {
    fn pick_meshes(&self) -> &[PickMesh] {
        self
    }
}

impl GpuPickScene for Vec<PickMesh> {
    fn pick_meshes(&self) -> &[PickMesh] {
        self
    }
}

/// Color and depth attachments of one pick target.
pub struct GpuPickTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GpuPickTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Pick Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PICK_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Pick Depth Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            texture,
            width,
            height,
        }
    }

    /// Target size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Uniform buffer holding one [`PickUniform`] per draw at dynamic offsets.
///
/// Grows by doubling and never shrinks; the bind group is rebuilt whenever
/// the buffer is reallocated.
struct UniformSlots {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: u64,
}

impl UniformSlots {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: u64) -> Self {
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let stride = uniform_stride(alignment);
        let capacity = capacity.max(1);
        let (buffer, bind_group) = Self::allocate(device, layout, stride, capacity);
        Self {
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Uniform Buffer"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pick Uniform Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Upload one uniform per slot, growing if needed.
    fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        uniforms: &[PickUniform],
    ) {
        let needed = uniforms.len() as u64;
        if needed > self.capacity {
            let capacity = (needed * 2).max(self.capacity + 16);
            let (buffer, bind_group) = Self::allocate(device, layout, self.stride, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
            log::debug!("pick uniform buffer grown to {capacity} slots");
        }
        if uniforms.is_empty() {
            return;
        }

        let stride = self.stride as usize;
        let mut bytes = vec![0u8; stride * uniforms.len()];
        for (chunk, uniform) in bytes.chunks_exact_mut(stride).zip(uniforms) {
            chunk[..UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        queue.write_buffer(&self.buffer, 0, &bytes);
    }

    fn offset(&self, slot: usize) -> wgpu::DynamicOffset {
        (self.stride * slot as u64) as wgpu::DynamicOffset
    }
}

const UNIFORM_SIZE: u64 = size_of::<PickUniform>() as u64;

/// Uniform slot stride: the uniform size rounded up to `alignment`.
fn uniform_stride(alignment: u64) -> u64 {
    UNIFORM_SIZE.div_ceil(alignment.max(1)) * alignment.max(1)
}

/// [`PickRenderer`] on a wgpu device.
pub struct WgpuPickRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniforms: UniformSlots,
    staging: wgpu::Buffer,
    staging_size: u64,
    clear_color: wgpu::Color,
}

impl WgpuPickRenderer {
    /// Build the pick pipeline on `device`.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let shader = device.create_shader_module(wgpu::include_wgsl!("pick.wgsl"));

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pick Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pick Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Pick Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[PickVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: PICK_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let staging_size = u64::from(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let staging = Self::create_staging(device, staging_size);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            uniforms: UniformSlots::new(device, &layout, 16),
            pipeline,
            layout,
            staging,
            staging_size,
            clear_color: wgpu::Color::BLACK,
        }
    }

    fn create_staging(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Staging Buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        })
    }

    /// Block until the staging buffer is mapped.
    fn map_staging(&self, size: u64) -> Result<(), VantageError> {
        let (tx, rx) = mpsc::channel();
        self.staging
            .slice(..size)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        let _ = self
            .device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| VantageError::Readback(e.to_string()))?;
        rx.recv()
            .map_err(|e| VantageError::Readback(e.to_string()))?
            .map_err(|e| VantageError::Readback(e.to_string()))
    }
}

impl PickRenderer for WgpuPickRenderer {
    type Scene = dyn GpuPickScene;
    type Target = GpuPickTarget;

    fn create_target(&mut self, width: u32, height: u32) -> GpuPickTarget {
        GpuPickTarget::new(&self.device, width.max(1), height.max(1))
    }

    fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    fn render_scene_override(
        &mut self,
        scene: &dyn GpuPickScene,
        camera: &CameraModel,
        material: &PickMaterial,
        target: &GpuPickTarget,
        rect: &PickRect,
    ) -> Result<(), VantageError> {
        let meshes = scene.pick_meshes();
        let view_proj = (rect.clip_transform() * camera.view_projection()).as_mat4();
        let uniforms: Vec<PickUniform> = meshes
            .iter()
            .map(|mesh| PickUniform::new(view_proj, mesh, material))
            .collect();
        self.uniforms
            .write(&self.device, &self.queue, &self.layout, &uniforms);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Pick Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            for (slot, mesh) in meshes.iter().enumerate() {
                if mesh.index_count == 0 {
                    continue;
                }
                pass.set_bind_group(0, &self.uniforms.bind_group, &[self.uniforms.offset(slot)]);
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
        log::trace!("pick pass {material:?}: {} meshes", meshes.len());
        Ok(())
    }

    fn read_pixels(
        &mut self,
        target: &GpuPickTarget,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), VantageError> {
        let row_bytes = width as usize * 4;
        let region_ok = width > 0
            && height > 0
            && row_bytes <= wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize
            && x.saturating_add(width) <= target.width
            && y.saturating_add(height) <= target.height
            && out.len() >= row_bytes * height as usize;
        if !region_ok {
            return Err(VantageError::InvalidReadRegion { width, height });
        }

        let bytes_per_row = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let size = u64::from(bytes_per_row) * u64::from(height);
        if size > self.staging_size {
            self.staging = Self::create_staging(&self.device, size);
            self.staging_size = size;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        let _ = self.queue.submit(std::iter::once(encoder.finish()));

        if let Err(e) = self.map_staging(size) {
            log::warn!("pick readback failed: {e}");
            return Err(e);
        }
        {
            let data = self.staging.slice(..size).get_mapped_range();
            for (row, dst) in out.chunks_exact_mut(row_bytes).take(height as usize).enumerate() {
                let start = row * bytes_per_row as usize;
                dst.copy_from_slice(&data[start..start + row_bytes]);
            }
        }
        self.staging.unmap();
        Ok(())
    }
}
