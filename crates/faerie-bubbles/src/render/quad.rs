use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use faerie_engine::device::{Gpu, GpuFrame};

use crate::error::{DemoError, create_resource};
use crate::loader::LoadedImage;

use super::program::{ProgramTargets, ShaderProgram};
use super::texture::BubbleTexture;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.8,
    g: 0.9,
    b: 1.0,
    a: 1.0,
};

pub const GLOBAL_COLOR: [f32; 4] = [0.1, 0.7, 0.2, 1.0];

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Unit square centered on the origin, as two triangles.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { pos: [-0.5, 0.5] },
    QuadVertex { pos: [0.5, 0.5] },
    QuadVertex { pos: [0.5, -0.5] },
    QuadVertex { pos: [-0.5, 0.5] },
    QuadVertex { pos: [0.5, -0.5] },
    QuadVertex { pos: [-0.5, -0.5] },
];

// ── globals uniform ───────────────────────────────────────────────────────

/// Mirrors `Globals` in both shader stages.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub scaling_factor: [f32; 2],
    pub rotation_vector: [f32; 2],
    pub global_color: [f32; 4],
}

impl Globals {
    /// Uniforms for one frame. `aspect` is width over height; the y scale
    /// absorbs it so the quad stays square.
    pub fn for_frame(rotation_vector: [f32; 2], aspect: f32) -> Self {
        Self {
            scaling_factor: [0.5, 0.5 * aspect],
            rotation_vector,
            global_color: GLOBAL_COLOR,
        }
    }
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Every GPU resource the demo draws with.
///
/// Group 0 holds the globals uniform, group 1 the bubble texture.
pub struct QuadRenderer {
    program: ShaderProgram,
    vertex_buffer: wgpu::Buffer,
    globals_ubo: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    texture_bgl: wgpu::BindGroupLayout,
    texture: BubbleTexture,
}

impl QuadRenderer {
    pub fn new(gpu: &Gpu<'_>) -> Result<Self, DemoError> {
        let device = gpu.device();

        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("faerie globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Globals>() as u64),
                },
                count: None,
            }],
        });
        let texture_bgl = BubbleTexture::bind_group_layout(device);

        let program = ShaderProgram::build(
            device,
            &[&globals_bgl, &texture_bgl],
            QuadVertex::layout(),
            ProgramTargets {
                color_format: gpu.surface_format(),
                sample_count: gpu.sample_count(),
                depth_format: gpu.depth_format(),
            },
        )?;

        let vertex_buffer = create_resource(device, "quad vertex buffer", || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("faerie quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            })
        })?;

        let (globals_ubo, globals_bg) = create_resource(device, "globals uniform buffer", || {
            let ubo = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("faerie globals ubo"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("faerie globals bg"),
                layout: &globals_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                }],
            });
            (ubo, bg)
        })?;

        let texture = BubbleTexture::placeholder(device, gpu.queue(), &texture_bgl)?;

        Ok(Self {
            program,
            vertex_buffer,
            globals_ubo,
            globals_bg,
            texture_bgl,
            texture,
        })
    }

    pub fn texture(&self) -> &BubbleTexture {
        &self.texture
    }

    /// Swaps the placeholder (or a previous image) for `image`.
    pub fn replace_texture(&mut self, gpu: &Gpu<'_>, image: &LoadedImage) -> Result<(), DemoError> {
        self.texture
            .replace(gpu.device(), gpu.queue(), &self.texture_bgl, image)
    }

    /// Records one clear-and-draw pass into `frame`.
    pub fn draw(&self, gpu: &Gpu<'_>, frame: &mut GpuFrame, globals: &Globals) {
        gpu.queue()
            .write_buffer(&self.globals_ubo, 0, bytemuck::bytes_of(globals));

        let (view, resolve_target) = frame.color_attachment();
        let view = view.clone();
        let resolve_target = resolve_target.cloned();

        let depth_stencil_attachment = frame
            .depth_view
            .as_ref()
            .zip(gpu.depth_format())
            .map(|(view, format)| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: format.has_depth_aspect().then_some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: format.has_stencil_aspect().then_some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Discard,
                }),
            });

        let mut pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("faerie bubble pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: resolve_target.as_ref(),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

        pass.set_pipeline(self.program.pipeline());
        pass.set_bind_group(0, &self.globals_bg, &[]);
        pass.set_bind_group(1, self.texture.bind_group(), &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_a_centered_unit_square() {
        let floats: &[f32] = bytemuck::cast_slice(&QUAD_VERTICES);
        assert_eq!(floats.len(), 12);
        for v in QUAD_VERTICES {
            assert_eq!(v.pos[0].abs(), 0.5);
            assert_eq!(v.pos[1].abs(), 0.5);
        }
        let sum = QUAD_VERTICES
            .iter()
            .fold([0.0f32; 2], |acc, v| [acc[0] + v.pos[0], acc[1] + v.pos[1]]);
        assert_eq!(sum, [0.0, 0.0]);
    }

    #[test]
    fn globals_match_shader_layout() {
        assert_eq!(std::mem::size_of::<Globals>(), 32);
        assert_eq!(std::mem::offset_of!(Globals, rotation_vector), 8);
        assert_eq!(std::mem::offset_of!(Globals, global_color), 16);
    }

    #[test]
    fn for_frame_scales_y_by_aspect() {
        let g = Globals::for_frame([0.0, 1.0], 1.5);
        assert_eq!(g.scaling_factor, [0.5, 0.75]);
        assert_eq!(g.rotation_vector, [0.0, 1.0]);
        assert_eq!(g.global_color, GLOBAL_COLOR);
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        let layout = QuadVertex::layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
    }
}
