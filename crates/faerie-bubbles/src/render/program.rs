use std::error::Error as StdError;
use std::fmt;

use wgpu::naga;

use crate::error::{DemoError, create_resource};

const VERTEX_SOURCE: &str = include_str!("shaders/bubble.vert.wgsl");
const FRAGMENT_SOURCE: &str = include_str!("shaders/bubble.frag.wgsl");

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Parses and validates one stage.
///
/// The diagnostic carried by the error is rendered against `source`.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, DemoError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| DemoError::Compile {
        stage,
        diagnostic: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| DemoError::Compile {
        stage,
        diagnostic: error_chain(&e),
    })?;

    Ok(module)
}

/// Checks that two compiled stages form a complete program.
///
/// Each module must expose its stage's entry point, and every location the
/// fragment stage reads must be written by the vertex stage.
pub fn link(vertex: &naga::Module, fragment: &naga::Module) -> Result<(), DemoError> {
    let vs = find_entry_point(vertex, ShaderStage::Vertex)?;
    let fs = find_entry_point(fragment, ShaderStage::Fragment)?;

    let outputs = match vs.function.result.as_ref() {
        Some(result) => locations(vertex, result.ty, result.binding.as_ref()),
        None => Vec::new(),
    };

    for arg in &fs.function.arguments {
        for location in locations(fragment, arg.ty, arg.binding.as_ref()) {
            if !outputs.contains(&location) {
                return Err(DemoError::Link {
                    diagnostic: format!(
                        "fragment input @location({location}) is not written by the vertex stage"
                    ),
                });
            }
        }
    }

    Ok(())
}

fn find_entry_point(
    module: &naga::Module,
    stage: ShaderStage,
) -> Result<&naga::EntryPoint, DemoError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == stage.entry_point() && ep.stage == stage.naga_stage())
        .ok_or_else(|| DemoError::Link {
            diagnostic: format!("missing {stage} entry point '{}'", stage.entry_point()),
        })
}

/// User-defined IO locations of a value, looking through struct members.
fn locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
) -> Vec<u32> {
    match binding {
        Some(naga::Binding::Location { location, .. }) => vec![*location],
        Some(naga::Binding::BuiltIn(_)) => Vec::new(),
        None => match &module.types[ty].inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|m| match m.binding {
                    Some(naga::Binding::Location { location, .. }) => Some(location),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
    }
}

fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Attachments a program will render into.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProgramTargets {
    pub color_format: wgpu::TextureFormat,
    pub sample_count: u32,
    pub depth_format: Option<wgpu::TextureFormat>,
}

/// The linked bubble program. Built once per demo instance.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
}

impl ShaderProgram {
    /// Compiles both stages, links them and creates the render pipeline.
    ///
    /// Every step is fatal on failure; nothing is retried.
    pub fn build(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        vertex_layout: wgpu::VertexBufferLayout<'_>,
        targets: ProgramTargets,
    ) -> Result<Self, DemoError> {
        let vertex_ir = compile_stage(ShaderStage::Vertex, VERTEX_SOURCE)?;
        let fragment_ir = compile_stage(ShaderStage::Fragment, FRAGMENT_SOURCE)?;
        link(&vertex_ir, &fragment_ir)?;

        let vertex = create_resource(device, "vertex shader", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("faerie bubble vertex shader"),
                source: wgpu::ShaderSource::Wgsl(VERTEX_SOURCE.into()),
            })
        })?;
        let fragment = create_resource(device, "fragment shader", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("faerie bubble fragment shader"),
                source: wgpu::ShaderSource::Wgsl(FRAGMENT_SOURCE.into()),
            })
        })?;

        let pipeline = create_resource(device, "bubble program", || {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("faerie bubble pipeline layout"),
                bind_group_layouts,
                immediate_size: 0,
            });
            Self::create_pipeline(device, &layout, &vertex, &fragment, vertex_layout, targets)
        })?;

        Ok(Self { pipeline })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
        targets: ProgramTargets,
    ) -> wgpu::RenderPipeline {
        let depth_stencil = targets.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            // The quad is the only geometry; the attachment exists because it was requested.
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("faerie bubble pipeline"),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module: vertex,
                entry_point: Some(ShaderStage::Vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },

            fragment: Some(wgpu::FragmentState {
                module: fragment,
                entry_point: Some(ShaderStage::Fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: targets.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil,
            multisample: wgpu::MultisampleState {
                count: targets.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },

            multiview_mask: None,
            cache: None,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSTHROUGH_VS: &str = r"
        @vertex
        fn vs_main(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(p, 0.0, 1.0);
        }
    ";

    #[test]
    fn embedded_sources_compile_and_link() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX_SOURCE).unwrap();
        let fs = compile_stage(ShaderStage::Fragment, FRAGMENT_SOURCE).unwrap();
        link(&vs, &fs).unwrap();
    }

    #[test]
    fn syntax_error_reports_diagnostic() {
        let err = compile_stage(ShaderStage::Fragment, "fn fs_main( -> {").unwrap_err();
        match err {
            DemoError::Compile { stage, diagnostic } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!diagnostic.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn type_error_is_a_compile_failure() {
        let src = r"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return 1.0;
            }
        ";
        assert!(matches!(
            compile_stage(ShaderStage::Fragment, src),
            Err(DemoError::Compile { stage: ShaderStage::Fragment, .. })
        ));
    }

    #[test]
    fn missing_entry_point_fails_link() {
        let vs = compile_stage(ShaderStage::Vertex, PASSTHROUGH_VS).unwrap();
        let err = link(&vs, &vs).unwrap_err();
        assert!(matches!(err, DemoError::Link { .. }));
        assert!(err.to_string().contains("fs_main"));
    }

    #[test]
    fn unsatisfied_fragment_input_fails_link() {
        let vs = compile_stage(ShaderStage::Vertex, PASSTHROUGH_VS).unwrap();
        let fs = compile_stage(
            ShaderStage::Fragment,
            r"
                @fragment
                fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
                    return vec4<f32>(uv, 0.0, 1.0);
                }
            ",
        )
        .unwrap();

        let err = link(&vs, &fs).unwrap_err();
        assert!(err.to_string().contains("@location(0)"));
    }
}
