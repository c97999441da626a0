//! Shader artifact loading and render pipeline construction.
//!
//! The pipeline is built once per color format and cached by the caller.
//! Everything that can reject the configuration (WGSL parse, naga validation,
//! missing entry points, uniform layout drift) is checked here and reported as
//! a [`PipelineError`]; nothing in this module panics or exits.

use std::borrow::Cow;
use std::num::NonZeroU64;

use thiserror::Error;

use super::uniforms::{GlobalUniforms, QuadVertex, RectUniforms, UniformLayout};

/// Vertex entry point of the rect shader.
pub const RECT_VERTEX_ENTRY: &str = "rect_vertex_shader";

/// Fragment entry point of the rect shader.
pub const RECT_FRAGMENT_ENTRY: &str = "rect_fragment_shader";

const RECT_SHADER_WGSL: &str = include_str!("shaders/rect.wgsl");

/// Fatal setup failures of the pipeline builder.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("shader `{label}` failed to parse: {message}")]
    Parse { label: &'static str, message: String },

    #[error("shader `{label}` failed validation: {message}")]
    Validation { label: &'static str, message: String },

    #[error("shader `{label}` has no {stage} entry point named `{name}`")]
    MissingEntryPoint {
        label: &'static str,
        name: String,
        stage: ShaderStage,
    },

    #[error("shader `{label}` does not declare struct `{name}`")]
    MissingStruct { label: &'static str, name: &'static str },

    #[error("struct `{name}` layout mismatch: {detail}")]
    LayoutMismatch { name: &'static str, detail: String },
}

/// Pipeline stage of an entry point.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Byte layout of one WGSL struct as computed by naga.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    /// `(member name, byte offset)` in declaration order.
    pub members: Vec<(String, u32)>,
    /// Total size including trailing padding.
    pub span: u32,
}

/// Names of the two stages a pipeline is built from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EntryPoints<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl Default for EntryPoints<'static> {
    fn default() -> Self {
        Self {
            vertex: RECT_VERTEX_ENTRY,
            fragment: RECT_FRAGMENT_ENTRY,
        }
    }
}

/// A parsed and validated WGSL shader.
///
/// Holding the naga module lets entry points and struct layouts be inspected
/// without a device.
pub struct ShaderArtifact {
    label: &'static str,
    source: &'static str,
    module: naga::Module,
}

impl ShaderArtifact {
    /// The bundled rounded-rect shader.
    pub fn rect() -> Result<Self, PipelineError> {
        Self::from_wgsl("tessera rect shader", RECT_SHADER_WGSL)
    }

    /// Parses and validates WGSL source.
    pub fn from_wgsl(label: &'static str, source: &'static str) -> Result<Self, PipelineError> {
        let module = naga::front::wgsl::parse_str(source).map_err(|e| PipelineError::Parse {
            label,
            message: e.to_string(),
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .map_err(|e| PipelineError::Validation {
            label,
            message: e.to_string(),
        })?;

        Ok(Self { label, source, module })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Ensures `name` exists and runs in `stage`.
    pub fn require_entry_point(&self, name: &str, stage: ShaderStage) -> Result<(), PipelineError> {
        let found = self
            .module
            .entry_points
            .iter()
            .any(|ep| ep.name == name && ep.stage == stage.to_naga());

        if found {
            Ok(())
        } else {
            Err(PipelineError::MissingEntryPoint {
                label: self.label,
                name: name.to_string(),
                stage,
            })
        }
    }

    /// Layout of the struct named `name`, if the shader declares one.
    pub fn struct_layout(&self, name: &str) -> Option<StructLayout> {
        self.module.types.iter().find_map(|(_, ty)| {
            if ty.name.as_deref() != Some(name) {
                return None;
            }
            match &ty.inner {
                naga::TypeInner::Struct { members, span } => Some(StructLayout {
                    members: members
                        .iter()
                        .map(|m| (m.name.clone().unwrap_or_default(), m.offset))
                        .collect(),
                    span: *span,
                }),
                _ => None,
            }
        })
    }

    /// Checks member names, offsets and total size of `T` against the shader.
    pub fn check_layout<T: UniformLayout>(&self) -> Result<(), PipelineError> {
        let name = T::WGSL_NAME;
        let layout = self
            .struct_layout(name)
            .ok_or(PipelineError::MissingStruct { label: self.label, name })?;

        if layout.members.len() != T::FIELDS.len() {
            return Err(PipelineError::LayoutMismatch {
                name,
                detail: format!(
                    "shader declares {} members, CPU side declares {}",
                    layout.members.len(),
                    T::FIELDS.len()
                ),
            });
        }

        for ((wgsl_name, wgsl_offset), (rust_name, rust_offset)) in
            layout.members.iter().zip(T::FIELDS)
        {
            if wgsl_name != rust_name || *wgsl_offset as usize != *rust_offset {
                return Err(PipelineError::LayoutMismatch {
                    name,
                    detail: format!(
                        "shader has `{wgsl_name}` at {wgsl_offset}, CPU side has `{rust_name}` at {rust_offset}"
                    ),
                });
            }
        }

        if layout.span as u64 != T::byte_size() {
            return Err(PipelineError::LayoutMismatch {
                name,
                detail: format!("shader size {} != CPU size {}", layout.span, T::byte_size()),
            });
        }

        Ok(())
    }
}

/// Immutable pipeline plus the bind group layout its uniforms are bound through.
pub struct RectPipeline {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl RectPipeline {
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

/// Standard "over" compositing, identical for color and alpha:
/// `src * src_alpha + dst * (1 - src_alpha)`.
pub fn over_blend() -> wgpu::BlendState {
    let over = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: over, alpha: over }
}

fn uniform_entry<T: UniformLayout>(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(T::byte_size()),
        },
        count: None,
    }
}

/// Builds the rect pipeline for `color_format`.
///
/// Call at most once per (shader, entry points, format); the result is meant to
/// be cached by the caller.
pub fn build_pipeline(
    device: &wgpu::Device,
    shader: &ShaderArtifact,
    entry_points: EntryPoints<'_>,
    color_format: wgpu::TextureFormat,
) -> Result<RectPipeline, PipelineError> {
    shader.require_entry_point(entry_points.vertex, ShaderStage::Vertex)?;
    shader.require_entry_point(entry_points.fragment, ShaderStage::Fragment)?;
    shader.check_layout::<GlobalUniforms>()?;
    shader.check_layout::<RectUniforms>()?;

    log::info!(
        "building rect pipeline ({} / {}) for {:?}",
        entry_points.vertex,
        entry_points.fragment,
        color_format
    );

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(shader.label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(shader.source)),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("tessera rect bgl"),
        entries: &[
            uniform_entry::<GlobalUniforms>(0, wgpu::ShaderStages::VERTEX),
            uniform_entry::<RectUniforms>(
                1,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ),
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("tessera rect pipeline layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("tessera rect pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(entry_points.vertex),
            compilation_options: Default::default(),
            buffers: &[QuadVertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(entry_points.fragment),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(over_blend()),
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
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    Ok(RectPipeline {
        format: color_format,
        pipeline,
        bind_group_layout,
    })
}
