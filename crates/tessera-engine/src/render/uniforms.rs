//! CPU-side mirrors of the uniform blocks and quad geometry in `shaders/rect.wgsl`.
//!
//! Each uniform struct implements [`UniformLayout`], which lists the WGSL member
//! names with their Rust byte offsets. The pipeline builder checks that table
//! against the parsed shader before creating any GPU object, so a drifted
//! field order or padding is a setup error instead of silent garbage.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::coords::{BorderWidths, ColorRgba, Rect, Vec2, Viewport};

/// Layout contract between a `#[repr(C)]` struct and a WGSL struct.
pub trait UniformLayout: Pod {
    /// Name of the matching struct in the WGSL source.
    const WGSL_NAME: &'static str;

    /// `(member name, byte offset)` for every member the shader declares.
    const FIELDS: &'static [(&'static str, usize)];

    /// Size of the struct as seen by the shader (including trailing padding).
    fn byte_size() -> u64 {
        size_of::<Self>() as u64
    }
}

// ── globals ───────────────────────────────────────────────────────────────

/// Per-surface parameters, bound at `@group(0) @binding(0)`.
///
/// Derived from the surface size on every resize and passed into each frame by
/// value. The trailing pad keeps the block at 16 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    /// Drawable size in physical pixels.
    pub viewport_size: [f32; 2],
    _pad: [f32; 2],
}

impl GlobalUniforms {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            viewport_size: [width, height],
            _pad: [0.0; 2],
        }
    }

    #[inline]
    pub fn from_viewport(viewport: Viewport) -> Self {
        Self::new(viewport.width, viewport.height)
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_size[0], self.viewport_size[1])
    }
}

impl UniformLayout for GlobalUniforms {
    const WGSL_NAME: &'static str = "GlobalUniforms";
    const FIELDS: &'static [(&'static str, usize)] = &[
        ("viewport_size", offset_of!(GlobalUniforms, viewport_size)),
        ("_pad", offset_of!(GlobalUniforms, _pad)),
    ];
}

// ── per-rect ──────────────────────────────────────────────────────────────

/// Parameters of the one rectangle drawn per frame, bound at `@group(0) @binding(1)`.
///
/// Layout (80 bytes, WGSL uniform rules):
///
///  offset  0  size              vec2<f32>
///  offset  8  origin            vec2<f32>
///  offset 16  background_color  vec4<f32>
///  offset 32  border_thickness  vec4<f32>  (top, right, bottom, left)
///  offset 48  border_color      vec4<f32>
///  offset 64  corner_radius     f32
///  offset 68  padding up to the 16-byte struct alignment
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct RectUniforms {
    pub size: [f32; 2],
    pub origin: [f32; 2],
    pub background_color: [f32; 4],
    pub border_thickness: [f32; 4],
    pub border_color: [f32; 4],
    pub corner_radius: f32,
    _pad: [f32; 3],
}

impl RectUniforms {
    /// Opaque black fill, no border, sharp corners.
    ///
    /// A rect with a non-finite coordinate collapses to an empty rect at the
    /// origin, which rasterizes to nothing.
    pub fn new(rect: Rect) -> Self {
        let r = if rect.is_finite() {
            rect.normalized()
        } else {
            log::warn!("non-finite rect {rect:?}; drawing nothing");
            Rect::default()
        };
        Self {
            size: r.size.to_array(),
            origin: r.origin.to_array(),
            background_color: ColorRgba::black().to_array(),
            border_thickness: BorderWidths::none().to_array(),
            border_color: [0.0; 4],
            corner_radius: 0.0,
            _pad: [0.0; 3],
        }
    }

    pub fn with_background(mut self, color: ColorRgba) -> Self {
        self.background_color = color.to_array();
        self
    }

    pub fn with_border(mut self, widths: BorderWidths, color: ColorRgba) -> Self {
        self.border_thickness = widths.clamped().to_array();
        self.border_color = color.to_array();
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(Vec2::from_array(self.origin), Vec2::from_array(self.size))
    }

    #[inline]
    pub fn border(&self) -> BorderWidths {
        let [top, right, bottom, left] = self.border_thickness;
        BorderWidths::new(top, right, bottom, left)
    }
}

impl UniformLayout for RectUniforms {
    const WGSL_NAME: &'static str = "RectUniforms";
    const FIELDS: &'static [(&'static str, usize)] = &[
        ("size", offset_of!(RectUniforms, size)),
        ("origin", offset_of!(RectUniforms, origin)),
        ("background_color", offset_of!(RectUniforms, background_color)),
        ("border_thickness", offset_of!(RectUniforms, border_thickness)),
        ("border_color", offset_of!(RectUniforms, border_color)),
        ("corner_radius", offset_of!(RectUniforms, corner_radius)),
    ];
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub uv: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Two triangles covering the unit square, drawn without an index buffer.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { uv: [0.0, 0.0] }, // top left
    QuadVertex { uv: [1.0, 0.0] }, // top right
    QuadVertex { uv: [1.0, 1.0] }, // bottom right
    QuadVertex { uv: [1.0, 1.0] },
    QuadVertex { uv: [0.0, 1.0] },
    QuadVertex { uv: [0.0, 0.0] },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pipeline::ShaderArtifact;

    #[test]
    fn global_uniforms_are_16_bytes() {
        assert_eq!(size_of::<GlobalUniforms>(), 16);
    }

    #[test]
    fn rect_uniforms_are_80_bytes() {
        assert_eq!(size_of::<RectUniforms>(), 80);
        assert_eq!(offset_of!(RectUniforms, corner_radius), 64);
    }

    #[test]
    fn wgsl_struct_layouts_match_rust() {
        let shader = ShaderArtifact::rect().unwrap();
        shader.check_layout::<GlobalUniforms>().unwrap();
        shader.check_layout::<RectUniforms>().unwrap();
    }

    #[test]
    fn wgsl_declares_no_extra_members() {
        let shader = ShaderArtifact::rect().unwrap();
        let layout = shader.struct_layout(RectUniforms::WGSL_NAME).unwrap();
        let names: Vec<&str> = layout.members.iter().map(|(n, _)| n.as_str()).collect();
        let expected: Vec<&str> = RectUniforms::FIELDS.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, expected);
        assert_eq!(layout.span as u64, RectUniforms::byte_size());
    }

    #[test]
    fn quad_vertices_form_unit_square() {
        let mut uvs: Vec<[f32; 2]> = QUAD_VERTICES.iter().map(|v| v.uv).collect();
        assert_eq!(uvs.len(), 6);
        uvs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        uvs.dedup();
        assert_eq!(uvs, vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn builder_normalizes_and_clamps() {
        let u = RectUniforms::new(Rect::new(220.0, 120.0, -200.0, -100.0))
            .with_border(BorderWidths::new(-1.0, 1.0, 1.0, 1.0), ColorRgba::black())
            .with_corner_radius(-3.0);
        assert_eq!(u.origin, [20.0, 20.0]);
        assert_eq!(u.size, [200.0, 100.0]);
        assert_eq!(u.border_thickness, [0.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.corner_radius, 0.0);
        assert_eq!(u.border(), BorderWidths::new(0.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn non_finite_rect_collapses_to_nothing() {
        let u = RectUniforms::new(Rect::new(f32::NAN, 10.0, 50.0, f32::INFINITY));
        assert_eq!(u.rect(), Rect::default());
        assert!(u.rect().is_empty());
        assert_eq!(u.border(), BorderWidths::none());
    }
}
