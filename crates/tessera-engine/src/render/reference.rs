//! CPU reference of `shaders/rect.wgsl` and the pipeline's blend state.
//!
//! Every function here mirrors one piece of shader or fixed-function math
//! line for line, so rendering properties (footprint, corner shape, blend
//! behavior) can be checked on machines without a GPU. If the shader changes,
//! this module changes with it.

use crate::coords::{ColorRgba, Rect, Vec2, Viewport};

use super::uniforms::{GlobalUniforms, RectUniforms};

/// Lower bound on outer coverage when splitting it into fill and border.
const MIN_COVERAGE: f32 = 1e-4;

/// Vertex stage: unit-quad `uv` to pixel position (top-left origin).
#[inline]
pub fn vertex_pixel(uv: Vec2, rect: &RectUniforms) -> Vec2 {
    Vec2::from_array(rect.origin) + uv * Vec2::from_array(rect.size)
}

/// Vertex stage: pixel position to normalized device coordinates (+Y up).
#[inline]
pub fn pixel_to_ndc(pixel: Vec2, globals: &GlobalUniforms) -> Vec2 {
    let [w, h] = globals.viewport_size;
    Vec2::new(pixel.x / w * 2.0 - 1.0, 1.0 - pixel.y / h * 2.0)
}

/// Inverse of the viewport transform the rasterizer applies to NDC.
#[inline]
pub fn ndc_to_pixel(ndc: Vec2, globals: &GlobalUniforms) -> Vec2 {
    let [w, h] = globals.viewport_size;
    Vec2::new((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h)
}

/// Signed distance from `p` (relative to the box center) to a rounded box.
///
/// Negative inside. The radius is clamped to `[0, min(half_size)]`.
pub fn rounded_box_sdf(p: Vec2, half_size: Vec2, radius: f32) -> f32 {
    let r = radius.max(0.0).min(half_size.min_element().max(0.0));
    let q = p.abs() - half_size + Vec2::splat(r);
    q.max(Vec2::zero()).length() + q.max_element().min(0.0) - r
}

/// Fragment stage: straight-alpha color at `rect_pos` (pixel offset from the
/// rect's top-left corner).
pub fn shade(rect: &RectUniforms, rect_pos: Vec2) -> [f32; 4] {
    let size = Vec2::from_array(rect.size);
    let half_size = size * 0.5;
    let outer = rounded_box_sdf(rect_pos - half_size, half_size, rect.corner_radius);

    let border = rect.border().clamped();
    let inner_box = Rect::from_origin_size(Vec2::zero(), size).inset(border);
    let inner_half = inner_box.size * 0.5;
    let inner_radius = (rect.corner_radius - border.max_edge()).max(0.0);
    let inner = rounded_box_sdf(rect_pos - inner_box.center(), inner_half, inner_radius);

    let outer_coverage = (0.5 - outer).clamp(0.0, 1.0);
    let mut fill_coverage = (0.5 - inner).clamp(0.0, 1.0);
    if inner_half.x <= 0.0 || inner_half.y <= 0.0 {
        fill_coverage = 0.0;
    }
    let fill_weight = (fill_coverage / outer_coverage.max(MIN_COVERAGE)).clamp(0.0, 1.0);

    let mut color = [0.0f32; 4];
    for (i, c) in color.iter_mut().enumerate() {
        // WGSL mix(a, b, t) = a * (1 - t) + b * t
        *c = rect.border_color[i] * (1.0 - fill_weight) + rect.background_color[i] * fill_weight;
    }
    color[3] *= outer_coverage;
    color
}

/// Fixed-function blend configured by `pipeline::over_blend`.
#[inline]
pub fn blend_over(src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
    let a = src[3];
    let mut out = [0.0f32; 4];
    for i in 0..4 {
        out[i] = src[i] * a + dst[i] * (1.0 - a);
    }
    out
}

/// Quantizes a color to what an 8-bit unorm target stores.
#[inline]
pub fn to_unorm8(c: [f32; 4]) -> [u8; 4] {
    c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Software render target emulating one frame of the rect pipeline.
///
/// Fragments are generated for pixel centers inside the quad (top-left fill
/// rule), shaded with [`shade`], blended with [`blend_over`] and stored as
/// 8-bit unorm, like the real swapchain image.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTarget {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl ReferenceTarget {
    /// A target cleared to `clear`, like the render pass load op.
    pub fn cleared(width: u32, height: u32, clear: ColorRgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![to_unorm8(clear.to_array()); (width * height) as usize],
        }
    }

    pub fn globals(&self) -> GlobalUniforms {
        GlobalUniforms::from_viewport(self.viewport())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f32, self.height as f32)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Emulates the single draw call of a frame.
    pub fn draw(&mut self, rect: &RectUniforms) {
        let globals = self.globals();

        // Quad corners go through the same NDC round trip the GPU performs.
        let min = ndc_to_pixel(pixel_to_ndc(vertex_pixel(Vec2::zero(), rect), &globals), &globals);
        let max = ndc_to_pixel(
            pixel_to_ndc(vertex_pixel(Vec2::splat(1.0), rect), &globals),
            &globals,
        );

        let quad = Rect::from_origin_size(min, max - min);
        let Some(visible) = quad.clip_to(self.viewport()) else {
            return;
        };
        let (x0, y0) = (visible.origin.x.floor() as u32, visible.origin.y.floor() as u32);
        let far = visible.max();
        let x1 = (far.x.ceil() as u32).min(self.width);
        let y1 = (far.y.ceil() as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if !quad.contains(center) {
                    continue;
                }

                let rect_pos = center - Vec2::from_array(rect.origin);
                let idx = (y * self.width + x) as usize;
                let dst = self.pixels[idx].map(|v| v as f32 / 255.0);
                self.pixels[idx] = to_unorm8(blend_over(shade(rect, rect_pos), dst));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::BorderWidths;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn scenario_rect() -> RectUniforms {
        RectUniforms::new(Rect::new(20.0, 20.0, 200.0, 100.0))
            .with_background(ColorRgba::new(0.8, 0.8, 0.8, 1.0))
            .with_border(BorderWidths::all(1.0), ColorRgba::gray(0.1))
            .with_corner_radius(8.0)
    }

    fn gray8(level: f32) -> [u8; 4] {
        to_unorm8(ColorRgba::gray(level).to_array())
    }

    // ── sdf ───────────────────────────────────────────────────────────────

    #[test]
    fn zero_radius_matches_box_test() {
        let half = Vec2::new(100.0, 50.0);
        for iy in -60..=60 {
            for ix in -110..=110 {
                let p = Vec2::new(ix as f32 + 0.25, iy as f32 + 0.25);
                let in_box = p.x.abs() < half.x && p.y.abs() < half.y;
                assert_eq!(rounded_box_sdf(p, half, 0.0) < 0.0, in_box, "at {p:?}");
            }
        }
    }

    #[test]
    fn sdf_at_rounded_corner_is_radial() {
        let half = Vec2::new(10.0, 10.0);
        // Corner arc center sits at (half - r); distance is measured from it.
        let d = rounded_box_sdf(Vec2::new(10.0, 10.0), half, 4.0);
        let expected = Vec2::splat(4.0).length() - 4.0;
        assert!((d - expected).abs() < 1e-5);
    }

    #[test]
    fn oversized_radius_is_clamped_to_half_extent() {
        let half = Vec2::new(10.0, 5.0);
        assert_eq!(
            rounded_box_sdf(Vec2::new(0.0, 5.0), half, 100.0),
            rounded_box_sdf(Vec2::new(0.0, 5.0), half, 5.0)
        );
    }

    // ── vertex stage ──────────────────────────────────────────────────────

    #[test]
    fn quad_corners_land_on_rect_corners() {
        let rect = scenario_rect();
        let globals = GlobalUniforms::new(800.0, 600.0);

        let tl = pixel_to_ndc(vertex_pixel(Vec2::zero(), &rect), &globals);
        let br = pixel_to_ndc(vertex_pixel(Vec2::splat(1.0), &rect), &globals);
        assert_eq!(tl, Vec2::new(20.0 / 400.0 - 1.0, 1.0 - 20.0 / 300.0));

        let br_px = ndc_to_pixel(br, &globals);
        assert!((br_px.x - 220.0).abs() < 1e-3 && (br_px.y - 120.0).abs() < 1e-3);
    }

    // ── blend ─────────────────────────────────────────────────────────────

    #[test]
    fn opaque_source_replaces_destination() {
        let src = [0.2, 0.4, 0.6, 1.0];
        assert_eq!(blend_over(src, [1.0, 0.0, 1.0, 1.0]), src);
    }

    #[test]
    fn transparent_source_keeps_destination() {
        let dst = [0.3, 0.3, 0.3, 1.0];
        assert_eq!(blend_over([1.0, 0.0, 0.0, 0.0], dst), dst);
    }

    #[test]
    fn drawing_an_opaque_sharp_rect_twice_is_idempotent() {
        let rect = RectUniforms::new(Rect::new(5.0, 7.0, 30.0, 20.0))
            .with_background(ColorRgba::new(0.9, 0.1, 0.2, 1.0))
            .with_border(BorderWidths::all(2.0), ColorRgba::black());

        let mut once = ReferenceTarget::cleared(48, 40, ColorRgba::white());
        once.draw(&rect);
        let mut twice = once.clone();
        twice.draw(&rect);
        assert_eq!(once, twice);
    }

    #[test]
    fn fully_covered_pixels_are_stable_under_redraw() {
        let rect = scenario_rect();
        let mut once = ReferenceTarget::cleared(240, 140, ColorRgba::white());
        once.draw(&rect);
        let mut twice = once.clone();
        twice.draw(&rect);

        for y in 0..140 {
            for x in 0..240 {
                let c = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - Vec2::from_array(rect.origin);
                if shade(&rect, c)[3] >= 1.0 {
                    assert_eq!(once.pixel(x, y), twice.pixel(x, y), "at ({x}, {y})");
                }
            }
        }
    }

    // ── footprint ─────────────────────────────────────────────────────────

    #[test]
    fn footprint_stays_inside_rect_and_viewport() {
        let cases = [
            (Rect::new(3.0, 4.0, 20.0, 10.0), 0.0, Viewport::new(32.0, 24.0)),
            (Rect::new(10.5, 2.25, 13.0, 17.5), 5.0, Viewport::new(32.0, 24.0)),
            (Rect::new(20.0, 15.0, 40.0, 40.0), 6.0, Viewport::new(32.0, 24.0)),
            (Rect::new(-8.0, -8.0, 16.0, 16.0), 3.0, Viewport::new(16.0, 16.0)),
        ];

        for (bounds, radius, viewport) in cases {
            let rect = RectUniforms::new(bounds)
                .with_background(ColorRgba::new(0.0, 0.0, 1.0, 1.0))
                .with_corner_radius(radius);
            let mut target =
                ReferenceTarget::cleared(viewport.width as u32, viewport.height as u32, ColorRgba::white());
            target.draw(&rect);

            let visible = bounds.clip_to(viewport);
            for y in 0..viewport.height as u32 {
                for x in 0..viewport.width as u32 {
                    if target.pixel(x, y) == WHITE {
                        continue;
                    }
                    let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let r = visible.unwrap_or_else(|| panic!("drew outside viewport at ({x}, {y})"));
                    assert!(r.contains(center), "overdraw at ({x}, {y}) for {bounds:?}");
                }
            }

            // Interior away from corners is always painted.
            if let Some(r) = visible {
                let c = r.center();
                if bounds.contains(c) && (c - bounds.center()).abs().max_element() + radius < bounds.size.min_element() * 0.5 {
                    assert_ne!(target.pixel(c.x as u32, c.y as u32), WHITE);
                }
            }
        }
    }

    // ── edges and borders ─────────────────────────────────────────────────

    #[test]
    fn borderless_white_rect_on_white_is_invisible() {
        let rect = RectUniforms::new(Rect::new(4.0, 4.0, 40.0, 30.0))
            .with_background(ColorRgba::white())
            .with_corner_radius(8.0);
        let mut target = ReferenceTarget::cleared(48, 40, ColorRgba::white());
        target.draw(&rect);

        // Alpha follows the over equation too; only color must be untouched.
        for y in 0..40 {
            for x in 0..48 {
                let px = target.pixel(x, y);
                assert_eq!(&px[..3], &WHITE[..3], "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn borderless_corner_never_darker_than_fill() {
        let rect = RectUniforms::new(Rect::new(4.0, 4.0, 40.0, 30.0))
            .with_background(ColorRgba::gray(0.5))
            .with_corner_radius(8.0);
        let mut target = ReferenceTarget::cleared(48, 40, ColorRgba::white());
        target.draw(&rect);

        let fill = gray8(0.5)[0];
        for y in 0..40 {
            for x in 0..48 {
                let px = target.pixel(x, y);
                assert!(px[0] >= fill, "fringe at ({x}, {y}): {px:?}");
            }
        }
    }

    #[test]
    fn per_edge_border_widths_follow_css_order() {
        // top 4, right 1, bottom 2, left 3 around a sharp 40x30 rect at (10, 10).
        let rect = RectUniforms::new(Rect::new(10.0, 10.0, 40.0, 30.0))
            .with_background(ColorRgba::gray(0.8))
            .with_border(BorderWidths::new(4.0, 1.0, 2.0, 3.0), ColorRgba::gray(0.1));
        let mut target = ReferenceTarget::cleared(64, 56, ColorRgba::white());
        target.draw(&rect);

        let border = gray8(0.1);
        let fill = gray8(0.8);

        // Horizontal cut through the middle row.
        assert_eq!(target.pixel(9, 25), WHITE);
        for x in 10..13 {
            assert_eq!(target.pixel(x, 25), border, "left edge at x={x}");
        }
        assert_eq!(target.pixel(13, 25), fill);
        assert_eq!(target.pixel(48, 25), fill);
        assert_eq!(target.pixel(49, 25), border);
        assert_eq!(target.pixel(50, 25), WHITE);

        // Vertical cut through the middle column.
        assert_eq!(target.pixel(30, 9), WHITE);
        for y in 10..14 {
            assert_eq!(target.pixel(30, y), border, "top edge at y={y}");
        }
        assert_eq!(target.pixel(30, 14), fill);
        assert_eq!(target.pixel(30, 37), fill);
        assert_eq!(target.pixel(30, 38), border);
        assert_eq!(target.pixel(30, 39), border);
        assert_eq!(target.pixel(30, 40), WHITE);
    }

    #[test]
    fn borders_meeting_paint_whole_rect_in_border_color() {
        // top + bottom equal the height: no fill area is left.
        let rect = RectUniforms::new(Rect::new(10.0, 10.0, 20.0, 12.0))
            .with_background(ColorRgba::gray(0.8))
            .with_border(BorderWidths::new(6.0, 1.0, 6.0, 1.0), ColorRgba::gray(0.1));
        let mut target = ReferenceTarget::cleared(40, 32, ColorRgba::white());
        target.draw(&rect);

        let border = gray8(0.1);
        for y in 10..22 {
            for x in 10..30 {
                assert_eq!(target.pixel(x, y), border, "at ({x}, {y})");
            }
        }
        assert_eq!(target.pixel(9, 15), WHITE);
        assert_eq!(target.pixel(30, 15), WHITE);
    }

    // ── end to end ────────────────────────────────────────────────────────

    #[test]
    fn scenario_light_gray_rect_on_white() {
        let rect = scenario_rect();
        let mut target = ReferenceTarget::cleared(800, 600, ColorRgba::white());
        target.draw(&rect);

        let border = gray8(0.1);
        let fill = gray8(0.8);

        // Straight edges: 1px border starting exactly at 20 and ending at 219.
        assert_eq!(target.pixel(19, 60), WHITE);
        assert_eq!(target.pixel(20, 60), border);
        assert_eq!(target.pixel(21, 60), fill);
        assert_eq!(target.pixel(218, 60), fill);
        assert_eq!(target.pixel(219, 60), border);
        assert_eq!(target.pixel(220, 60), WHITE);

        assert_eq!(target.pixel(120, 19), WHITE);
        assert_eq!(target.pixel(120, 20), border);
        assert_eq!(target.pixel(120, 119), border);
        assert_eq!(target.pixel(120, 120), WHITE);

        assert_eq!(target.pixel(120, 70), fill);

        // Rounded corners leave the bounding-box corners unpainted.
        assert_eq!(target.pixel(20, 20), WHITE);
        assert_eq!(target.pixel(219, 119), WHITE);

        // Everything outside the rect stays cleared.
        assert_eq!(target.pixel(0, 0), WHITE);
        assert_eq!(target.pixel(799, 599), WHITE);
        assert_eq!(target.pixel(400, 300), WHITE);
    }

    #[test]
    fn resize_keeps_absolute_pixel_footprint() {
        let rect = scenario_rect();

        let mut large = ReferenceTarget::cleared(800, 600, ColorRgba::white());
        large.draw(&rect);
        let mut small = ReferenceTarget::cleared(400, 300, ColorRgba::white());
        small.draw(&rect);

        assert_eq!(small.viewport(), Viewport::new(400.0, 300.0));
        for y in 0..300 {
            for x in 0..400 {
                assert_eq!(small.pixel(x, y), large.pixel(x, y), "at ({x}, {y})");
            }
        }
        assert_eq!(small.pixel(399, 299), WHITE);
    }
}
