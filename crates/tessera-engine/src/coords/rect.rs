use super::{BorderWidths, Vec2, Viewport};

/// Axis-aligned rectangle in physical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let Rect { mut origin, mut size } = self;
        if size.x < 0.0 {
            origin.x += size.x;
            size.x = -size.x;
        }
        if size.y < 0.0 {
            origin.y += size.y;
            size.y = -size.y;
        }
        Rect { origin, size }
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        let max = r.max();
        p.x >= r.origin.x && p.y >= r.origin.y && p.x < max.x && p.y < max.y
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let x0 = a.origin.x.max(b.origin.x);
        let y0 = a.origin.y.max(b.origin.y);
        let x1 = a.max().x.min(b.max().x);
        let y1 = a.max().y.min(b.max().y);

        let (w, h) = (x1 - x0, y1 - y0);
        if w <= 0.0 || h <= 0.0 { None } else { Some(Rect::new(x0, y0, w, h)) }
    }

    /// Visible part of the rectangle inside a viewport anchored at (0, 0).
    #[inline]
    pub fn clip_to(self, viewport: Viewport) -> Option<Rect> {
        self.intersect(Rect::new(0.0, 0.0, viewport.width, viewport.height))
    }

    /// Shrinks each edge by the matching border width.
    ///
    /// The result may be empty when the borders meet.
    #[inline]
    pub fn inset(self, border: BorderWidths) -> Rect {
        let b = border.clamped();
        Rect::new(
            self.origin.x + b.left,
            self.origin.y + b.top,
            self.size.x - b.left - b.right,
            self.size.y - b.top - b.bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    #[test]
    fn normalized_negative_extent_flips_origin() {
        let n = r(10.0, 10.0, -4.0, -3.0).normalized();
        assert_eq!(n, r(6.0, 7.0, 4.0, 3.0));
    }

    #[test]
    fn contains_is_half_open() {
        let rect = r(20.0, 20.0, 200.0, 100.0);
        assert!(rect.contains(Vec2::new(20.0, 20.0)));
        assert!(rect.contains(Vec2::new(219.5, 119.5)));
        assert!(!rect.contains(Vec2::new(220.0, 120.0)));
    }

    #[test]
    fn clip_to_viewport_trims_overhang() {
        let rect = r(350.0, 250.0, 100.0, 100.0);
        let clipped = rect.clip_to(Viewport::new(400.0, 300.0)).unwrap();
        assert_eq!(clipped, r(350.0, 250.0, 50.0, 50.0));
    }

    #[test]
    fn clip_to_viewport_outside_is_none() {
        let rect = r(500.0, 0.0, 10.0, 10.0);
        assert!(rect.clip_to(Viewport::new(400.0, 300.0)).is_none());
    }

    #[test]
    fn inset_uses_css_edge_order() {
        let inner = r(0.0, 0.0, 100.0, 50.0).inset(BorderWidths::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(inner, r(4.0, 1.0, 94.0, 46.0));
    }

    #[test]
    fn inset_past_center_is_empty() {
        let inner = r(0.0, 0.0, 4.0, 4.0).inset(BorderWidths::all(3.0));
        assert!(inner.is_empty());
    }
}
