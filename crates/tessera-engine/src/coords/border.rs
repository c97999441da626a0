/// Per-edge border thickness in physical pixels.
///
/// Edges follow CSS order: top, right, bottom, left. This is also the
/// component order of `RectUniforms::border_thickness` on the GPU side.
/// Negative values are treated as zero.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BorderWidths {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl BorderWidths {
    #[inline]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Same thickness on all four edges.
    #[inline]
    pub const fn all(w: f32) -> Self {
        Self { top: w, right: w, bottom: w, left: w }
    }

    /// No border.
    #[inline]
    pub const fn none() -> Self {
        Self::all(0.0)
    }

    /// Thickest edge. Used to shrink the inner corner radius.
    #[inline]
    pub fn max_edge(self) -> f32 {
        self.top.max(self.right).max(self.bottom).max(self.left)
    }

    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(
            self.top.max(0.0),
            self.right.max(0.0),
            self.bottom.max(0.0),
            self.left.max(0.0),
        )
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}
