use crate::render::{GlobalUniforms, RectUniforms};

/// Surface facts available once the window and GPU are up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LaunchInfo {
    pub surface_format: wgpu::TextureFormat,
    pub globals: GlobalUniforms,
}

/// Per-tick input to [`App::on_frame`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameInfo {
    /// Monotonic tick counter, including skipped frames.
    pub frame_index: u64,
    /// Viewport this frame will be drawn with.
    pub globals: GlobalUniforms,
}

/// Application contract implemented by higher layers.
///
/// All callbacks run on the event-loop thread.
pub trait App {
    /// Called once after the surface and renderer exist.
    fn on_launch(&mut self, info: &LaunchInfo) {
        let _ = info;
    }

    /// Called after the surface has been resized.
    fn on_resize(&mut self, globals: GlobalUniforms) {
        let _ = globals;
    }

    /// Called when the window is closing; the runtime terminates afterwards.
    fn on_close(&mut self) {}

    /// Called on every display tick; returns the rectangle to draw.
    fn on_frame(&mut self, frame: &FrameInfo) -> RectUniforms;
}
