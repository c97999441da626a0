//! Coordinate and geometry types shared by the renderer and the host.
//!
//! Canonical CPU space:
//! - Physical pixels (the drawable's backing store, not points)
//! - Origin top-left
//! - +X right, +Y down
//!
//! The vertex stage converts to NDC using the global viewport uniform.

mod border;
mod color;
mod rect;
mod vec2;
mod viewport;

pub use border::BorderWidths;
pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
