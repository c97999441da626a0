//! Tessera engine crate.
//!
//! Renders a single rounded, bordered rectangle into a window surface with
//! wgpu. Layers, bottom-up:
//!
//! - [`coords`]: pixel-space geometry and colors
//! - [`render`]: uniform layouts, the rect pipeline and the frame renderer
//! - [`device`]: adapter/device setup and the surface/drawable lifecycle
//! - [`core`]: the application trait and the per-tick frame sequence
//! - [`window`]: the `winit` host loop

pub mod core;
pub mod coords;
pub mod device;
pub mod logging;
pub mod render;
pub mod window;
