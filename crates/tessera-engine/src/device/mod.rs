//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) and tracking its size
//! - acquiring one drawable per frame and presenting it

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::Drawable;
pub use gpu::Gpu;
pub use init::{GpuInit, PresentPolicy};
pub use surface::{physical_from_points, surface_error_action, SurfaceManager, SurfaceSize};
