//! GPU rendering subsystem.
//!
//! One pipeline, one rectangle, one draw per frame.
//!
//! Convention:
//! - CPU geometry is in physical pixels (top-left origin, +Y down).
//! - Vertex shader converts to NDC using the global viewport uniform.

mod ctx;
pub mod pipeline;
pub mod reference;
mod renderer;
pub mod uniforms;

pub use ctx::{RenderCtx, RenderTarget};
pub use pipeline::{build_pipeline, EntryPoints, PipelineError, RectPipeline, ShaderArtifact};
pub use renderer::{RectRenderer, RendererConfig};
pub use uniforms::{GlobalUniforms, RectUniforms};
