/// What `present` does with work that is still executing on the GPU.
///
/// `Immediate` keeps CPU and GPU overlapped: `present` returns as soon as the
/// frame is queued, so latency is bounded by the swapchain depth rather than
/// by the GPU. `WaitForCompletion` blocks on the frame's submission before
/// presenting, trading one frame of throughput for a deterministic "what you
/// see is what finished" loop (useful under capture tools and in tests).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PresentPolicy {
    #[default]
    Immediate,
    WaitForCompletion,
}

impl PresentPolicy {
    /// Parses `immediate` or `wait` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Some(Self::Immediate),
            "wait" | "wait-for-completion" => Some(Self::WaitForCompletion),
            _ => None,
        }
    }
}

/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Color format requested for the surface.
    ///
    /// The blend setup assumes an 8-bit non-sRGB target, so the default is
    /// `Bgra8Unorm`. Falls back to another non-sRGB format if unsupported.
    pub preferred_format: wgpu::TextureFormat,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported and never tears.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,

    pub present_policy: PresentPolicy,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            preferred_format: wgpu::TextureFormat::Bgra8Unorm,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
            present_policy: PresentPolicy::default(),
        }
    }
}
