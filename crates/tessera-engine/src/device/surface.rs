use anyhow::{anyhow, Result};
use winit::dpi::{LogicalSize, PhysicalSize};

use crate::coords::Viewport;
use crate::render::GlobalUniforms;

use super::{Drawable, GpuInit, SurfaceErrorAction};

/// Physical backing size for a size in points at `scale` (device pixel ratio).
pub fn physical_from_points(points: LogicalSize<f64>, scale: f64) -> PhysicalSize<u32> {
    points.to_physical(scale)
}

/// Size bookkeeping for the swapchain, independent of any GPU object.
///
/// `current` always follows the latest resize. `configured` is the size the
/// surface was last configured with; it only moves for non-zero sizes because
/// wgpu rejects 0x0 configurations.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfaceSize {
    current: PhysicalSize<u32>,
    configured: Option<PhysicalSize<u32>>,
}

impl SurfaceSize {
    pub fn new(initial: PhysicalSize<u32>) -> Self {
        Self {
            current: initial,
            configured: None,
        }
    }

    /// A zero-area surface (minimized, mid-resize) has no drawable.
    #[inline]
    pub fn is_drawable(self) -> bool {
        self.current.width > 0 && self.current.height > 0
    }

    /// Records `new_size`; returns `true` if the surface must be reconfigured.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) -> bool {
        self.current = new_size;
        if !self.is_drawable() || self.configured == Some(new_size) {
            return false;
        }
        self.configured = Some(new_size);
        true
    }

    /// Viewport uniform matching the current backing size.
    #[inline]
    pub fn globals(self) -> GlobalUniforms {
        GlobalUniforms::from_viewport(Viewport::from_physical(self.current))
    }
}

/// Maps a failed acquisition to what the frame loop should do.
///
/// Acquisition never blocks indefinitely: a timeout is a skipped frame, not a retry.
pub fn surface_error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    preferred: wgpu::TextureFormat,
) -> Option<wgpu::TextureFormat> {
    if formats.contains(&preferred) {
        return Some(preferred);
    }

    let fallback = [
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Rgba8Unorm,
    ];
    fallback
        .into_iter()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| !f.is_srgb()))
        .or_else(|| formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Owns the platform surface and hands out one drawable per frame.
pub struct SurfaceManager<'w> {
    /// Surface lifetime is tied to the window via `'w`.
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: SurfaceSize,
}

impl<'w> SurfaceManager<'w> {
    pub(crate) fn new(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        initial: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = choose_surface_format(&caps.formats, init.preferred_format)
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;

        if format != init.preferred_format {
            log::warn!(
                "surface does not support {:?}; falling back to {:?}",
                init.preferred_format,
                format
            );
        }
        if format.is_srgb() {
            log::warn!("surface format {format:?} is sRGB; blending will happen in linear space");
        }

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: initial.width.max(1),
            height: initial.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: choose_alpha_mode(&caps.alpha_modes, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        let mut manager = Self {
            surface,
            config,
            size: SurfaceSize::new(initial),
        };
        manager.on_resize(device, initial);

        log::info!(
            "surface configured: {:?} {}x{} ({:?})",
            format,
            initial.width,
            initial.height,
            manager.config.present_mode
        );
        Ok(manager)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Viewport uniform for the next frame.
    pub fn globals(&self) -> GlobalUniforms {
        self.size.globals()
    }

    /// Resizes the backing store to `new_size` physical pixels.
    ///
    /// Zero sizes are recorded and the configuration is deferred.
    pub fn on_resize(&mut self, device: &wgpu::Device, new_size: PhysicalSize<u32>) {
        if !self.size.resize(new_size) {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(device, &self.config);
        log::debug!("surface resized to {}x{}", new_size.width, new_size.height);
    }

    /// Resizes from a size in points and the backing scale factor.
    pub fn on_resize_points(&mut self, device: &wgpu::Device, points: LogicalSize<f64>, scale: f64) {
        self.on_resize(device, physical_from_points(points, scale));
    }

    /// Acquires the next drawable.
    ///
    /// `Ok(None)` means "skip this frame"; `Err` is fatal.
    pub fn acquire_drawable(&mut self, device: &wgpu::Device) -> Result<Option<Drawable>> {
        if !self.size.is_drawable() {
            return Ok(None);
        }

        let err = match self.surface.get_current_texture() {
            Ok(texture) => {
                let drawable = Drawable::new(texture);
                if drawable.is_suboptimal() {
                    log::debug!("acquired a suboptimal drawable");
                }
                return Ok(Some(drawable));
            }
            Err(err) => err,
        };

        match surface_error_action(&err) {
            SurfaceErrorAction::Reconfigured => {
                log::warn!("surface {err}; reconfiguring");
                self.surface.configure(device, &self.config);
                Ok(None)
            }
            SurfaceErrorAction::SkipFrame => {
                log::debug!("no drawable available ({err}); skipping frame");
                Ok(None)
            }
            SurfaceErrorAction::Fatal => Err(anyhow!("failed to acquire drawable: {err}")),
        }
    }
}
