use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::window::Window;

use crate::core::FramePresenter;
use crate::render::{GlobalUniforms, RenderCtx};

use super::{Drawable, GpuInit, PresentPolicy, SurfaceManager};

/// Owns wgpu core objects and the window's surface.
///
/// This type is the low-level rendering context:
/// - creates Adapter/Device/Queue
/// - owns the [`SurfaceManager`] (swapchain + size tracking)
/// - acquires and presents drawables according to the [`PresentPolicy`]
pub struct Gpu<'w> {
    /// Window the surface presents into.
    window: &'w Window,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    surface: SurfaceManager<'w>,

    present_policy: PresentPolicy,

    /// Set from the device-lost callback.
    device_lost: Arc<AtomicBool>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu. Every failure here
    /// is fatal for the session and is returned to the caller.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter `{}` ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tessera device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let device_lost = Arc::new(AtomicBool::new(false));
        let lost_flag = Arc::clone(&device_lost);
        device.set_device_lost_callback(move |reason, message| {
            log::error!("GPU device lost ({reason:?}): {message}");
            lost_flag.store(true, Ordering::Release);
        });

        let surface = SurfaceManager::new(surface, &adapter, &device, size, &init)
            .context("failed to configure surface")?;

        Ok(Self {
            window,
            device,
            queue,
            surface,
            present_policy: init.present_policy,
            device_lost,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.format()
    }

    /// Viewport uniform derived from the latest resize.
    pub fn globals(&self) -> GlobalUniforms {
        self.surface.globals()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }

    /// Renderer-facing view of this context.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, self.surface.format())
    }

    /// Reconfigures the surface after a resize.
    pub fn on_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.on_resize(&self.device, new_size);
    }

    /// Reconfigures the surface from a size in points and a backing scale factor.
    pub fn on_resize_points(&mut self, points: LogicalSize<f64>, scale: f64) {
        self.surface.on_resize_points(&self.device, points, scale);
    }
}

impl FramePresenter for Gpu<'_> {
    type Drawable = Drawable;
    type Submission = wgpu::SubmissionIndex;

    fn acquire_drawable(&mut self) -> Result<Option<Drawable>> {
        if self.is_device_lost() {
            log::debug!("device lost; dropping frame");
            return Ok(None);
        }
        self.surface.acquire_drawable(&self.device)
    }

    fn present(&mut self, drawable: Drawable, submission: wgpu::SubmissionIndex) {
        if self.present_policy == PresentPolicy::WaitForCompletion {
            let wait = wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: None,
            };
            if let Err(e) = self.device.poll(wait) {
                log::warn!("waiting for frame completion failed: {e}");
            }
        }

        self.window.pre_present_notify();
        drawable.present();
    }
}
