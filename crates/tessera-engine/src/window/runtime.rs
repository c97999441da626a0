use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{drive_tick, App, FrameInfo, LaunchInfo, TickOutcome};
use crate::device::{Gpu, GpuInit};
use crate::render::{RectRenderer, RendererConfig};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// Redraw on every loop iteration instead of only after launch/resize.
    pub continuous_redraw: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tessera".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            continuous_redraw: false,
        }
    }
}

/// Entry point for the host runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the event loop until the window closes.
    ///
    /// Fatal setup errors (no adapter, pipeline rejected) and fatal frame errors
    /// end the loop and are returned here; deciding to terminate the process is
    /// left to the caller.
    pub fn run<A>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer_config: RendererConfig,
        app: A,
    ) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, renderer_config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Everything that exists between launch and close.
struct Session {
    entry: WindowEntry,
    renderer: RectRenderer,
    frame_index: u64,

    /// Window size in points, kept across scale factor changes.
    points: LogicalSize<f64>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_config: RendererConfig,
    app: A,

    session: Option<Session>,
    fatal: Option<anyhow::Error>,
    launched: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, renderer_config: RendererConfig, app: A) -> Self {
        Self {
            config,
            gpu_init,
            renderer_config,
            app,
            session: None,
            fatal: None,
            launched: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.session = None;
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn launch(&mut self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w: &Window| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let renderer = entry
            .with_gpu(|gpu| {
                RectRenderer::new(gpu.device(), gpu.surface_format(), self.renderer_config.clone())
            })
            .context("failed to build rect pipeline")?;

        let info = entry.with_gpu(|gpu| LaunchInfo {
            surface_format: gpu.surface_format(),
            globals: gpu.globals(),
        });
        self.app.on_launch(&info);

        log::info!(
            "launched: {:?} viewport {:?}",
            info.surface_format,
            info.globals.viewport_size
        );

        let points = entry.with_window(|w| w.inner_size().to_logical(w.scale_factor()));
        entry.with_window(|w| w.request_redraw());

        Ok(Session {
            entry,
            renderer,
            frame_index: 0,
            points,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.points = session
            .entry
            .with_window(|w| new_size.to_logical(w.scale_factor()));
        session.entry.with_gpu_mut(|gpu| gpu.on_resize(new_size));
        self.after_resize();
    }

    /// The window keeps its size in points; the backing store follows `scale`.
    fn rescale(&mut self, scale: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let points = session.points;
        session
            .entry
            .with_gpu_mut(|gpu| gpu.on_resize_points(points, scale));
        self.after_resize();
    }

    fn after_resize(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let globals = session.entry.with_gpu(|gpu| gpu.globals());
        self.app.on_resize(globals);
        session.entry.with_window(|w| w.request_redraw());
    }

    /// One display tick. Errors returned here are fatal.
    fn redraw(&mut self) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let Session {
            entry,
            renderer,
            frame_index,
            ..
        } = session;

        let format = entry.with_gpu(|gpu| gpu.surface_format());
        entry
            .with_gpu(|gpu| renderer.ensure_format(gpu.device(), format))
            .context("failed to rebuild rect pipeline")?;

        let frame = FrameInfo {
            frame_index: *frame_index,
            globals: entry.with_gpu(|gpu| gpu.globals()),
        };
        *frame_index += 1;
        let rect = self.app.on_frame(&frame);

        let outcome = entry.with_gpu_mut(|gpu| {
            drive_tick(gpu, |gpu, drawable| {
                renderer.render_frame(&gpu.render_ctx(), drawable, frame.globals, &rect)
            })
        })?;

        if outcome != TickOutcome::Presented {
            log::debug!("frame {} {:?}", frame.frame_index, outcome);
        }
        Ok(())
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.launched {
            return;
        }
        self.launched = true;

        match self.launch(event_loop) {
            Ok(session) => self.session = Some(session),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        if self.config.continuous_redraw {
            if let Some(session) = &self.session {
                session.entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let ours = self
            .session
            .as_ref()
            .is_some_and(|s| s.entry.with_window(|w| w.id()) == window_id);
        if !ours {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.app.on_close();
                if let Some(session) = self.session.take() {
                    log::info!("closing after {} frames", session.renderer.frames_submitted());
                }
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => self.rescale(scale_factor),

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}
