use wgpu::util::DeviceExt;

use crate::coords::ColorRgba;
use crate::device::Drawable;

use super::pipeline::{build_pipeline, EntryPoints, RectPipeline, ShaderArtifact};
use super::uniforms::{GlobalUniforms, QUAD_VERTICES, RectUniforms, UniformLayout};
use super::{RenderCtx, RenderTarget};

/// Frame renderer settings.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Load-op clear color of every frame.
    pub clear_color: ColorRgba,

    /// Arms a one-shot debug capture of the first frame.
    pub capture_first_frame: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: ColorRgba::white(),
            capture_first_frame: false,
        }
    }
}

/// Draws exactly one rounded rectangle per frame.
///
/// GPU resources are created once in [`RectRenderer::new`]. The pipeline and
/// its bind group are rebuilt only when the surface format changes; uniform
/// buffers are persistent and rewritten from the draw-loop thread each frame.
pub struct RectRenderer {
    config: RendererConfig,
    shader: ShaderArtifact,
    pipeline: RectPipeline,
    bind_group: wgpu::BindGroup,

    globals_ubo: wgpu::Buffer,
    rect_ubo: wgpu::Buffer,
    quad_vbo: wgpu::Buffer,

    capture_armed: bool,
    frames_submitted: u64,
}

impl RectRenderer {
    /// Builds the pipeline and static buffers for `format`.
    ///
    /// Any error here is fatal: without a pipeline no frame can be produced.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        config: RendererConfig,
    ) -> Result<Self, super::PipelineError> {
        let shader = ShaderArtifact::rect()?;
        let pipeline = build_pipeline(device, &shader, EntryPoints::default(), format)?;

        let globals_ubo = uniform_buffer::<GlobalUniforms>(device, "tessera globals ubo");
        let rect_ubo = uniform_buffer::<RectUniforms>(device, "tessera rect ubo");
        let bind_group = create_bind_group(device, &pipeline, &globals_ubo, &rect_ubo);

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessera quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            capture_armed: config.capture_first_frame,
            config,
            shader,
            pipeline,
            bind_group,
            globals_ubo,
            rect_ubo,
            quad_vbo,
            frames_submitted: 0,
        })
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Rebuilds the pipeline if the surface now uses a different format.
    pub fn ensure_format(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<(), super::PipelineError> {
        if self.pipeline.format() == format {
            return Ok(());
        }

        log::warn!(
            "surface format changed from {:?} to {:?}; rebuilding rect pipeline",
            self.pipeline.format(),
            format
        );
        self.pipeline = build_pipeline(device, &self.shader, EntryPoints::default(), format)?;
        self.bind_group = create_bind_group(device, &self.pipeline, &self.globals_ubo, &self.rect_ubo);
        Ok(())
    }

    /// Brackets the next frame with a graphics debugger capture.
    pub fn request_capture(&mut self) {
        self.capture_armed = true;
    }

    /// Clears `drawable`, draws `rect` once and submits the work.
    ///
    /// `globals` is the viewport captured for this frame; a resize arriving
    /// later only affects subsequent frames. Returns `None` when the frame is
    /// dropped, in which case nothing was submitted.
    pub fn render_frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        drawable: &Drawable,
        globals: GlobalUniforms,
        rect: &RectUniforms,
    ) -> Option<wgpu::SubmissionIndex> {
        if drawable.format() != self.pipeline.format() {
            log::warn!(
                "dropping frame: drawable is {:?} but pipeline targets {:?}",
                drawable.format(),
                self.pipeline.format()
            );
            return None;
        }

        if !globals.viewport().is_valid() {
            log::debug!("dropping frame: degenerate viewport {:?}", globals.viewport_size);
            return None;
        }

        let size = drawable.size();
        if globals.viewport_size != [size.width as f32, size.height as f32] {
            log::debug!(
                "viewport {:?} differs from drawable {}x{}",
                globals.viewport_size,
                size.width,
                size.height
            );
        }

        let capture = std::mem::take(&mut self.capture_armed);
        if capture {
            log::info!("starting debug capture of frame {}", self.frames_submitted);
            // SAFETY: capture is started and stopped on this thread around a single submit.
            unsafe { ctx.device.start_graphics_debugger_capture() };
        }

        ctx.queue.write_buffer(&self.globals_ubo, 0, bytemuck::bytes_of(&globals));
        ctx.queue.write_buffer(&self.rect_ubo, 0, bytemuck::bytes_of(rect));

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessera frame encoder"),
            });

        if capture {
            encoder.push_debug_group("tessera rect frame");
        }
        {
            let mut target = RenderTarget::new(&mut encoder, drawable.view());
            self.encode_pass(&mut target);
        }
        if capture {
            encoder.pop_debug_group();
        }

        let index = ctx.queue.submit(std::iter::once(encoder.finish()));

        if capture {
            // SAFETY: paired with the start above.
            unsafe { ctx.device.stop_graphics_debugger_capture() };
        }

        self.frames_submitted += 1;
        Some(index)
    }

    fn encode_pass(&self, target: &mut RenderTarget<'_>) {
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera rect pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.clear_color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(self.pipeline.pipeline());
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }
}

fn uniform_buffer<T: UniformLayout>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: T::byte_size(),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    pipeline: &RectPipeline,
    globals_ubo: &wgpu::Buffer,
    rect_ubo: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("tessera rect bind group"),
        layout: pipeline.bind_group_layout(),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_ubo.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: rect_ubo.as_entire_binding(),
            },
        ],
    })
}
