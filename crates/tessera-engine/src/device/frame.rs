use winit::dpi::PhysicalSize;

/// One acquired swapchain image.
///
/// Short-lived: acquired at the start of a frame and either presented or
/// dropped (discarded) at its end. Holding it blocks acquisition of the next
/// image.
pub struct Drawable {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl Drawable {
    pub(crate) fn new(texture: wgpu::SurfaceTexture) -> Self {
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Color view the render pass targets.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.texture.format()
    }

    /// Backing size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.texture.texture.width(), self.texture.texture.height())
    }

    /// The surface still works but should be reconfigured.
    pub fn is_suboptimal(&self) -> bool {
        self.texture.suboptimal
    }

    pub(crate) fn present(self) {
        let Drawable { texture, view } = self;
        drop(view);
        texture.present();
    }
}
