/// Represents a single acquired frame.
///
/// This object is short-lived and must be finalized promptly. Holding the surface
/// texture prevents acquisition of subsequent frames.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,

    /// Swapchain view. Draws land here directly, or via `msaa_view` when multisampling.
    pub view: wgpu::TextureView,

    /// Multisampled color target resolving into `view`, if antialiasing is active.
    pub msaa_view: Option<wgpu::TextureView>,

    /// Depth/stencil attachment, if one was requested.
    pub depth_view: Option<wgpu::TextureView>,

    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Returns `(view, resolve_target)` for a color attachment.
    pub fn color_attachment(&self) -> (&wgpu::TextureView, Option<&wgpu::TextureView>) {
        match self.msaa_view.as_ref() {
            Some(msaa) => (msaa, Some(&self.view)),
            None => (&self.view, None),
        }
    }
}
