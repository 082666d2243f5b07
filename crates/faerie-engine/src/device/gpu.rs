use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::{scope, surface};
use super::{ApiTier, ContextOptions, ContextSource, GpuFrame, SurfaceErrorAction};

/// Initialization parameters for the GPU layer that are not part of the
/// host-facing `ContextOptions`.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Required wgpu features.
    ///
    /// Favor an empty set so the GL tier stays reachable.
    pub required_features: wgpu::Features,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            required_features: wgpu::Features::empty(),
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue for one API tier
/// - creates and configures the Surface (swapchain)
/// - owns the MSAA and depth/stencil attachments implied by `ContextOptions`
/// - acquires frames and provides an encoder + views for rendering
pub struct Gpu<'w> {
    /// Kept alive for the lifetime of the surface.
    _instance: wgpu::Instance,

    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; architecture must ensure the window
    /// outlives the `Gpu` instance.
    surface: wgpu::Surface<'w>,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    tier: ApiTier,

    sample_count: u32,
    depth_format: Option<wgpu::TextureFormat>,
    msaa_view: Option<wgpu::TextureView>,
    depth_view: Option<wgpu::TextureView>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window using only the backends of `tier`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(
        window: &'w Window,
        tier: ApiTier,
        options: ContextOptions,
        init: GpuInit,
    ) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            prefer_srgb,
            required_features,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: tier.backends(),
            ..Default::default()
        });

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: options.power_preference.to_wgpu(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        if options.fail_if_major_performance_caveat {
            anyhow::ensure!(
                info.device_type != wgpu::DeviceType::Cpu,
                "adapter '{}' is a software renderer",
                info.name
            );
        }

        let base_limits = match tier {
            ApiTier::Preferred => wgpu::Limits::default(),
            ApiTier::Compatibility => wgpu::Limits::downlevel_webgl2_defaults(),
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("faerie-engine device"),
                required_features,
                required_limits: base_limits.using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;
        scope::log_uncaptured_errors(&device);

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = surface::choose_alpha_mode(
            &surface_caps.alpha_modes,
            surface::requested_alpha_mode(&options),
        );
        let present_mode =
            surface::choose_present_mode(&surface_caps.present_modes, options.desynchronized);
        let sample_count = surface::choose_sample_count(
            options.antialias,
            adapter.get_texture_format_features(format).flags,
        );

        let config = wgpu::SurfaceConfiguration {
            usage: surface::surface_usage(surface_caps.usages, options.preserve_drawing_buffer),
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        log::debug!(
            "'{tier}' context on {} ({:?}): format={format:?} present={present_mode:?} alpha={alpha_mode:?} samples={sample_count}",
            info.name,
            info.backend,
        );

        let mut gpu = Self {
            _instance: instance,
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            tier,
            sample_count,
            depth_format: options.depth_stencil_format(),
            msaa_view: None,
            depth_view: None,
        };
        gpu.rebuild_attachments();
        Ok(gpu)
    }

    /// Returns the tier this context was acquired on.
    pub fn tier(&self) -> ApiTier {
        self.tier
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Color/depth sample count every pipeline drawing to this surface must use.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Depth/stencil attachment format, if the context has one.
    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth_format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Width over height of the drawable; `1.0` while the surface is collapsed.
    pub fn aspect_ratio(&self) -> f32 {
        if self.size.width == 0 || self.size.height == 0 {
            return 1.0;
        }
        self.size.width as f32 / self.size.height as f32
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Reconfigures the surface and its attachments after a resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let reconfigured = surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
        if reconfigured {
            self.rebuild_attachments();
        }
    }

    /// Acquires the next surface texture and creates an encoder.
    ///
    /// The returned frame owns the surface texture. Releasing it (after submission)
    /// presents the frame.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("faerie frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            msaa_view: self.msaa_view.clone(),
            depth_view: self.depth_view.clone(),
            encoder,
        })
    }

    /// Submits the recorded commands for the given frame.
    ///
    /// Presentation occurs when `surface_texture` is dropped after submission.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
            ..
        } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }

    fn rebuild_attachments(&mut self) {
        self.msaa_view = (self.sample_count > 1).then(|| {
            surface::create_attachment(
                &self.device,
                "faerie msaa color",
                &self.config,
                self.config.format,
                self.sample_count,
            )
        });

        self.depth_view = self.depth_format.map(|format| {
            surface::create_attachment(
                &self.device,
                "faerie depth/stencil",
                &self.config,
                format,
                self.sample_count,
            )
        });
    }
}

/// `ContextSource` that builds a [`Gpu`] for a window, one tier at a time.
pub struct WindowContextSource<'w> {
    window: &'w Window,
    init: GpuInit,
}

impl<'w> WindowContextSource<'w> {
    pub fn new(window: &'w Window, init: GpuInit) -> Self {
        Self { window, init }
    }
}

impl<'w> ContextSource for WindowContextSource<'w> {
    type Context = Gpu<'w>;

    fn acquire(&mut self, tier: ApiTier, options: &ContextOptions) -> Option<Gpu<'w>> {
        match pollster::block_on(Gpu::new(self.window, tier, *options, self.init.clone())) {
            Ok(gpu) => Some(gpu),
            Err(e) => {
                log::debug!("'{tier}' context unavailable: {e:#}");
                None
            }
        }
    }
}
