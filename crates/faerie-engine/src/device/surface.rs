use winit::dpi::PhysicalSize;

use super::{ContextOptions, SurfaceErrorAction};

pub(crate) const MSAA_SAMPLES: u32 = 4;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

/// Alpha compositing mode requested by `options`.
pub(crate) fn requested_alpha_mode(options: &ContextOptions) -> wgpu::CompositeAlphaMode {
    match (options.alpha, options.premultiplied_alpha) {
        (false, _) => wgpu::CompositeAlphaMode::Opaque,
        (true, true) => wgpu::CompositeAlphaMode::PreMultiplied,
        (true, false) => wgpu::CompositeAlphaMode::PostMultiplied,
    }
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: wgpu::CompositeAlphaMode,
) -> wgpu::CompositeAlphaMode {
    if supported.contains(&requested) {
        return requested;
    }
    supported
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

pub(crate) fn choose_present_mode(
    supported: &[wgpu::PresentMode],
    desynchronized: bool,
) -> wgpu::PresentMode {
    if desynchronized && supported.contains(&wgpu::PresentMode::Mailbox) {
        wgpu::PresentMode::Mailbox
    } else {
        wgpu::PresentMode::Fifo
    }
}

pub(crate) fn choose_sample_count(antialias: bool, flags: wgpu::TextureFormatFeatureFlags) -> u32 {
    if antialias && flags.sample_count_supported(MSAA_SAMPLES) {
        MSAA_SAMPLES
    } else {
        1
    }
}

pub(crate) fn surface_usage(
    supported: wgpu::TextureUsages,
    preserve_drawing_buffer: bool,
) -> wgpu::TextureUsages {
    let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
    if preserve_drawing_buffer && supported.contains(wgpu::TextureUsages::COPY_SRC) {
        usage |= wgpu::TextureUsages::COPY_SRC;
    }
    usage
}

/// Creates a render attachment matching the surface extent.
pub(crate) fn create_attachment(
    device: &wgpu::Device,
    label: &str,
    config: &wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Returns `true` when the surface was reconfigured.
///
/// wgpu does not support configuring a surface with a 0x0 size; in that case,
/// only `size` is updated and configuration is deferred.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) -> bool {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return false;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    surface.configure(device, config);
    true
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}
