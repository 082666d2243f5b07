//! The bubble texture: a 1x1 placeholder until the real image arrives.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::error::{DemoError, create_resource};
use crate::loader::LoadedImage;

/// Opaque blue, shown until the image is decoded.
pub const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 255, 255];

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Zero counts as a power of two.
pub fn is_power_of_two(n: u32) -> bool {
    n & n.wrapping_sub(1) == 0
}

/// Levels in a full chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Sampling strategy, fixed by the image dimensions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureFiltering {
    /// Power-of-two image: full mip chain, repeat wrapping.
    Mipmapped,
    /// Anything else: single level, clamp to edge, linear minification.
    ClampLinear,
}

impl TextureFiltering {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if is_power_of_two(width) && is_power_of_two(height) {
            TextureFiltering::Mipmapped
        } else {
            TextureFiltering::ClampLinear
        }
    }

    pub fn level_count(self, width: u32, height: u32) -> u32 {
        match self {
            TextureFiltering::Mipmapped => mip_level_count(width, height),
            TextureFiltering::ClampLinear => 1,
        }
    }

    fn sampler_descriptor(self) -> wgpu::SamplerDescriptor<'static> {
        match self {
            TextureFiltering::Mipmapped => wgpu::SamplerDescriptor {
                label: Some("faerie bubble sampler (mipmapped)"),
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::Repeat,
                address_mode_w: wgpu::AddressMode::Repeat,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Linear,
                ..Default::default()
            },
            TextureFiltering::ClampLinear => wgpu::SamplerDescriptor {
                label: Some("faerie bubble sampler (clamped)"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            },
        }
    }
}

/// Box-filtered chain starting with `base` itself, each level half the last.
pub fn generate_mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(base.width(), base.height());
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base.clone());

    for _ in 1..levels {
        let Some(prev) = chain.last() else { break };
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = imageops::resize(prev, w, h, FilterType::Triangle);
        chain.push(next);
    }

    chain
}

/// GPU texture plus the sampler and bind group that expose it to the fragment stage.
///
/// Replacing the image swaps every handle at once; the slot itself never
/// goes away for the life of the demo.
pub struct BubbleTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    filtering: TextureFiltering,
}

impl BubbleTexture {
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("faerie bubble texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// One blue texel, usable before any image exists.
    pub fn placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, DemoError> {
        let placeholder = RgbaImage::from_pixel(1, 1, image::Rgba(PLACEHOLDER_PIXEL));
        Self::upload(
            device,
            queue,
            layout,
            std::slice::from_ref(&placeholder),
            TextureFiltering::ClampLinear,
            "placeholder texture",
        )
    }

    /// Uploads a decoded image into the slot, replacing the current contents.
    ///
    /// On error the previous texture stays bound.
    pub fn replace(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        image: &LoadedImage,
    ) -> Result<(), DemoError> {
        let (w, h) = (image.width(), image.height());
        let max = device.limits().max_texture_dimension_2d;
        if w == 0 || h == 0 || w > max || h > max {
            return Err(DemoError::ResourceCreation {
                resource: "bubble texture",
                reason: format!(
                    "{} is {w}x{h}, supported range is 1..={max}",
                    image.source.display()
                ),
            });
        }

        let filtering = TextureFiltering::for_dimensions(w, h);
        let levels = match filtering {
            TextureFiltering::Mipmapped => generate_mip_chain(&image.pixels),
            TextureFiltering::ClampLinear => vec![image.pixels.clone()],
        };

        *self = Self::upload(device, queue, layout, &levels, filtering, "bubble texture")?;
        log::debug!("bubble texture now {w}x{h}, {filtering:?}, {} level(s)", levels.len());
        Ok(())
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        levels: &[RgbaImage],
        filtering: TextureFiltering,
        resource: &'static str,
    ) -> Result<Self, DemoError> {
        let (width, height) = levels
            .first()
            .map(|base| (base.width(), base.height()))
            .unwrap_or((1, 1));

        create_resource(device, resource, || {
            Self::create(device, queue, layout, levels, filtering, (width, height))
        })
    }

    fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        levels: &[RgbaImage],
        filtering: TextureFiltering,
        (width, height): (u32, u32),
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("faerie bubble texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len().max(1) as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                level.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.width()),
                    rows_per_image: Some(level.height()),
                },
                wgpu::Extent3d {
                    width: level.width(),
                    height: level.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&filtering.sampler_descriptor());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("faerie bubble texture bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            bind_group,
            filtering,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn filtering(&self) -> TextureFiltering {
        self.filtering
    }

    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_detection() {
        for n in [0, 1, 2, 4, 256, 1 << 31] {
            assert!(is_power_of_two(n), "{n}");
        }
        for n in [3, 6, 100, 255, 257, u32::MAX] {
            assert!(!is_power_of_two(n), "{n}");
        }
    }

    #[test]
    fn square_power_of_two_is_mipmapped() {
        let f = TextureFiltering::for_dimensions(256, 256);
        assert_eq!(f, TextureFiltering::Mipmapped);
        assert_eq!(f.level_count(256, 256), 9);
    }

    #[test]
    fn non_square_power_of_two_is_mipmapped() {
        let f = TextureFiltering::for_dimensions(512, 64);
        assert_eq!(f, TextureFiltering::Mipmapped);
        assert_eq!(f.level_count(512, 64), 10);
    }

    #[test]
    fn any_odd_dimension_clamps() {
        for (w, h) in [(100, 100), (256, 100), (100, 256)] {
            let f = TextureFiltering::for_dimensions(w, h);
            assert_eq!(f, TextureFiltering::ClampLinear, "{w}x{h}");
            assert_eq!(f.level_count(w, h), 1);
        }
    }

    #[test]
    fn clamped_sampler_never_wraps_or_mips() {
        let d = TextureFiltering::ClampLinear.sampler_descriptor();
        assert_eq!(d.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(d.address_mode_v, wgpu::AddressMode::ClampToEdge);
        assert_eq!(d.min_filter, wgpu::FilterMode::Linear);

        let d = TextureFiltering::Mipmapped.sampler_descriptor();
        assert_eq!(d.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(d.mipmap_filter, wgpu::MipmapFilterMode::Linear);
    }

    #[test]
    fn mip_chain_halves_to_one_texel() {
        let base = RgbaImage::from_pixel(8, 2, image::Rgba([10, 20, 30, 255]));
        let sizes: Vec<_> = generate_mip_chain(&base)
            .iter()
            .map(|l| l.dimensions())
            .collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn mip_chain_of_flat_color_stays_flat() {
        let base = RgbaImage::from_pixel(4, 4, image::Rgba([90, 90, 90, 255]));
        let chain = generate_mip_chain(&base);
        let last = chain.last().unwrap();
        assert_eq!(last.dimensions(), (1, 1));
        assert_eq!(last.get_pixel(0, 0).0, [90, 90, 90, 255]);
    }
}
