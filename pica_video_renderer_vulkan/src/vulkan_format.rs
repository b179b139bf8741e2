/// Emulated format to VkFormat resolution
///
/// Not every host GPU supports the packed 16-bit formats or D24 natively,
/// so each emulated format carries an ordered list of candidates. The
/// first candidate with full feature support wins; picking anything but
/// the first means uploads need CPU conversion.

use ash::vk;

use pica_video::runtime::D24S8_STAGING_BYTES_PER_PIXEL;
use pica_video::{default_usage, ImageUsage, PixelFormat, SurfaceType};

/// Host capabilities of one emulated pixel format
#[derive(Debug, Clone, Copy)]
pub struct FormatTraits {
    /// Host format the surface data is stored in
    pub native: vk::Format,
    /// Aspects the native format carries
    pub aspect: vk::ImageAspectFlags,
    /// Usage flags images of this format are created with
    pub usage: vk::ImageUsageFlags,
    /// Uploads must be converted on the CPU before the copy
    pub needs_conversion: bool,
}

/// Candidate host formats in preference order
const fn candidates(format: PixelFormat) -> &'static [vk::Format] {
    match format {
        PixelFormat::RGBA8 => &[vk::Format::R8G8B8A8_UNORM],
        // Three-component formats have no widely supported host texture
        PixelFormat::RGB8 => &[vk::Format::R8G8B8A8_UNORM],
        PixelFormat::RGB5A1 => &[
            vk::Format::R5G5B5A1_UNORM_PACK16,
            vk::Format::A1R5G5B5_UNORM_PACK16,
            vk::Format::R8G8B8A8_UNORM,
        ],
        PixelFormat::RGB565 => &[
            vk::Format::R5G6B5_UNORM_PACK16,
            vk::Format::R8G8B8A8_UNORM,
        ],
        PixelFormat::RGBA4 => &[
            vk::Format::R4G4B4A4_UNORM_PACK16,
            vk::Format::R8G8B8A8_UNORM,
        ],
        PixelFormat::D16 => &[vk::Format::D16_UNORM],
        PixelFormat::D24 => &[
            vk::Format::X8_D24_UNORM_PACK32,
            vk::Format::D32_SFLOAT,
        ],
        PixelFormat::D24S8 => &[
            vk::Format::D24_UNORM_S8_UINT,
            vk::Format::D32_SFLOAT_S8_UINT,
        ],
        PixelFormat::Invalid => &[vk::Format::R8G8B8A8_UNORM],
    }
}

/// Aspects of a host format
pub fn aspect_of(format: PixelFormat) -> vk::ImageAspectFlags {
    match format.surface_type() {
        SurfaceType::Depth => vk::ImageAspectFlags::DEPTH,
        SurfaceType::DepthStencil => {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        }
        _ => vk::ImageAspectFlags::COLOR,
    }
}

/// Image usage flags for a surface type
pub fn usage_of(format: PixelFormat) -> vk::ImageUsageFlags {
    let requested = default_usage(format.surface_type());
    let mut usage = vk::ImageUsageFlags::empty();
    if requested.contains(ImageUsage::SAMPLED) {
        usage |= vk::ImageUsageFlags::SAMPLED;
    }
    if requested.contains(ImageUsage::COLOR_ATTACHMENT) {
        usage |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if requested.contains(ImageUsage::DEPTH_STENCIL_ATTACHMENT) {
        usage |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    if requested.contains(ImageUsage::TRANSFER_SRC) {
        usage |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if requested.contains(ImageUsage::TRANSFER_DST) {
        usage |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    usage
}

/// Bytes one texel occupies in staging memory
///
/// D24S8 stages its aspects as split planes, a 4-byte depth plane plus a
/// 1-byte stencil plane, so the staging footprint is wider than the
/// emulated 4-byte word.
pub const fn staging_bytes_per_pixel(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::D24S8 => D24S8_STAGING_BYTES_PER_PIXEL,
        _ => format.bytes_per_pixel(),
    }
}

/// Optimal tiling features a host format must provide to back surfaces
/// of the given emulated format
fn required_features(format: PixelFormat) -> vk::FormatFeatureFlags {
    let base = vk::FormatFeatureFlags::SAMPLED_IMAGE
        | vk::FormatFeatureFlags::TRANSFER_SRC
        | vk::FormatFeatureFlags::TRANSFER_DST;
    match format.surface_type() {
        SurfaceType::Depth | SurfaceType::DepthStencil => {
            base | vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT
        }
        _ => {
            base | vk::FormatFeatureFlags::COLOR_ATTACHMENT
                | vk::FormatFeatureFlags::BLIT_SRC
                | vk::FormatFeatureFlags::BLIT_DST
        }
    }
}

/// Pick the first supported candidate for an emulated format
///
/// Returns the chosen host format and whether uploads need conversion.
/// RGB8 always converts since its only candidate is four-component.
pub fn pick_native(
    format: PixelFormat,
    supported: impl Fn(vk::Format) -> bool,
) -> (vk::Format, bool) {
    let candidates = candidates(format);
    for (index, &candidate) in candidates.iter().enumerate() {
        if supported(candidate) {
            let converts = index != 0 || format == PixelFormat::RGB8;
            return (candidate, converts);
        }
    }
    // Fall through to the last candidate; every driver supports RGBA8 and
    // one of the depth-stencil formats
    (candidates[candidates.len() - 1], true)
}

/// Resolve the traits of every emulated format against a physical device
pub fn resolve_format_traits(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> [FormatTraits; PixelFormat::COUNT] {
    let formats = [
        PixelFormat::RGBA8,
        PixelFormat::RGB8,
        PixelFormat::RGB5A1,
        PixelFormat::RGB565,
        PixelFormat::RGBA4,
        PixelFormat::D16,
        PixelFormat::D24,
        PixelFormat::D24S8,
    ];

    formats.map(|format| {
        let needed = required_features(format);
        let (native, needs_conversion) = pick_native(format, |candidate| {
            let properties = unsafe {
                instance.get_physical_device_format_properties(physical_device, candidate)
            };
            properties.optimal_tiling_features.contains(needed)
        });
        FormatTraits {
            native,
            aspect: aspect_of(format),
            usage: usage_of(format),
            needs_conversion,
        }
    })
}

/// Clear value in the shape the host API expects for this surface type
pub fn make_clear_value(
    surface_type: SurfaceType,
    value: pica_video::ClearValue,
) -> vk::ClearValue {
    match surface_type {
        SurfaceType::Depth | SurfaceType::DepthStencil => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue {
                depth: value.depth,
                stencil: value.stencil as u32,
            },
        },
        _ => vk::ClearValue {
            color: vk::ClearColorValue {
                float32: value.color,
            },
        },
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
