/// SamplerCache - internal VkSampler management for the Vulkan backend
///
/// Creates and caches VkSampler objects on first use, keyed by the full
/// sampler description. The emulated GPU only has a handful of distinct
/// sampler states, so this stays tiny.

use ash::vk;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use pica_video::{Error, Result, SamplerParams, TextureFilter, WrapMode};

use crate::vulkan_context::GpuContext;

fn to_vk_filter(filter: TextureFilter) -> vk::Filter {
    match filter {
        TextureFilter::Nearest => vk::Filter::NEAREST,
        TextureFilter::Linear => vk::Filter::LINEAR,
    }
}

fn to_vk_mipmap_mode(filter: TextureFilter) -> vk::SamplerMipmapMode {
    match filter {
        TextureFilter::Nearest => vk::SamplerMipmapMode::NEAREST,
        TextureFilter::Linear => vk::SamplerMipmapMode::LINEAR,
    }
}

fn to_vk_address_mode(wrap: WrapMode) -> vk::SamplerAddressMode {
    match wrap {
        WrapMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        WrapMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
        WrapMode::Repeat => vk::SamplerAddressMode::REPEAT,
        WrapMode::MirroredRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
    }
}

/// Internal sampler cache; creates VkSampler on first use, destroys on drop
pub struct SamplerCache {
    ctx: Arc<GpuContext>,
    cache: FxHashMap<SamplerParams, vk::Sampler>,
}

impl SamplerCache {
    pub fn new(ctx: Arc<GpuContext>) -> Self {
        Self {
            ctx,
            cache: FxHashMap::default(),
        }
    }

    /// Get or create a VkSampler for the given description
    ///
    /// The emulated border color is integer RGBA; custom border colors
    /// need an extension, so the nearest stock border color is used.
    pub fn get(&mut self, params: SamplerParams) -> Result<vk::Sampler> {
        if let Some(&sampler) = self.cache.get(&params) {
            return Ok(sampler);
        }

        let border = match params.border_color {
            [_, _, _, 0] => vk::BorderColor::FLOAT_TRANSPARENT_BLACK,
            [r, g, b, _] if (r as u32 + g as u32 + b as u32) < 384 => {
                vk::BorderColor::FLOAT_OPAQUE_BLACK
            }
            _ => vk::BorderColor::FLOAT_OPAQUE_WHITE,
        };

        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(to_vk_filter(params.mag_filter))
            .min_filter(to_vk_filter(params.min_filter))
            .mipmap_mode(to_vk_mipmap_mode(params.mip_filter))
            .address_mode_u(to_vk_address_mode(params.wrap_s))
            .address_mode_v(to_vk_address_mode(params.wrap_t))
            .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .mip_lod_bias(0.0)
            .min_lod(params.lod_min as f32)
            .max_lod(params.lod_max as f32)
            .border_color(border)
            .anisotropy_enable(false)
            .max_anisotropy(1.0)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .unnormalized_coordinates(false);

        let sampler = unsafe {
            self.ctx
                .device
                .create_sampler(&create_info, None)
                .map_err(|e| Error::BackendError(format!("Failed to create sampler: {:?}", e)))?
        };
        self.cache.insert(params, sampler);
        Ok(sampler)
    }
}

impl Drop for SamplerCache {
    fn drop(&mut self) {
        for (_, sampler) in self.cache.drain() {
            unsafe { self.ctx.device.destroy_sampler(sampler, None) };
        }
    }
}
