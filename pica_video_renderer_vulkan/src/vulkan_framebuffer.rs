/// Framebuffer - attachment pairs and the VkFramebuffer cache
///
/// The cache is keyed by attachment identity: view handles are unique
/// until destroyed, so (views, render pass, extent) identifies a
/// framebuffer. Host objects are created on first use and destroyed with
/// the runtime; the public [`Framebuffer`] type is a non-owning view
/// pairing a color and a depth-stencil surface.

use ash::vk;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use pica_video::{Error, Rect, Result};

use crate::vulkan_context::GpuContext;

/// Cache key: attachment identities plus pass and extent
///
/// Missing attachments are null handles; order is color then
/// depth-stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FramebufferKey {
    pub views: [vk::ImageView; 2],
    pub render_pass: vk::RenderPass,
    pub width: u32,
    pub height: u32,
}

pub(crate) struct FramebufferCache {
    ctx: Arc<GpuContext>,
    cache: FxHashMap<FramebufferKey, vk::Framebuffer>,
}

impl FramebufferCache {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Self {
        Self {
            ctx,
            cache: FxHashMap::default(),
        }
    }

    /// Get or create the framebuffer for the given attachments
    pub(crate) fn get(&mut self, key: FramebufferKey) -> Result<vk::Framebuffer> {
        if let Some(&framebuffer) = self.cache.get(&key) {
            return Ok(framebuffer);
        }

        let attachments: Vec<vk::ImageView> = key
            .views
            .iter()
            .copied()
            .filter(|&view| view != vk::ImageView::null())
            .collect();
        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(key.render_pass)
            .attachments(&attachments)
            .width(key.width)
            .height(key.height)
            .layers(1);

        let framebuffer = unsafe {
            self.ctx
                .device
                .create_framebuffer(&create_info, None)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to create framebuffer: {:?}", e))
                })?
        };
        self.cache.insert(key, framebuffer);
        Ok(framebuffer)
    }
}

impl Drop for FramebufferCache {
    fn drop(&mut self) {
        for (_, framebuffer) in self.cache.drain() {
            unsafe { self.ctx.device.destroy_framebuffer(framebuffer, None) };
        }
    }
}

/// A render target pairing a color surface and a depth-stencil surface
///
/// Both attachments are optional but at least one must be present. The
/// host objects come from the runtime's caches and stay valid for the
/// runtime's lifetime; identical attachment pairs share one
/// VkFramebuffer.
#[derive(Debug, Clone, Copy)]
pub struct Framebuffer {
    pub(crate) render_pass: vk::RenderPass,
    pub(crate) framebuffer: vk::Framebuffer,
    render_area: Rect,
    res_scale: u32,
}

impl Framebuffer {
    pub(crate) fn from_cache(
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        render_area: Rect,
        res_scale: u32,
    ) -> Self {
        Self {
            render_pass,
            framebuffer,
            render_area,
            res_scale,
        }
    }

    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    pub fn handle(&self) -> vk::Framebuffer {
        self.framebuffer
    }

    pub fn render_area(&self) -> Rect {
        self.render_area
    }

    pub fn res_scale(&self) -> u32 {
        self.res_scale
    }
}

#[cfg(test)]
#[path = "vulkan_framebuffer_tests.rs"]
mod tests;
