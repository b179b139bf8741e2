/// RenderPassCache - internal VkRenderPass management
///
/// The clear slow path and framebuffer creation need render passes that
/// load and store their attachments. One pass per attachment format
/// pair is enough; they are created on first use and destroyed with the
/// runtime.

use ash::vk;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use pica_video::{Error, Result};

use crate::vulkan_context::GpuContext;

/// Key describing a render pass
///
/// Either format may be UNDEFINED for a missing attachment, but not
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RenderPassKey {
    pub color_format: vk::Format,
    pub depth_format: vk::Format,
}

pub(crate) struct RenderPassCache {
    ctx: Arc<GpuContext>,
    cache: FxHashMap<RenderPassKey, vk::RenderPass>,
}

impl RenderPassCache {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Self {
        Self {
            ctx,
            cache: FxHashMap::default(),
        }
    }

    /// Get or create the render pass for the given attachment formats
    pub(crate) fn get(&mut self, key: RenderPassKey) -> Result<vk::RenderPass> {
        if let Some(&render_pass) = self.cache.get(&key) {
            return Ok(render_pass);
        }

        let render_pass = self.create_render_pass(key)?;
        self.cache.insert(key, render_pass);
        Ok(render_pass)
    }

    fn create_render_pass(&self, key: RenderPassKey) -> Result<vk::RenderPass> {
        debug_assert!(
            key.color_format != vk::Format::UNDEFINED
                || key.depth_format != vk::Format::UNDEFINED
        );

        // Surfaces rest in GENERAL; the pass loads and stores in place
        let describe = |format: vk::Format| {
            vk::AttachmentDescription::default()
                .format(format)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::LOAD)
                .store_op(vk::AttachmentStoreOp::STORE)
                .stencil_load_op(vk::AttachmentLoadOp::LOAD)
                .stencil_store_op(vk::AttachmentStoreOp::STORE)
                .initial_layout(vk::ImageLayout::GENERAL)
                .final_layout(vk::ImageLayout::GENERAL)
        };
        let reference = |attachment: u32| {
            vk::AttachmentReference::default()
                .attachment(attachment)
                .layout(vk::ImageLayout::GENERAL)
        };

        let mut attachments = Vec::with_capacity(2);
        let mut color_references = Vec::with_capacity(1);
        let mut depth_reference = None;
        if key.color_format != vk::Format::UNDEFINED {
            color_references.push(reference(attachments.len() as u32));
            attachments.push(describe(key.color_format));
        }
        if key.depth_format != vk::Format::UNDEFINED {
            depth_reference = Some(reference(attachments.len() as u32));
            attachments.push(describe(key.depth_format));
        }

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_references);
        if let Some(depth_reference) = &depth_reference {
            subpass = subpass.depth_stencil_attachment(depth_reference);
        }

        let subpasses = [subpass];
        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses);

        unsafe {
            self.ctx
                .device
                .create_render_pass(&create_info, None)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to create render pass: {:?}", e))
                })
        }
    }
}

impl Drop for RenderPassCache {
    fn drop(&mut self) {
        for (_, render_pass) in self.cache.drain() {
            unsafe { self.ctx.device.destroy_render_pass(render_pass, None) };
        }
    }
}
