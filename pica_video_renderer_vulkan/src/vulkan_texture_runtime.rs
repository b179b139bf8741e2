/// TextureRuntime - Vulkan implementation of the pica_video runtime trait
///
/// Owns the scheduler, the staging stream buffers, the allocation
/// recycler, and the render pass / framebuffer / sampler caches. Surfaces
/// borrow the runtime for every transfer so all GPU work funnels through
/// one deferred command stream.

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::mem::take;
use std::sync::{Arc, Mutex};

use pica_video::runtime::pack_d24s8;
use pica_video::{
    video_trace, ClearValue, Error, HostTextureTag, PixelFormat, Rect, Result, SurfaceParams,
    SurfaceType, TextureBlit, TextureClear, TextureCopy, TextureFilter,
};

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{make_clear_value, FormatTraits};
use crate::vulkan_framebuffer::{Framebuffer, FramebufferCache, FramebufferKey};
use crate::vulkan_render_pass::{RenderPassCache, RenderPassKey};
use crate::vulkan_sampler::SamplerCache;
use crate::vulkan_scheduler::Scheduler;
use crate::vulkan_stream_buffer::{StagingData, StreamBuffer, STREAM_BUFFER_SIZE};
use crate::vulkan_surface::Surface;

/// GPU texture allocation: image, memory, and the views surfaces need
///
/// Allocations move between surfaces and the recycler pool; they are
/// destroyed only when the pool itself is dropped.
pub struct ImageAlloc {
    pub image: vk::Image,
    pub allocation: Option<Allocation>,
    /// View over all levels and layers
    pub full_view: vk::ImageView,
    /// Single-aspect views, only for depth-stencil formats
    pub depth_view: Option<vk::ImageView>,
    pub stencil_view: Option<vk::ImageView>,
    /// One 2D view per mip level, used as framebuffer attachments
    pub level_views: Vec<vk::ImageView>,
}

impl ImageAlloc {
    pub(crate) fn destroy(mut self, ctx: &GpuContext) {
        unsafe {
            for view in self.level_views.drain(..) {
                ctx.device.destroy_image_view(view, None);
            }
            if let Some(view) = self.depth_view.take() {
                ctx.device.destroy_image_view(view, None);
            }
            if let Some(view) = self.stencil_view.take() {
                ctx.device.destroy_image_view(view, None);
            }
            ctx.device.destroy_image_view(self.full_view, None);
            if let Some(allocation) = self.allocation.take() {
                if let Ok(mut allocator) = ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }
            ctx.device.destroy_image(self.image, None);
        }
    }
}

/// Shared recycler pool; destroys pooled allocations when the last
/// surface or the runtime drops it
pub(crate) struct VulkanRecycler {
    ctx: Arc<GpuContext>,
    pub(crate) pool: pica_video::TextureRecycler<vk::Format, ImageAlloc>,
}

impl Drop for VulkanRecycler {
    fn drop(&mut self) {
        for alloc in self.pool.drain() {
            alloc.destroy(&self.ctx);
        }
    }
}

pub(crate) type SharedRecycler = Arc<Mutex<VulkanRecycler>>;

/// Record a layout transition covering a level range of an image
///
/// Conservative ALL_COMMANDS barriers; transfers are not the bottleneck
/// and correctness across the deferred stream matters more.
pub(crate) fn transition_image(
    device: &ash::Device,
    cmdbuf: vk::CommandBuffer,
    image: vk::Image,
    aspect: vk::ImageAspectFlags,
    base_level: u32,
    level_count: u32,
    layer_count: u32,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) {
    let barrier = vk::ImageMemoryBarrier::default()
        .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
        .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: aspect,
            base_mip_level: base_level,
            level_count,
            base_array_layer: 0,
            layer_count,
        });

    unsafe {
        device.cmd_pipeline_barrier(
            cmdbuf,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier],
        );
    }
}

pub struct TextureRuntime {
    pub(crate) ctx: Arc<GpuContext>,
    pub(crate) scheduler: Scheduler,
    pub(crate) upload_buffer: StreamBuffer,
    pub(crate) download_buffer: StreamBuffer,
    render_passes: RenderPassCache,
    framebuffers: FramebufferCache,
    pub samplers: SamplerCache,
    // Declared after the caches: framebuffers must be destroyed before
    // the recycler tears down the image views they reference
    pub(crate) recycler: SharedRecycler,
    /// Mapped download ranges holding split D24S8 planes that must be
    /// interleaved once the GPU work behind them completes. Raw pointers
    /// into stream buffer memory, valid until the buffer is invalidated.
    pending_interleaves: Vec<(*mut u8, usize)>,
}

impl TextureRuntime {
    pub fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        let scheduler = Scheduler::new(ctx.clone())?;
        let upload_buffer = StreamBuffer::new(ctx.clone(), STREAM_BUFFER_SIZE, false)?;
        let download_buffer = StreamBuffer::new(ctx.clone(), STREAM_BUFFER_SIZE, true)?;
        let recycler = Arc::new(Mutex::new(VulkanRecycler {
            ctx: ctx.clone(),
            pool: pica_video::TextureRecycler::new(),
        }));
        Ok(Self {
            render_passes: RenderPassCache::new(ctx.clone()),
            framebuffers: FramebufferCache::new(ctx.clone()),
            samplers: SamplerCache::new(ctx.clone()),
            ctx,
            scheduler,
            upload_buffer,
            download_buffer,
            recycler,
            pending_interleaves: Vec::new(),
        })
    }

    /// Allocate a surface, reusing a pooled allocation when one matches
    ///
    /// The allocation's contents are undefined either way; an
    /// UNDEFINED -> GENERAL transition is recorded to discard them.
    pub fn allocate(&mut self, params: SurfaceParams) -> Result<Surface> {
        let traits = self.ctx.traits(params.pixel_format);
        let tag = HostTextureTag {
            native_format: traits.native,
            pixel_format: params.pixel_format,
            texture_type: params.texture_type,
            width: params.scaled_width(),
            height: params.scaled_height(),
            levels: params.levels,
        };

        let recycled = self
            .recycler
            .lock()
            .map_err(|_| Error::BackendError("Recycler lock poisoned".to_string()))?
            .pool
            .acquire(&tag);
        let alloc = match recycled {
            Some(alloc) => {
                video_trace!(
                    "video::vulkan::Runtime",
                    "Reusing {}x{} allocation for {:?}",
                    params.scaled_width(),
                    params.scaled_height(),
                    params.pixel_format
                );
                alloc
            }
            None => self.create_alloc(&params, traits)?,
        };

        let image = alloc.image;
        let aspect = traits.aspect;
        let levels = params.levels;
        let layers = params.texture_type.layers();
        self.scheduler.record(move |device, _render_cmdbuf, upload_cmdbuf| {
            transition_image(
                device,
                upload_cmdbuf,
                image,
                aspect,
                0,
                levels,
                layers,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::GENERAL,
            );
        });

        Ok(Surface::from_alloc(
            params,
            traits,
            alloc,
            self.ctx.clone(),
            self.recycler.clone(),
        ))
    }

    fn create_alloc(&mut self, params: &SurfaceParams, traits: FormatTraits) -> Result<ImageAlloc> {
        let is_cube = params.texture_type == pica_video::TextureType::CubeMap;
        let layers = params.texture_type.layers();

        unsafe {
            let mut image_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(traits.native)
                .extent(vk::Extent3D {
                    width: params.scaled_width(),
                    height: params.scaled_height(),
                    depth: 1,
                })
                .mip_levels(params.levels)
                .array_layers(layers)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(traits.usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);
            if is_cube {
                image_info = image_info.flags(vk::ImageCreateFlags::CUBE_COMPATIBLE);
            }

            let image = self
                .ctx
                .device
                .create_image(&image_info, None)
                .map_err(|e| Error::BackendError(format!("Failed to create image: {:?}", e)))?;

            let requirements = self.ctx.device.get_image_memory_requirements(image);
            let allocation = self
                .ctx
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("Allocator lock poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: "surface",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| Error::OutOfMemory)?;

            self.ctx
                .device
                .bind_image_memory(image, allocation.memory(), allocation.offset())
                .map_err(|e| {
                    Error::BackendError(format!("Failed to bind image memory: {:?}", e))
                })?;

            let view_type = if is_cube {
                vk::ImageViewType::CUBE
            } else {
                vk::ImageViewType::TYPE_2D
            };
            let make_view = |aspect: vk::ImageAspectFlags,
                             view_type: vk::ImageViewType,
                             base_level: u32,
                             level_count: u32,
                             layer_count: u32|
             -> Result<vk::ImageView> {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(view_type)
                    .format(traits.native)
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: aspect,
                        base_mip_level: base_level,
                        level_count,
                        base_array_layer: 0,
                        layer_count,
                    });
                self.ctx
                    .device
                    .create_image_view(&view_info, None)
                    .map_err(|e| {
                        Error::BackendError(format!("Failed to create image view: {:?}", e))
                    })
            };

            let full_view = make_view(traits.aspect, view_type, 0, params.levels, layers)?;

            let is_depth_stencil =
                params.pixel_format.surface_type() == SurfaceType::DepthStencil;
            let depth_view = if is_depth_stencil {
                Some(make_view(
                    vk::ImageAspectFlags::DEPTH,
                    view_type,
                    0,
                    params.levels,
                    layers,
                )?)
            } else {
                None
            };
            let stencil_view = if is_depth_stencil {
                Some(make_view(
                    vk::ImageAspectFlags::STENCIL,
                    view_type,
                    0,
                    params.levels,
                    layers,
                )?)
            } else {
                None
            };

            // Per-level attachment views for the clear slow path
            let level_views = if is_cube {
                Vec::new()
            } else {
                (0..params.levels)
                    .map(|level| {
                        make_view(traits.aspect, vk::ImageViewType::TYPE_2D, level, 1, 1)
                    })
                    .collect::<Result<Vec<_>>>()?
            };

            Ok(ImageAlloc {
                image,
                allocation: Some(allocation),
                full_view,
                depth_view,
                stencil_view,
                level_views,
            })
        }
    }

    /// Reserve staging memory in the upload or download stream buffer
    ///
    /// The range is committed immediately; the caller fills it (upload)
    /// or reads it after `finish` (download).
    pub fn find_staging(&mut self, size: u32, download: bool) -> Result<StagingData> {
        let buffer = if download {
            &mut self.download_buffer
        } else {
            &mut self.upload_buffer
        };
        let staging = buffer.map(size as u64, 4)?;
        buffer.commit(size as u64);
        Ok(staging)
    }

    /// Queue a D24S8 interleave fixup for a mapped download range
    pub(crate) fn defer_interleave(&mut self, mapped: *mut u8, size: usize) {
        self.pending_interleaves.push((mapped, size));
    }

    /// Build a render target over an attachment pair
    ///
    /// The underlying render pass and VkFramebuffer come from the
    /// runtime's caches; identical pairs share one host object.
    pub fn create_framebuffer(
        &mut self,
        color: Option<&Surface>,
        depth_stencil: Option<&Surface>,
        render_area: Rect,
    ) -> Result<Framebuffer> {
        let primary = color.or(depth_stencil).ok_or_else(|| {
            Error::InvalidResource("framebuffer without attachments".to_string())
        })?;

        let key = RenderPassKey {
            color_format: color
                .map(|surface| surface.traits.native)
                .unwrap_or(vk::Format::UNDEFINED),
            depth_format: depth_stencil
                .map(|surface| surface.traits.native)
                .unwrap_or(vk::Format::UNDEFINED),
        };
        let render_pass = self.render_passes.get(key)?;

        let view_of = |surface: Option<&Surface>| -> Result<vk::ImageView> {
            surface.map_or(Ok(vk::ImageView::null()), |surface| surface.level_view(0))
        };
        let framebuffer = self.framebuffers.get(FramebufferKey {
            views: [view_of(color)?, view_of(depth_stencil)?],
            render_pass,
            width: primary.params.scaled_width(),
            height: primary.params.scaled_height(),
        })?;

        Ok(Framebuffer::from_cache(
            render_pass,
            framebuffer,
            render_area,
            primary.params.res_scale,
        ))
    }

    /// Reinterpretation strategies able to produce `dest_format`
    pub fn get_reinterpretations(
        &self,
        dest_format: PixelFormat,
    ) -> &'static [&'static dyn crate::vulkan_reinterpret::FormatReinterpreter] {
        crate::vulkan_reinterpret::possible_reinterpretations(dest_format)
    }

    /// Whole-level extent of a surface mip, in host texels
    fn level_rect(surface: &Surface, level: u32) -> Rect {
        Rect::from_extent(
            (surface.params.scaled_width() >> level).max(1),
            (surface.params.scaled_height() >> level).max(1),
        )
    }
}

impl pica_video::TextureRuntime for TextureRuntime {
    type Surface = Surface;

    fn finish(&mut self) -> Result<()> {
        self.scheduler.finish()?;

        // Interleave split depth-stencil planes now that the per-aspect
        // copies have landed. The pointers target staging memory that is
        // only released by the invalidate below, even if the stream
        // buffer grew and retired it in the meantime.
        for (mapped, size) in take(&mut self.pending_interleaves) {
            let staged = unsafe { std::slice::from_raw_parts_mut(mapped, size) };
            pack_d24s8(staged);
        }

        self.download_buffer.invalidate()?;
        self.upload_buffer.invalidate()?;
        Ok(())
    }

    fn clear_texture(
        &mut self,
        surface: &mut Surface,
        clear: &TextureClear,
        value: ClearValue,
    ) -> Result<()> {
        let level_rect = Self::level_rect(surface, clear.texture_level);
        if clear.texture_rect == level_rect {
            surface.clear_full(self, clear, value)
        } else {
            // Scissored clear goes through a render pass
            let surface_type = surface.params.surface_type();
            let is_color = !matches!(
                surface_type,
                SurfaceType::Depth | SurfaceType::DepthStencil
            );
            let key = RenderPassKey {
                color_format: if is_color {
                    surface.traits.native
                } else {
                    vk::Format::UNDEFINED
                },
                depth_format: if is_color {
                    vk::Format::UNDEFINED
                } else {
                    surface.traits.native
                },
            };
            let render_pass = self.render_passes.get(key)?;
            let framebuffer = self.framebuffers.get(FramebufferKey {
                views: [surface.level_view(clear.texture_level)?, vk::ImageView::null()],
                render_pass,
                width: level_rect.width(),
                height: level_rect.height(),
            })?;
            let clear_value = make_clear_value(surface_type, value);
            surface.clear_scissored(self, clear, render_pass, framebuffer, clear_value, is_color)
        }
    }

    fn copy_textures(
        &mut self,
        source: &mut Surface,
        dest: &mut Surface,
        copy: &TextureCopy,
    ) -> Result<()> {
        if source.params.pixel_format != dest.params.pixel_format {
            return Err(Error::InvalidResource(
                "copy between mismatched formats".to_string(),
            ));
        }
        Surface::record_copy(self, source, dest, copy);
        Ok(())
    }

    fn blit_textures(
        &mut self,
        source: &mut Surface,
        dest: &mut Surface,
        blit: &TextureBlit,
    ) -> Result<()> {
        let filter = match pica_video::runtime::rescale_filter(dest.params.pixel_format) {
            TextureFilter::Nearest => vk::Filter::NEAREST,
            TextureFilter::Linear => vk::Filter::LINEAR,
        };
        Surface::record_blit(self, source, dest, blit, filter);
        Ok(())
    }

    fn generate_mipmaps(&mut self, surface: &mut Surface) -> Result<()> {
        for level in 1..surface.params.levels {
            let src_rect = Self::level_rect(surface, level - 1);
            let dst_rect = Self::level_rect(surface, level);
            let blit = TextureBlit {
                src_level: level - 1,
                dst_level: level,
                src_layer: 0,
                dst_layer: 0,
                src_rect,
                dst_rect,
            };
            let filter = match pica_video::runtime::rescale_filter(surface.params.pixel_format) {
                TextureFilter::Nearest => vk::Filter::NEAREST,
                TextureFilter::Linear => vk::Filter::LINEAR,
            };
            Surface::record_mip_blit(self, surface, &blit, filter);
        }
        Ok(())
    }

    fn needs_conversion(&self, format: PixelFormat) -> bool {
        self.ctx.traits(format).needs_conversion
    }
}
