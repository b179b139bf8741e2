/// Surface - one emulated surface backed by a Vulkan image
///
/// Surfaces own their ImageAlloc and return it to the recycler pool on
/// drop. Every transfer borrows the runtime: commands are recorded into
/// the deferred stream, staging data travels through the runtime's
/// stream buffers.
///
/// Rectangles arrive with the emulated bottom-left origin; Vulkan is
/// top-down, so every recorded region flips its y coordinate against the
/// mip level height.

use ash::vk;
use std::sync::Arc;

use pica_video::runtime::{stencil_plane_offset, unpack_depth_stencil};
use pica_video::{
    BufferTextureCopy, ClearValue, Error, HostTextureTag, PixelFormat, Result, SurfaceParams,
    SurfaceType, TextureBlit, TextureClear, TextureCopy,
};

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::FormatTraits;
use crate::vulkan_stream_buffer::StagingData;
use crate::vulkan_texture_runtime::{
    transition_image, ImageAlloc, SharedRecycler, TextureRuntime,
};

pub struct Surface {
    pub params: SurfaceParams,
    pub(crate) traits: FormatTraits,
    alloc: Option<ImageAlloc>,
    ctx: Arc<GpuContext>,
    recycler: SharedRecycler,
}

impl Surface {
    pub(crate) fn from_alloc(
        params: SurfaceParams,
        traits: FormatTraits,
        alloc: ImageAlloc,
        ctx: Arc<GpuContext>,
        recycler: SharedRecycler,
    ) -> Self {
        Self {
            params,
            traits,
            alloc: Some(alloc),
            ctx,
            recycler,
        }
    }

    fn tag(&self) -> HostTextureTag<vk::Format> {
        HostTextureTag {
            native_format: self.traits.native,
            pixel_format: self.params.pixel_format,
            texture_type: self.params.texture_type,
            width: self.params.scaled_width(),
            height: self.params.scaled_height(),
            levels: self.params.levels,
        }
    }

    fn alloc(&self) -> &ImageAlloc {
        // The alloc is only None after Drop has taken it
        self.alloc.as_ref().unwrap_or_else(|| unreachable!())
    }

    pub fn image(&self) -> vk::Image {
        self.alloc().image
    }

    /// View over all levels and layers, for sampling
    pub fn full_view(&self) -> vk::ImageView {
        self.alloc().full_view
    }

    /// Depth-only view of a depth-stencil surface
    pub fn depth_view(&self) -> Result<vk::ImageView> {
        self.alloc()
            .depth_view
            .ok_or_else(|| Error::InvalidResource("surface has no depth view".to_string()))
    }

    /// Stencil-only view of a depth-stencil surface
    pub fn stencil_view(&self) -> Result<vk::ImageView> {
        self.alloc()
            .stencil_view
            .ok_or_else(|| Error::InvalidResource("surface has no stencil view".to_string()))
    }

    /// Attachment view of one mip level
    pub fn level_view(&self, level: u32) -> Result<vk::ImageView> {
        self.alloc()
            .level_views
            .get(level as usize)
            .copied()
            .ok_or_else(|| {
                Error::InvalidResource(format!("surface has no view for level {}", level))
            })
    }

    fn layers(&self) -> u32 {
        self.params.texture_type.layers()
    }

    /// Height of a mip level in host texels
    fn level_height(&self, level: u32) -> u32 {
        (self.params.scaled_height() >> level).max(1)
    }

    /// Height of a mip level in unscaled texels
    fn unscaled_level_height(&self, level: u32) -> u32 {
        (self.params.height >> level).max(1)
    }

    /// Bytes one texel of this surface occupies in staging memory
    ///
    /// Wider than the emulated footprint for D24S8, whose staging holds
    /// split depth and stencil planes.
    pub fn internal_bytes_per_pixel(&self) -> u32 {
        crate::vulkan_format::staging_bytes_per_pixel(self.params.pixel_format)
    }

    // ===== UPLOAD =====

    /// Copy staged texel data into a region of this surface
    ///
    /// `copy.texture_rect` is in unscaled texels. For scaled surfaces the
    /// data lands in an ephemeral 1x surface and is rescaled from there.
    /// D24S8 staging is split into planes in place before the copy.
    pub fn upload(
        &mut self,
        runtime: &mut TextureRuntime,
        copy: &BufferTextureCopy,
        mut staging: StagingData,
    ) -> Result<()> {
        if self.params.res_scale > 1 {
            return self.scaled_upload(runtime, copy, staging);
        }

        if self.params.surface_type() == SurfaceType::DepthStencil {
            unpack_depth_stencil(staging.mapped_slice(), self.params.pixel_format);
        }
        self.record_upload(runtime, copy, &staging);
        Ok(())
    }

    fn record_upload(
        &mut self,
        runtime: &mut TextureRuntime,
        copy: &BufferTextureCopy,
        staging: &StagingData,
    ) {
        let rect = copy.texture_rect;
        let image = self.image();
        let aspect = self.traits.aspect;
        let levels = self.params.levels;
        let layers = self.layers();
        let level_height = self.unscaled_level_height(copy.texture_level);

        let region = |region_aspect: vk::ImageAspectFlags, buffer_offset: u64| {
            vk::BufferImageCopy::default()
                .buffer_offset(buffer_offset)
                .buffer_row_length(0)
                .buffer_image_height(0)
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: region_aspect,
                    mip_level: copy.texture_level,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_offset(vk::Offset3D {
                    x: rect.left as i32,
                    y: (level_height - rect.top) as i32,
                    z: 0,
                })
                .image_extent(vk::Extent3D {
                    width: rect.width(),
                    height: rect.height(),
                    depth: 1,
                })
        };

        let regions = if self.params.pixel_format == PixelFormat::D24S8 {
            let stencil_offset =
                staging.buffer_offset + stencil_plane_offset(copy.buffer_size as usize) as u64;
            vec![
                region(vk::ImageAspectFlags::DEPTH, staging.buffer_offset),
                region(vk::ImageAspectFlags::STENCIL, stencil_offset),
            ]
        } else {
            vec![region(aspect, staging.buffer_offset)]
        };

        // Recorded on the render buffer so the copy keeps its place in
        // the surface's command order relative to blits and clears
        let buffer = staging.buffer;
        runtime
            .scheduler
            .record(move |device, render_cmdbuf, _upload_cmdbuf| {
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    0,
                    levels,
                    layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                );
                unsafe {
                    device.cmd_copy_buffer_to_image(
                        render_cmdbuf,
                        buffer,
                        image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &regions,
                    );
                }
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    0,
                    levels,
                    layers,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
            });
    }

    /// Upload through an ephemeral unscaled surface, then rescale
    fn scaled_upload(
        &mut self,
        runtime: &mut TextureRuntime,
        copy: &BufferTextureCopy,
        staging: StagingData,
    ) -> Result<()> {
        let unscaled_params = self.params.unscaled(copy.texture_rect);
        let mut unscaled = runtime.allocate(unscaled_params)?;

        let unscaled_copy = BufferTextureCopy {
            buffer_offset: copy.buffer_offset,
            buffer_size: copy.buffer_size,
            texture_rect: unscaled_params.rect(),
            texture_level: 0,
        };
        unscaled.upload(runtime, &unscaled_copy, staging)?;

        let blit = TextureBlit {
            src_level: 0,
            dst_level: copy.texture_level,
            src_layer: 0,
            dst_layer: 0,
            src_rect: unscaled_params.rect(),
            dst_rect: copy.texture_rect.scale(self.params.res_scale),
        };
        pica_video::TextureRuntime::blit_textures(runtime, &mut unscaled, self, &blit)
        // The unscaled surface drops here and its allocation is recycled
    }

    // ===== DOWNLOAD =====

    /// Copy a region of this surface out into staging memory
    ///
    /// The staged bytes are valid only after `runtime.finish()`. For
    /// D24S8 the per-aspect copies leave split planes in staging; the
    /// runtime interleaves them into emulated words during `finish`.
    pub fn download(
        &mut self,
        runtime: &mut TextureRuntime,
        copy: &BufferTextureCopy,
        staging: &mut StagingData,
    ) -> Result<()> {
        if self.params.res_scale > 1 {
            return self.scaled_download(runtime, copy, staging);
        }
        self.record_download(runtime, copy, staging);
        Ok(())
    }

    fn record_download(
        &mut self,
        runtime: &mut TextureRuntime,
        copy: &BufferTextureCopy,
        staging: &mut StagingData,
    ) {
        let rect = copy.texture_rect;
        let image = self.image();
        let aspect = self.traits.aspect;
        let levels = self.params.levels;
        let layers = self.layers();
        let level_height = self.unscaled_level_height(copy.texture_level);

        let region = |region_aspect: vk::ImageAspectFlags, buffer_offset: u64| {
            vk::BufferImageCopy::default()
                .buffer_offset(buffer_offset)
                .buffer_row_length(0)
                .buffer_image_height(0)
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: region_aspect,
                    mip_level: copy.texture_level,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_offset(vk::Offset3D {
                    x: rect.left as i32,
                    y: (level_height - rect.top) as i32,
                    z: 0,
                })
                .image_extent(vk::Extent3D {
                    width: rect.width(),
                    height: rect.height(),
                    depth: 1,
                })
        };

        let regions = if self.params.pixel_format == PixelFormat::D24S8 {
            let size = copy.buffer_size as usize;
            let stencil_offset = staging.buffer_offset + stencil_plane_offset(size) as u64;
            runtime.defer_interleave(staging.mapped_slice().as_mut_ptr(), size);
            vec![
                region(vk::ImageAspectFlags::DEPTH, staging.buffer_offset),
                region(vk::ImageAspectFlags::STENCIL, stencil_offset),
            ]
        } else {
            vec![region(aspect, staging.buffer_offset)]
        };

        let buffer = staging.buffer;
        runtime
            .scheduler
            .record(move |device, render_cmdbuf, _upload_cmdbuf| {
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    0,
                    levels,
                    layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                );
                unsafe {
                    device.cmd_copy_image_to_buffer(
                        render_cmdbuf,
                        image,
                        vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                        buffer,
                        &regions,
                    );
                }
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    0,
                    levels,
                    layers,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
            });
    }

    /// Rescale into an ephemeral unscaled surface, then download that
    fn scaled_download(
        &mut self,
        runtime: &mut TextureRuntime,
        copy: &BufferTextureCopy,
        staging: &mut StagingData,
    ) -> Result<()> {
        let unscaled_params = self.params.unscaled(copy.texture_rect);
        let mut unscaled = runtime.allocate(unscaled_params)?;

        let blit = TextureBlit {
            src_level: copy.texture_level,
            dst_level: 0,
            src_layer: 0,
            dst_layer: 0,
            src_rect: copy.texture_rect.scale(self.params.res_scale),
            dst_rect: unscaled_params.rect(),
        };
        pica_video::TextureRuntime::blit_textures(runtime, self, &mut unscaled, &blit)?;

        let unscaled_copy = BufferTextureCopy {
            buffer_offset: copy.buffer_offset,
            buffer_size: copy.buffer_size,
            texture_rect: unscaled_params.rect(),
            texture_level: 0,
        };
        unscaled.download(runtime, &unscaled_copy, staging)
    }

    // ===== CLEAR =====

    /// Full-level clear through the dedicated clear commands
    pub(crate) fn clear_full(
        &mut self,
        runtime: &mut TextureRuntime,
        clear: &TextureClear,
        value: ClearValue,
    ) -> Result<()> {
        let image = self.image();
        let aspect = self.traits.aspect;
        let levels = self.params.levels;
        let layers = self.layers();
        let level = clear.texture_level;
        let is_color = !matches!(
            self.params.surface_type(),
            SurfaceType::Depth | SurfaceType::DepthStencil
        );
        let color_value = vk::ClearColorValue {
            float32: value.color,
        };
        let depth_value = vk::ClearDepthStencilValue {
            depth: value.depth,
            stencil: value.stencil as u32,
        };

        runtime
            .scheduler
            .record(move |device, render_cmdbuf, _upload_cmdbuf| {
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    0,
                    levels,
                    layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                );
                let range = vk::ImageSubresourceRange {
                    aspect_mask: aspect,
                    base_mip_level: level,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: layers,
                };
                unsafe {
                    if is_color {
                        device.cmd_clear_color_image(
                            render_cmdbuf,
                            image,
                            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                            &color_value,
                            &[range],
                        );
                    } else {
                        device.cmd_clear_depth_stencil_image(
                            render_cmdbuf,
                            image,
                            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                            &depth_value,
                            &[range],
                        );
                    }
                }
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    0,
                    levels,
                    layers,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
            });
        Ok(())
    }

    /// Partial clear through a render pass with a clear rect
    pub(crate) fn clear_scissored(
        &mut self,
        runtime: &mut TextureRuntime,
        clear: &TextureClear,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        clear_value: vk::ClearValue,
        is_color: bool,
    ) -> Result<()> {
        let rect = clear.texture_rect;
        let aspect = self.traits.aspect;
        let level_height = self.level_height(clear.texture_level);
        let level_width = (self.params.scaled_width() >> clear.texture_level).max(1);

        let clear_rect = vk::ClearRect {
            rect: vk::Rect2D {
                offset: vk::Offset2D {
                    x: rect.left as i32,
                    y: (level_height - rect.top) as i32,
                },
                extent: vk::Extent2D {
                    width: rect.width(),
                    height: rect.height(),
                },
            },
            base_array_layer: 0,
            layer_count: 1,
        };
        let attachment = vk::ClearAttachment {
            aspect_mask: if is_color {
                vk::ImageAspectFlags::COLOR
            } else {
                aspect
            },
            color_attachment: 0,
            clear_value,
        };

        runtime
            .scheduler
            .record(move |device, render_cmdbuf, _upload_cmdbuf| {
                let begin_info = vk::RenderPassBeginInfo::default()
                    .render_pass(render_pass)
                    .framebuffer(framebuffer)
                    .render_area(vk::Rect2D {
                        offset: vk::Offset2D { x: 0, y: 0 },
                        extent: vk::Extent2D {
                            width: level_width,
                            height: level_height,
                        },
                    });
                unsafe {
                    device.cmd_begin_render_pass(
                        render_cmdbuf,
                        &begin_info,
                        vk::SubpassContents::INLINE,
                    );
                    device.cmd_clear_attachments(render_cmdbuf, &[attachment], &[clear_rect]);
                    device.cmd_end_render_pass(render_cmdbuf);
                }
            });
        Ok(())
    }

    // ===== COPY / BLIT =====

    pub(crate) fn record_copy(
        runtime: &mut TextureRuntime,
        source: &Surface,
        dest: &Surface,
        copy: &TextureCopy,
    ) {
        let src_image = source.image();
        let dst_image = dest.image();
        let aspect = source.traits.aspect;
        let src_levels = source.params.levels;
        let dst_levels = dest.params.levels;
        let src_layers = source.layers();
        let dst_layers = dest.layers();
        let src_level_height = source.level_height(copy.src_level);
        let dst_level_height = dest.level_height(copy.dst_level);

        let region = vk::ImageCopy::default()
            .src_subresource(vk::ImageSubresourceLayers {
                aspect_mask: aspect,
                mip_level: copy.src_level,
                base_array_layer: copy.src_layer,
                layer_count: 1,
            })
            .src_offset(vk::Offset3D {
                x: copy.src_offset.x as i32,
                y: (src_level_height - copy.src_offset.y - copy.extent.height) as i32,
                z: 0,
            })
            .dst_subresource(vk::ImageSubresourceLayers {
                aspect_mask: aspect,
                mip_level: copy.dst_level,
                base_array_layer: copy.dst_layer,
                layer_count: 1,
            })
            .dst_offset(vk::Offset3D {
                x: copy.dst_offset.x as i32,
                y: (dst_level_height - copy.dst_offset.y - copy.extent.height) as i32,
                z: 0,
            })
            .extent(vk::Extent3D {
                width: copy.extent.width,
                height: copy.extent.height,
                depth: 1,
            });

        runtime
            .scheduler
            .record(move |device, render_cmdbuf, _upload_cmdbuf| {
                transition_image(
                    device,
                    render_cmdbuf,
                    src_image,
                    aspect,
                    0,
                    src_levels,
                    src_layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                );
                transition_image(
                    device,
                    render_cmdbuf,
                    dst_image,
                    aspect,
                    0,
                    dst_levels,
                    dst_layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                );
                unsafe {
                    device.cmd_copy_image(
                        render_cmdbuf,
                        src_image,
                        vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                        dst_image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[region],
                    );
                }
                transition_image(
                    device,
                    render_cmdbuf,
                    src_image,
                    aspect,
                    0,
                    src_levels,
                    src_layers,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
                transition_image(
                    device,
                    render_cmdbuf,
                    dst_image,
                    aspect,
                    0,
                    dst_levels,
                    dst_layers,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
            });
    }

    /// y-flipped blit region between two rects
    fn blit_region(
        source: &Surface,
        dest: &Surface,
        blit: &TextureBlit,
        aspect: vk::ImageAspectFlags,
    ) -> vk::ImageBlit {
        let src_height = source.level_height(blit.src_level);
        let dst_height = dest.level_height(blit.dst_level);
        vk::ImageBlit::default()
            .src_subresource(vk::ImageSubresourceLayers {
                aspect_mask: aspect,
                mip_level: blit.src_level,
                base_array_layer: blit.src_layer,
                layer_count: 1,
            })
            .src_offsets([
                vk::Offset3D {
                    x: blit.src_rect.left as i32,
                    y: (src_height - blit.src_rect.top) as i32,
                    z: 0,
                },
                vk::Offset3D {
                    x: blit.src_rect.right as i32,
                    y: (src_height - blit.src_rect.bottom) as i32,
                    z: 1,
                },
            ])
            .dst_subresource(vk::ImageSubresourceLayers {
                aspect_mask: aspect,
                mip_level: blit.dst_level,
                base_array_layer: blit.dst_layer,
                layer_count: 1,
            })
            .dst_offsets([
                vk::Offset3D {
                    x: blit.dst_rect.left as i32,
                    y: (dst_height - blit.dst_rect.top) as i32,
                    z: 0,
                },
                vk::Offset3D {
                    x: blit.dst_rect.right as i32,
                    y: (dst_height - blit.dst_rect.bottom) as i32,
                    z: 1,
                },
            ])
    }

    pub(crate) fn record_blit(
        runtime: &mut TextureRuntime,
        source: &Surface,
        dest: &Surface,
        blit: &TextureBlit,
        filter: vk::Filter,
    ) {
        let src_image = source.image();
        let dst_image = dest.image();
        let aspect = source.traits.aspect;
        let src_levels = source.params.levels;
        let dst_levels = dest.params.levels;
        let src_layers = source.layers();
        let dst_layers = dest.layers();
        let region = Self::blit_region(source, dest, blit, aspect);

        runtime
            .scheduler
            .record(move |device, render_cmdbuf, _upload_cmdbuf| {
                transition_image(
                    device,
                    render_cmdbuf,
                    src_image,
                    aspect,
                    0,
                    src_levels,
                    src_layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                );
                transition_image(
                    device,
                    render_cmdbuf,
                    dst_image,
                    aspect,
                    0,
                    dst_levels,
                    dst_layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                );
                unsafe {
                    device.cmd_blit_image(
                        render_cmdbuf,
                        src_image,
                        vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                        dst_image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[region],
                        filter,
                    );
                }
                transition_image(
                    device,
                    render_cmdbuf,
                    src_image,
                    aspect,
                    0,
                    src_levels,
                    src_layers,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
                transition_image(
                    device,
                    render_cmdbuf,
                    dst_image,
                    aspect,
                    0,
                    dst_levels,
                    dst_layers,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
            });
    }

    /// Blit between two levels of the same image, for mipmap generation
    pub(crate) fn record_mip_blit(
        runtime: &mut TextureRuntime,
        surface: &Surface,
        blit: &TextureBlit,
        filter: vk::Filter,
    ) {
        let image = surface.image();
        let aspect = surface.traits.aspect;
        let layers = surface.layers();
        let src_level = blit.src_level;
        let dst_level = blit.dst_level;
        let region = Self::blit_region(surface, surface, blit, aspect);

        runtime
            .scheduler
            .record(move |device, render_cmdbuf, _upload_cmdbuf| {
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    src_level,
                    1,
                    layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                );
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    dst_level,
                    1,
                    layers,
                    vk::ImageLayout::GENERAL,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                );
                unsafe {
                    device.cmd_blit_image(
                        render_cmdbuf,
                        image,
                        vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                        image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[region],
                        filter,
                    );
                }
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    src_level,
                    1,
                    layers,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
                transition_image(
                    device,
                    render_cmdbuf,
                    image,
                    aspect,
                    dst_level,
                    1,
                    layers,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::GENERAL,
                );
            });
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        if let Some(alloc) = self.alloc.take() {
            let tag = self.tag();
            if let Ok(mut recycler) = self.recycler.lock() {
                recycler.pool.recycle(tag, alloc);
            } else {
                alloc.destroy(&self.ctx);
            }
        }
    }
}
