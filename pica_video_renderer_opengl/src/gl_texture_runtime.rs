/// TextureRuntime - OpenGL implementation of the pica_video runtime trait
///
/// GL commands execute immediately on the current context, so there is
/// no command scheduler here; `finish` is a plain `glFinish`. The
/// runtime owns the upload PBO, the download arena, the allocation
/// recycler, the scratch read/draw FBOs, and the framebuffer and sampler
/// caches.

use gl::types::{GLenum, GLint, GLuint};
use std::sync::{Arc, Mutex};

use pica_video::{
    video_trace, ClearValue, Error, HostTextureTag, PixelFormat, Result, SurfaceParams,
    SurfaceType, TextureBlit, TextureClear, TextureCopy, TextureFilter, TextureType,
};

use crate::gl_format::{buffer_mask, format_tuple, needs_conversion};
use crate::gl_framebuffer::FramebufferCache;
use crate::gl_handles::{OglFramebuffer, OglTexture};
use crate::gl_sampler::SamplerCache;
use crate::gl_stream_buffer::{
    DownloadArena, StagingData, UploadStreamBuffer, UPLOAD_BUFFER_SIZE,
};
use crate::gl_surface::Surface;

/// Shared recycler pool; pooled textures delete themselves on drop
pub(crate) struct GlRecycler {
    pub(crate) pool: pica_video::TextureRecycler<GLenum, OglTexture>,
}

pub(crate) type SharedRecycler = Arc<Mutex<GlRecycler>>;

pub struct TextureRuntime {
    is_gles: bool,
    pub(crate) upload_buffer: UploadStreamBuffer,
    download_arena: DownloadArena,
    read_fbo: OglFramebuffer,
    draw_fbo: OglFramebuffer,
    pub(crate) framebuffers: FramebufferCache,
    pub samplers: SamplerCache,
    recycler: SharedRecycler,
}

impl TextureRuntime {
    /// Build a runtime on the current GL context
    ///
    /// The `gl` function pointers must already be loaded.
    pub fn new(is_gles: bool) -> Result<Self> {
        Ok(Self {
            is_gles,
            upload_buffer: UploadStreamBuffer::new(UPLOAD_BUFFER_SIZE)?,
            download_arena: DownloadArena::new(),
            read_fbo: OglFramebuffer::new(),
            draw_fbo: OglFramebuffer::new(),
            framebuffers: FramebufferCache::new(),
            samplers: SamplerCache::new(),
            recycler: Arc::new(Mutex::new(GlRecycler {
                pool: pica_video::TextureRecycler::new(),
            })),
        })
    }

    pub fn is_gles(&self) -> bool {
        self.is_gles
    }

    /// Allocate a surface, reusing a pooled texture when one matches
    ///
    /// The texture contents are undefined either way.
    pub fn allocate(&mut self, params: SurfaceParams) -> Result<Surface> {
        let tuple = format_tuple(params.pixel_format, self.is_gles);
        let tag = HostTextureTag {
            native_format: tuple.internal_format,
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
        let texture = match recycled {
            Some(texture) => {
                video_trace!(
                    "video::opengl::Runtime",
                    "Reusing {}x{} texture for {:?}",
                    params.scaled_width(),
                    params.scaled_height(),
                    params.pixel_format
                );
                texture
            }
            None => {
                let target = texture_target(params.texture_type);
                let texture = OglTexture::new();
                unsafe {
                    gl::ActiveTexture(gl::TEXTURE0);
                    gl::BindTexture(target, texture.handle);
                    gl::TexStorage2D(
                        target,
                        params.levels as GLint,
                        tuple.internal_format,
                        params.scaled_width() as GLint,
                        params.scaled_height() as GLint,
                    );
                    gl::TexParameteri(target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
                    gl::TexParameteri(target, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
                    gl::TexParameteri(target, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
                    gl::BindTexture(target, 0);
                }
                texture
            }
        };

        Ok(Surface::from_texture(
            params,
            tuple,
            texture,
            self.recycler.clone(),
        ))
    }

    /// Reserve staging memory for an upload or a download
    pub fn find_staging(&mut self, size: u32, download: bool) -> Result<StagingData> {
        if download {
            return Ok(self.download_arena.staging(size));
        }
        let staging = self.upload_buffer.map(size as usize, 4)?;
        self.upload_buffer.commit(size as usize);
        Ok(staging)
    }

    /// Reinterpretation strategies able to produce `dest_format`
    pub fn get_reinterpretations(
        &self,
        dest_format: PixelFormat,
    ) -> &'static [&'static dyn crate::gl_reinterpret::FormatReinterpreter] {
        crate::gl_reinterpret::possible_reinterpretations(dest_format)
    }

    /// Attach a surface level to one of the runtime's scratch FBOs
    pub(crate) fn bind_framebuffer(
        &self,
        target: GLenum,
        level: u32,
        textarget: GLenum,
        surface_type: SurfaceType,
        handle: GLuint,
    ) {
        let framebuffer = if target == gl::DRAW_FRAMEBUFFER {
            self.draw_fbo.handle
        } else {
            self.read_fbo.handle
        };
        unsafe {
            gl::BindFramebuffer(target, framebuffer);
            attach_for_type(target, level, textarget, surface_type, handle);
        }
    }
}

fn texture_target(texture_type: TextureType) -> GLenum {
    match texture_type {
        TextureType::Texture2D => gl::TEXTURE_2D,
        TextureType::CubeMap => gl::TEXTURE_CUBE_MAP,
    }
}

/// Attach `handle` at `level` to the currently bound framebuffer,
/// clearing the attachment points the surface type does not use
unsafe fn attach_for_type(
    target: GLenum,
    level: u32,
    textarget: GLenum,
    surface_type: SurfaceType,
    handle: GLuint,
) {
    let level = level as GLint;
    match surface_type {
        SurfaceType::Color | SurfaceType::Texture | SurfaceType::Fill => {
            gl::FramebufferTexture2D(target, gl::COLOR_ATTACHMENT0, textarget, handle, level);
            gl::FramebufferTexture2D(target, gl::DEPTH_STENCIL_ATTACHMENT, textarget, 0, 0);
        }
        SurfaceType::Depth => {
            gl::FramebufferTexture2D(target, gl::COLOR_ATTACHMENT0, textarget, 0, 0);
            gl::FramebufferTexture2D(target, gl::DEPTH_ATTACHMENT, textarget, handle, level);
            gl::FramebufferTexture2D(target, gl::STENCIL_ATTACHMENT, textarget, 0, 0);
        }
        SurfaceType::DepthStencil => {
            gl::FramebufferTexture2D(target, gl::COLOR_ATTACHMENT0, textarget, 0, 0);
            gl::FramebufferTexture2D(target, gl::DEPTH_STENCIL_ATTACHMENT, textarget, handle, level);
        }
        SurfaceType::Invalid => {
            pica_video::video_critical!("video::opengl::Runtime", "Invalid surface type");
            unreachable!()
        }
    }
}

impl pica_video::TextureRuntime for TextureRuntime {
    type Surface = Surface;

    fn finish(&mut self) -> Result<()> {
        unsafe { gl::Finish() };
        self.upload_buffer.invalidate();
        Ok(())
    }

    fn clear_texture(
        &mut self,
        surface: &mut Surface,
        clear: &TextureClear,
        value: ClearValue,
    ) -> Result<()> {
        let rect = clear.texture_rect;
        let surface_type = surface.params.surface_type();
        self.bind_framebuffer(
            gl::DRAW_FRAMEBUFFER,
            clear.texture_level,
            gl::TEXTURE_2D,
            surface_type,
            surface.handle(),
        );
        unsafe {
            gl::Enable(gl::SCISSOR_TEST);
            gl::Scissor(
                rect.left as GLint,
                rect.bottom as GLint,
                rect.width() as GLint,
                rect.height() as GLint,
            );
            match surface_type {
                SurfaceType::Color | SurfaceType::Texture | SurfaceType::Fill => {
                    gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
                    gl::ClearBufferfv(gl::COLOR, 0, value.color.as_ptr());
                }
                SurfaceType::Depth => {
                    gl::DepthMask(gl::TRUE);
                    gl::ClearBufferfv(gl::DEPTH, 0, &value.depth);
                }
                SurfaceType::DepthStencil => {
                    gl::DepthMask(gl::TRUE);
                    gl::StencilMask(!0);
                    gl::ClearBufferfi(gl::DEPTH_STENCIL, 0, value.depth, value.stencil as GLint);
                }
                SurfaceType::Invalid => {
                    return Err(Error::InvalidResource(
                        "clear on a surface without a format".to_string(),
                    ));
                }
            }
            gl::Disable(gl::SCISSOR_TEST);
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, 0);
        }
        Ok(())
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
        let src_target = texture_target(source.params.texture_type);
        let dst_target = texture_target(dest.params.texture_type);
        unsafe {
            gl::CopyImageSubData(
                source.handle(),
                src_target,
                copy.src_level as GLint,
                copy.src_offset.x as GLint,
                copy.src_offset.y as GLint,
                copy.src_layer as GLint,
                dest.handle(),
                dst_target,
                copy.dst_level as GLint,
                copy.dst_offset.x as GLint,
                copy.dst_offset.y as GLint,
                copy.dst_layer as GLint,
                copy.extent.width as GLint,
                copy.extent.height as GLint,
                1,
            );
        }
        Ok(())
    }

    fn blit_textures(
        &mut self,
        source: &mut Surface,
        dest: &mut Surface,
        blit: &TextureBlit,
    ) -> Result<()> {
        let src_textarget = if source.params.texture_type == TextureType::CubeMap {
            gl::TEXTURE_CUBE_MAP_POSITIVE_X + blit.src_layer
        } else {
            gl::TEXTURE_2D
        };
        let dst_textarget = if dest.params.texture_type == TextureType::CubeMap {
            gl::TEXTURE_CUBE_MAP_POSITIVE_X + blit.dst_layer
        } else {
            gl::TEXTURE_2D
        };
        self.bind_framebuffer(
            gl::READ_FRAMEBUFFER,
            blit.src_level,
            src_textarget,
            source.params.surface_type(),
            source.handle(),
        );
        self.bind_framebuffer(
            gl::DRAW_FRAMEBUFFER,
            blit.dst_level,
            dst_textarget,
            dest.params.surface_type(),
            dest.handle(),
        );

        let mask = buffer_mask(source.params.surface_type());
        let filter = match pica_video::runtime::rescale_filter(dest.params.pixel_format) {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        };
        unsafe {
            gl::BlitFramebuffer(
                blit.src_rect.left as GLint,
                blit.src_rect.bottom as GLint,
                blit.src_rect.right as GLint,
                blit.src_rect.top as GLint,
                blit.dst_rect.left as GLint,
                blit.dst_rect.bottom as GLint,
                blit.dst_rect.right as GLint,
                blit.dst_rect.top as GLint,
                mask,
                filter,
            );
            gl::BindFramebuffer(gl::READ_FRAMEBUFFER, 0);
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, 0);
        }
        Ok(())
    }

    fn generate_mipmaps(&mut self, surface: &mut Surface) -> Result<()> {
        let target = texture_target(surface.params.texture_type);
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindTexture(target, surface.handle());
            gl::TexParameteri(
                target,
                gl::TEXTURE_MAX_LEVEL,
                (surface.params.levels - 1) as GLint,
            );
            gl::GenerateMipmap(target);
            gl::BindTexture(target, 0);
        }
        Ok(())
    }

    fn needs_conversion(&self, format: PixelFormat) -> bool {
        needs_conversion(format, self.is_gles)
    }
}
