/// Surface - one emulated surface backed by a GL texture
///
/// Surfaces own their texture and return it to the recycler pool on
/// drop. Transfers execute immediately: uploads source from the PBO the
/// staging came from, downloads read back into the staging's client
/// memory before returning.
///
/// Emulated rectangles use a bottom-left origin, which matches GL, so
/// coordinates pass through without flipping.

use gl::types::GLint;
use std::ffi::c_void;

use pica_video::{BufferTextureCopy, HostTextureTag, Result, TextureBlit, TextureType};

use crate::gl_format::FormatTuple;
use crate::gl_handles::OglTexture;
use crate::gl_stream_buffer::{buffer_offset_ptr, StagingData};
use crate::gl_texture_runtime::{SharedRecycler, TextureRuntime};

pub struct Surface {
    pub params: pica_video::SurfaceParams,
    pub(crate) tuple: FormatTuple,
    texture: Option<OglTexture>,
    recycler: SharedRecycler,
}

impl Surface {
    pub(crate) fn from_texture(
        params: pica_video::SurfaceParams,
        tuple: FormatTuple,
        texture: OglTexture,
        recycler: SharedRecycler,
    ) -> Self {
        Self {
            params,
            tuple,
            texture: Some(texture),
            recycler,
        }
    }

    pub fn handle(&self) -> gl::types::GLuint {
        // The texture is only None after Drop has taken it
        self.texture
            .as_ref()
            .map(|texture| texture.handle)
            .unwrap_or_else(|| unreachable!())
    }

    fn tag(&self) -> HostTextureTag<gl::types::GLenum> {
        HostTextureTag {
            native_format: self.tuple.internal_format,
            pixel_format: self.params.pixel_format,
            texture_type: self.params.texture_type,
            width: self.params.scaled_width(),
            height: self.params.scaled_height(),
            levels: self.params.levels,
        }
    }

    /// Bytes one texel of this surface occupies in staging memory
    ///
    /// Matches the emulated footprint for every format; D24S8 transfers
    /// as interleaved 24.8 words rather than split planes.
    pub fn internal_bytes_per_pixel(&self) -> u32 {
        crate::gl_format::staging_bytes_per_pixel(self.params.pixel_format)
    }

    /// Copy staged texel data into a region of this surface
    ///
    /// `copy.texture_rect` is in unscaled texels; scaled surfaces stage
    /// through an ephemeral 1x surface and rescale with a blit.
    pub fn upload(
        &mut self,
        runtime: &mut TextureRuntime,
        copy: &BufferTextureCopy,
        staging: StagingData,
    ) -> Result<()> {
        if self.params.res_scale > 1 {
            return self.scaled_upload(runtime, copy, staging);
        }

        // Cube faces need per-face targets, which this path never binds
        debug_assert_eq!(self.params.texture_type, TextureType::Texture2D);

        let rect = copy.texture_rect;
        unsafe {
            gl::PixelStorei(gl::UNPACK_ROW_LENGTH, rect.width() as GLint);
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, staging.buffer);
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindTexture(gl::TEXTURE_2D, self.handle());
            gl::TexSubImage2D(
                gl::TEXTURE_2D,
                copy.texture_level as GLint,
                rect.left as GLint,
                rect.bottom as GLint,
                rect.width() as GLint,
                rect.height() as GLint,
                self.tuple.format,
                self.tuple.ty,
                buffer_offset_ptr(staging.buffer_offset),
            );
            gl::PixelStorei(gl::UNPACK_ROW_LENGTH, 0);
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
        Ok(())
    }

    /// Read a region of this surface back into staging memory
    ///
    /// Synchronous: the staged bytes are valid on return.
    pub fn download(
        &mut self,
        runtime: &mut TextureRuntime,
        copy: &BufferTextureCopy,
        staging: &mut StagingData,
    ) -> Result<()> {
        if self.params.res_scale > 1 {
            return self.scaled_download(runtime, copy, staging);
        }

        debug_assert_eq!(self.params.texture_type, TextureType::Texture2D);

        let rect = copy.texture_rect;
        runtime.bind_framebuffer(
            gl::READ_FRAMEBUFFER,
            copy.texture_level,
            gl::TEXTURE_2D,
            self.params.surface_type(),
            self.handle(),
        );
        unsafe {
            gl::PixelStorei(gl::PACK_ROW_LENGTH, rect.width() as GLint);
            gl::ReadPixels(
                rect.left as GLint,
                rect.bottom as GLint,
                rect.width() as GLint,
                rect.height() as GLint,
                self.tuple.format,
                self.tuple.ty,
                staging.mapped_slice().as_mut_ptr() as *mut c_void,
            );
            gl::PixelStorei(gl::PACK_ROW_LENGTH, 0);
            gl::BindFramebuffer(gl::READ_FRAMEBUFFER, 0);
        }
        Ok(())
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
}

impl Drop for Surface {
    fn drop(&mut self) {
        if let Some(texture) = self.texture.take() {
            let tag = self.tag();
            if let Ok(mut recycler) = self.recycler.lock() {
                recycler.pool.recycle(tag, texture);
            }
            // A poisoned lock drops the texture here, deleting it
        }
    }
}
