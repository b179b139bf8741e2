/// Pixel reinterpretation between incompatible formats
///
/// The rasterizer cache sometimes needs the bits of one surface as the
/// logical content of another format, most commonly a depth-stencil
/// buffer sampled as color. Vulkan cannot alias a depth image as RGBA8,
/// so the registered strategy round-trips through staging memory: the
/// per-aspect planes are downloaded, merged into emulated words on the
/// CPU, and uploaded into the destination image.

use pica_video::{BufferTextureCopy, PixelFormat, Rect, Result};

use crate::vulkan_surface::Surface;
use crate::vulkan_texture_runtime::TextureRuntime;

/// One source -> destination reinterpretation strategy
///
/// Strategies are stateless and registered in static per-destination
/// lists, so they must be shareable between threads.
pub trait FormatReinterpreter: Sync {
    /// Source format this strategy consumes
    fn source_format(&self) -> PixelFormat;

    /// Rewrite `src_rect` of `source` as `dst_rect` of `dest`
    ///
    /// Blocks on the GPU: the source bits must be observed before the
    /// destination copy can be staged.
    fn reinterpret(
        &self,
        runtime: &mut TextureRuntime,
        source: &mut Surface,
        src_rect: Rect,
        dest: &mut Surface,
        dst_rect: Rect,
    ) -> Result<()>;
}

/// D24S8 -> RGBA8: each depth-stencil word becomes one RGBA8 texel
struct D24S8ToRgba8;

impl FormatReinterpreter for D24S8ToRgba8 {
    fn source_format(&self) -> PixelFormat {
        PixelFormat::D24S8
    }

    fn reinterpret(
        &self,
        runtime: &mut TextureRuntime,
        source: &mut Surface,
        src_rect: Rect,
        dest: &mut Surface,
        dst_rect: Rect,
    ) -> Result<()> {
        debug_assert_eq!(source.params.pixel_format, PixelFormat::D24S8);
        debug_assert_eq!(dest.params.pixel_format, PixelFormat::RGBA8);
        debug_assert_eq!(src_rect.width(), dst_rect.width());
        debug_assert_eq!(src_rect.height(), dst_rect.height());

        let texels = (src_rect.width() * src_rect.height()) as usize;
        let download_size = (texels * source.internal_bytes_per_pixel() as usize) as u32;
        let word_size = texels * 4;

        let mut download = runtime.find_staging(download_size, true)?;
        let download_copy = BufferTextureCopy {
            buffer_offset: download.buffer_offset,
            buffer_size: download_size,
            texture_rect: src_rect,
            texture_level: 0,
        };
        source.download(runtime, &download_copy, &mut download)?;

        // The interleave fixup runs inside finish; afterwards the first
        // four fifths of the staged range hold packed D24S8 words
        pica_video::TextureRuntime::finish(runtime)?;

        let mut upload = runtime.find_staging(word_size as u32, false)?;
        upload
            .mapped_slice()
            .copy_from_slice(&download.mapped_slice()[..word_size]);

        let upload_copy = BufferTextureCopy {
            buffer_offset: upload.buffer_offset,
            buffer_size: word_size as u32,
            texture_rect: dst_rect,
            texture_level: 0,
        };
        dest.upload(runtime, &upload_copy, upload)
    }
}

static D24S8_TO_RGBA8: D24S8ToRgba8 = D24S8ToRgba8;

static TO_RGBA8: [&dyn FormatReinterpreter; 1] = [&D24S8_TO_RGBA8];

/// Strategies able to produce the given destination format
pub fn possible_reinterpretations(
    dest_format: PixelFormat,
) -> &'static [&'static dyn FormatReinterpreter] {
    match dest_format {
        PixelFormat::RGBA8 => &TO_RGBA8,
        _ => &[],
    }
}

#[cfg(test)]
#[path = "vulkan_reinterpret_tests.rs"]
mod tests;
