/// Pixel reinterpretation between incompatible formats
///
/// GL transfers D24S8 as interleaved 24.8 words, so reinterpreting a
/// depth-stencil surface as RGBA8 is a plain readback and re-upload of
/// the same bytes. RGBA4 to RGB5A1 converts each texel on the CPU while
/// it moves between the download arena and the upload PBO.

use pica_video::{BufferTextureCopy, PixelFormat, Rect, Result};

use crate::gl_surface::Surface;
use crate::gl_texture_runtime::TextureRuntime;

/// One source -> destination reinterpretation strategy
///
/// Strategies are stateless and registered in static per-destination
/// lists, so they must be shareable between threads.
pub trait FormatReinterpreter: Sync {
    /// Source format this strategy consumes
    fn source_format(&self) -> PixelFormat;

    /// Rewrite `src_rect` of `source` as `dst_rect` of `dest`
    fn reinterpret(
        &self,
        runtime: &mut TextureRuntime,
        source: &mut Surface,
        src_rect: Rect,
        dest: &mut Surface,
        dst_rect: Rect,
    ) -> Result<()>;
}

fn rect_copy(rect: Rect, buffer_offset: u64, buffer_size: u32) -> BufferTextureCopy {
    BufferTextureCopy {
        buffer_offset,
        buffer_size,
        texture_rect: rect,
        texture_level: 0,
    }
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

        let size = src_rect.width() * src_rect.height() * 4;
        let mut download = runtime.find_staging(size, true)?;
        source.download(runtime, &rect_copy(src_rect, 0, size), &mut download)?;

        let mut upload = runtime.find_staging(size, false)?;
        upload.mapped_slice().copy_from_slice(download.mapped_slice());
        dest.upload(
            runtime,
            &rect_copy(dst_rect, upload.buffer_offset, size),
            upload,
        )
    }
}

/// Widen one RGBA4 texel to RGB5A1
///
/// The low four-bit channels replicate their top bit to fill five bits;
/// alpha keeps only its top bit.
pub(crate) fn rgba4_to_rgb5a1(texel: u16) -> u16 {
    let expand = |c: u16| (c << 1) | (c >> 3);
    let r = expand((texel >> 12) & 0xF);
    let g = expand((texel >> 8) & 0xF);
    let b = expand((texel >> 4) & 0xF);
    let a = (texel & 0xF) >> 3;
    (r << 11) | (g << 6) | (b << 1) | a
}

/// RGBA4 -> RGB5A1: per-texel channel widening
struct Rgba4ToRgb5a1;

impl FormatReinterpreter for Rgba4ToRgb5a1 {
    fn source_format(&self) -> PixelFormat {
        PixelFormat::RGBA4
    }

    fn reinterpret(
        &self,
        runtime: &mut TextureRuntime,
        source: &mut Surface,
        src_rect: Rect,
        dest: &mut Surface,
        dst_rect: Rect,
    ) -> Result<()> {
        debug_assert_eq!(source.params.pixel_format, PixelFormat::RGBA4);
        debug_assert_eq!(dest.params.pixel_format, PixelFormat::RGB5A1);

        let size = src_rect.width() * src_rect.height() * 2;
        let mut download = runtime.find_staging(size, true)?;
        source.download(runtime, &rect_copy(src_rect, 0, size), &mut download)?;

        let mut upload = runtime.find_staging(size, false)?;
        for (src, dst) in download
            .mapped_slice()
            .chunks_exact(2)
            .zip(upload.mapped_slice().chunks_exact_mut(2))
        {
            let texel = u16::from_ne_bytes([src[0], src[1]]);
            dst.copy_from_slice(&rgba4_to_rgb5a1(texel).to_ne_bytes());
        }
        dest.upload(
            runtime,
            &rect_copy(dst_rect, upload.buffer_offset, size),
            upload,
        )
    }
}

static D24S8_TO_RGBA8: D24S8ToRgba8 = D24S8ToRgba8;
static RGBA4_TO_RGB5A1: Rgba4ToRgb5a1 = Rgba4ToRgb5a1;

static TO_RGBA8: [&dyn FormatReinterpreter; 1] = [&D24S8_TO_RGBA8];
static TO_RGB5A1: [&dyn FormatReinterpreter; 1] = [&RGBA4_TO_RGB5A1];

/// Strategies able to produce the given destination format
pub fn possible_reinterpretations(
    dest_format: PixelFormat,
) -> &'static [&'static dyn FormatReinterpreter] {
    match dest_format {
        PixelFormat::RGBA8 => &TO_RGBA8,
        PixelFormat::RGB5A1 => &TO_RGB5A1,
        _ => &[],
    }
}

#[cfg(test)]
#[path = "gl_reinterpret_tests.rs"]
mod tests;
