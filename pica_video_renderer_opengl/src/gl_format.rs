/// Pixel format translation tables
///
/// Each emulated format maps to a `FormatTuple` naming the storage
/// format and the wire format/type used by `glTexSubImage2D` and
/// `glReadPixels`. GLES lacks the packed desktop wire types for
/// RGBA8/RGB8, so those fall back to plain RGBA bytes and the rasterizer
/// cache converts on the CPU.

use gl::types::{GLbitfield, GLenum};

use pica_video::{video_critical, PixelFormat, SurfaceType};

/// Storage and wire formats for one emulated pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTuple {
    pub internal_format: GLenum,
    pub format: GLenum,
    pub ty: GLenum,
}

const DEFAULT_TUPLE: FormatTuple = FormatTuple {
    internal_format: gl::RGBA8,
    format: gl::RGBA,
    ty: gl::UNSIGNED_BYTE,
};

/// Tuple used to store and transfer the given format
pub const fn format_tuple(format: PixelFormat, is_gles: bool) -> FormatTuple {
    match format {
        PixelFormat::RGBA8 if is_gles => FormatTuple {
            internal_format: gl::RGBA8,
            format: gl::RGBA,
            ty: gl::UNSIGNED_BYTE,
        },
        PixelFormat::RGBA8 => FormatTuple {
            internal_format: gl::RGBA8,
            format: gl::RGBA,
            ty: gl::UNSIGNED_INT_8_8_8_8,
        },
        // GLES has no BGR wire format; RGB8 is stored as RGBA8 there
        PixelFormat::RGB8 if is_gles => FormatTuple {
            internal_format: gl::RGBA8,
            format: gl::RGBA,
            ty: gl::UNSIGNED_BYTE,
        },
        PixelFormat::RGB8 => FormatTuple {
            internal_format: gl::RGB8,
            format: gl::BGR,
            ty: gl::UNSIGNED_BYTE,
        },
        PixelFormat::RGB5A1 => FormatTuple {
            internal_format: gl::RGB5_A1,
            format: gl::RGBA,
            ty: gl::UNSIGNED_SHORT_5_5_5_1,
        },
        PixelFormat::RGB565 => FormatTuple {
            internal_format: gl::RGB565,
            format: gl::RGB,
            ty: gl::UNSIGNED_SHORT_5_6_5,
        },
        PixelFormat::RGBA4 => FormatTuple {
            internal_format: gl::RGBA4,
            format: gl::RGBA,
            ty: gl::UNSIGNED_SHORT_4_4_4_4,
        },
        PixelFormat::D16 => FormatTuple {
            internal_format: gl::DEPTH_COMPONENT16,
            format: gl::DEPTH_COMPONENT,
            ty: gl::UNSIGNED_SHORT,
        },
        PixelFormat::D24 => FormatTuple {
            internal_format: gl::DEPTH_COMPONENT24,
            format: gl::DEPTH_COMPONENT,
            ty: gl::UNSIGNED_INT,
        },
        // Interleaved 24.8 words transfer directly, no plane split needed
        PixelFormat::D24S8 => FormatTuple {
            internal_format: gl::DEPTH24_STENCIL8,
            format: gl::DEPTH_STENCIL,
            ty: gl::UNSIGNED_INT_24_8,
        },
        PixelFormat::Invalid => DEFAULT_TUPLE,
    }
}

/// Bytes one texel occupies in staging memory
///
/// GL transfers D24S8 as interleaved 24.8 words, so the staging footprint
/// always matches the emulated footprint.
pub const fn staging_bytes_per_pixel(format: PixelFormat) -> u32 {
    format.bytes_per_pixel()
}

/// Whether uploads of this format require CPU conversion first
pub const fn needs_conversion(format: PixelFormat, is_gles: bool) -> bool {
    is_gles && matches!(format, PixelFormat::RGBA8 | PixelFormat::RGB8)
}

/// Buffer bits a blit of the given surface type transfers
pub fn buffer_mask(surface_type: SurfaceType) -> GLbitfield {
    match surface_type {
        SurfaceType::Color | SurfaceType::Texture | SurfaceType::Fill => gl::COLOR_BUFFER_BIT,
        SurfaceType::Depth => gl::DEPTH_BUFFER_BIT,
        SurfaceType::DepthStencil => gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT,
        SurfaceType::Invalid => {
            video_critical!("video::opengl::Format", "Invalid surface type");
            unreachable!()
        }
    }
}

#[cfg(test)]
#[path = "gl_format_tests.rs"]
mod tests;
