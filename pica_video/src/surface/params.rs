/// Surface parameters describing an emulated surface
///
/// These are the cache-visible properties of a surface. Backends derive
/// everything else (host format, usage flags, mip extents) from them.

use crate::math::Rect;
use crate::surface::{PixelFormat, SurfaceType, TextureType};

/// Dimensions, format, and scaling of an emulated surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceParams {
    /// Width in emulated texels
    pub width: u32,
    /// Height in emulated texels
    pub height: u32,
    /// Row pitch in emulated texels (>= width)
    pub stride: u32,
    /// Number of mip levels
    pub levels: u32,
    /// Resolution scale factor applied to the host texture
    pub res_scale: u32,
    /// 2D or cube
    pub texture_type: TextureType,
    /// Emulated pixel format
    pub pixel_format: PixelFormat,
}

impl SurfaceParams {
    pub const fn surface_type(&self) -> SurfaceType {
        self.pixel_format.surface_type()
    }

    pub const fn scaled_width(&self) -> u32 {
        self.width * self.res_scale
    }

    pub const fn scaled_height(&self) -> u32 {
        self.height * self.res_scale
    }

    /// Full rectangle in unscaled texels
    pub const fn rect(&self) -> Rect {
        Rect::from_extent(self.width, self.height)
    }

    /// Full rectangle in host texels
    pub const fn scaled_rect(&self) -> Rect {
        Rect::from_extent(self.scaled_width(), self.scaled_height())
    }

    /// Parameters of an unscaled single-level surface covering `rect`
    ///
    /// Used by the scaled upload/download paths, which stage data through
    /// an ephemeral 1x surface before blitting.
    pub const fn unscaled(&self, rect: Rect) -> SurfaceParams {
        SurfaceParams {
            width: rect.width(),
            height: rect.height(),
            stride: rect.width(),
            levels: 1,
            res_scale: 1,
            texture_type: TextureType::Texture2D,
            pixel_format: self.pixel_format,
        }
    }
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            stride: 0,
            levels: 1,
            res_scale: 1,
            texture_type: TextureType::Texture2D,
            pixel_format: PixelFormat::Invalid,
        }
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
