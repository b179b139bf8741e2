/// Emulated GPU pixel formats and their classification
///
/// The emulated rasterizer knows exactly five color formats and three
/// depth formats. Everything the runtime does (staging sizes, aspect
/// selection, reinterpretation) derives from this enum.

/// Pixel format of an emulated surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PixelFormat {
    /// 32-bit RGBA, 8 bits per channel
    RGBA8,
    /// 24-bit RGB, no alpha
    RGB8,
    /// 16-bit RGB with 1-bit alpha
    RGB5A1,
    /// 16-bit RGB
    RGB565,
    /// 16-bit RGBA, 4 bits per channel
    RGBA4,
    /// 16-bit depth
    D16,
    /// 24-bit depth
    D24,
    /// 24-bit depth with 8-bit stencil
    D24S8,
    /// Placeholder for fill surfaces with no texel interpretation
    Invalid,
}

impl PixelFormat {
    /// Number of real formats (Invalid excluded)
    pub const COUNT: usize = 8;

    /// Bits per texel in emulated memory
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::RGBA8 => 32,
            PixelFormat::RGB8 => 24,
            PixelFormat::RGB5A1 => 16,
            PixelFormat::RGB565 => 16,
            PixelFormat::RGBA4 => 16,
            PixelFormat::D16 => 16,
            PixelFormat::D24 => 24,
            PixelFormat::D24S8 => 32,
            PixelFormat::Invalid => 0,
        }
    }

    /// Bytes per texel in emulated memory
    pub const fn bytes_per_pixel(self) -> u32 {
        self.bits_per_pixel() / 8
    }

    /// Classify the format into the surface type used for aspect and
    /// attachment selection
    pub const fn surface_type(self) -> SurfaceType {
        match self {
            PixelFormat::RGBA8
            | PixelFormat::RGB8
            | PixelFormat::RGB5A1
            | PixelFormat::RGB565
            | PixelFormat::RGBA4 => SurfaceType::Color,
            PixelFormat::D16 | PixelFormat::D24 => SurfaceType::Depth,
            PixelFormat::D24S8 => SurfaceType::DepthStencil,
            PixelFormat::Invalid => SurfaceType::Invalid,
        }
    }

    /// Stable index for format lookup tables
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Broad classification of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceType {
    Color,
    Texture,
    Fill,
    Depth,
    DepthStencil,
    Invalid,
}

/// Dimensionality of the backing texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Texture2D,
    CubeMap,
}

impl TextureType {
    /// Number of array layers the texture needs
    pub const fn layers(self) -> u32 {
        match self {
            TextureType::Texture2D => 1,
            TextureType::CubeMap => 6,
        }
    }
}

/// Clear value covering both color and depth/stencil surfaces
///
/// Which fields apply is decided by the surface type of the cleared
/// texture, never by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearValue {
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u8,
}

#[cfg(test)]
#[path = "pixel_format_tests.rs"]
mod tests;
