/// Transfer operation descriptors
///
/// Plain data passed from the cache layer to the backends. Rectangles are
/// in host (scaled) texels unless a method documents otherwise.

use crate::math::{Extent, Offset, Rect};

/// Copy between a staging buffer and one mip level of a texture
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferTextureCopy {
    /// Offset of the data inside the staging stream buffer
    pub buffer_offset: u64,
    /// Size of the staged data in bytes
    pub buffer_size: u32,
    /// Target region, in texels of the addressed mip level
    pub texture_rect: Rect,
    /// Mip level addressed
    pub texture_level: u32,
}

/// 1:1 region copy between two textures
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureCopy {
    pub src_level: u32,
    pub dst_level: u32,
    pub src_layer: u32,
    pub dst_layer: u32,
    pub src_offset: Offset,
    pub dst_offset: Offset,
    pub extent: Extent,
}

/// Scaling copy between two textures
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureBlit {
    pub src_level: u32,
    pub dst_level: u32,
    pub src_layer: u32,
    pub dst_layer: u32,
    pub src_rect: Rect,
    pub dst_rect: Rect,
}

/// Clear of a region of one mip level
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureClear {
    pub texture_level: u32,
    pub texture_rect: Rect,
}
