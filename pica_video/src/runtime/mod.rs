/// Backend-agnostic texture runtime trait and pooling
///
/// The rasterizer cache drives a backend exclusively through the
/// [`TextureRuntime`] trait and the surface type it exposes. Backends may
/// record work lazily; only [`TextureRuntime::finish`] guarantees results
/// are visible to the CPU.

mod recycler;
mod unpack;

#[cfg(test)]
pub mod mock_runtime;

pub use recycler::{HostTextureTag, TextureRecycler};
pub use unpack::{
    pack_d24s8, stencil_plane_offset, unpack_d24s8, unpack_depth_stencil,
    D24S8_STAGING_BYTES_PER_PIXEL,
};

use bitflags::bitflags;

use crate::error::Result;
use crate::surface::{
    ClearValue, PixelFormat, SurfaceType, TextureBlit, TextureClear, TextureCopy, TextureFilter,
};

bitflags! {
    /// Host usage flags requested for a texture allocation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const SAMPLED                  = 1 << 0;
        const COLOR_ATTACHMENT         = 1 << 1;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 2;
        const TRANSFER_SRC             = 1 << 3;
        const TRANSFER_DST             = 1 << 4;
    }
}

/// Usage flags a surface of the given type needs
///
/// Every surface can be sampled and transferred in both directions; the
/// attachment flag follows the surface type.
pub fn default_usage(surface_type: SurfaceType) -> ImageUsage {
    let base = ImageUsage::SAMPLED | ImageUsage::TRANSFER_SRC | ImageUsage::TRANSFER_DST;
    match surface_type {
        SurfaceType::Color | SurfaceType::Texture | SurfaceType::Fill => {
            base | ImageUsage::COLOR_ATTACHMENT
        }
        SurfaceType::Depth | SurfaceType::DepthStencil => {
            base | ImageUsage::DEPTH_STENCIL_ATTACHMENT
        }
        SurfaceType::Invalid => base,
    }
}

/// Filter used when rescaling surfaces of the given format
///
/// Depth values must not be interpolated, so depth formats blit with
/// nearest filtering and color formats with linear.
pub fn rescale_filter(format: PixelFormat) -> TextureFilter {
    match format.surface_type() {
        SurfaceType::Depth | SurfaceType::DepthStencil => TextureFilter::Nearest,
        _ => TextureFilter::Linear,
    }
}

/// Backend texture runtime
///
/// Operations record GPU work; none of them block. `finish` submits all
/// recorded work and blocks until the GPU has executed it, after which
/// download staging data is valid.
pub trait TextureRuntime {
    /// Backend surface type
    type Surface;

    /// Submit all recorded work and block until it completes
    fn finish(&mut self) -> Result<()>;

    /// Clear a region of one level of a surface
    ///
    /// The value fields that apply are chosen by the surface type.
    fn clear_texture(
        &mut self,
        surface: &mut Self::Surface,
        clear: &TextureClear,
        value: ClearValue,
    ) -> Result<()>;

    /// 1:1 copy between two surfaces of the same format
    fn copy_textures(
        &mut self,
        source: &mut Self::Surface,
        dest: &mut Self::Surface,
        copy: &TextureCopy,
    ) -> Result<()>;

    /// Scaling blit between two surfaces of the same format
    fn blit_textures(
        &mut self,
        source: &mut Self::Surface,
        dest: &mut Self::Surface,
        blit: &TextureBlit,
    ) -> Result<()>;

    /// Regenerate levels 1..levels of a surface from level 0
    fn generate_mipmaps(&mut self, surface: &mut Self::Surface) -> Result<()>;

    /// Whether uploads of this format must be converted on the CPU
    /// before the backend can consume them
    fn needs_conversion(&self, format: PixelFormat) -> bool;
}
