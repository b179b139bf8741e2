/// Backend-agnostic surface data model
///
/// Pixel formats, surface parameters, transfer operation descriptors,
/// and sampler state shared by the Vulkan and OpenGL backends.

mod params;
mod pixel_format;
mod sampler;
mod transfer;

pub use params::SurfaceParams;
pub use pixel_format::{ClearValue, PixelFormat, SurfaceType, TextureType};
pub use sampler::{SamplerParams, TextureFilter, WrapMode};
pub use transfer::{BufferTextureCopy, TextureBlit, TextureClear, TextureCopy};
