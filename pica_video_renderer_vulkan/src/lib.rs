/*!
# PICA Video - Vulkan Backend

Vulkan implementation of the PICA surface and texture runtime.

This crate implements the pica_video traits using the Ash library for
Vulkan bindings and gpu-allocator for memory management. All transfer
work is recorded into deferred command buffers and submitted in batches;
only `TextureRuntime::finish` blocks on the GPU.
*/

// Vulkan implementation modules
mod vulkan_context;
mod vulkan_format;
mod vulkan_framebuffer;
mod vulkan_render_pass;
mod vulkan_reinterpret;
mod vulkan_sampler;
mod vulkan_scheduler;
mod vulkan_stream_buffer;
mod vulkan_surface;
mod vulkan_texture_runtime;

pub use vulkan_context::GpuContext;
pub use vulkan_format::FormatTraits;
pub use vulkan_framebuffer::Framebuffer;
pub use vulkan_reinterpret::{possible_reinterpretations, FormatReinterpreter};
pub use vulkan_sampler::SamplerCache;
pub use vulkan_stream_buffer::StagingData;
pub use vulkan_surface::Surface;
pub use vulkan_texture_runtime::TextureRuntime;
