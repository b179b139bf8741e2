/*!
# PICA Video - OpenGL Backend

OpenGL implementation of the PICA surface and texture runtime.

Unlike the Vulkan backend this one executes immediately: every runtime
operation issues GL commands on the current context, and `finish` is a
plain `glFinish`. The caller must have a context current and the `gl`
function pointers loaded before constructing the runtime.

State handling is explicit. Every operation binds exactly the state it
needs and restores the bindings it touched before returning; there is no
global state shadow.
*/

// OpenGL implementation modules
mod gl_format;
mod gl_framebuffer;
mod gl_handles;
mod gl_reinterpret;
mod gl_sampler;
mod gl_stream_buffer;
mod gl_surface;
mod gl_texture_runtime;

pub use gl_format::FormatTuple;
pub use gl_framebuffer::Framebuffer;
pub use gl_handles::{OglBuffer, OglFramebuffer, OglSampler, OglTexture};
pub use gl_reinterpret::{possible_reinterpretations, FormatReinterpreter};
pub use gl_sampler::SamplerCache;
pub use gl_stream_buffer::StagingData;
pub use gl_surface::Surface;
pub use gl_texture_runtime::TextureRuntime;
