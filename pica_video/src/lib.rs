/*!
# PICA Video Core

Core traits and types for the PICA surface and texture runtime.

This crate provides the backend-agnostic API used by the rasterizer cache
to allocate, upload, download, and transform emulated GPU surfaces. Backend
implementations (Vulkan, OpenGL) provide concrete runtime and surface types
that implement these traits.

## Architecture

- **TextureRuntime**: Backend trait for texture transfers and transforms
- **SurfaceParams**: Dimensions, format, and scaling of an emulated surface
- **TextureRecycler**: Multimap pool of retired GPU allocations
- **PixelFormat**: The emulated formats and their footprints

Backend crates depend on this one and are otherwise independent.
*/

// Internal modules
mod error;
pub mod log;
pub mod math;
pub mod runtime;
pub mod surface;

// Main video namespace module
pub mod video {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{set_logger, DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Surface sub-module with the data model types
    pub mod surface {
        pub use crate::surface::*;
    }

    // Runtime sub-module with the backend trait and pooling
    pub mod runtime {
        pub use crate::runtime::*;
    }
}

// Re-export the most used types at crate root
pub use error::{Error, Result};
pub use math::{Extent, Offset, Rect};
pub use runtime::{default_usage, HostTextureTag, ImageUsage, TextureRecycler, TextureRuntime};
pub use surface::{
    BufferTextureCopy, ClearValue, PixelFormat, SamplerParams, SurfaceParams, SurfaceType,
    TextureBlit, TextureClear, TextureCopy, TextureFilter, TextureType, WrapMode,
};
