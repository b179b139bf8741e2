/// Framebuffer - cached (color, depth-stencil) attachment pairs
///
/// Host framebuffer objects are cached by the pair of attachment texture
/// handles; identical pairs share one FBO. The cache owns the FBOs and
/// deletes them when it drops.

use gl::types::{GLint, GLuint};
use rustc_hash::FxHashMap;

use pica_video::{PixelFormat, Rect, Result};

use crate::gl_handles::OglFramebuffer;
use crate::gl_surface::Surface;
use crate::gl_texture_runtime::TextureRuntime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FramebufferKey {
    color: GLuint,
    depth_stencil: GLuint,
}

pub(crate) struct FramebufferCache {
    cache: FxHashMap<FramebufferKey, OglFramebuffer>,
}

impl FramebufferCache {
    pub(crate) fn new() -> Self {
        Self {
            cache: FxHashMap::default(),
        }
    }

    /// Get or create the FBO for an attachment pair
    ///
    /// `has_stencil` selects the depth-stencil attachment point; plain
    /// depth formats leave the stencil attachment cleared.
    pub(crate) fn get(&mut self, key: FramebufferKey, has_stencil: bool) -> GLuint {
        if let Some(framebuffer) = self.cache.get(&key) {
            return framebuffer.handle;
        }

        let framebuffer = OglFramebuffer::new();
        let handle = framebuffer.handle;
        unsafe {
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, handle);
            gl::FramebufferTexture2D(
                gl::DRAW_FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_2D,
                key.color,
                0,
            );
            if key.depth_stencil != 0 && has_stencil {
                gl::FramebufferTexture2D(
                    gl::DRAW_FRAMEBUFFER,
                    gl::DEPTH_STENCIL_ATTACHMENT,
                    gl::TEXTURE_2D,
                    key.depth_stencil,
                    0,
                );
            } else {
                gl::FramebufferTexture2D(
                    gl::DRAW_FRAMEBUFFER,
                    gl::DEPTH_ATTACHMENT,
                    gl::TEXTURE_2D,
                    key.depth_stencil,
                    0,
                );
                gl::FramebufferTexture2D(
                    gl::DRAW_FRAMEBUFFER,
                    gl::STENCIL_ATTACHMENT,
                    gl::TEXTURE_2D,
                    0,
                    0,
                );
            }
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, 0);
        }

        self.cache.insert(key, framebuffer);
        handle
    }
}

/// A render target pairing a color surface and a depth-stencil surface
///
/// Both attachments are optional but at least one must be present. The
/// host FBO comes from the runtime's cache and is shared between
/// framebuffers with the same attachment pair.
pub struct Framebuffer {
    handle: GLuint,
    render_area: Rect,
    res_scale: u32,
}

impl Framebuffer {
    pub fn new(
        runtime: &mut TextureRuntime,
        color: Option<&Surface>,
        depth_stencil: Option<&Surface>,
        render_area: Rect,
    ) -> Result<Self> {
        debug_assert!(color.is_some() || depth_stencil.is_some());

        let key = FramebufferKey {
            color: color.map(Surface::handle).unwrap_or(0),
            depth_stencil: depth_stencil.map(Surface::handle).unwrap_or(0),
        };
        let has_stencil = depth_stencil
            .map(|surface| surface.params.pixel_format == PixelFormat::D24S8)
            .unwrap_or(false);
        let res_scale = color
            .or(depth_stencil)
            .map(|surface| surface.params.res_scale)
            .unwrap_or(1);

        Ok(Self {
            handle: runtime.framebuffers.get(key, has_stencil),
            render_area,
            res_scale,
        })
    }

    pub fn handle(&self) -> GLuint {
        self.handle
    }

    pub fn render_area(&self) -> Rect {
        self.render_area
    }

    pub fn res_scale(&self) -> u32 {
        self.res_scale
    }

    /// Bind as the draw framebuffer with viewport and scissor set to the
    /// render area
    pub fn bind(&self) {
        let area = self.render_area;
        unsafe {
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, self.handle);
            gl::Viewport(
                area.left as GLint,
                area.bottom as GLint,
                area.width() as GLint,
                area.height() as GLint,
            );
            gl::Scissor(
                area.left as GLint,
                area.bottom as GLint,
                area.width() as GLint,
                area.height() as GLint,
            );
        }
    }
}

#[cfg(test)]
#[path = "gl_framebuffer_tests.rs"]
mod tests;
