/// RAII wrappers for raw GL object names
///
/// Each wrapper owns exactly one GL object and deletes it on drop. The
/// wrappers never bind anything; callers manage bindings explicitly.

use gl::types::GLuint;

pub struct OglTexture {
    pub handle: GLuint,
}

impl OglTexture {
    pub fn new() -> Self {
        let mut handle = 0;
        unsafe { gl::GenTextures(1, &mut handle) };
        Self { handle }
    }
}

impl Drop for OglTexture {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.handle) };
    }
}

pub struct OglFramebuffer {
    pub handle: GLuint,
}

impl OglFramebuffer {
    pub fn new() -> Self {
        let mut handle = 0;
        unsafe { gl::GenFramebuffers(1, &mut handle) };
        Self { handle }
    }
}

impl Drop for OglFramebuffer {
    fn drop(&mut self) {
        unsafe { gl::DeleteFramebuffers(1, &self.handle) };
    }
}

pub struct OglBuffer {
    pub handle: GLuint,
}

impl OglBuffer {
    pub fn new() -> Self {
        let mut handle = 0;
        unsafe { gl::GenBuffers(1, &mut handle) };
        Self { handle }
    }
}

impl Drop for OglBuffer {
    fn drop(&mut self) {
        unsafe { gl::DeleteBuffers(1, &self.handle) };
    }
}

pub struct OglSampler {
    pub handle: GLuint,
}

impl OglSampler {
    pub fn new() -> Self {
        let mut handle = 0;
        unsafe { gl::GenSamplers(1, &mut handle) };
        Self { handle }
    }
}

impl Drop for OglSampler {
    fn drop(&mut self) {
        unsafe { gl::DeleteSamplers(1, &self.handle) };
    }
}
