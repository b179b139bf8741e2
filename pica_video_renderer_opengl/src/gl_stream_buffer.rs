/// Staging memory for GL transfers
///
/// Uploads stage through a persistently mapped pixel-unpack PBO so
/// `glTexSubImage2D` sources from GPU-visible memory. Downloads are
/// synchronous in this backend (`glReadPixels` into client memory), so
/// they stage through a growable CPU arena instead of a buffer object.

use gl::types::GLuint;
use std::ffi::c_void;

use pica_video::{video_debug, Error, Result};

use crate::gl_handles::OglBuffer;

/// Upload PBO size, enough for a few frames of transfers
pub const UPLOAD_BUFFER_SIZE: usize = 32 * 1024 * 1024;
/// Initial download arena size; grows to fit the largest download seen
pub const DOWNLOAD_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// View into a staged range
///
/// `buffer` is the PBO handle for uploads and zero for downloads, which
/// stage through client memory.
pub struct StagingData {
    pub buffer: GLuint,
    pub size: u32,
    pub buffer_offset: u64,
    mapped: *mut u8,
}

impl StagingData {
    /// CPU view of the staged bytes
    pub fn mapped_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.mapped, self.size as usize) }
    }
}

/// Round `value` up to a power-of-two alignment
pub(crate) const fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// Persistently mapped pixel-unpack buffer
pub struct UploadStreamBuffer {
    buffer: OglBuffer,
    mapped_base: *mut u8,
    size: usize,
    offset: usize,
    mapped_offset: usize,
}

impl UploadStreamBuffer {
    pub fn new(size: usize) -> Result<Self> {
        let buffer = OglBuffer::new();
        let flags = gl::MAP_WRITE_BIT | gl::MAP_PERSISTENT_BIT | gl::MAP_COHERENT_BIT;
        let mapped_base = unsafe {
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, buffer.handle);
            gl::BufferStorage(
                gl::PIXEL_UNPACK_BUFFER,
                size as isize,
                std::ptr::null(),
                flags,
            );
            let mapped = gl::MapBufferRange(gl::PIXEL_UNPACK_BUFFER, 0, size as isize, flags);
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
            mapped as *mut u8
        };
        if mapped_base.is_null() {
            return Err(Error::InitializationFailed(
                "Failed to map upload stream buffer".to_string(),
            ));
        }
        Ok(Self {
            buffer,
            mapped_base,
            size,
            offset: 0,
            mapped_offset: 0,
        })
    }

    /// Reserve an aligned range of the PBO
    ///
    /// When the cursor would overflow it wraps to the start; a `glFinish`
    /// drains any command still sourcing from the buffer first.
    pub fn map(&mut self, size: usize, alignment: usize) -> Result<StagingData> {
        debug_assert!(alignment.is_power_of_two());
        if size > self.size {
            return Err(Error::OutOfMemory);
        }

        let mut offset = align_up(self.offset, alignment);
        if offset + size > self.size {
            video_debug!(
                "video::opengl::StreamBuffer",
                "Upload buffer wrapped at offset {}",
                offset
            );
            unsafe { gl::Finish() };
            offset = 0;
        }
        self.mapped_offset = offset;

        Ok(StagingData {
            buffer: self.buffer.handle,
            size: size as u32,
            buffer_offset: offset as u64,
            mapped: unsafe { self.mapped_base.add(offset) },
        })
    }

    /// Mark the last mapped range as used
    pub fn commit(&mut self, size: usize) {
        self.offset = self.mapped_offset + size;
    }

    /// Reset the cursor; valid once the GL stream has drained
    pub fn invalidate(&mut self) {
        self.offset = 0;
        self.mapped_offset = 0;
    }
}

impl Drop for UploadStreamBuffer {
    fn drop(&mut self) {
        unsafe {
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, self.buffer.handle);
            gl::UnmapBuffer(gl::PIXEL_UNPACK_BUFFER);
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
        }
    }
}

/// Growable client-memory arena for downloads
pub(crate) struct DownloadArena {
    data: Vec<u8>,
}

impl DownloadArena {
    pub(crate) fn new() -> Self {
        Self {
            data: vec![0; DOWNLOAD_BUFFER_SIZE],
        }
    }

    /// Stage a download of `size` bytes
    ///
    /// Downloads complete synchronously, so every staging starts at
    /// offset zero and the arena only grows.
    pub(crate) fn staging(&mut self, size: u32) -> StagingData {
        if size as usize > self.data.len() {
            self.data.resize(size as usize, 0);
        }
        StagingData {
            buffer: 0,
            size,
            buffer_offset: 0,
            mapped: self.data.as_mut_ptr(),
        }
    }
}

/// Byte offset as the pointer-typed argument GL pixel transfers expect
/// when a PBO is bound
pub(crate) fn buffer_offset_ptr(offset: u64) -> *const c_void {
    offset as usize as *const c_void
}

#[cfg(test)]
#[path = "gl_stream_buffer_tests.rs"]
mod tests;
