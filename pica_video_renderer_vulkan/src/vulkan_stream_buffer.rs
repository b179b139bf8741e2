/// StreamBuffer - persistently mapped staging memory
///
/// All uploads and downloads stage through two of these (one per
/// direction). The buffer is mapped once at creation; `map` hands out
/// aligned sub-ranges, `commit` advances the write cursor, and
/// `invalidate` resets it after a `finish`.
///
/// When a request does not fit, the buffer grows: the old buffer is
/// retired but kept alive (recorded commands still reference it) and
/// freed on the next `invalidate`, which runs after the GPU has drained.

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use pica_video::{video_debug, Error, Result};

use crate::vulkan_context::GpuContext;

/// Default stream buffer size, enough for a few frames of transfers
pub const STREAM_BUFFER_SIZE: u64 = 32 * 1024 * 1024;

/// View into a mapped sub-range of a stream buffer
///
/// The pointer stays valid until the owning buffer is freed, which only
/// happens on `invalidate` after the GPU has drained. Not Send: staging
/// memory is written and read on the runtime thread only.
pub struct StagingData {
    /// Buffer the range lives in
    pub buffer: vk::Buffer,
    /// Range size in bytes
    pub size: u32,
    /// Offset of the range inside the buffer
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
pub(crate) const fn align_up(value: u64, alignment: u64) -> u64 {
    (value + alignment - 1) & !(alignment - 1)
}

/// Size of the replacement buffer after an overflow
pub(crate) const fn grown_size(current: u64, needed: u64) -> u64 {
    let mut size = current * 2;
    while size < needed {
        size *= 2;
    }
    size
}

pub struct StreamBuffer {
    ctx: Arc<GpuContext>,
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
    mapped_base: *mut u8,
    size: u64,
    /// Next free byte
    offset: u64,
    /// Offset handed out by the last `map`
    mapped_offset: u64,
    location: MemoryLocation,
    /// Outgrown buffers still referenced by in-flight commands
    retired: Vec<(vk::Buffer, Allocation)>,
}

impl StreamBuffer {
    /// Create a stream buffer
    ///
    /// `download` selects host-visible readback memory instead of upload
    /// memory.
    pub fn new(ctx: Arc<GpuContext>, size: u64, download: bool) -> Result<Self> {
        let location = if download {
            MemoryLocation::GpuToCpu
        } else {
            MemoryLocation::CpuToGpu
        };
        let (buffer, allocation, mapped_base) = Self::create_buffer(&ctx, size, location)?;
        Ok(Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            mapped_base,
            size,
            offset: 0,
            mapped_offset: 0,
            location,
            retired: Vec::new(),
        })
    }

    fn create_buffer(
        ctx: &GpuContext,
        size: u64,
        location: MemoryLocation,
    ) -> Result<(vk::Buffer, Allocation, *mut u8)> {
        unsafe {
            let buffer_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(vk::BufferUsageFlags::TRANSFER_SRC | vk::BufferUsageFlags::TRANSFER_DST)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);
            let buffer = ctx.device.create_buffer(&buffer_info, None).map_err(|e| {
                Error::InitializationFailed(format!("Failed to create stream buffer: {:?}", e))
            })?;

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let allocation = ctx
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("Allocator lock poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: "stream buffer",
                    requirements,
                    location,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| Error::OutOfMemory)?;

            ctx.device
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                .map_err(|e| {
                    Error::InitializationFailed(format!(
                        "Failed to bind stream buffer memory: {:?}",
                        e
                    ))
                })?;

            let mapped_base = allocation
                .mapped_ptr()
                .ok_or_else(|| {
                    Error::InitializationFailed(
                        "Stream buffer memory is not host-visible".to_string(),
                    )
                })?
                .as_ptr() as *mut u8;

            Ok((buffer, allocation, mapped_base))
        }
    }

    /// Reserve an aligned range of staging memory
    ///
    /// The range is not considered used until `commit`; calling `map`
    /// again before `commit` returns the same region.
    pub fn map(&mut self, size: u64, alignment: u64) -> Result<StagingData> {
        debug_assert!(alignment.is_power_of_two());

        let mut offset = align_up(self.offset, alignment);
        if offset + size > self.size {
            self.grow(size)?;
            offset = 0;
        }
        self.mapped_offset = offset;

        Ok(StagingData {
            buffer: self.buffer,
            size: size as u32,
            buffer_offset: offset,
            mapped: unsafe { self.mapped_base.add(offset as usize) },
        })
    }

    /// Mark the last mapped range as used
    pub fn commit(&mut self, size: u64) {
        self.offset = self.mapped_offset + size;
    }

    /// Reset the cursor and free outgrown buffers
    ///
    /// Must only be called once the GPU has executed everything that
    /// references this buffer.
    pub fn invalidate(&mut self) -> Result<()> {
        self.offset = 0;
        self.mapped_offset = 0;
        if self.retired.is_empty() {
            return Ok(());
        }
        let mut allocator = self
            .ctx
            .allocator
            .lock()
            .map_err(|_| Error::BackendError("Allocator lock poisoned".to_string()))?;
        for (buffer, allocation) in self.retired.drain(..) {
            allocator.free(allocation).ok();
            unsafe { self.ctx.device.destroy_buffer(buffer, None) };
        }
        Ok(())
    }

    fn grow(&mut self, needed: u64) -> Result<()> {
        let new_size = grown_size(self.size, needed);
        video_debug!(
            "video::vulkan::StreamBuffer",
            "Growing stream buffer from {} to {} bytes",
            self.size,
            new_size
        );

        let (buffer, allocation, mapped_base) =
            Self::create_buffer(&self.ctx, new_size, self.location)?;
        if let Some(old_allocation) = self.allocation.take() {
            self.retired.push((self.buffer, old_allocation));
        }
        self.buffer = buffer;
        self.allocation = Some(allocation);
        self.mapped_base = mapped_base;
        self.size = new_size;
        self.offset = 0;
        self.mapped_offset = 0;
        Ok(())
    }
}

impl Drop for StreamBuffer {
    fn drop(&mut self) {
        if let Ok(mut allocator) = self.ctx.allocator.lock() {
            for (buffer, allocation) in self.retired.drain(..) {
                allocator.free(allocation).ok();
                unsafe { self.ctx.device.destroy_buffer(buffer, None) };
            }
            if let Some(allocation) = self.allocation.take() {
                allocator.free(allocation).ok();
            }
        }
        unsafe { self.ctx.device.destroy_buffer(self.buffer, None) };
    }
}

#[cfg(test)]
#[path = "vulkan_stream_buffer_tests.rs"]
mod tests;
