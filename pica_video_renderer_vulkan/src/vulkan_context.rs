/// GpuContext - Shared GPU resources for all Vulkan objects
///
/// Contains everything the runtime needs for GPU operations:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue for command submission
/// - Per-format capabilities resolved at creation time

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

use pica_video::PixelFormat;

use crate::vulkan_format::{self, FormatTraits};

/// Shared GPU context for all Vulkan resources.
///
/// This struct is shared (via `Arc`) by all GPU resources (surfaces,
/// stream buffers, framebuffers) to avoid duplicating device/allocator
/// references in each resource.
///
/// Note: Device and instance destruction is owned by the embedding
/// frontend, which created them. This crate only borrows them.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator (shared, requires mutex for thread safety)
    /// Wrapped in ManuallyDrop to ensure it's dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Host capabilities per emulated format, resolved once at startup
    format_traits: [FormatTraits; PixelFormat::COUNT],
}

impl GpuContext {
    /// Create a new GPU context
    ///
    /// # Arguments
    ///
    /// * `instance` - Vulkan instance the device was created from
    /// * `physical_device` - Physical device, queried for format support
    /// * `device` - Vulkan logical device
    /// * `allocator` - GPU memory allocator
    /// * `graphics_queue` - Graphics queue for command submission
    /// * `graphics_queue_family` - Graphics queue family index
    pub fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        allocator: Arc<Mutex<Allocator>>,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
    ) -> Self {
        let format_traits =
            vulkan_format::resolve_format_traits(instance, physical_device);
        Self {
            device,
            allocator: ManuallyDrop::new(allocator),
            graphics_queue,
            graphics_queue_family,
            format_traits,
        }
    }

    /// Host traits of an emulated pixel format
    ///
    /// `Invalid` maps to the RGBA8 traits so fill surfaces get a real
    /// backing texture.
    pub fn traits(&self, format: PixelFormat) -> FormatTraits {
        let index = match format {
            PixelFormat::Invalid => PixelFormat::RGBA8.index(),
            _ => format.index(),
        };
        self.format_traits[index]
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        // NOTE: Device and instance destruction is owned by the frontend.
        // This Drop impl intentionally does nothing.
    }
}
