/// Scheduler - deferred command recording and batched submission
///
/// Transfer operations do not talk to the GPU directly; they record
/// closures here. `flush` replays the closures into command buffers and
/// submits them, `finish` additionally blocks until the GPU is done.
///
/// Two command slots alternate so a new batch can be recorded while the
/// previous one executes. A separate upload command buffer is submitted
/// before the render one; only data-free image initialization goes
/// there, so fresh images are in a defined layout before any transfer in
/// the batch touches them. Everything that moves or depends on surface
/// data stays on the render buffer in recorded order.

use ash::vk;
use std::sync::Arc;

use pica_video::{video_trace, Error, Result};

use crate::vulkan_context::GpuContext;

/// Number of batches that can be in flight at once
const SCHEDULER_COMMAND_SLOTS: usize = 2;

/// Deferred command: receives the device, the render command buffer, and
/// the upload command buffer
type Command = Box<dyn FnOnce(&ash::Device, vk::CommandBuffer, vk::CommandBuffer)>;

struct CommandSlot {
    render_cmdbuf: vk::CommandBuffer,
    upload_cmdbuf: vk::CommandBuffer,
    fence: vk::Fence,
    /// A submission using this slot has not been waited on yet
    pending: bool,
}

pub struct Scheduler {
    ctx: Arc<GpuContext>,
    command_pool: vk::CommandPool,
    slots: Vec<CommandSlot>,
    current: usize,
    commands: Vec<Command>,
}

impl Scheduler {
    pub fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let pool_info = vk::CommandPoolCreateInfo::default()
                .flags(
                    vk::CommandPoolCreateFlags::TRANSIENT
                        | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
                )
                .queue_family_index(ctx.graphics_queue_family);
            let command_pool = ctx
                .device
                .create_command_pool(&pool_info, None)
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
                })?;

            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count((SCHEDULER_COMMAND_SLOTS * 2) as u32);
            let cmdbufs = ctx
                .device
                .allocate_command_buffers(&alloc_info)
                .map_err(|e| {
                    Error::InitializationFailed(format!(
                        "Failed to allocate command buffers: {:?}",
                        e
                    ))
                })?;

            let mut slots = Vec::with_capacity(SCHEDULER_COMMAND_SLOTS);
            for slot in 0..SCHEDULER_COMMAND_SLOTS {
                let fence = ctx
                    .device
                    .create_fence(&vk::FenceCreateInfo::default(), None)
                    .map_err(|e| {
                        Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
                    })?;
                slots.push(CommandSlot {
                    render_cmdbuf: cmdbufs[slot * 2],
                    upload_cmdbuf: cmdbufs[slot * 2 + 1],
                    fence,
                    pending: false,
                });
            }

            Ok(Self {
                ctx,
                command_pool,
                slots,
                current: 0,
                commands: Vec::new(),
            })
        }
    }

    /// Queue a closure for the next batch
    pub fn record(
        &mut self,
        command: impl FnOnce(&ash::Device, vk::CommandBuffer, vk::CommandBuffer) + 'static,
    ) {
        self.commands.push(Box::new(command));
    }

    /// Replay all queued closures and submit the batch
    ///
    /// Does not wait for the submitted work. May block briefly if both
    /// command slots are still executing.
    pub fn flush(&mut self) -> Result<()> {
        if self.commands.is_empty() {
            return Ok(());
        }

        let device = &self.ctx.device;
        let slot = &self.slots[self.current];
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe {
            device
                .begin_command_buffer(slot.render_cmdbuf, &begin_info)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to begin command buffer: {:?}", e))
                })?;
            device
                .begin_command_buffer(slot.upload_cmdbuf, &begin_info)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to begin command buffer: {:?}", e))
                })?;

            video_trace!(
                "video::vulkan::Scheduler",
                "Flushing {} deferred commands",
                self.commands.len()
            );
            for command in self.commands.drain(..) {
                command(device, slot.render_cmdbuf, slot.upload_cmdbuf);
            }

            device.end_command_buffer(slot.render_cmdbuf).map_err(|e| {
                Error::BackendError(format!("Failed to end command buffer: {:?}", e))
            })?;
            device.end_command_buffer(slot.upload_cmdbuf).map_err(|e| {
                Error::BackendError(format!("Failed to end command buffer: {:?}", e))
            })?;

            // Image initialization executes before the transfers that
            // assume the initialized layout
            let cmdbufs = [slot.upload_cmdbuf, slot.render_cmdbuf];
            let submit_info = vk::SubmitInfo::default().command_buffers(&cmdbufs);
            device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], slot.fence)
                .map_err(|e| Error::BackendError(format!("Failed to submit queue: {:?}", e)))?;
        }

        self.slots[self.current].pending = true;
        self.current = (self.current + 1) % SCHEDULER_COMMAND_SLOTS;
        // Free up the slot we will record into next
        self.wait_slot(self.current)
    }

    /// Submit everything and block until the GPU has executed it
    pub fn finish(&mut self) -> Result<()> {
        self.flush()?;
        for slot in 0..self.slots.len() {
            self.wait_slot(slot)?;
        }
        Ok(())
    }

    fn wait_slot(&mut self, index: usize) -> Result<()> {
        let slot = &mut self.slots[index];
        if !slot.pending {
            return Ok(());
        }
        unsafe {
            self.ctx
                .device
                .wait_for_fences(&[slot.fence], true, u64::MAX)
                .map_err(|e| Error::BackendError(format!("Failed to wait for fence: {:?}", e)))?;
            self.ctx
                .device
                .reset_fences(&[slot.fence])
                .map_err(|e| Error::BackendError(format!("Failed to reset fence: {:?}", e)))?;
        }
        slot.pending = false;
        Ok(())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        unsafe {
            for slot in 0..self.slots.len() {
                self.wait_slot(slot).ok();
            }
            for slot in &self.slots {
                self.ctx.device.destroy_fence(slot.fence, None);
            }
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
