//! Abstraction over Vulkan command pools

use anyhow::Result;
use ash::vk;

use crate::core::device::Device;

/// The command pool is where command buffers are allocated from.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CommandPool {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::CommandPool,
}

impl CommandPool {
    /// Create a new command pool over a queue family with specified flags.
    pub fn new(device: Device, family: u32, flags: vk::CommandPoolCreateFlags) -> Result<Self> {
        let info = vk::CommandPoolCreateInfo {
            s_type: vk::StructureType::COMMAND_POOL_CREATE_INFO,
            p_next: std::ptr::null(),
            flags,
            queue_family_index: family,
        };
        let handle = unsafe { device.create_command_pool(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkCommandPool {handle:p}");

        Ok(CommandPool {
            device,
            handle,
        })
    }

    /// Get unsafe access to the underlying `VkCommandPool` handle.
    /// # Safety
    /// - Access to the command pool **and** command buffers allocated from it must be externally synchronized.
    pub unsafe fn handle(&self) -> vk::CommandPool {
        self.handle
    }

    /// Allocate a single primary command buffer from this pool and begin
    /// recording into it, ready to be wrapped in a [`CommandRecorder`](crate::command_buffer::CommandRecorder).
    pub fn allocate_command_buffer(&self) -> Result<vk::CommandBuffer> {
        let info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.handle)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1)
            .build();
        let handle = unsafe { self.device.allocate_command_buffers(&info)?[0] };
        let begin_info = vk::CommandBufferBeginInfo::builder().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT).build();
        unsafe { self.device.begin_command_buffer(handle, &begin_info)? };
        Ok(handle)
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkCommandPool {:p}", self.handle);
        unsafe {
            self.device.destroy_command_pool(self.handle, None);
        }
    }
}
