//! Contains the Vulkan device, the main entrypoint to the Vulkan API.

use std::ops::Deref;
use std::sync::Arc;

use anyhow::Result;
use ash::vk;
use derivative::Derivative;

use crate::core::app_info::AppInfo;
use crate::core::instance::Instance;
use crate::core::physical_device::PhysicalDevice;
use crate::Error;

#[derive(Derivative)]
#[derivative(Debug)]
struct DeviceInner {
    #[derivative(Debug = "ignore")]
    handle: ash::Device,
    queue_family_index: u32,
    queue: vk::Queue,
    properties: vk::PhysicalDeviceProperties,
}

/// Wrapper around a `VkDevice` and its single graphics/compute/transfer queue.
///
/// Internal state is wrapped in an `Arc<DeviceInner>`, so this is safe to clone.
/// Janus only ever creates a single queue (per its single-queue, no-multi-queue-
/// scheduling scope), so there is no `QueueType` negotiation here.
#[derive(Debug, Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

unsafe impl Send for Device {}

unsafe impl Sync for Device {}

impl Device {
    /// Create a new Vulkan device. This is the main interface point with the Vulkan API.
    /// # Errors
    /// * Can fail if vulkan device init fails.
    pub fn new(instance: &Instance, physical_device: &PhysicalDevice, _settings: &AppInfo) -> Result<Self> {
        let queue_family_index = physical_device.queue_family_index();
        let queue_priority = [1.0f32];
        let queue_info = vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(queue_family_index)
            .queue_priorities(&queue_priority)
            .build();

        let mut sync2 = vk::PhysicalDeviceSynchronization2Features::builder().synchronization2(true).build();
        let mut dynamic_rendering = vk::PhysicalDeviceDynamicRenderingFeatures::builder().dynamic_rendering(true).build();

        let device_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(std::slice::from_ref(&queue_info))
            .push_next(&mut sync2)
            .push_next(&mut dynamic_rendering)
            .build();

        let handle = unsafe { instance.create_device(physical_device.handle(), &device_info, None)? };
        let queue = unsafe { handle.get_device_queue(queue_family_index, 0) };

        #[cfg(feature = "log-objects")]
        trace!("Created new Device {:p}", handle.handle());

        Ok(Device {
            inner: Arc::new(DeviceInner {
                handle,
                queue_family_index,
                queue,
                properties: *physical_device.properties(),
            }),
        })
    }

    /// Wait for the device to be completely idle.
    pub fn wait_idle(&self) -> Result<()> {
        unsafe { Ok(self.inner.handle.device_wait_idle()?) }
    }

    /// Get unsafe access to the underlying `ash::Device`.
    /// # Safety
    /// Any vulkan calls that modify device state may lead to validation errors or put the
    /// system in an undefined state if not externally synchronized.
    pub unsafe fn handle(&self) -> ash::Device {
        self.inner.handle.clone()
    }

    /// The single queue family janus created its queue from.
    pub fn queue_family_index(&self) -> u32 {
        self.inner.queue_family_index
    }

    /// Get unsafe access to the single `VkQueue` this device owns.
    /// # Safety
    /// Submitting to this queue from multiple threads at once without external
    /// synchronization is undefined behaviour.
    pub unsafe fn queue(&self) -> vk::Queue {
        self.inner.queue
    }

    /// Janus always operates on a single queue; this is always `true` and exists
    /// for parity with engines that must check this dynamically.
    pub fn is_single_queue(&self) -> bool {
        true
    }

    /// Queried physical device properties (limits, name, vendor, ...).
    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.inner.properties
    }

    /// Submit a batch of command buffers to the device's single queue.
    pub fn submit(&self, submits: &[vk::SubmitInfo2], fence: vk::Fence) -> Result<()> {
        unsafe {
            self.inner
                .handle
                .queue_submit2(self.inner.queue, submits, fence)
                .map_err(|e| anyhow::Error::from(Error::VkError(e)))
        }
    }
}

impl Deref for Device {
    type Target = ash::Device;

    fn deref(&self) -> &Self::Target {
        &self.inner.handle
    }
}

impl Drop for DeviceInner {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying Device {:p}", self.handle.handle());
        unsafe {
            self.handle.destroy_device(None);
        }
    }
}
