//! Physical device selection.

use std::ffi::CStr;

use anyhow::Result;
use ash::vk;

use crate::core::app_info::AppInfo;
use crate::core::instance::Instance;
use crate::util::string::wrap_c_str;
use crate::Error;

/// Stores queried properties of a Vulkan extension.
#[derive(Debug, Default)]
pub struct ExtensionProperties {
    /// Name of the extension.
    pub name: String,
    /// Specification version of the extension.
    pub spec_version: u32,
}

/// A physical device abstracts away an actual device, like a graphics card or integrated graphics card.
///
/// Selection is deliberately simple: janus assumes a single graphics-capable queue
/// family, so there is no multi-queue family negotiation to perform (unlike the
/// dedicated-queue-preferring selection a multi-queue engine needs).
#[derive(Default, Debug)]
pub struct PhysicalDevice {
    /// Handle to the [`VkPhysicalDevice`](vk::PhysicalDevice).
    handle: vk::PhysicalDevice,
    /// [`VkPhysicalDeviceProperties`](vk::PhysicalDeviceProperties) structure with properties of this physical device.
    properties: vk::PhysicalDeviceProperties,
    /// Available Vulkan extensions.
    extension_properties: Vec<ExtensionProperties>,
    /// List of [`VkQueueFamilyProperties`](vk::QueueFamilyProperties) with properties of each queue family on the device.
    queue_families: Vec<vk::QueueFamilyProperties>,
    /// Index of the queue family selected for the single graphics/compute/transfer queue.
    queue_family_index: u32,
}

impl PhysicalDevice {
    /// Selects the first physical device exposing a queue family with
    /// `GRAPHICS | COMPUTE | TRANSFER` support and Vulkan 1.3 dynamic rendering plus
    /// synchronization2.
    pub fn select(instance: &Instance, _settings: &AppInfo) -> Result<Self> {
        let devices = unsafe { instance.enumerate_physical_devices()? };
        if devices.is_empty() {
            return Err(anyhow::Error::from(Error::NoGPU));
        }

        devices
            .iter()
            .find_map(|device| -> Option<PhysicalDevice> {
                let queue_families = unsafe { instance.get_physical_device_queue_family_properties(*device) };
                let queue_family_index = find_graphics_queue_family(&queue_families)?;

                if !supports_dynamic_rendering_and_sync2(instance, *device) {
                    return None;
                }

                let properties = unsafe { instance.get_physical_device_properties(*device) };
                let extension_properties = unsafe {
                    instance
                        .enumerate_device_extension_properties(*device)
                        .unwrap_or_default()
                        .iter()
                        .map(|vk_properties| ExtensionProperties {
                            name: wrap_c_str(vk_properties.extension_name.as_ptr()),
                            spec_version: vk_properties.spec_version,
                        })
                        .collect()
                };

                let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) };
                info!("Picked physical device {:?}, driver version {:?}.", name, properties.driver_version);

                Some(PhysicalDevice {
                    handle: *device,
                    properties,
                    extension_properties,
                    queue_families,
                    queue_family_index: queue_family_index as u32,
                })
            })
            .ok_or(anyhow::Error::from(Error::NoGPU))
    }

    /// Get all queue families available on this device
    pub fn queue_families(&self) -> &[vk::QueueFamilyProperties] {
        self.queue_families.as_slice()
    }

    /// Index of the single queue family janus will create its queue from.
    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    /// Get unsafe access to the physical device handle
    /// # Safety
    /// The caller must not destroy or otherwise invalidate the handle.
    pub unsafe fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    /// Queried device properties (limits, name, vendor, ...).
    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    /// Available device extensions.
    pub fn extension_properties(&self) -> &[ExtensionProperties] {
        self.extension_properties.as_slice()
    }
}

fn find_graphics_queue_family(families: &[vk::QueueFamilyProperties]) -> Option<usize> {
    let required = vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER;
    families.iter().position(|family| family.queue_flags.contains(required))
}

fn supports_dynamic_rendering_and_sync2(instance: &Instance, device: vk::PhysicalDevice) -> bool {
    let mut sync2 = vk::PhysicalDeviceSynchronization2Features::default();
    let mut dynamic_rendering = vk::PhysicalDeviceDynamicRenderingFeatures::default();
    let mut features = vk::PhysicalDeviceFeatures2::builder()
        .push_next(&mut sync2)
        .push_next(&mut dynamic_rendering)
        .build();
    unsafe { instance.get_physical_device_features2(device, &mut features) };
    sync2.synchronization2 == vk::TRUE && dynamic_rendering.dynamic_rendering == vk::TRUE
}
