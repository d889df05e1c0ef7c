//! Headless Vulkan context for integration tests. Requires a real Vulkan ICD;
//! there is no synthetic device, matching the teacher's own
//! `tests/framework/mod.rs`, which also needs a real GPU.

use anyhow::Result;
use janus::prelude::*;

#[allow(dead_code)]
pub struct Context {
    // Kept alive for the duration of the context: `device` and `allocator`
    // depend on both outliving them even when a test never reads them back.
    pub instance: Instance,
    pub physical_device: PhysicalDevice,
    pub device: Device,
    pub allocator: DefaultAllocator,
}

/// Bring up a headless instance, pick a physical device, and create a device
/// plus allocator from it. Returns an error (rather than panicking) if no
/// Vulkan ICD is present, so callers can skip gracefully.
pub fn make_context() -> Result<Context> {
    let settings = DeviceBuilder::new().name("janus integration tests").validation(false).build();
    let instance = Instance::new(&settings)?;
    let physical_device = PhysicalDevice::select(&instance, &settings)?;
    let device = Device::new(&instance, &physical_device, &settings)?;
    let allocator = DefaultAllocator::new(&instance, &device, &physical_device)?;
    Ok(Context {
        instance,
        physical_device,
        device,
        allocator,
    })
}
