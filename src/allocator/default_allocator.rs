//! Concrete allocator type based on the [`gpu_allocator`] crate.
//!
//! Janus does not generalize over an `Allocator` trait the way a multi-backend
//! engine might: there is exactly one allocator, so `Image`/`Buffer` hold a
//! `DefaultAllocator` directly instead of being generic over an allocator type.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use ash::vk::{DeviceMemory, DeviceSize, MemoryRequirements};
use gpu_allocator::vulkan as vk_alloc;
use gpu_allocator::vulkan::AllocationScheme;

use crate::allocator::memory_type::MemoryType;
use crate::core::device::Device;
use crate::core::instance::Instance;
use crate::core::physical_device::PhysicalDevice;
use crate::Error;

/// The allocator used for every GPU allocation janus makes.
///
/// `Clone`, `Send` and `Sync`: internal state is wrapped inside an `Arc<Mutex<T>>`,
/// so the same allocator can be shared between the `RenderGraph` and any code
/// creating imported resources outside it.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct DefaultAllocator {
    #[derivative(Debug = "ignore")]
    alloc: Arc<Mutex<vk_alloc::Allocator>>,
}

/// Allocation returned from [`DefaultAllocator::allocate()`].
///
/// Automatically freed on drop, so it is not strictly necessary to call
/// [`DefaultAllocator::free()`] directly.
#[derive(Derivative)]
#[derivative(Default, Debug)]
pub struct Allocation {
    // Wrapped in `Option`s so we can "move" out of them in `Drop`. Always `Some(_)`
    // until dropped.
    allocator: Option<DefaultAllocator>,
    allocation: Option<vk_alloc::Allocation>,
}

impl DefaultAllocator {
    /// Create a new default allocator.
    /// # Errors
    /// * May fail if creating the internal `gpu_allocator` fails.
    pub fn new(instance: &Instance, device: &Device, physical_device: &PhysicalDevice) -> Result<Self> {
        Ok(Self {
            alloc: Arc::new(Mutex::new(vk_alloc::Allocator::new(&vk_alloc::AllocatorCreateDesc {
                instance: (*instance).clone(),
                // SAFETY: The user passed in a valid Device reference.
                device: unsafe { device.handle() },
                // SAFETY: The user passed in a valid PhysicalDevice reference.
                physical_device: unsafe { physical_device.handle() },
                debug_settings: Default::default(),
                buffer_device_address: true,
            })?)),
        })
    }

    fn free_impl(&mut self, allocation: &mut Allocation) -> Result<()> {
        let mut alloc = self.alloc.lock().map_err(|_| Error::PoisonError)?;
        if let Some(allocation) = allocation.allocation.take() {
            alloc.free(allocation)?;
        }
        Ok(())
    }

    /// Allocates raw memory of a specific memory type. `name` is used for internal
    /// tracking and debug logging. To get proper [`MemoryRequirements`], call
    /// `vkGetBufferMemoryRequirements`/`vkGetImageMemoryRequirements` on the
    /// resource that needs backing.
    /// # Errors
    /// * May fail if the device is out of memory.
    /// * May fail if invalid [`MemoryRequirements`] were passed in.
    pub fn allocate(&mut self, name: &str, requirements: &MemoryRequirements, ty: MemoryType) -> Result<Allocation> {
        let mut alloc = self.alloc.lock().map_err(|_| Error::PoisonError)?;
        let allocation = alloc.allocate(&vk_alloc::AllocationCreateDesc {
            name,
            requirements: *requirements,
            location: gpu_allocator::MemoryLocation::from(ty),
            linear: false,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        })?;

        Ok(Allocation {
            allocator: Some(self.clone()),
            allocation: Some(allocation),
        })
    }

    /// Explicitly free memory owned by this allocator. Generally not needed, since
    /// [`Drop`] for [`Allocation`] already handles this.
    /// # Errors
    /// * May fail if the vulkan context is no longer valid.
    pub fn free(&mut self, mut allocation: Allocation) -> Result<()> {
        self.free_impl(&mut allocation)
    }
}

impl Allocation {
    /// Get unsafe access to the underlying `VkDeviceMemory`. Should always be used
    /// together with [`Allocation::offset()`].
    /// # Safety
    /// The user must not free this memory or access a range outside of
    /// `(offset()..offset() + size())`.
    pub unsafe fn memory(&self) -> DeviceMemory {
        self.allocation.as_ref().unwrap().memory()
    }

    /// Offset into the `VkDeviceMemory` this allocation refers to.
    pub fn offset(&self) -> DeviceSize {
        self.allocation.as_ref().unwrap().offset()
    }

    /// Obtain a mapped pointer to this allocation, or `None` if the memory is not
    /// `HOST_VISIBLE`.
    pub fn mapped_ptr(&self) -> Option<NonNull<c_void>> {
        self.allocation.as_ref().unwrap().mapped_ptr()
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        if self.allocation.is_none() {
            return;
        }
        let mut allocator = self.allocator.clone().unwrap();
        allocator.free_impl(self).unwrap();
    }
}
