//! Wrappers for `VkBuffer` objects.
//!
//! Similarly to the [`image`](crate::resource::image) module, this module exposes two types: [`Buffer`] and [`BufferView`]. The difference here is that a
//! [`BufferView`] does not own a vulkan resource, so it can be freely copied around as long as the owning [`Buffer`] lives.
//!
//! It also exposes some utilities for writing to memory-mapped buffers. For this you can use [`BufferView::mapped_slice`]. This only succeeds
//! if the buffer was allocated from a mappable heap (one that has the `HOST_VISIBLE` bit set).

use std::ffi::c_void;
use std::ptr::NonNull;

use anyhow::Result;
use ash::vk;

use crate::allocator::default_allocator::{Allocation, DefaultAllocator};
use crate::allocator::memory_type::MemoryType;
use crate::core::device::Device;
use crate::Error;

/// Wrapper around a [`VkBuffer`](vk::Buffer).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Buffer {
    #[derivative(Debug = "ignore")]
    device: Device,
    #[derivative(Debug = "ignore")]
    #[allow(dead_code)]
    memory: Option<Allocation>,
    address: vk::DeviceAddress,
    pointer: Option<NonNull<c_void>>,
    handle: vk::Buffer,
    size: vk::DeviceSize,
}

// SAFETY: The unsafe part of this is the mapped pointer, but this is a pointer to GPU memory
// so its value is not dropped when sending this to a different thread.
unsafe impl Send for Buffer {}

unsafe impl Sync for Buffer {}

/// View into a specific offset and range of a [`Buffer`].
/// Care should be taken with the lifetime of this, as there is no checking that the buffer
/// is not dropped while using this.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferView {
    handle: vk::Buffer,
    pointer: Option<NonNull<c_void>>,
    address: vk::DeviceAddress,
    offset: vk::DeviceSize,
    size: vk::DeviceSize,
}

// SAFETY: The unsafe part of this is the mapped pointer, but this is a pointer to GPU memory
// so its value is not dropped when sending this to a different thread.
unsafe impl Send for BufferView {}

impl Buffer {
    /// Allocate a new buffer with a specific size, at a specific memory location.
    /// All usage flags must be given.
    pub fn new(device: Device, allocator: &mut DefaultAllocator, size: impl Into<vk::DeviceSize>, usage: vk::BufferUsageFlags, location: MemoryType) -> Result<Self> {
        let size = size.into();
        // Janus only ever has a single queue family, so buffer sharing is always exclusive.
        let handle = unsafe {
            device.create_buffer(
                &vk::BufferCreateInfo {
                    s_type: vk::StructureType::BUFFER_CREATE_INFO,
                    p_next: std::ptr::null(),
                    flags: vk::BufferCreateFlags::empty(),
                    size,
                    usage: usage | vk::BufferUsageFlags::SHADER_DEVICE_ADDRESS,
                    sharing_mode: vk::SharingMode::EXCLUSIVE,
                    queue_family_index_count: 0,
                    p_queue_family_indices: std::ptr::null(),
                },
                None,
            )?
        };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkBuffer {handle:p} (size = {size} bytes)");

        let requirements = unsafe { device.get_buffer_memory_requirements(handle) };
        let memory = allocator.allocate("buffer", &requirements, location)?;

        unsafe { device.bind_buffer_memory(handle, memory.memory(), memory.offset())? };

        let address = unsafe {
            device.get_buffer_device_address(&vk::BufferDeviceAddressInfo {
                s_type: vk::StructureType::BUFFER_DEVICE_ADDRESS_INFO,
                p_next: std::ptr::null(),
                buffer: handle,
            })
        };

        Ok(Self {
            device,
            pointer: memory.mapped_ptr(),
            memory: Some(memory),
            handle,
            size,
            address,
        })
    }

    /// Allocate a new buffer with device local memory (VRAM). This is usually the correct memory location for most buffers.
    pub fn new_device_local(device: Device, allocator: &mut DefaultAllocator, size: impl Into<vk::DeviceSize>, usage: vk::BufferUsageFlags) -> Result<Self> {
        Self::new(device, allocator, size, usage, MemoryType::GpuOnly)
    }

    /// Wrap a `VkBuffer` janus does not own (imported from outside the graph).
    /// Dropping this `Buffer` does not destroy the handle.
    pub fn new_imported(device: Device, handle: vk::Buffer, size: vk::DeviceSize) -> Self {
        let address = unsafe {
            device.get_buffer_device_address(&vk::BufferDeviceAddressInfo {
                s_type: vk::StructureType::BUFFER_DEVICE_ADDRESS_INFO,
                p_next: std::ptr::null(),
                buffer: handle,
            })
        };
        Self {
            device,
            memory: None,
            pointer: None,
            handle,
            size,
            address,
        }
    }

    /// Whether this buffer is owned by janus or imported from outside the graph.
    pub fn is_owned(&self) -> bool {
        self.memory.is_some()
    }

    /// Creates a view into an offset and size of the buffer.
    /// # Lifetime
    /// This view is valid as long as the buffer is valid.
    /// # Errors
    /// Fails if `offset + size > self.size`.
    pub fn view(&self, offset: impl Into<vk::DeviceSize>, size: impl Into<vk::DeviceSize>) -> Result<BufferView> {
        let offset = offset.into();
        let size = size.into();
        if offset + size > self.size {
            Err(anyhow::Error::from(Error::BufferViewOutOfRange))
        } else {
            Ok(BufferView {
                handle: self.handle,
                offset,
                pointer: unsafe { self.pointer.map(|p| NonNull::new(p.as_ptr().offset(offset as isize)).unwrap()) },
                address: self.address + offset,
                size,
            })
        }
    }

    /// Creates a view of the entire buffer.
    /// # Lifetime
    /// This view is valid as long as the buffer is valid.
    pub fn view_full(&self) -> BufferView {
        BufferView {
            handle: self.handle,
            pointer: self.pointer,
            offset: 0,
            address: self.address,
            size: self.size,
        }
    }

    /// True if this buffer has a mapped pointer and thus can directly be written to.
    pub fn is_mapped(&self) -> bool {
        self.pointer.is_some()
    }

    /// Obtain a handle to the raw vulkan buffer object.
    /// # Safety
    /// * The caller must make sure to not use this handle after `self` is dropped.
    /// * The caller must not call `vkDestroyBuffer` on this handle.
    pub unsafe fn handle(&self) -> vk::Buffer {
        self.handle
    }

    /// Get the size of this buffer
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Get the device address of this buffer
    pub fn address(&self) -> vk::DeviceAddress {
        self.address
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkBuffer {:p}", self.handle);
        if self.is_owned() {
            unsafe {
                self.device.destroy_buffer(self.handle, None);
            }
        }
    }
}

impl BufferView {
    /// Obtain a slice to the mapped memory of this buffer.
    /// # Errors
    /// Fails if this buffer is not mappable (not `HOST_VISIBLE`).
    pub fn mapped_slice<T>(&mut self) -> Result<&mut [T]> {
        if let Some(pointer) = self.pointer {
            Ok(unsafe { std::slice::from_raw_parts_mut(pointer.cast::<T>().as_ptr(), self.size as usize / std::mem::size_of::<T>()) })
        } else {
            Err(anyhow::Error::from(Error::UnmappableBuffer))
        }
    }

    /// Obtain a handle to the raw vulkan buffer object.
    /// # Safety
    /// * The caller must make sure to not use this handle after the owning [`Buffer`] is dropped.
    /// * The caller must not call `vkDestroyBuffer` on this handle.
    pub unsafe fn handle(&self) -> vk::Buffer {
        self.handle
    }

    /// Get the offset of this buffer view into the owning buffer
    pub fn offset(&self) -> vk::DeviceSize {
        self.offset
    }

    /// Get the size of this buffer view.
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Get the device address of the start of this buffer view.
    pub fn address(&self) -> vk::DeviceAddress {
        self.address
    }
}
