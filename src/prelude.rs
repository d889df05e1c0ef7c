//! Re-exports the most commonly used types in the library.

pub use ash::vk;

pub use crate::allocator::default_allocator::{Allocation, DefaultAllocator};
pub use crate::allocator::memory_type::MemoryType;
pub use crate::command_buffer::command_pool::CommandPool;
pub use crate::command_buffer::{CommandRecorder, RenderingAttachmentInfo, RenderingInfo};
pub use crate::core::app_info::{AppInfo, DeviceBuilder};
pub use crate::core::debug::DebugMessenger;
pub use crate::core::device::Device;
pub use crate::core::error::Error;
pub use crate::core::instance::Instance;
pub use crate::core::physical_device::PhysicalDevice;
pub use crate::graph::{
    AttachmentInfo, Blackboard, Builder, BufferDesc, ClearColor, ClearDepthStencil, DebugImageInfo, RenderGraph, Registry, ResourceHandle, ResourceId, TextureDesc,
};
pub use crate::resource::buffer::{Buffer, BufferView};
pub use crate::resource::image::{Image, ImageView};
pub use crate::resource::pool::{BufferKey, ImageKey, PooledBuffer, PooledImage, TransientPool};
