//! The core module holds all functionality that is minimally required to initialize a Vulkan context.

pub mod app_info;
pub mod debug;
pub mod device;
pub mod error;
pub mod instance;
pub mod physical_device;
