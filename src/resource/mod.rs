//! Exposes common Vulkan resources such as buffers and images, and the transient
//! pool the render graph draws them from.

pub mod buffer;
pub mod image;
pub mod pool;
