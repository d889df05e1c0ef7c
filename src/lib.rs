//! Single-queue Vulkan 1.3 render graph.
//!
//! janus builds a per-frame DAG of GPU passes on top of dynamic rendering and
//! `VK_KHR_synchronization2`: passes declare the transient textures and
//! buffers they read, write and render to, janus resolves a physical backing
//! for each of them (reusing pooled memory across frames where descriptors
//! match), and computes the barriers needed to synchronize passes against
//! each other before recording the resulting command stream.
//!
//! To get started:
//! ```no_run
//! use janus::prelude::*;
//!
//! let app = DeviceBuilder::new().name("janus demo").validation(true).build();
//! let instance = Instance::new(&app)?;
//! let physical_device = PhysicalDevice::select(&instance, &app)?;
//! let device = Device::new(&instance, &physical_device, &app)?;
//! let mut allocator = DefaultAllocator::new(&instance, &device, &physical_device)?;
//! let mut graph = RenderGraph::new(device, allocator);
//! # Ok::<(), anyhow::Error>(())
//! ```
//! Each frame, declare passes against the graph, compile it, and execute it
//! onto a [`CommandRecorder`]:
//! - [`graph`] for the render graph itself: [`RenderGraph`](crate::graph::RenderGraph), its [`Builder`](crate::graph::Builder), and its [`Blackboard`](crate::graph::Blackboard).
//! - [`command_buffer`] for [`CommandRecorder`](crate::command_buffer::CommandRecorder), handed to every pass's execute closure.
//! - [`resource`] for [`Image`](crate::resource::image::Image)/[`Buffer`](crate::resource::buffer::Buffer) and the transient pool they're drawn from.
//! - [`allocator`] for GPU memory allocation.
//! - [`core`] for bootstrapping a Vulkan instance and device.

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;

pub mod prelude;
pub use crate::prelude::*;

pub mod allocator;
pub mod command_buffer;
pub mod core;
pub mod graph;
pub mod resource;
mod util;
