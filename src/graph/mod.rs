//! The render graph: a per-frame DAG of passes that own transient textures
//! and buffers, have their inter-pass synchronization computed automatically,
//! and are recorded as one dynamic-rendering command stream.
//!
//! [`RenderGraph`] is the entry point. Each frame, declare passes against a
//! [`Builder`] handed to their setup closures, [`RenderGraph::compile`] the
//! graph to resolve resources and synthesize barriers, then
//! [`RenderGraph::execute`] it onto a [`CommandRecorder`](crate::command_buffer::CommandRecorder).

mod blackboard;
mod builder;
mod compiler;
mod descriptor;
mod executor;
mod handle;
mod node;
mod pass;
mod registry;
mod render_graph;

pub use blackboard::Blackboard;
pub use builder::Builder;
pub use descriptor::{aspect_for_usage, has_stencil_component, infer_texture_defaults, is_depth_format, BufferDesc, TextureDesc};
pub use handle::{ResourceHandle, ResourceId};
pub use pass::{AttachmentInfo, ClearColor, ClearDepthStencil};
pub use registry::Registry;
pub use render_graph::{DebugImageInfo, RenderGraph};
