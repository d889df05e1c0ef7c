//! Pass records: what a pass reads, writes and renders to, and the type-erased
//! payload and execute closure the executor invokes for it.

use std::any::Any;

use anyhow::Result;
use ash::vk;

use crate::command_buffer::CommandRecorder;
use crate::graph::handle::ResourceId;
use crate::graph::registry::Registry;

/// Clear value for a color attachment.
#[derive(Debug, Clone, Copy)]
pub enum ClearColor {
    Float([f32; 4]),
    Int([i32; 4]),
    Uint([u32; 4]),
}

impl ClearColor {
    pub(crate) fn to_vk(self) -> vk::ClearColorValue {
        match self {
            ClearColor::Float(value) => vk::ClearColorValue {
                float32: value,
            },
            ClearColor::Int(value) => vk::ClearColorValue {
                int32: value,
            },
            ClearColor::Uint(value) => vk::ClearColorValue {
                uint32: value,
            },
        }
    }
}

/// Clear value for a depth/stencil attachment.
#[derive(Debug, Clone, Copy)]
pub struct ClearDepthStencil {
    pub depth: f32,
    pub stencil: u32,
}

/// How a pass wants to load and store one of its attachments.
#[derive(Debug, Clone)]
pub struct AttachmentInfo {
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub clear_color: Option<ClearColor>,
    pub clear_depth: Option<ClearDepthStencil>,
}

impl AttachmentInfo {
    /// Load the attachment's existing contents and keep them after the pass.
    pub fn load() -> Self {
        AttachmentInfo {
            load_op: vk::AttachmentLoadOp::LOAD,
            store_op: vk::AttachmentStoreOp::STORE,
            clear_color: None,
            clear_depth: None,
        }
    }

    /// Clear the attachment to `value` before the pass, keeping the result.
    pub fn clear_color(value: [f32; 4]) -> Self {
        AttachmentInfo {
            load_op: vk::AttachmentLoadOp::CLEAR,
            store_op: vk::AttachmentStoreOp::STORE,
            clear_color: Some(ClearColor::Float(value)),
            clear_depth: None,
        }
    }

    /// Clear a depth/stencil attachment before the pass, keeping the result.
    pub fn clear_depth(depth: f32, stencil: u32) -> Self {
        AttachmentInfo {
            load_op: vk::AttachmentLoadOp::CLEAR,
            store_op: vk::AttachmentStoreOp::STORE,
            clear_color: None,
            clear_depth: Some(ClearDepthStencil {
                depth,
                stencil,
            }),
        }
    }

    pub(crate) fn clear_value(&self) -> vk::ClearValue {
        if let Some(color) = self.clear_color {
            vk::ClearValue {
                color: color.to_vk(),
            }
        } else if let Some(depth) = self.clear_depth {
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: depth.depth,
                    stencil: depth.stencil,
                },
            }
        } else {
            vk::ClearValue::default()
        }
    }
}

/// A non-attachment read or write declared through [`Builder::read`](crate::graph::builder::Builder::read)
/// or [`Builder::write`](crate::graph::builder::Builder::write).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResourceAccess {
    pub id: ResourceId,
    pub stage: vk::PipelineStageFlags2,
    pub access: vk::AccessFlags2,
}

/// A color or depth/stencil attachment declared through
/// [`Builder::write_color`](crate::graph::builder::Builder::write_color) or
/// [`Builder::write_depth`](crate::graph::builder::Builder::write_depth).
#[derive(Debug, Clone)]
pub(crate) struct AttachmentAccess {
    pub id: ResourceId,
    pub info: AttachmentInfo,
    pub depth: bool,
}

/// The barrier batch the compiler synthesized for one pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct BarrierBatch {
    pub image_barriers: Vec<vk::ImageMemoryBarrier2>,
    pub buffer_barriers: Vec<vk::BufferMemoryBarrier2>,
}

pub(crate) type BoxedExecuteFn = Box<dyn FnMut(&dyn Any, &Registry, &mut CommandRecorder) -> Result<()>>;

/// One pass's declared accesses, its compiled barrier batch and rendering
/// region, and the type-erased closure that records its commands.
pub(crate) struct PassRecord {
    pub name: String,
    pub reads: Vec<ResourceAccess>,
    pub writes: Vec<ResourceAccess>,
    pub attachments: Vec<AttachmentAccess>,
    pub payload: Box<dyn Any>,
    pub execute: BoxedExecuteFn,
    pub barriers: BarrierBatch,
    pub rendering_area: vk::Extent2D,
    pub skip: bool,
}
