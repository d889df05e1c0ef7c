//! Top-level render graph: a per-frame DAG of GPU passes, recompiled and
//! re-executed every frame from scratch.
//!
//! Typical use:
//! ```ignore
//! graph.reset();
//! graph.add_pass("gbuffer", |payload, builder| { ... }, payload, |payload, registry, cmd| { ... });
//! graph.compile(frame_slot)?;
//! graph.execute(&mut recorder)?;
//! ```

use std::any::Any;
use std::collections::HashMap;

use anyhow::Result;
use ash::vk;

use crate::allocator::default_allocator::DefaultAllocator;
use crate::command_buffer::CommandRecorder;
use crate::core::device::Device;
use crate::graph::blackboard::Blackboard;
use crate::graph::builder::Builder;
use crate::graph::compiler;
use crate::graph::executor;
use crate::graph::handle::ResourceId;
use crate::graph::node::{Node, PhysicalBinding};
use crate::graph::pass::{BarrierBatch, BoxedExecuteFn, PassRecord};
use crate::graph::registry::Registry;
use crate::resource::pool::TransientPool;

/// A transient image the graph created and its current layout, as seen by
/// [`RenderGraph::post_compile`]. Useful for attaching a debug view to an
/// arbitrary intermediate render target.
#[derive(Debug, Clone, Copy)]
pub struct DebugImageInfo {
    pub image: vk::Image,
    pub view: vk::ImageView,
    pub layout: vk::ImageLayout,
}

/// Owns the logical resource graph for one frame at a time: add passes,
/// compile them into barriers and rendering regions, then execute them onto a
/// command recorder. Call [`RenderGraph::reset`] to start the next frame.
pub struct RenderGraph {
    device: Device,
    allocator: DefaultAllocator,
    pool: TransientPool,
    nodes: Vec<Node>,
    name_lookup: HashMap<String, ResourceId>,
    passes: Vec<PassRecord>,
    blackboard: Blackboard,
}

impl RenderGraph {
    /// Create a new, empty render graph. `allocator` backs every transient
    /// resource the graph creates across its lifetime.
    pub fn new(device: Device, allocator: DefaultAllocator) -> Self {
        RenderGraph {
            pool: TransientPool::new(device.clone()),
            device,
            allocator,
            nodes: Vec::new(),
            name_lookup: HashMap::new(),
            passes: Vec::new(),
            blackboard: Blackboard::new(),
        }
    }

    /// Clear all passes and logical resources declared so far, and free every
    /// transient resource cell for reuse. Does not destroy pooled resources,
    /// so resources whose descriptor recurs next frame are aliased rather than
    /// reallocated.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.name_lookup.clear();
        self.passes.clear();
        self.blackboard.clear();
        self.pool.reset();
    }

    /// Access the blackboard for this frame's passes to exchange handles by name.
    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    /// Mutably access the blackboard.
    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Add a pass to the graph. `setup` declares the pass's resource reads,
    /// writes and attachments against a fresh [`Builder`]; `payload` is stored
    /// alongside the pass and handed to `execute` once the graph is compiled
    /// and executed. If `setup` references an unknown or invalid handle, the
    /// pass is recorded but marked to be skipped at execution time rather than
    /// aborting the whole graph.
    pub fn add_pass<Payload, Setup, Execute>(&mut self, name: impl Into<String>, setup: Setup, mut payload: Payload, mut execute: Execute)
    where
        Payload: Any,
        Setup: FnOnce(&mut Payload, &mut Builder),
        Execute: FnMut(&Payload, &Registry, &mut CommandRecorder) -> Result<()> + 'static,
    {
        let name = name.into();
        let mut builder = Builder::new(name.clone(), &mut self.nodes, &mut self.name_lookup);
        setup(&mut payload, &mut builder);
        let (valid, reads, writes, attachments) = builder.finish();

        let execute_box: BoxedExecuteFn = Box::new(move |payload_any, registry, cmd| {
            let payload = payload_any.downcast_ref::<Payload>().expect("pass payload type mismatch");
            execute(payload, registry, cmd)
        });

        self.passes.push(PassRecord {
            name,
            reads,
            writes,
            attachments,
            payload: Box::new(payload),
            execute: execute_box,
            barriers: BarrierBatch::default(),
            rendering_area: vk::Extent2D::default(),
            skip: !valid,
        });
    }

    /// Resolve every transient node's physical backing and synthesize each
    /// pass's barrier batch, in submission order. `frame_slot` partitions
    /// pooled resources so that resources from a frame still in flight on the
    /// GPU are never handed to a pass compiling a different slot.
    pub fn compile(&mut self, frame_slot: u32) -> Result<()> {
        compiler::compile(&mut self.nodes, &mut self.passes, &mut self.pool, &mut self.allocator, frame_slot)
    }

    /// Record every pass's barrier batch, dynamic rendering region and
    /// execute closure onto `cmd`, in submission order.
    pub fn execute(&mut self, cmd: &mut CommandRecorder) -> Result<()> {
        executor::execute(&self.nodes, &mut self.passes, cmd)
    }

    /// Enumerate every transient or imported texture the graph currently
    /// knows about, together with its physical backing and last-known layout.
    /// Intended for attaching a debug visualization pass to arbitrary
    /// intermediate render targets after compilation.
    pub fn post_compile(&self) -> Vec<(String, DebugImageInfo)> {
        self.nodes
            .iter()
            .filter_map(|node| {
                if !node.is_image() {
                    return None;
                }
                match node.physical {
                    Some(PhysicalBinding::Image {
                        image, view,
                    }) => Some((
                        node.name.clone(),
                        DebugImageInfo {
                            image,
                            view,
                            layout: node.current_layout,
                        },
                    )),
                    _ => None,
                }
            })
            .collect()
    }

    /// Number of logical resource nodes declared so far this frame.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of passes declared so far this frame.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Access the device the graph was created with.
    pub fn device(&self) -> &Device {
        &self.device
    }
}
