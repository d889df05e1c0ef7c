//! Two-phase compiler: resolve every touched node's physical backing in
//! submission order (phase A), then synthesize each pass's barrier batch
//! against the access state left by the passes before it (phase B).
//!
//! Submission order is taken as authoritative instead of reconstructing a
//! dependency graph: passes execute in the order they were added, so the
//! access state a barrier must transition *from* is simply whatever the same
//! node was last transitioned *to* by an earlier pass (or its initial state,
//! for the first pass to touch it).

use anyhow::Result;
use ash::vk;
use log::warn;

use crate::allocator::default_allocator::DefaultAllocator;
use crate::graph::builder::resolved_texture_usage;
use crate::graph::handle::ResourceId;
use crate::graph::node::{Node, NodeKind, PhysicalBinding};
use crate::graph::pass::{AttachmentAccess, AttachmentInfo, BarrierBatch, PassRecord, ResourceAccess};
use crate::resource::pool::{BufferKey, ImageKey, TransientPool};

/// Resolve physical backing and synthesize barriers for every pass, in
/// submission order. A pass whose resources cannot be resolved (for example a
/// transient resource the pool failed to allocate) is marked to be skipped by
/// the executor; it does not abort compilation of the remaining passes.
pub(crate) fn compile(nodes: &mut [Node], passes: &mut [PassRecord], pool: &mut TransientPool, allocator: &mut DefaultAllocator, frame_slot: u32) -> Result<()> {
    for index in 0..passes.len() {
        if passes[index].skip {
            continue;
        }
        match compile_pass(nodes, passes, index, pool, allocator, frame_slot) {
            Ok(()) => {}
            Err(err) => {
                warn!("pass `{}` skipped: could not resolve its resources ({err})", passes[index].name);
                passes[index].skip = true;
            }
        }
    }
    Ok(())
}

fn compile_pass(nodes: &mut [Node], passes: &mut [PassRecord], index: usize, pool: &mut TransientPool, allocator: &mut DefaultAllocator, frame_slot: u32) -> Result<()> {
    let touched: Vec<ResourceId> = {
        let pass = &passes[index];
        pass.attachments
            .iter()
            .map(|access| access.id)
            .chain(pass.reads.iter().map(|access| access.id))
            .chain(pass.writes.iter().map(|access| access.id))
            .collect()
    };
    for id in touched {
        resolve_physical(&mut nodes[id.index()], pool, allocator, frame_slot)?;
    }

    let pass = &passes[index];
    let (batch, rendering_area) = synthesize_pass_barriers(nodes, &pass.attachments, &pass.reads, &pass.writes);

    let pass = &mut passes[index];
    pass.barriers = batch;
    pass.rendering_area = rendering_area;
    Ok(())
}

/// Phase B in isolation: synthesize one pass's barrier batch against whatever
/// access state its touched nodes were left in by earlier passes. Takes only
/// already-resolved nodes, so unlike [`compile_pass`] it needs no pool or
/// allocator — this is what makes barrier synthesis testable across multiple
/// chained passes without a live device.
fn synthesize_pass_barriers(nodes: &mut [Node], attachments: &[AttachmentAccess], reads: &[ResourceAccess], writes: &[ResourceAccess]) -> (BarrierBatch, vk::Extent2D) {
    let mut batch = BarrierBatch::default();
    let mut rendering_area = vk::Extent2D::default();

    for attachment in attachments {
        let node = &mut nodes[attachment.id.index()];
        if rendering_area == vk::Extent2D::default() {
            rendering_area = node_extent(node);
        }
        if let Some(PhysicalBinding::Image {
            image, ..
        }) = node.physical
        {
            let (stage, access, layout) = attachment_transition(attachment.depth, &attachment.info);
            emit_image_barrier(node, image, layout, stage, access, &mut batch);
        }
    }
    for read in reads {
        synthesize_read_barrier(&mut nodes[read.id.index()], read, &mut batch);
    }
    for write in writes {
        synthesize_write_barrier(&mut nodes[write.id.index()], write, &mut batch);
    }

    (batch, rendering_area)
}

fn resolve_physical(node: &mut Node, pool: &mut TransientPool, allocator: &mut DefaultAllocator, frame_slot: u32) -> Result<()> {
    if node.physical.is_some() {
        return Ok(());
    }
    match &node.kind {
        NodeKind::TransientTexture(desc) => {
            let (usage, aspect) = resolved_texture_usage(&node.name, desc);
            let key = ImageKey {
                slot: frame_slot,
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage,
                samples: desc.samples,
            };
            let pooled = pool.acquire_image(key, allocator, aspect)?;
            node.physical = Some(PhysicalBinding::Image {
                image: unsafe { pooled.image.handle() },
                view: unsafe { pooled.view.handle() },
            });
            Ok(())
        }
        NodeKind::TransientBuffer(desc) => {
            let key = BufferKey {
                slot: frame_slot,
                size: desc.size,
                usage: desc.usage,
                domain: desc.domain,
            };
            let pooled = pool.acquire_buffer(key, allocator)?;
            node.physical = Some(PhysicalBinding::Buffer {
                buffer: unsafe { pooled.buffer.handle() },
            });
            Ok(())
        }
        NodeKind::ImportedTexture {
            ..
        }
        | NodeKind::ImportedBuffer {
            ..
        } => Ok(()),
    }
}

fn node_extent(node: &Node) -> vk::Extent2D {
    match &node.kind {
        NodeKind::TransientTexture(desc) => vk::Extent2D {
            width: desc.width,
            height: desc.height,
        },
        NodeKind::ImportedTexture {
            extent, ..
        } => *extent,
        _ => vk::Extent2D::default(),
    }
}

fn image_aspect(node: &Node) -> vk::ImageAspectFlags {
    match &node.kind {
        NodeKind::TransientTexture(desc) => resolved_texture_usage(&node.name, desc).1,
        NodeKind::ImportedTexture {
            format, ..
        } => {
            if crate::graph::descriptor::is_depth_format(*format) {
                if crate::graph::descriptor::has_stencil_component(*format) {
                    vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
                } else {
                    vk::ImageAspectFlags::DEPTH
                }
            } else {
                vk::ImageAspectFlags::COLOR
            }
        }
        _ => vk::ImageAspectFlags::COLOR,
    }
}

fn attachment_transition(depth: bool, info: &AttachmentInfo) -> (vk::PipelineStageFlags2, vk::AccessFlags2, vk::ImageLayout) {
    if depth {
        let mut access = vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE;
        if info.load_op == vk::AttachmentLoadOp::LOAD {
            access |= vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ;
        }
        (
            vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS | vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS,
            access,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        )
    } else {
        let mut access = vk::AccessFlags2::COLOR_ATTACHMENT_WRITE;
        if info.load_op == vk::AttachmentLoadOp::LOAD {
            access |= vk::AccessFlags2::COLOR_ATTACHMENT_READ;
        }
        (vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT, access, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
    }
}

/// Emit a barrier for a non-attachment read, if the node's resolved physical
/// resource has not already reached the access's target state. An image read
/// gates on layout alone (matching the spec's read-after-read boundary
/// behavior: a second read that needs no new layout emits nothing); a buffer
/// read gates on stage/access since it has no layout.
fn synthesize_read_barrier(node: &mut Node, read: &ResourceAccess, batch: &mut BarrierBatch) {
    match node.physical {
        Some(PhysicalBinding::Image {
            image, ..
        }) => {
            let layout = read_target_layout(read.access);
            if node.current_layout != layout {
                emit_image_barrier(node, image, layout, read.stage, read.access, batch);
            }
        }
        Some(PhysicalBinding::Buffer {
            buffer,
        }) if node.current_stage != read.stage || node.current_access != read.access => {
            emit_buffer_barrier(node, buffer, read.stage, read.access, batch);
        }
        _ => {}
    }
}

/// Emit a barrier for a non-attachment write, if the node's resolved physical
/// resource has not already reached the access's target state. An image write
/// gates on layout, stage, or access changing; a buffer write gates on
/// stage/access.
fn synthesize_write_barrier(node: &mut Node, write: &ResourceAccess, batch: &mut BarrierBatch) {
    match node.physical {
        Some(PhysicalBinding::Image {
            image, ..
        }) => {
            let layout = write_target_layout(write.access);
            let state_changed = node.current_layout != layout || node.current_stage != write.stage || node.current_access != write.access;
            if state_changed {
                emit_image_barrier(node, image, layout, write.stage, write.access, batch);
            }
        }
        Some(PhysicalBinding::Buffer {
            buffer,
        }) if node.current_stage != write.stage || node.current_access != write.access => {
            emit_buffer_barrier(node, buffer, write.stage, write.access, batch);
        }
        _ => {}
    }
}

/// Target layout for a non-attachment image read, derived from its declared
/// access: a transfer read wants transfer-src-optimal, a storage read wants
/// general, anything else (the common case: a sampled read) wants
/// shader-read-only-optimal.
fn read_target_layout(access: vk::AccessFlags2) -> vk::ImageLayout {
    if access.contains(vk::AccessFlags2::TRANSFER_READ) {
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL
    } else if access.intersects(vk::AccessFlags2::SHADER_STORAGE_READ) {
        vk::ImageLayout::GENERAL
    } else {
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
    }
}

/// Target layout for a non-attachment image write, derived from its declared
/// access: a transfer write wants transfer-dst-optimal; a storage write (or
/// anything else not explicitly known) falls back to general.
fn write_target_layout(access: vk::AccessFlags2) -> vk::ImageLayout {
    if access.contains(vk::AccessFlags2::TRANSFER_WRITE) {
        vk::ImageLayout::TRANSFER_DST_OPTIMAL
    } else {
        vk::ImageLayout::GENERAL
    }
}

fn emit_image_barrier(node: &mut Node, image: vk::Image, new_layout: vk::ImageLayout, new_stage: vk::PipelineStageFlags2, new_access: vk::AccessFlags2, batch: &mut BarrierBatch) {
    let aspect = image_aspect(node);
    let barrier = vk::ImageMemoryBarrier2::builder()
        .src_stage_mask(node.current_stage)
        .src_access_mask(node.current_access)
        .dst_stage_mask(new_stage)
        .dst_access_mask(new_access)
        .old_layout(node.current_layout)
        .new_layout(new_layout)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: aspect,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        })
        .build();
    node.current_layout = new_layout;
    node.current_stage = new_stage;
    node.current_access = new_access;
    batch.image_barriers.push(barrier);
}

fn emit_buffer_barrier(node: &mut Node, buffer: vk::Buffer, new_stage: vk::PipelineStageFlags2, new_access: vk::AccessFlags2, batch: &mut BarrierBatch) {
    let barrier = vk::BufferMemoryBarrier2::builder()
        .src_stage_mask(node.current_stage)
        .src_access_mask(node.current_access)
        .dst_stage_mask(new_stage)
        .dst_access_mask(new_access)
        .buffer(buffer)
        .offset(0)
        .size(vk::WHOLE_SIZE)
        .build();
    node.current_stage = new_stage;
    node.current_access = new_access;
    batch.buffer_barriers.push(barrier);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::descriptor::TextureDesc;

    fn transient_node_with_physical() -> Node {
        let mut node = Node::new_transient_texture("scene_color".to_string(), TextureDesc::new(1920, 1080, vk::Format::R8G8B8A8_UNORM));
        node.physical = Some(PhysicalBinding::Image {
            image: vk::Image::null(),
            view: vk::ImageView::null(),
        });
        node
    }

    #[test]
    fn first_attachment_barrier_transitions_from_undefined() {
        let mut node = transient_node_with_physical();
        let mut batch = BarrierBatch::default();
        let (stage, access, layout) = attachment_transition(false, &AttachmentInfo::clear_color([0.0; 4]));
        emit_image_barrier(&mut node, vk::Image::null(), layout, stage, access, &mut batch);

        assert_eq!(batch.image_barriers.len(), 1);
        assert_eq!(batch.image_barriers[0].old_layout, vk::ImageLayout::UNDEFINED);
        assert_eq!(batch.image_barriers[0].new_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(node.current_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    }

    #[test]
    fn second_pass_barrier_continues_from_first_passs_exit_state() {
        let mut node = transient_node_with_physical();
        let mut batch = BarrierBatch::default();
        let (stage, access, layout) = attachment_transition(false, &AttachmentInfo::clear_color([0.0; 4]));
        emit_image_barrier(&mut node, vk::Image::null(), layout, stage, access, &mut batch);

        // A later pass reads the same texture as a sampled image.
        let layout = read_target_layout(vk::AccessFlags2::SHADER_SAMPLED_READ);
        emit_image_barrier(&mut node, vk::Image::null(), layout, vk::PipelineStageFlags2::FRAGMENT_SHADER, vk::AccessFlags2::SHADER_SAMPLED_READ, &mut batch);

        let second = batch.image_barriers[1];
        assert_eq!(second.old_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(second.new_layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        assert_eq!(second.src_access_mask, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);
    }

    #[test]
    fn transfer_read_targets_transfer_src_optimal() {
        assert_eq!(read_target_layout(vk::AccessFlags2::TRANSFER_READ), vk::ImageLayout::TRANSFER_SRC_OPTIMAL);
        assert_eq!(read_target_layout(vk::AccessFlags2::SHADER_SAMPLED_READ), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        assert_eq!(read_target_layout(vk::AccessFlags2::SHADER_STORAGE_READ), vk::ImageLayout::GENERAL);
    }

    #[test]
    fn transfer_write_targets_transfer_dst_optimal() {
        assert_eq!(write_target_layout(vk::AccessFlags2::TRANSFER_WRITE), vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        assert_eq!(write_target_layout(vk::AccessFlags2::SHADER_STORAGE_WRITE), vk::ImageLayout::GENERAL);
    }

    #[test]
    fn read_after_read_in_matching_layout_emits_no_barrier() {
        let mut node = transient_node_with_physical();
        node.current_layout = vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL;
        node.current_stage = vk::PipelineStageFlags2::FRAGMENT_SHADER;
        node.current_access = vk::AccessFlags2::SHADER_SAMPLED_READ;
        let mut batch = BarrierBatch::default();
        let read = ResourceAccess {
            id: ResourceId(0),
            stage: vk::PipelineStageFlags2::FRAGMENT_SHADER,
            access: vk::AccessFlags2::SHADER_SAMPLED_READ,
        };

        synthesize_read_barrier(&mut node, &read, &mut batch);

        assert!(batch.image_barriers.is_empty());
    }

    #[test]
    fn read_with_a_different_target_layout_emits_a_barrier() {
        let mut node = transient_node_with_physical();
        node.current_layout = vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL;
        node.current_stage = vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT;
        node.current_access = vk::AccessFlags2::COLOR_ATTACHMENT_WRITE;
        let mut batch = BarrierBatch::default();
        let read = ResourceAccess {
            id: ResourceId(0),
            stage: vk::PipelineStageFlags2::TRANSFER,
            access: vk::AccessFlags2::TRANSFER_READ,
        };

        synthesize_read_barrier(&mut node, &read, &mut batch);

        assert_eq!(batch.image_barriers.len(), 1);
        assert_eq!(batch.image_barriers[0].new_layout, vk::ImageLayout::TRANSFER_SRC_OPTIMAL);
        assert_eq!(node.current_layout, vk::ImageLayout::TRANSFER_SRC_OPTIMAL);
    }

    #[test]
    fn write_with_unchanged_state_emits_no_barrier() {
        let mut node = Node::new_transient_buffer(
            "particle_counts".to_string(),
            crate::graph::descriptor::BufferDesc::new(256, vk::BufferUsageFlags::STORAGE_BUFFER, crate::allocator::memory_type::MemoryType::GpuOnly),
        );
        node.physical = Some(PhysicalBinding::Buffer {
            buffer: vk::Buffer::null(),
        });
        node.current_stage = vk::PipelineStageFlags2::COMPUTE_SHADER;
        node.current_access = vk::AccessFlags2::SHADER_STORAGE_WRITE;
        let mut batch = BarrierBatch::default();
        let write = ResourceAccess {
            id: ResourceId(0),
            stage: vk::PipelineStageFlags2::COMPUTE_SHADER,
            access: vk::AccessFlags2::SHADER_STORAGE_WRITE,
        };

        synthesize_write_barrier(&mut node, &write, &mut batch);

        assert!(batch.buffer_barriers.is_empty());
    }

    #[test]
    fn depth_attachment_loads_carry_a_read_access() {
        let (_, access, layout) = attachment_transition(true, &AttachmentInfo::load());
        assert!(access.contains(vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ));
        assert!(access.contains(vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE));
        assert_eq!(layout, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);
    }

    fn attachment_write(id: ResourceId) -> AttachmentAccess {
        AttachmentAccess {
            id,
            info: AttachmentInfo::clear_color([0.0; 4]),
            depth: false,
        }
    }

    /// Scenario: picking read-back. Pass A writes a color attachment `PickID`;
    /// pass B declares a transfer read on it and copies one pixel out. Expects a
    /// single image barrier Color-Attachment -> Transfer-Src, src stage/access
    /// matching pass A's write.
    #[test]
    fn scenario_picking_readback_transitions_color_attachment_to_transfer_src() {
        let mut nodes = vec![transient_node_with_physical()];
        let pick_id = ResourceId(0);

        let (pass_a, _) = synthesize_pass_barriers(&mut nodes, &[attachment_write(pick_id)], &[], &[]);
        assert_eq!(pass_a.image_barriers.len(), 1);
        assert_eq!(pass_a.image_barriers[0].new_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

        let transfer_read = ResourceAccess {
            id: pick_id,
            stage: vk::PipelineStageFlags2::TRANSFER,
            access: vk::AccessFlags2::TRANSFER_READ,
        };
        let (pass_b, _) = synthesize_pass_barriers(&mut nodes, &[], &[transfer_read], &[]);

        assert_eq!(pass_b.image_barriers.len(), 1);
        let barrier = pass_b.image_barriers[0];
        assert_eq!(barrier.old_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(barrier.new_layout, vk::ImageLayout::TRANSFER_SRC_OPTIMAL);
        assert_eq!(barrier.src_stage_mask, vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT);
        assert_eq!(barrier.src_access_mask, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);
        assert_eq!(barrier.dst_stage_mask, vk::PipelineStageFlags2::TRANSFER);
        assert_eq!(barrier.dst_access_mask, vk::AccessFlags2::TRANSFER_READ);
    }

    /// Scenario: outline overlay. Pass A writes `PickID`; pass B samples it in
    /// the fragment shader while also writing `Backbuffer`. Expects the read
    /// barrier on `PickID` (Color-Attachment -> Shader-Read-Only) plus an
    /// attachment barrier on `Backbuffer` from its prior (undefined) state.
    #[test]
    fn scenario_outline_overlay_samples_pick_id_and_attaches_backbuffer() {
        let mut nodes = vec![transient_node_with_physical(), transient_node_with_physical()];
        let pick_id = ResourceId(0);
        let backbuffer = ResourceId(1);

        let (_, _) = synthesize_pass_barriers(&mut nodes, &[attachment_write(pick_id)], &[], &[]);

        let sampled_read = ResourceAccess {
            id: pick_id,
            stage: vk::PipelineStageFlags2::FRAGMENT_SHADER,
            access: vk::AccessFlags2::SHADER_SAMPLED_READ,
        };
        let (pass_b, _) = synthesize_pass_barriers(&mut nodes, &[attachment_write(backbuffer)], &[sampled_read], &[]);

        assert_eq!(pass_b.image_barriers.len(), 2);
        let pick_barrier = pass_b.image_barriers.iter().find(|b| b.new_layout == vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL).unwrap();
        assert_eq!(pick_barrier.old_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(pick_barrier.src_access_mask, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);
        assert_eq!(pick_barrier.dst_stage_mask, vk::PipelineStageFlags2::FRAGMENT_SHADER);
        assert_eq!(pick_barrier.dst_access_mask, vk::AccessFlags2::SHADER_SAMPLED_READ);

        let backbuffer_barrier = pass_b.image_barriers.iter().find(|b| b.new_layout == vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL).unwrap();
        assert_eq!(backbuffer_barrier.old_layout, vk::ImageLayout::UNDEFINED);
    }

    /// Scenario: single forward pass writing a color and a depth attachment in
    /// one pass, both transitioning from undefined — no reads, no writes.
    #[test]
    fn scenario_single_forward_pass_attaches_color_and_depth() {
        let mut nodes = vec![transient_node_with_physical(), transient_node_with_physical()];
        let color = attachment_write(ResourceId(0));
        let depth = AttachmentAccess {
            id: ResourceId(1),
            info: AttachmentInfo::clear_depth(1.0, 0),
            depth: true,
        };

        let (batch, _) = synthesize_pass_barriers(&mut nodes, &[color, depth], &[], &[]);

        assert_eq!(batch.image_barriers.len(), 2);
        assert!(batch.image_barriers.iter().all(|b| b.old_layout == vk::ImageLayout::UNDEFINED));
        assert!(batch.image_barriers.iter().any(|b| b.new_layout == vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL));
        assert!(batch.image_barriers.iter().any(|b| b.new_layout == vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL));
    }

    /// Scenario: compute cull pass reading an indirect-args buffer and writing
    /// a visible-count buffer — no image barriers at all, both buffer barriers
    /// carry compute-shader stage/access.
    #[test]
    fn scenario_compute_cull_pass_emits_only_buffer_barriers() {
        let buffer_node = |name: &str| {
            let mut node = Node::new_transient_buffer(
                name.to_string(),
                crate::graph::descriptor::BufferDesc::new(4096, vk::BufferUsageFlags::STORAGE_BUFFER, crate::allocator::memory_type::MemoryType::GpuOnly),
            );
            node.physical = Some(PhysicalBinding::Buffer {
                buffer: vk::Buffer::null(),
            });
            node
        };
        let mut nodes = vec![buffer_node("draw_args"), buffer_node("visible_count")];
        let reads = [ResourceAccess {
            id: ResourceId(0),
            stage: vk::PipelineStageFlags2::COMPUTE_SHADER,
            access: vk::AccessFlags2::SHADER_STORAGE_READ,
        }];
        let writes = [ResourceAccess {
            id: ResourceId(1),
            stage: vk::PipelineStageFlags2::COMPUTE_SHADER,
            access: vk::AccessFlags2::SHADER_STORAGE_WRITE,
        }];

        let (batch, _) = synthesize_pass_barriers(&mut nodes, &[], &reads, &writes);

        assert!(batch.image_barriers.is_empty());
        assert_eq!(batch.buffer_barriers.len(), 2);
    }

    #[test]
    fn buffer_barrier_carries_no_layout() {
        let mut node = Node::new_transient_buffer(
            "particle_counts".to_string(),
            crate::graph::descriptor::BufferDesc::new(256, vk::BufferUsageFlags::STORAGE_BUFFER, crate::allocator::memory_type::MemoryType::GpuOnly),
        );
        node.physical = Some(PhysicalBinding::Buffer {
            buffer: vk::Buffer::null(),
        });
        let mut batch = BarrierBatch::default();
        emit_buffer_barrier(&mut node, vk::Buffer::null(), vk::PipelineStageFlags2::COMPUTE_SHADER, vk::AccessFlags2::SHADER_STORAGE_WRITE, &mut batch);

        assert_eq!(batch.buffer_barriers.len(), 1);
        assert_eq!(batch.buffer_barriers[0].dst_access_mask, vk::AccessFlags2::SHADER_STORAGE_WRITE);
        assert_eq!(node.current_access, vk::AccessFlags2::SHADER_STORAGE_WRITE);
    }
}
