//! Submits each pass's compiled barrier batch, opens and closes its dynamic
//! rendering region if it has attachments, and invokes its execute closure.

use anyhow::Result;
use log::warn;

use crate::command_buffer::{CommandRecorder, RenderingAttachmentInfo, RenderingInfo};
use crate::graph::handle::ResourceHandle;
use crate::graph::node::Node;
use crate::graph::pass::PassRecord;
use crate::graph::registry::Registry;
use crate::Error;

pub(crate) fn execute(nodes: &[Node], passes: &mut [PassRecord], cmd: &mut CommandRecorder) -> Result<()> {
    let registry = Registry::new(nodes);
    for pass in passes.iter_mut() {
        if pass.skip {
            warn!("skipping pass `{}`: its resources failed to resolve during compilation", pass.name);
            continue;
        }

        cmd.pipeline_barrier(&pass.barriers.image_barriers, &pass.barriers.buffer_barriers)?;

        let has_attachments = !pass.attachments.is_empty();
        if has_attachments {
            let rendering_info = build_rendering_info(pass, &registry);
            cmd.begin_rendering(&rendering_info);
        }

        let result = (pass.execute)(pass.payload.as_ref(), &registry, cmd);

        if has_attachments {
            cmd.end_rendering();
        }

        result.map_err(|err| anyhow::Error::from(Error::PassBodyFailure(pass.name.clone(), err.to_string())))?;
    }
    Ok(())
}

fn build_rendering_info(pass: &PassRecord, registry: &Registry) -> RenderingInfo {
    let mut color_attachments = Vec::new();
    let mut depth_attachment = None;
    for attachment in &pass.attachments {
        let handle = ResourceHandle::new(attachment.id);
        let info = RenderingAttachmentInfo {
            image_view: registry.get_image_view(handle),
            image_layout: if attachment.depth {
                ash::vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
            } else {
                ash::vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
            },
            load_op: attachment.info.load_op,
            store_op: attachment.info.store_op,
            clear_value: attachment.info.clear_value(),
        };
        if attachment.depth {
            depth_attachment = Some(info);
        } else {
            color_attachments.push(info);
        }
    }
    RenderingInfo {
        render_area: ash::vk::Rect2D {
            offset: ash::vk::Offset2D::default(),
            extent: pass.rendering_area,
        },
        layer_count: 1,
        color_attachments,
        depth_attachment,
    }
}
