//! The logical resource node the graph tracks between builder time and
//! execute time.

use ash::vk;

use crate::graph::descriptor::{BufferDesc, TextureDesc};
use crate::resource::image::ImageView;

/// What a node represents, and the data needed to back it with a physical
/// resource (for transient nodes) or the physical resource it already is (for
/// imported nodes).
#[derive(Debug)]
pub(crate) enum NodeKind {
    TransientTexture(TextureDesc),
    TransientBuffer(BufferDesc),
    ImportedTexture {
        image: vk::Image,
        // Kept alive for the node's lifetime; `physical` only stores the raw handle.
        #[allow(dead_code)]
        view: ImageView,
        format: vk::Format,
        extent: vk::Extent2D,
    },
    ImportedBuffer {
        buffer: vk::Buffer,
        size: vk::DeviceSize,
    },
}

/// The physical Vulkan object currently backing a node, resolved by the
/// compiler's resource resolution pass.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PhysicalBinding {
    Image { image: vk::Image, view: vk::ImageView },
    Buffer { buffer: vk::Buffer },
}

/// A single logical resource in one frame's graph: its declared shape, its
/// physical backing once resolved, and the access state barriers are
/// synthesized against as the compiler walks passes in submission order.
#[derive(Debug)]
pub(crate) struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub current_layout: vk::ImageLayout,
    pub current_stage: vk::PipelineStageFlags2,
    pub current_access: vk::AccessFlags2,
    pub physical: Option<PhysicalBinding>,
}

impl Node {
    pub fn new_transient_texture(name: String, desc: TextureDesc) -> Self {
        Node {
            name,
            kind: NodeKind::TransientTexture(desc),
            current_layout: vk::ImageLayout::UNDEFINED,
            current_stage: vk::PipelineStageFlags2::TOP_OF_PIPE,
            current_access: vk::AccessFlags2::NONE,
            physical: None,
        }
    }

    pub fn new_transient_buffer(name: String, desc: BufferDesc) -> Self {
        Node {
            name,
            kind: NodeKind::TransientBuffer(desc),
            current_layout: vk::ImageLayout::UNDEFINED,
            current_stage: vk::PipelineStageFlags2::TOP_OF_PIPE,
            current_access: vk::AccessFlags2::NONE,
            physical: None,
        }
    }

    pub fn new_imported_texture(name: String, image: vk::Image, view: ImageView, format: vk::Format, extent: vk::Extent2D, initial_layout: vk::ImageLayout) -> Self {
        let physical = Some(PhysicalBinding::Image {
            image,
            view: unsafe { view.handle() },
        });
        Node {
            name,
            kind: NodeKind::ImportedTexture {
                image,
                view,
                format,
                extent,
            },
            current_layout: initial_layout,
            current_stage: vk::PipelineStageFlags2::TOP_OF_PIPE,
            current_access: vk::AccessFlags2::NONE,
            physical,
        }
    }

    pub fn new_imported_buffer(name: String, buffer: vk::Buffer, size: vk::DeviceSize) -> Self {
        Node {
            name,
            kind: NodeKind::ImportedBuffer {
                buffer,
                size,
            },
            current_layout: vk::ImageLayout::UNDEFINED,
            current_stage: vk::PipelineStageFlags2::TOP_OF_PIPE,
            current_access: vk::AccessFlags2::NONE,
            physical: Some(PhysicalBinding::Buffer {
                buffer,
            }),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, NodeKind::TransientTexture(_) | NodeKind::ImportedTexture { .. })
    }
}
