//! Read-only view into a compiled graph's resolved resources, handed to pass
//! execute closures.

use ash::vk;

use crate::graph::handle::ResourceHandle;
use crate::graph::node::{Node, PhysicalBinding};

/// Resolves handles to the Vulkan objects backing them. Every lookup is
/// null-safe: an invalid handle, or a handle that resolves to a node of the
/// wrong kind, yields a null Vulkan handle rather than panicking. A pass that
/// misuses a handle this way will fail its draw or dispatch call instead of
/// bringing down the whole frame.
pub struct Registry<'g> {
    nodes: &'g [Node],
}

impl<'g> Registry<'g> {
    pub(crate) fn new(nodes: &'g [Node]) -> Self {
        Registry {
            nodes,
        }
    }

    fn resolve(&self, handle: ResourceHandle) -> Option<&Node> {
        if !handle.is_valid() {
            return None;
        }
        self.nodes.get(handle.id.index())
    }

    /// The image backing `handle`, or a null handle if `handle` is invalid or
    /// does not resolve to an image.
    pub fn get_image(&self, handle: ResourceHandle) -> vk::Image {
        self.resolve(handle)
            .and_then(|node| node.physical.as_ref())
            .and_then(|physical| match physical {
                PhysicalBinding::Image {
                    image, ..
                } => Some(*image),
                PhysicalBinding::Buffer {
                    ..
                } => None,
            })
            .unwrap_or(vk::Image::null())
    }

    /// The image view backing `handle`, or a null handle if `handle` is
    /// invalid or does not resolve to an image.
    pub fn get_image_view(&self, handle: ResourceHandle) -> vk::ImageView {
        self.resolve(handle)
            .and_then(|node| node.physical.as_ref())
            .and_then(|physical| match physical {
                PhysicalBinding::Image {
                    view, ..
                } => Some(*view),
                PhysicalBinding::Buffer {
                    ..
                } => None,
            })
            .unwrap_or(vk::ImageView::null())
    }

    /// The buffer backing `handle`, or a null handle if `handle` is invalid or
    /// does not resolve to a buffer.
    pub fn get_buffer(&self, handle: ResourceHandle) -> vk::Buffer {
        self.resolve(handle)
            .and_then(|node| node.physical.as_ref())
            .and_then(|physical| match physical {
                PhysicalBinding::Buffer {
                    buffer,
                } => Some(*buffer),
                PhysicalBinding::Image {
                    ..
                } => None,
            })
            .unwrap_or(vk::Buffer::null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::handle::ResourceId;
    use crate::graph::node::Node;

    #[test]
    fn invalid_handle_resolves_to_null_handles_everywhere() {
        let nodes: Vec<Node> = Vec::new();
        let registry = Registry::new(&nodes);
        let invalid = ResourceHandle::invalid();

        assert_eq!(registry.get_image(invalid), vk::Image::null());
        assert_eq!(registry.get_image_view(invalid), vk::ImageView::null());
        assert_eq!(registry.get_buffer(invalid), vk::Buffer::null());
    }

    #[test]
    fn looking_up_a_buffer_as_an_image_yields_null() {
        let nodes = vec![Node::new_imported_buffer("constants".to_string(), vk::Buffer::null(), 256)];
        let registry = Registry::new(&nodes);
        let handle = ResourceHandle::new(ResourceId(0));

        assert_eq!(registry.get_image(handle), vk::Image::null());
        assert_eq!(registry.get_image_view(handle), vk::ImageView::null());
        assert_eq!(registry.get_buffer(handle), vk::Buffer::null());
    }

    #[test]
    fn out_of_range_index_resolves_to_null() {
        let nodes: Vec<Node> = Vec::new();
        let registry = Registry::new(&nodes);
        let handle = ResourceHandle::new(ResourceId(42));

        assert_eq!(registry.get_image(handle), vk::Image::null());
    }
}
