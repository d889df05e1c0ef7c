//! Per-pass builder: the only way a pass's setup closure can declare resource
//! reads, writes, attachments, and new or imported resources.

use std::collections::HashMap;

use anyhow::Result;
use ash::vk;
use log::warn;

use crate::graph::descriptor::{aspect_for_usage, infer_texture_defaults, BufferDesc, TextureDesc};
use crate::graph::handle::{ResourceHandle, ResourceId};
use crate::graph::node::{Node, NodeKind};
use crate::graph::pass::{AttachmentAccess, AttachmentInfo, ResourceAccess};
use crate::resource::image::ImageView;
use crate::Error;

/// Builder handed to a pass's setup closure. Declares what a pass reads,
/// writes, and renders to, and creates or imports the logical resources
/// involved. None of this touches the GPU: physical resources are resolved
/// later, during compilation.
pub struct Builder<'g> {
    pass_name: String,
    nodes: &'g mut Vec<Node>,
    name_lookup: &'g mut HashMap<String, ResourceId>,
    reads: Vec<ResourceAccess>,
    writes: Vec<ResourceAccess>,
    attachments: Vec<AttachmentAccess>,
    valid: bool,
}

impl<'g> Builder<'g> {
    pub(crate) fn new(pass_name: String, nodes: &'g mut Vec<Node>, name_lookup: &'g mut HashMap<String, ResourceId>) -> Self {
        Builder {
            pass_name,
            nodes,
            name_lookup,
            reads: Vec::new(),
            writes: Vec::new(),
            attachments: Vec::new(),
            valid: true,
        }
    }

    pub(crate) fn finish(self) -> (bool, Vec<ResourceAccess>, Vec<ResourceAccess>, Vec<AttachmentAccess>) {
        (self.valid, self.reads, self.writes, self.attachments)
    }

    fn check_handle(&mut self, handle: ResourceHandle, unknown_name: &str) -> Option<ResourceId> {
        if handle.is_valid() && handle.id.index() < self.nodes.len() {
            return Some(handle.id);
        }
        warn!(
            "{}",
            Error::MissingResource {
                pass: self.pass_name.clone(),
                name: unknown_name.to_string(),
            }
        );
        self.valid = false;
        None
    }

    /// Declare a non-attachment read of `handle`. `stage`/`access` describe how
    /// the pass body will consume the resource; when `None`, a conservative
    /// all-commands/all-reads default is used.
    pub fn read(&mut self, handle: ResourceHandle, stage: Option<vk::PipelineStageFlags2>, access: Option<vk::AccessFlags2>) -> ResourceHandle {
        if let Some(id) = self.check_handle(handle, "<read>") {
            self.reads.push(ResourceAccess {
                id,
                stage: stage.unwrap_or(vk::PipelineStageFlags2::ALL_COMMANDS),
                access: access.unwrap_or(vk::AccessFlags2::MEMORY_READ),
            });
        }
        handle
    }

    /// Declare a non-attachment write of `handle`.
    pub fn write(&mut self, handle: ResourceHandle, stage: Option<vk::PipelineStageFlags2>, access: Option<vk::AccessFlags2>) -> ResourceHandle {
        if let Some(id) = self.check_handle(handle, "<write>") {
            self.writes.push(ResourceAccess {
                id,
                stage: stage.unwrap_or(vk::PipelineStageFlags2::ALL_COMMANDS),
                access: access.unwrap_or(vk::AccessFlags2::MEMORY_WRITE),
            });
        }
        handle
    }

    /// Declare `handle` as a color attachment of the pass's dynamic rendering
    /// region.
    pub fn write_color(&mut self, handle: ResourceHandle, info: AttachmentInfo) -> ResourceHandle {
        if let Some(id) = self.check_handle(handle, "<color attachment>") {
            self.attachments.push(AttachmentAccess {
                id,
                info,
                depth: false,
            });
        }
        handle
    }

    /// Declare `handle` as the depth/stencil attachment of the pass's dynamic
    /// rendering region.
    pub fn write_depth(&mut self, handle: ResourceHandle, info: AttachmentInfo) -> ResourceHandle {
        if let Some(id) = self.check_handle(handle, "<depth attachment>") {
            self.attachments.push(AttachmentAccess {
                id,
                info,
                depth: true,
            });
        }
        handle
    }

    /// Create (or, if `name` was already created this frame with an identical
    /// descriptor, reuse) a transient texture.
    /// # Errors
    /// Fails if `name` was already declared with a different descriptor, or is
    /// already bound to a resource of a different kind.
    pub fn create_texture(&mut self, name: &str, desc: TextureDesc) -> Result<ResourceHandle> {
        if let Some(&id) = self.name_lookup.get(name) {
            return match &self.nodes[id.index()].kind {
                NodeKind::TransientTexture(existing) if *existing == desc => Ok(ResourceHandle::new(id)),
                NodeKind::TransientTexture(_) => Err(anyhow::Error::from(Error::ConflictingDeclaration {
                    name: name.to_string(),
                    reason: "texture re-created this frame with a different descriptor".to_string(),
                })),
                _ => Err(anyhow::Error::from(Error::ConflictingDeclaration {
                    name: name.to_string(),
                    reason: "name is already bound to a resource of a different kind".to_string(),
                })),
            };
        }
        let id = ResourceId(self.nodes.len());
        self.nodes.push(Node::new_transient_texture(name.to_string(), desc));
        self.name_lookup.insert(name.to_string(), id);
        Ok(ResourceHandle::new(id))
    }

    /// Create (or reuse) a transient buffer.
    /// # Errors
    /// Fails if `name` was already declared with a different descriptor, or is
    /// already bound to a resource of a different kind.
    pub fn create_buffer(&mut self, name: &str, desc: BufferDesc) -> Result<ResourceHandle> {
        if let Some(&id) = self.name_lookup.get(name) {
            return match &self.nodes[id.index()].kind {
                NodeKind::TransientBuffer(existing) if *existing == desc => Ok(ResourceHandle::new(id)),
                NodeKind::TransientBuffer(_) => Err(anyhow::Error::from(Error::ConflictingDeclaration {
                    name: name.to_string(),
                    reason: "buffer re-created this frame with a different descriptor".to_string(),
                })),
                _ => Err(anyhow::Error::from(Error::ConflictingDeclaration {
                    name: name.to_string(),
                    reason: "name is already bound to a resource of a different kind".to_string(),
                })),
            };
        }
        let id = ResourceId(self.nodes.len());
        self.nodes.push(Node::new_transient_buffer(name.to_string(), desc));
        self.name_lookup.insert(name.to_string(), id);
        Ok(ResourceHandle::new(id))
    }

    /// Import an externally-owned image (for example a swapchain image) under
    /// `name`, with the given current layout. Re-importing the same name with
    /// identical parameters is idempotent.
    pub fn import_texture(&mut self, name: &str, image: vk::Image, view: ImageView, format: vk::Format, extent: vk::Extent2D, current_layout: vk::ImageLayout) -> Result<ResourceHandle> {
        if let Some(&id) = self.name_lookup.get(name) {
            return match &self.nodes[id.index()].kind {
                NodeKind::ImportedTexture {
                    image: existing_image,
                    format: existing_format,
                    extent: existing_extent,
                    ..
                } if *existing_image == image && *existing_format == format && *existing_extent == extent => Ok(ResourceHandle::new(id)),
                NodeKind::ImportedTexture {
                    ..
                } => Err(anyhow::Error::from(Error::ConflictingDeclaration {
                    name: name.to_string(),
                    reason: "texture re-imported this frame with different parameters".to_string(),
                })),
                _ => Err(anyhow::Error::from(Error::ConflictingDeclaration {
                    name: name.to_string(),
                    reason: "name is already bound to a resource of a different kind".to_string(),
                })),
            };
        }
        let id = ResourceId(self.nodes.len());
        self.nodes.push(Node::new_imported_texture(name.to_string(), image, view, format, extent, current_layout));
        self.name_lookup.insert(name.to_string(), id);
        Ok(ResourceHandle::new(id))
    }

    /// Import an externally-owned buffer under `name`.
    pub fn import_buffer(&mut self, name: &str, buffer: vk::Buffer, size: vk::DeviceSize) -> Result<ResourceHandle> {
        if let Some(&id) = self.name_lookup.get(name) {
            return match &self.nodes[id.index()].kind {
                NodeKind::ImportedBuffer {
                    buffer: existing_buffer,
                    size: existing_size,
                } if *existing_buffer == buffer && *existing_size == size => Ok(ResourceHandle::new(id)),
                NodeKind::ImportedBuffer {
                    ..
                } => Err(anyhow::Error::from(Error::ConflictingDeclaration {
                    name: name.to_string(),
                    reason: "buffer re-imported this frame with different parameters".to_string(),
                })),
                _ => Err(anyhow::Error::from(Error::ConflictingDeclaration {
                    name: name.to_string(),
                    reason: "name is already bound to a resource of a different kind".to_string(),
                })),
            };
        }
        let id = ResourceId(self.nodes.len());
        self.nodes.push(Node::new_imported_buffer(name.to_string(), buffer, size));
        self.name_lookup.insert(name.to_string(), id);
        Ok(ResourceHandle::new(id))
    }

    /// The 2D extent of a texture handle, if it resolves to one.
    pub fn get_texture_extent(&self, handle: ResourceHandle) -> Option<vk::Extent2D> {
        if !handle.is_valid() {
            return None;
        }
        let node = self.nodes.get(handle.id.index())?;
        match &node.kind {
            NodeKind::TransientTexture(desc) => Some(vk::Extent2D {
                width: desc.width,
                height: desc.height,
            }),
            NodeKind::ImportedTexture {
                extent, ..
            } => Some(*extent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Vec<Node>, HashMap<String, ResourceId>) {
        (Vec::new(), HashMap::new())
    }

    #[test]
    fn recreating_with_same_descriptor_returns_the_same_handle() {
        let (mut nodes, mut lookup) = fixture();
        let mut builder = Builder::new("pass".to_string(), &mut nodes, &mut lookup);
        let desc = TextureDesc::new(1920, 1080, vk::Format::R8G8B8A8_UNORM);
        let first = builder.create_texture("scene_color", desc.clone()).unwrap();
        let second = builder.create_texture("scene_color", desc).unwrap();
        assert_eq!(first, second);
        let (valid, ..) = builder.finish();
        assert!(valid);
    }

    #[test]
    fn recreating_with_a_different_descriptor_fails_loudly() {
        let (mut nodes, mut lookup) = fixture();
        let mut builder = Builder::new("pass".to_string(), &mut nodes, &mut lookup);
        builder.create_texture("scene_color", TextureDesc::new(1920, 1080, vk::Format::R8G8B8A8_UNORM)).unwrap();
        let conflict = builder.create_texture("scene_color", TextureDesc::new(1280, 720, vk::Format::R8G8B8A8_UNORM));
        assert!(conflict.is_err());
    }

    #[test]
    fn reading_an_unknown_handle_invalidates_the_pass_without_panicking() {
        let (mut nodes, mut lookup) = fixture();
        let mut builder = Builder::new("pass".to_string(), &mut nodes, &mut lookup);
        builder.read(ResourceHandle::invalid(), None, None);
        let (valid, reads, ..) = builder.finish();
        assert!(!valid);
        assert!(reads.is_empty());
    }

    #[test]
    fn depth_named_texture_gets_depth_stencil_usage() {
        let (mut nodes, mut lookup) = fixture();
        let handle = {
            let mut builder = Builder::new("pass".to_string(), &mut nodes, &mut lookup);
            let handle = builder.create_texture("shadow_depth", TextureDesc::new(2048, 2048, vk::Format::D32_SFLOAT)).unwrap();
            let extent = builder.get_texture_extent(handle).unwrap();
            assert_eq!(extent, vk::Extent2D {
                width: 2048,
                height: 2048,
            });
            handle
        };
        let (usage, _) = resolved_texture_usage(
            "shadow_depth",
            match &nodes[handle.id.index()].kind {
                NodeKind::TransientTexture(desc) => desc,
                _ => unreachable!(),
            },
        );
        assert!(usage.contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT));
    }
}

/// Resolve the usage and view aspect a texture node should be backed with,
/// accounting for an explicit override.
pub(crate) fn resolved_texture_usage(name: &str, desc: &TextureDesc) -> (vk::ImageUsageFlags, vk::ImageAspectFlags) {
    match desc.usage {
        Some(usage) => (usage, aspect_for_usage(usage, desc.format)),
        None => infer_texture_defaults(name, desc.format),
    }
}
