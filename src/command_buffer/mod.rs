//! Exposes [`CommandRecorder`], the type passed to every pass's execute closure.
//!
//! Unlike an engine that must record commands across several queue domains and
//! pipeline/descriptor caches, janus only ever records onto one graphics-capable
//! queue and never binds descriptors on the caller's behalf (pipeline and
//! descriptor management are explicitly out of scope — a pass body is handed a
//! raw recorder and is expected to bind its own pipeline). This collapses what
//! would otherwise be a domain-generic `IncompleteCommandBuffer<D, A>` into one
//! concrete type.

use anyhow::Result;
use ash::vk;
use derivative::Derivative;

use crate::core::device::Device;
use crate::Error;

pub mod command_pool;

/// Describes one color or depth/stencil attachment of a dynamic rendering region.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct RenderingAttachmentInfo {
    /// View of the image attached.
    pub image_view: vk::ImageView,
    /// Layout the image is in while used as this attachment.
    pub image_layout: vk::ImageLayout,
    /// What to do with the attachment's previous contents.
    pub load_op: vk::AttachmentLoadOp,
    /// What to do with the attachment's contents after rendering.
    pub store_op: vk::AttachmentStoreOp,
    /// Clear value used when `load_op` is [`vk::AttachmentLoadOp::CLEAR`].
    #[derivative(Debug = "ignore")]
    pub clear_value: vk::ClearValue,
}

/// Describes a `vkCmdBeginRendering`/`vkCmdEndRendering` region.
#[derive(Debug, Clone, Default)]
pub struct RenderingInfo {
    /// Area of the attachments that will be rendered to.
    pub render_area: vk::Rect2D,
    /// Number of array layers rendered to.
    pub layer_count: u32,
    /// Color attachments, in binding order.
    pub color_attachments: Vec<RenderingAttachmentInfo>,
    /// Optional depth/stencil attachment.
    pub depth_attachment: Option<RenderingAttachmentInfo>,
}

/// Records GPU commands into a single `VkCommandBuffer`.
///
/// A `CommandRecorder` is handed to a pass's execute closure by the executor,
/// already positioned between that pass's barrier batch and (if the pass has
/// attachments) an open dynamic rendering region.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CommandRecorder {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::CommandBuffer,
    in_rendering: bool,
}

impl CommandRecorder {
    /// Wrap an already-allocated, already-`vkBeginCommandBuffer`'d command
    /// buffer for recording.
    pub fn new(device: Device, handle: vk::CommandBuffer) -> Self {
        CommandRecorder {
            device,
            handle,
            in_rendering: false,
        }
    }

    /// Get unsafe access to the underlying `VkCommandBuffer`.
    /// # Safety
    /// Any vulkan calls that modify this command buffer's state outside of this
    /// type's own methods may desynchronize its tracked rendering state.
    pub unsafe fn handle(&self) -> vk::CommandBuffer {
        self.handle
    }

    /// Submit a combined image + buffer barrier batch as one `VkDependencyInfo`.
    /// # Errors
    /// Fails with [`Error::IllegalBarrierInDynamicRendering`] if a buffer barrier
    /// is submitted while a dynamic rendering region is open; buffer barriers
    /// inside such a region are illegal per the Vulkan spec.
    pub fn pipeline_barrier(&mut self, image_barriers: &[vk::ImageMemoryBarrier2], buffer_barriers: &[vk::BufferMemoryBarrier2]) -> Result<()> {
        if self.in_rendering && !buffer_barriers.is_empty() {
            return Err(anyhow::Error::from(Error::IllegalBarrierInDynamicRendering(String::from("<pass>"))));
        }
        if image_barriers.is_empty() && buffer_barriers.is_empty() {
            return Ok(());
        }
        let dependency = vk::DependencyInfo::builder()
            .image_memory_barriers(image_barriers)
            .buffer_memory_barriers(buffer_barriers)
            .build();
        unsafe { self.device.cmd_pipeline_barrier2(self.handle, &dependency) };
        Ok(())
    }

    /// Begin a dynamic rendering region for a pass with attachments.
    pub fn begin_rendering(&mut self, info: &RenderingInfo) {
        let color_attachments: Vec<vk::RenderingAttachmentInfo> = info
            .color_attachments
            .iter()
            .map(|attachment| {
                vk::RenderingAttachmentInfo::builder()
                    .image_view(attachment.image_view)
                    .image_layout(attachment.image_layout)
                    .load_op(attachment.load_op)
                    .store_op(attachment.store_op)
                    .clear_value(attachment.clear_value)
                    .build()
            })
            .collect();
        let depth_attachment = info.depth_attachment.as_ref().map(|attachment| {
            vk::RenderingAttachmentInfo::builder()
                .image_view(attachment.image_view)
                .image_layout(attachment.image_layout)
                .load_op(attachment.load_op)
                .store_op(attachment.store_op)
                .clear_value(attachment.clear_value)
                .build()
        });

        let mut builder = vk::RenderingInfo::builder()
            .render_area(info.render_area)
            .layer_count(info.layer_count)
            .color_attachments(&color_attachments);
        if let Some(depth) = depth_attachment.as_ref() {
            builder = builder.depth_attachment(depth);
        }
        let rendering_info = builder.build();

        unsafe { self.device.cmd_begin_rendering(self.handle, &rendering_info) };
        self.in_rendering = true;
    }

    /// End the current dynamic rendering region.
    pub fn end_rendering(&mut self) {
        unsafe { self.device.cmd_end_rendering(self.handle) };
        self.in_rendering = false;
    }

    /// Set viewport and scissor to cover the entire given extent, with standard
    /// Vulkan (not flipped) winding.
    pub fn full_viewport_scissor(&mut self, extent: vk::Extent2D) -> &mut Self {
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D::default(),
            extent,
        };
        unsafe {
            self.device.cmd_set_viewport(self.handle, 0, std::slice::from_ref(&viewport));
            self.device.cmd_set_scissor(self.handle, 0, std::slice::from_ref(&scissor));
        }
        self
    }

    /// Bind a vertex buffer at binding 0.
    pub fn bind_vertex_buffer(&mut self, buffer: vk::Buffer, offset: vk::DeviceSize) -> &mut Self {
        unsafe { self.device.cmd_bind_vertex_buffers(self.handle, 0, std::slice::from_ref(&buffer), std::slice::from_ref(&offset)) };
        self
    }

    /// Bind an index buffer.
    pub fn bind_index_buffer(&mut self, buffer: vk::Buffer, offset: vk::DeviceSize, index_type: vk::IndexType) -> &mut Self {
        unsafe { self.device.cmd_bind_index_buffer(self.handle, buffer, offset, index_type) };
        self
    }

    /// Issue a non-indexed draw call.
    pub fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> &mut Self {
        unsafe { self.device.cmd_draw(self.handle, vertex_count, instance_count, first_vertex, first_instance) };
        self
    }

    /// Issue an indexed draw call.
    pub fn draw_indexed(&mut self, index_count: u32, instance_count: u32, first_index: u32, vertex_offset: i32, first_instance: u32) -> &mut Self {
        unsafe {
            self.device
                .cmd_draw_indexed(self.handle, index_count, instance_count, first_index, vertex_offset, first_instance)
        };
        self
    }

    /// Issue an indexed indirect draw call with a GPU-provided draw count.
    pub fn draw_indexed_indirect_count(
        &mut self,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        count_buffer: vk::Buffer,
        count_offset: vk::DeviceSize,
        max_draw_count: u32,
        stride: u32,
    ) -> &mut Self {
        unsafe {
            self.device
                .cmd_draw_indexed_indirect_count(self.handle, buffer, offset, count_buffer, count_offset, max_draw_count, stride)
        };
        self
    }

    /// Dispatch a compute workload.
    pub fn dispatch(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> &mut Self {
        unsafe { self.device.cmd_dispatch(self.handle, group_count_x, group_count_y, group_count_z) };
        self
    }

    /// Copy a region between two buffers.
    pub fn copy_buffer(&mut self, src: vk::Buffer, dst: vk::Buffer, regions: &[vk::BufferCopy]) -> &mut Self {
        unsafe { self.device.cmd_copy_buffer(self.handle, src, dst, regions) };
        self
    }

    /// Copy a region from a buffer into an image.
    pub fn copy_buffer_to_image(&mut self, src: vk::Buffer, dst: vk::Image, dst_layout: vk::ImageLayout, regions: &[vk::BufferImageCopy]) -> &mut Self {
        unsafe { self.device.cmd_copy_buffer_to_image(self.handle, src, dst, dst_layout, regions) };
        self
    }

    /// Push constant bytes to all stages.
    pub fn push_constants(&mut self, layout: vk::PipelineLayout, stage_flags: vk::ShaderStageFlags, offset: u32, data: &[u8]) -> &mut Self {
        unsafe { self.device.cmd_push_constants(self.handle, layout, stage_flags, offset, data) };
        self
    }
}
