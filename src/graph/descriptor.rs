//! Plain-data descriptors for transient resources, and the format/name
//! heuristics used to fill in the parts of a descriptor a caller left default.

use ash::vk;

use crate::allocator::memory_type::MemoryType;

/// Descriptor for a transient texture. `usage` may be left `None`, in which
/// case it is derived from `format` and the resource's name when the texture
/// is created (a name containing `"depth"`, case-insensitively, or a
/// depth/stencil format, yields a depth-stencil attachment; anything else
/// yields a color attachment).
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: vk::Format,
    pub usage: Option<vk::ImageUsageFlags>,
    pub samples: vk::SampleCountFlags,
}

impl TextureDesc {
    /// A single-sampled 2D texture of the given size and format, with usage
    /// inferred from its name at creation time.
    pub fn new(width: u32, height: u32, format: vk::Format) -> Self {
        TextureDesc {
            width,
            height,
            format,
            usage: None,
            samples: vk::SampleCountFlags::TYPE_1,
        }
    }

    /// Override the inferred usage flags.
    pub fn with_usage(mut self, usage: vk::ImageUsageFlags) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Request a multisampled texture.
    pub fn with_samples(mut self, samples: vk::SampleCountFlags) -> Self {
        self.samples = samples;
        self
    }
}

/// Descriptor for a transient buffer. All fields are required: buffers have
/// no equivalent of a texture's name-based usage heuristic.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferDesc {
    pub size: vk::DeviceSize,
    pub usage: vk::BufferUsageFlags,
    pub domain: MemoryType,
}

impl BufferDesc {
    pub fn new(size: vk::DeviceSize, usage: vk::BufferUsageFlags, domain: MemoryType) -> Self {
        BufferDesc {
            size,
            usage,
            domain,
        }
    }
}

/// Whether `format` carries a depth component.
pub fn is_depth_format(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D16_UNORM
            | vk::Format::D16_UNORM_S8_UINT
            | vk::Format::D24_UNORM_S8_UINT
            | vk::Format::D32_SFLOAT
            | vk::Format::D32_SFLOAT_S8_UINT
            | vk::Format::X8_D24_UNORM_PACK32
    )
}

/// Whether `format` carries a stencil component.
pub fn has_stencil_component(format: vk::Format) -> bool {
    matches!(format, vk::Format::D16_UNORM_S8_UINT | vk::Format::D24_UNORM_S8_UINT | vk::Format::D32_SFLOAT_S8_UINT | vk::Format::S8_UINT)
}

/// Resolve a texture's usage flags and view aspect from its name and format,
/// for the case where the caller did not provide explicit usage.
pub fn infer_texture_defaults(name: &str, format: vk::Format) -> (vk::ImageUsageFlags, vk::ImageAspectFlags) {
    let looks_like_depth = name.to_ascii_lowercase().contains("depth") || is_depth_format(format);
    if looks_like_depth {
        let aspect = if has_stencil_component(format) {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        } else {
            vk::ImageAspectFlags::DEPTH
        };
        (vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT | vk::ImageUsageFlags::SAMPLED, aspect)
    } else {
        (vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::SAMPLED, vk::ImageAspectFlags::COLOR)
    }
}

/// Resolve the view aspect a texture's usage flags and format imply, used when
/// a caller supplied explicit usage but no aspect.
pub fn aspect_for_usage(usage: vk::ImageUsageFlags, format: vk::Format) -> vk::ImageAspectFlags {
    if usage.contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT) {
        if has_stencil_component(format) {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        } else {
            vk::ImageAspectFlags::DEPTH
        }
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_heuristic_picks_depth_stencil() {
        let (usage, aspect) = infer_texture_defaults("SceneDepth", vk::Format::D32_SFLOAT);
        assert!(usage.contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT));
        assert_eq!(aspect, vk::ImageAspectFlags::DEPTH);
    }

    #[test]
    fn plain_name_picks_color() {
        let (usage, aspect) = infer_texture_defaults("SceneColor", vk::Format::R8G8B8A8_UNORM);
        assert!(usage.contains(vk::ImageUsageFlags::COLOR_ATTACHMENT));
        assert_eq!(aspect, vk::ImageAspectFlags::COLOR);
    }

    #[test]
    fn depth_format_is_detected_even_without_name_hint() {
        let (usage, _) = infer_texture_defaults("GBuffer2", vk::Format::D24_UNORM_S8_UINT);
        assert!(usage.contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT));
    }
}
