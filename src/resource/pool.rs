//! Transient resource pool: a key-matching free list that backs every transient
//! node the render graph creates with a physical `Image` or `Buffer`.
//!
//! This is a direct specialization of the free-list-by-key pattern used
//! elsewhere in this crate's lineage for pooled GPU objects (match an existing
//! free cell by descriptor key before allocating a new one), narrowed to the two
//! concrete resource kinds janus ever pools — there is no need to keep it generic
//! over an arbitrary `Poolable` type since images and buffers are the only things
//! a render graph ever creates.

use std::collections::HashMap;

use anyhow::Result;
use ash::vk;

use crate::allocator::default_allocator::DefaultAllocator;
use crate::allocator::memory_type::MemoryType;
use crate::core::device::Device;
use crate::resource::buffer::Buffer;
use crate::resource::image::{Image, ImageView};
use crate::Error;

/// Key identifying a class of interchangeable pooled images. The frame slot is
/// folded into the key so a resource created in slot 0 is never handed back to a
/// pass compiling slot 1 while slot 0's frame may still be in flight on the GPU.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey {
    pub slot: u32,
    pub width: u32,
    pub height: u32,
    pub format: vk::Format,
    pub usage: vk::ImageUsageFlags,
    pub samples: vk::SampleCountFlags,
}

/// Key identifying a class of interchangeable pooled buffers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferKey {
    pub slot: u32,
    pub size: vk::DeviceSize,
    pub usage: vk::BufferUsageFlags,
    pub domain: MemoryType,
}

/// A transient image backed by the pool, together with a default full-resource
/// view of it.
pub struct PooledImage {
    pub image: Image,
    pub view: ImageView,
}

/// A transient buffer backed by the pool.
pub struct PooledBuffer {
    pub buffer: Buffer,
}

struct Cell<T> {
    value: T,
    free: bool,
}

/// Owns every transient image and buffer the render graph has ever created,
/// reusing a free cell whose key matches exactly before allocating a new one.
/// Cells are never destroyed on [`TransientPool::reset`] — only marked free —
/// which is what gives cross-frame resource aliasing its bounded memory
/// footprint.
pub struct TransientPool {
    device: Device,
    images: HashMap<ImageKey, Vec<Cell<PooledImage>>>,
    buffers: HashMap<BufferKey, Vec<Cell<PooledBuffer>>>,
}

impl TransientPool {
    /// Create a new, empty pool.
    pub fn new(device: Device) -> Self {
        TransientPool {
            device,
            images: HashMap::new(),
            buffers: HashMap::new(),
        }
    }

    /// Mark every cell in the pool free for reuse. Does not destroy any
    /// underlying Vulkan object.
    pub fn reset(&mut self) {
        for cells in self.images.values_mut() {
            for cell in cells {
                cell.free = true;
            }
        }
        for cells in self.buffers.values_mut() {
            for cell in cells {
                cell.free = true;
            }
        }
    }

    /// Acquire a pooled image matching `key`, reusing a free cell if one exists,
    /// otherwise allocating a new image and view.
    pub fn acquire_image(&mut self, key: ImageKey, allocator: &mut DefaultAllocator, aspect: vk::ImageAspectFlags) -> Result<&PooledImage> {
        let cells = self.images.entry(key.clone()).or_default();
        let index = match cells.iter().position(|cell| cell.free) {
            Some(index) => {
                cells[index].free = false;
                index
            }
            None => {
                #[cfg(feature = "log-objects")]
                trace!("transient pool miss: allocating new image for key {:?}", key);
                let image = Image::new(self.device.clone(), allocator, key.width, key.height, key.usage, key.format, key.samples)
                    .map_err(|_| Error::AllocationFailure(format!("{key:?}")))?;
                let view = image.view(aspect).map_err(|_| Error::AllocationFailure(format!("{key:?}")))?;
                cells.push(Cell {
                    value: PooledImage {
                        image,
                        view,
                    },
                    free: false,
                });
                cells.len() - 1
            }
        };
        Ok(&cells[index].value)
    }

    /// Acquire a pooled buffer matching `key`, reusing a free cell if one exists,
    /// otherwise allocating a new buffer.
    pub fn acquire_buffer(&mut self, key: BufferKey, allocator: &mut DefaultAllocator) -> Result<&PooledBuffer> {
        let cells = self.buffers.entry(key.clone()).or_default();
        let index = match cells.iter().position(|cell| cell.free) {
            Some(index) => {
                cells[index].free = false;
                index
            }
            None => {
                #[cfg(feature = "log-objects")]
                trace!("transient pool miss: allocating new buffer for key {:?}", key);
                let buffer = Buffer::new(self.device.clone(), allocator, key.size, key.usage, key.domain)
                    .map_err(|_| Error::AllocationFailure(format!("{key:?}")))?;
                cells.push(Cell {
                    value: PooledBuffer {
                        buffer,
                    },
                    free: false,
                });
                cells.len() - 1
            }
        };
        Ok(&cells[index].value)
    }

    /// Total number of image cells currently tracked (free and in-use), for
    /// testing pool non-aliasing and bounded growth.
    pub fn image_cell_count(&self) -> usize {
        self.images.values().map(Vec::len).sum()
    }

    /// Total number of buffer cells currently tracked (free and in-use).
    pub fn buffer_cell_count(&self) -> usize {
        self.buffers.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(slot: u32) -> ImageKey {
        ImageKey {
            slot,
            width: 1920,
            height: 1080,
            format: vk::Format::R8G8B8A8_UNORM,
            usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            samples: vk::SampleCountFlags::TYPE_1,
        }
    }

    #[test]
    fn distinct_slots_never_alias_within_a_frame() {
        // Without a real device we can't allocate; this test only exercises the
        // key-partitioning logic that keeps concurrent frame slots disjoint.
        assert_ne!(key(0), key(1));
        assert_eq!(key(0), key(0));
    }

    /// Scenario: resource aliasing across frames. A transient `BloomH` in frame
    /// k and an unrelated transient `BlurH` in frame k+1 are declared with the
    /// same slot and an identical descriptor. `ImageKey` carries no logical
    /// name, so both resolve to the same pool bucket and would share a cell —
    /// this is the mechanism `acquire_image` relies on to hand `BlurH` the
    /// physical resource previously backing `BloomH` with no new allocation.
    #[test]
    fn identical_descriptor_keys_alias_regardless_of_logical_name() {
        let bloom_h = ImageKey {
            slot: 0,
            width: 960,
            height: 540,
            format: vk::Format::R16G16B16A16_SFLOAT,
            usage: vk::ImageUsageFlags::STORAGE,
            samples: vk::SampleCountFlags::TYPE_1,
        };
        let blur_h = ImageKey {
            slot: 0,
            width: 960,
            height: 540,
            format: vk::Format::R16G16B16A16_SFLOAT,
            usage: vk::ImageUsageFlags::STORAGE,
            samples: vk::SampleCountFlags::TYPE_1,
        };
        assert_eq!(bloom_h, blur_h);

        let mut map: HashMap<ImageKey, u32> = HashMap::new();
        map.insert(bloom_h, 1);
        assert_eq!(map.get(&blur_h), Some(&1));
    }
}
