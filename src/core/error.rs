//! Exposes the janus error type

use std::ffi::NulError;
use std::sync::PoisonError;

use ash;
use gpu_allocator::AllocationError;
use thiserror::Error;

/// Error type that janus can return.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load the Vulkan library.
    #[error("Failed to load Vulkan.")]
    LoadFailed(ash::LoadingError),
    /// Could not convert rust string to C-String because it has null bytes
    #[error("Invalid C string")]
    InvalidString(NulError),
    /// Generic Vulkan error type.
    #[error("Vulkan error: `{0}`")]
    VkError(ash::vk::Result),
    /// No suitable GPU found.
    #[error("No physical device found matching requirements.")]
    NoGPU,
    /// No queue was found for requested capabilities.
    #[error("No queue found supporting graphics, compute and transfer on a single family.")]
    NoCapableQueue,
    /// Vulkan allocation error.
    #[error("Vulkan allocation error: `{0}`")]
    AllocationError(AllocationError),
    /// Poisoned mutex.
    #[error("Poisoned mutex")]
    PoisonError,
    /// Mappable buffer expected.
    #[error("Requested mappable buffer, but buffer does not have a memory map")]
    UnmappableBuffer,
    /// Buffer view out of range of the owning buffer.
    #[error("Buffer view is not a valid range in the parent buffer.")]
    BufferViewOutOfRange,
    /// A pass read or wrote a resource name that was never registered through
    /// `create_texture`/`create_buffer`/`import_texture`/`import_buffer`.
    #[error("Pass `{pass}` referenced unknown resource `{name}`.")]
    MissingResource {
        /// Name of the pass that referenced the resource.
        pass: String,
        /// Name of the resource that could not be resolved.
        name: String,
    },
    /// A resource name was declared more than once with incompatible descriptors
    /// (e.g. re-imported with a different format, or re-created with a different
    /// size).
    #[error("Resource `{name}` was declared more than once with conflicting descriptors: {reason}")]
    ConflictingDeclaration {
        /// Name of the conflicting resource.
        name: String,
        /// Human-readable explanation of the conflict.
        reason: String,
    },
    /// The transient pool could not back a logical resource with a physical
    /// allocation.
    #[error("Failed to allocate physical backing for resource `{0}`.")]
    AllocationFailure(String),
    /// A pass body closure returned an error.
    #[error("Pass `{0}` failed during execution: {1}")]
    PassBodyFailure(String, String),
    /// A buffer barrier was declared for a node while a dynamic rendering region
    /// for the same pass was open; buffer barriers are illegal inside a
    /// `vkCmdBeginRendering`/`vkCmdEndRendering` region.
    #[error("Pass `{0}` declared a buffer barrier inside an active dynamic rendering region.")]
    IllegalBarrierInDynamicRendering(String),
}

impl From<ash::LoadingError> for Error {
    fn from(value: ash::LoadingError) -> Self {
        Error::LoadFailed(value)
    }
}

impl From<NulError> for Error {
    fn from(value: NulError) -> Self {
        Error::InvalidString(value)
    }
}

impl From<ash::vk::Result> for Error {
    fn from(value: ash::vk::Result) -> Self {
        Error::VkError(value)
    }
}

impl From<AllocationError> for Error {
    fn from(value: AllocationError) -> Self {
        Error::AllocationError(value)
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error::PoisonError
    }
}
