//! GPU memory allocation.
//!
//! Janus uses a single concrete allocator backed by the `gpu_allocator` crate,
//! see [`default_allocator`].

pub mod default_allocator;
pub mod memory_type;
