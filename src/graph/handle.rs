//! Stable identifiers for logical resources inside a single graph build.

use static_assertions::const_assert_eq;

/// Stable integer identifying a logical resource node within one graph build.
/// Assigned the first time a name is mentioned (created or imported); every
/// later reference to that name resolves to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub(crate) usize);

const_assert_eq!(std::mem::size_of::<ResourceId>(), std::mem::size_of::<usize>());

impl ResourceId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A handle returned to callers of [`Builder`](crate::graph::builder::Builder).
/// Wraps a [`ResourceId`] together with a validity flag: a handle obtained from
/// a lookup that failed (for example [`Blackboard::get`](crate::graph::blackboard::Blackboard::get)
/// on an unknown name) is still a valid value to pass around, but resolves to
/// nothing in the [`Registry`](crate::graph::registry::Registry) and is
/// rejected by [`Builder::read`](crate::graph::builder::Builder::read) /
/// [`Builder::write`](crate::graph::builder::Builder::write).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    pub(crate) id: ResourceId,
    valid: bool,
}

impl ResourceHandle {
    pub(crate) fn new(id: ResourceId) -> Self {
        ResourceHandle {
            id,
            valid: true,
        }
    }

    /// A handle that never resolves to any resource.
    pub fn invalid() -> Self {
        ResourceHandle {
            id: ResourceId(usize::MAX),
            valid: false,
        }
    }

    /// Whether this handle was produced by a successful resource lookup.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
