/// Node and leaf records stored in the index's pooled arrays.
///
/// Ids are plain `u32` indices into those arrays, never addresses, so the
/// backing storage can grow or recycle blocks without invalidating anything
/// but the slots it actually hands back.

use crate::scene::AABB;
use crate::utils::SliceRange;

/// Structural state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum NodeKind {
    /// No leaf or branch yet
    #[default]
    Empty,
    /// Four children allocated contiguously from `first_child`
    Branch { first_child: u32 },
    /// Holds instances through an entry of the leaf array
    Leaf { leaf: u32 },
}

/// A node and its cached bounds.
///
/// `bounds` covers every instance ever added below the node and is only
/// grown, never shrunk, until the node is reclaimed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub bounds: AABB,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            kind: NodeKind::Empty,
            bounds: AABB::INVALID,
        }
    }
}

/// Instance slice owned by a leaf: `count` live handles at the front of `slice`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Leaf {
    pub slice: SliceRange,
    pub count: u32,
}

impl Leaf {
    /// Live part of the slice
    #[inline]
    pub fn live(&self) -> SliceRange {
        SliceRange::new(self.slice.start, self.count)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.slice.len
    }
}
