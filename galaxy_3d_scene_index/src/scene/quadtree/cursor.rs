/// FrustumCursor - pull-style culling traversal.
///
/// Walks the tree depth first with an explicit stack of frames. A frame
/// whose node is fully inside the volume passes that down, so no volume
/// test runs anywhere below it. Subtrees whose cached bounds are outside
/// the volume are never entered.
///
/// Empty leaves met on the way are reclaimed (slice and leaf returned to
/// their pools, node reset to `Empty`). This is the only place leaves are
/// destroyed after a remove.

use std::ops::Range;
use smallvec::SmallVec;
use crate::camera::CullingVolume;
use crate::error::Result;
use crate::scene::AABB;
use crate::utils::SliceRange;
use super::node::{Node, NodeKind};
use super::QuadtreeSceneIndex;

/// A visible leaf yielded by the cursor
#[derive(Debug, Clone)]
pub struct VisibleLeaf<'a, H> {
    /// Live handles of the leaf (zero-copy view of the instance array)
    pub instances: &'a [H],
    /// Absolute position of `instances` in the instance array
    pub range: Range<usize>,
    /// Cached bounds of the leaf
    pub bounds: AABB,
    /// The leaf is fully inside the volume: per-instance tests can be skipped
    pub fully_contained: bool,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: u32,
    /// Next child to visit (0..4) when `node` is a branch
    next_child: u8,
    fully_contained: bool,
}

#[derive(Debug, Clone)]
struct Current {
    range: Range<usize>,
    bounds: AABB,
    fully_contained: bool,
}

/// Enumerates the non-empty leaves whose bounds intersect a culling volume.
///
/// # Example
///
/// ```ignore
/// let mut cursor = index.frustum_cursor(&frustum);
/// while cursor.move_next() {
///     let leaf = cursor.current().unwrap();
///     for (&instance, slot) in leaf.instances.iter().zip(leaf.range.clone()) {
///         // draw instance, read metadata[slot]...
///     }
/// }
/// ```
pub struct FrustumCursor<'a, H: Copy + PartialEq + Default, V: CullingVolume + ?Sized> {
    index: &'a mut QuadtreeSceneIndex<H>,
    volume: &'a V,
    stack: SmallVec<[Frame; 32]>,
    current: Option<Current>,
}

impl<'a, H: Copy + PartialEq + Default, V: CullingVolume + ?Sized> FrustumCursor<'a, H, V> {
    pub(super) fn new(index: &'a mut QuadtreeSceneIndex<H>, volume: &'a V) -> Self {
        let mut stack = SmallVec::new();

        if let Some(root) = index.root {
            let bounds = index.nodes[root.node as usize].bounds;
            if bounds.is_valid() {
                let test = volume.visibility(&bounds);
                if test.is_visible() {
                    stack.push(Frame {
                        node: root.node,
                        next_child: 0,
                        fully_contained: test.is_fully_contained(),
                    });
                }
            }
        }

        Self {
            index,
            volume,
            stack,
            current: None,
        }
    }

    /// Advance to the next visible, non-empty leaf
    pub fn move_next(&mut self) -> bool {
        self.current = None;

        while let Some(frame) = self.stack.last_mut() {
            let node: Node = self.index.nodes[frame.node as usize];
            match node.kind {
                NodeKind::Branch { first_child } => {
                    if frame.next_child == 4 {
                        self.stack.pop();
                        continue;
                    }

                    let child_id = first_child + frame.next_child as u32;
                    frame.next_child += 1;
                    let parent_contained = frame.fully_contained;

                    let child = self.index.nodes[child_id as usize];
                    if child.kind == NodeKind::Empty {
                        continue;
                    }

                    let fully_contained = if parent_contained {
                        true
                    } else {
                        let test = self.volume.visibility(&child.bounds);
                        if !test.is_visible() {
                            continue;
                        }
                        test.is_fully_contained()
                    };

                    self.stack.push(Frame {
                        node: child_id,
                        next_child: 0,
                        fully_contained,
                    });
                }
                NodeKind::Leaf { leaf } => {
                    let node_id = frame.node;
                    let fully_contained = frame.fully_contained;
                    self.stack.pop();

                    let entry = self.index.leaves[leaf as usize];
                    if entry.count > 0 {
                        self.current = Some(Current {
                            range: entry.live().as_range(),
                            bounds: node.bounds,
                            fully_contained,
                        });
                        return true;
                    }

                    self.index.reclaim_leaf(node_id, leaf);
                }
                NodeKind::Empty => {
                    self.stack.pop();
                }
            }
        }

        false
    }

    /// Leaf reached by the last successful `move_next`
    pub fn current(&self) -> Option<VisibleLeaf<'_, H>> {
        self.current.as_ref().map(|current| VisibleLeaf {
            instances: &self.index.instances.as_slice()[current.range.clone()],
            range: current.range.clone(),
            bounds: current.bounds,
            fully_contained: current.fully_contained,
        })
    }

    /// `move_next` then `current`
    pub fn next_leaf(&mut self) -> Option<VisibleLeaf<'_, H>> {
        if self.move_next() {
            self.current()
        } else {
            None
        }
    }

    /// Raw read of one instance slot while the cursor is alive
    pub fn instance(&self, index: usize) -> Option<H> {
        self.index.instance(index)
    }

    /// Metadata array while the cursor is alive
    pub fn metadata<T: 'static>(&self) -> Result<&[T]> {
        self.index.metadata::<T>()
    }
}

impl<H: Copy + PartialEq + Default> QuadtreeSceneIndex<H> {
    /// Return an empty leaf's storage and reset its node to `Empty`
    pub(super) fn reclaim_leaf(&mut self, node: u32, leaf: u32) {
        let slice = self.leaves[leaf as usize].slice;
        self.instances.release(slice);
        self.leaves.release(SliceRange::new(leaf, 1));
        self.nodes[node as usize] = Node::default();
        self.reclaimed_leaves += 1;
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
