/// Bounding-volume propagation along the last descent path.
///
/// Bounds only grow by the one box that changed. Nothing is ever recomputed
/// from children, so after removals a node's bounds over-approximate its
/// contents until the node is reclaimed.

use crate::scene::AABB;
use super::QuadtreeSceneIndex;

impl<H: Copy + PartialEq + Default> QuadtreeSceneIndex<H> {
    /// Union `aabb` into every node of `path`, leaf first
    pub(super) fn propagate_bounds(&mut self, aabb: &AABB) {
        for &node in self.path.iter().rev() {
            let bounds = &mut self.nodes[node as usize].bounds;
            *bounds = bounds.union(aabb);
        }
    }
}
