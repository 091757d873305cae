/// Insertion: root creation and growth, leaf append, leaf split.

use glam::IVec2;
use crate::{engine_debug, engine_trace, engine_warn};
use crate::scene::{AABB, InstanceSource};
use crate::utils::SliceRange;
use super::cell::Cell;
use super::node::{Leaf, Node, NodeKind};
use super::{Mutation, QuadtreeSceneIndex, Root, LOG_SOURCE};

impl<H: Copy + PartialEq + Default> QuadtreeSceneIndex<H> {
    /// Insert `instance` at `position`.
    ///
    /// Grows the root if needed, splits full leaves on the way down, then
    /// appends to the owning leaf and grows the cached bounds of every
    /// ancestor by the instance's box.
    pub fn add<S: InstanceSource<H>>(&mut self, source: &S, position: IVec2, instance: H) -> Mutation {
        let root = self.ensure_root_contains(position);
        let (mut node, mut cell) = self.descend(root, position);

        let mut split = false;
        loop {
            let NodeKind::Leaf { leaf } = self.nodes[node as usize].kind else {
                break;
            };
            if self.leaves[leaf as usize].count < self.config.leaf_capacity || !self.can_split(cell) {
                break;
            }
            self.split_leaf(source, node, cell, leaf);
            split = true;

            // Re-descend from the new branch: the target may hit another full leaf
            self.path.pop();
            (node, cell) = self.descend_from(node, cell, position);
        }

        let leaf = match self.nodes[node as usize].kind {
            NodeKind::Leaf { leaf } => leaf,
            _ => {
                let leaf = self.leaves.allocate(1).start;
                self.leaves[leaf as usize] = Leaf::default();
                self.nodes[node as usize].kind = NodeKind::Leaf { leaf };
                leaf
            }
        };

        let mut entry = self.leaves[leaf as usize];
        let old_offset = if entry.slice.is_empty() { None } else { Some(entry.slice.start) };
        if entry.is_full() {
            let new_len = self.config.slice_len_for(entry.count + 1);
            self.resize_slice(&mut entry.slice, new_len, entry.count);
        }

        let index = entry.slice.start + entry.count;
        self.instances[index as usize] = instance;
        entry.count += 1;
        self.leaves[leaf as usize] = entry;
        self.instance_count += 1;

        if entry.count == self.config.leaf_capacity + 1 {
            self.warn_overflow(cell, entry.count);
        }

        let aabb = source.instance_aabb(instance);
        self.propagate_bounds(&aabb);

        Mutation {
            old_offset: old_offset.unwrap_or(entry.slice.start),
            new_offset: entry.slice.start,
            new_count: entry.count,
            index,
            split,
        }
    }

    #[inline]
    fn can_split(&self, cell: Cell) -> bool {
        cell.altitude > self.config.min_leaf_altitude
    }

    fn warn_overflow(&self, cell: Cell, count: u32) {
        engine_warn!(
            LOG_SOURCE,
            "Leaf at {:?} (altitude {}) holds {} instances, over capacity {}: positions too dense to split further",
            cell.offset, cell.altitude, count, self.config.leaf_capacity
        );
    }

    // ===== ROOT =====

    /// Create the root, or grow it until its cell contains `position`.
    ///
    /// A root that was never subdivided is simply re-addressed. Once it is a
    /// branch, its children's cells are derived from it, so it is wrapped
    /// instead: the tree is pushed down one level per doubling and the root
    /// node id stays the same.
    fn ensure_root_contains(&mut self, position: IVec2) -> Root {
        let Some(mut root) = self.root else {
            let node = self.nodes.allocate(1).start;
            let root = Root {
                node,
                cell: Cell::at(position, self.config.min_leaf_altitude),
            };
            self.root = Some(root);
            engine_debug!(LOG_SOURCE, "Root created at {:?}", root.cell.offset);
            return root;
        };

        if root.cell.contains(position) {
            return root;
        }

        if let NodeKind::Branch { .. } = self.nodes[root.node as usize].kind {
            let mut wraps = 0;
            while !root.cell.contains(position) {
                let (parent, quadrant) = root.cell.wrap_toward(position);
                let children = self.nodes.allocate(4).start;
                self.nodes[(children + quadrant as u32) as usize] = self.nodes[root.node as usize];
                self.nodes[root.node as usize].kind = NodeKind::Branch { first_child: children };
                root.cell = parent;
                wraps += 1;
            }
            self.root_wraps += wraps;
            engine_debug!(
                LOG_SOURCE,
                "Root wrapped {} time(s) to {:?} altitude {}",
                wraps, root.cell.offset, root.cell.altitude
            );
        } else {
            root.cell = root.cell.covering(position);
            engine_debug!(
                LOG_SOURCE,
                "Root leaf resized to {:?} altitude {}",
                root.cell.offset, root.cell.altitude
            );
        }

        self.root = Some(root);
        root
    }

    // ===== SPLIT =====

    /// Turn leaf `node` into a branch over four children.
    ///
    /// Members are classified by their real position and partitioned in
    /// place into four quadrant runs (one pass, swaps only). Each non-empty
    /// run is copied into a fresh right-sized slice. Empty quadrants stay
    /// `Empty`. The node keeps its cached bounds.
    fn split_leaf<S: InstanceSource<H>>(&mut self, source: &S, node: u32, cell: Cell, leaf: u32) {
        let Leaf { slice, count } = self.leaves[leaf as usize];
        let base = slice.start as usize;
        let count = count as usize;

        let mut run_len = [0usize; 4];
        self.split_quadrants.clear();
        for i in 0..count {
            let quadrant = cell.quadrant_of(source.instance_position(self.instances[base + i]));
            self.split_quadrants.push(quadrant);
            run_len[quadrant as usize] += 1;
        }

        let mut run_start = [0usize; 4];
        for q in 1..4 {
            run_start[q] = run_start[q - 1] + run_len[q - 1];
        }

        // 4-bucket in-place partition: every swap puts one member in its final run
        let mut next = run_start;
        for q in 0..4 {
            let run_end = run_start[q] + run_len[q];
            while next[q] < run_end {
                let i = next[q];
                let target = self.split_quadrants[i] as usize;
                if target == q {
                    next[q] += 1;
                } else {
                    let j = next[target];
                    self.swap_slots(base + i, base + j);
                    self.split_quadrants.swap(i, j);
                    next[target] += 1;
                }
            }
        }

        let first_child = self.nodes.allocate(4).start;
        for q in 0..4u8 {
            let run = run_len[q as usize] as u32;
            if run == 0 {
                continue;
            }

            let child_slice = self.allocate_slice(self.config.slice_len_for(run));
            self.copy_slots(base + run_start[q as usize], child_slice.start as usize, run as usize);

            let mut bounds = AABB::INVALID;
            for &member in self.instances.slice(SliceRange::new(child_slice.start, run)) {
                bounds = bounds.union(&source.instance_aabb(member));
            }

            let child_leaf = self.leaves.allocate(1).start;
            self.leaves[child_leaf as usize] = Leaf { slice: child_slice, count: run };
            self.nodes[(first_child + q as u32) as usize] = Node {
                kind: NodeKind::Leaf { leaf: child_leaf },
                bounds,
            };

            let child_cell = cell.child(q);
            if run > self.config.leaf_capacity && !self.can_split(child_cell) {
                self.warn_overflow(child_cell, run);
            }
        }

        self.instances.release(slice);
        self.leaves.release(SliceRange::new(leaf, 1));
        self.nodes[node as usize].kind = NodeKind::Branch { first_child };
        self.splits += 1;

        engine_trace!(
            LOG_SOURCE,
            "Split leaf at {:?} altitude {} ({} instances: {:?})",
            cell.offset, cell.altitude, count, run_len
        );
    }
}
