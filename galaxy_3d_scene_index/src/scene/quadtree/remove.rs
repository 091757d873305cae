/// Removal and relocation.

use glam::IVec2;
use crate::engine_trace;
use crate::scene::InstanceSource;
use super::node::NodeKind;
use super::{MoveOutcome, Mutation, QuadtreeSceneIndex, LOG_SOURCE};

impl<H: Copy + PartialEq + Default> QuadtreeSceneIndex<H> {
    /// Remove `instance`, previously added at `position`.
    ///
    /// Compacts the leaf slice by shifting later entries down one slot.
    /// Cached bounds are not shrunk and an emptied leaf stays allocated
    /// until a frustum cursor walks through it. Returns `None` when the
    /// instance is not stored at `position`.
    pub fn remove(&mut self, position: IVec2, instance: H) -> Option<Mutation> {
        let root = match self.root {
            Some(root) if root.cell.contains(position) => root,
            _ => {
                engine_trace!(LOG_SOURCE, "Remove at {:?}: outside the root cell", position);
                return None;
            }
        };

        let (node, _) = self.descend(root, position);
        let NodeKind::Leaf { leaf } = self.nodes[node as usize].kind else {
            engine_trace!(LOG_SOURCE, "Remove at {:?}: no leaf there", position);
            return None;
        };

        let mut entry = self.leaves[leaf as usize];
        let Some(local) = self.instances.slice(entry.live()).iter().position(|h| *h == instance) else {
            engine_trace!(LOG_SOURCE, "Remove at {:?}: instance not in leaf", position);
            return None;
        };

        let index = entry.slice.start as usize + local;
        let tail = entry.count as usize - local - 1;
        self.copy_slots(index + 1, index, tail);

        entry.count -= 1;
        self.instances[(entry.slice.start + entry.count) as usize] = H::default();
        self.leaves[leaf as usize] = entry;
        self.instance_count -= 1;

        Some(Mutation {
            old_offset: entry.slice.start,
            new_offset: entry.slice.start,
            new_count: entry.count,
            index: index as u32,
            split: false,
        })
    }

    /// Relocate `instance` from `old_position` to `new_position`.
    ///
    /// When the new position stays inside the cell of the leaf owning the
    /// old one, only the cached bounds are grown (the instance's current box
    /// is unioned along the path). Otherwise this is `remove` then `add`.
    pub fn move_instance<S: InstanceSource<H>>(
        &mut self,
        source: &S,
        old_position: IVec2,
        new_position: IVec2,
        instance: H,
    ) -> MoveOutcome {
        if let Some(root) = self.root.filter(|root| root.cell.contains(old_position)) {
            let (node, cell) = self.descend(root, old_position);
            if matches!(self.nodes[node as usize].kind, NodeKind::Leaf { .. }) && cell.contains(new_position) {
                let aabb = source.instance_aabb(instance);
                self.propagate_bounds(&aabb);
                return MoveOutcome::InPlace;
            }
        }

        let removed = self.remove(old_position, instance);
        let added = self.add(source, new_position, instance);
        MoveOutcome::Relocated { removed, added }
    }
}
