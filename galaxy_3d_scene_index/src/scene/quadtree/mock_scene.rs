//! Mock scene for quadtree tests.
//!
//! Stores one integer position per instance and derives a unit box from it:
//! `(x, 0, y)..(x + 1, 1, y + 1)`, the ground plane mapped to XZ.

use glam::{IVec2, Vec3};
use slotmap::{new_key_type, SlotMap};
use crate::scene::{AABB, InstanceSource};

new_key_type! {
    /// Test instance handle
    pub(crate) struct MockInstanceKey;
}

pub(crate) struct MockScene {
    positions: SlotMap<MockInstanceKey, IVec2>,
}

impl MockScene {
    pub(crate) fn new() -> Self {
        Self { positions: SlotMap::with_key() }
    }

    pub(crate) fn spawn(&mut self, position: IVec2) -> MockInstanceKey {
        self.positions.insert(position)
    }

    pub(crate) fn set_position(&mut self, key: MockInstanceKey, position: IVec2) {
        if let Some(p) = self.positions.get_mut(key) {
            *p = position;
        }
    }

    pub(crate) fn position(&self, key: MockInstanceKey) -> IVec2 {
        self.positions[key]
    }

    pub(crate) fn despawn(&mut self, key: MockInstanceKey) {
        self.positions.remove(key);
    }

    pub(crate) fn keys(&self) -> Vec<MockInstanceKey> {
        self.positions.keys().collect()
    }

    /// Box of an instance at `position`
    pub(crate) fn box_at(position: IVec2) -> AABB {
        let min = Vec3::new(position.x as f32, 0.0, position.y as f32);
        AABB::new(min, min + Vec3::ONE)
    }

    /// Region covering `[min, max)` on the ground plane, as a culling volume
    pub(crate) fn region(min: IVec2, max: IVec2) -> AABB {
        AABB::new(
            Vec3::new(min.x as f32, -1.0, min.y as f32),
            Vec3::new(max.x as f32, 2.0, max.y as f32),
        )
    }
}

impl InstanceSource<MockInstanceKey> for MockScene {
    fn instance_aabb(&self, instance: MockInstanceKey) -> AABB {
        self.positions
            .get(instance)
            .map(|&p| Self::box_at(p))
            .unwrap_or(AABB::INVALID)
    }

    fn instance_position(&self, instance: MockInstanceKey) -> IVec2 {
        self.positions.get(instance).copied().unwrap_or_default()
    }
}
