use std::cell::Cell as CallCount;
use glam::{IVec2, Mat4, Vec3};
use crate::camera::{CullingVolume, Frustum, FrustumTest};
use crate::scene::AABB;
use super::super::{QuadtreeConfig, QuadtreeSceneIndex};
use super::super::mock_scene::{MockInstanceKey, MockScene};

type Index = QuadtreeSceneIndex<MockInstanceKey>;

/// Culling volume that counts how many boxes it was asked about
struct CountingVolume {
    inner: AABB,
    calls: CallCount<usize>,
}

impl CountingVolume {
    fn new(inner: AABB) -> Self {
        Self { inner, calls: CallCount::new(0) }
    }
}

impl CullingVolume for CountingVolume {
    fn visibility(&self, aabb: &AABB) -> FrustumTest {
        self.calls.set(self.calls.get() + 1);
        self.inner.visibility(aabb)
    }
}

/// One instance per leaf, so leaf culling is exact
fn single_instance_leaves(points: &[IVec2]) -> (MockScene, Index, Vec<MockInstanceKey>) {
    let mut scene = MockScene::new();
    let mut index = Index::with_config(QuadtreeConfig { leaf_capacity: 1, ..Default::default() }).unwrap();
    let keys = points
        .iter()
        .map(|&p| {
            let key = scene.spawn(p);
            index.add(&scene, p, key);
            key
        })
        .collect();
    (scene, index, keys)
}

fn everything() -> AABB {
    AABB::new(Vec3::splat(-1.0e6), Vec3::splat(1.0e6))
}

// ============================================================================
// Basic protocol
// ============================================================================

#[test]
fn test_cursor_on_empty_index() {
    let mut index = Index::new();
    let volume = everything();
    let mut cursor = index.frustum_cursor(&volume);
    assert!(cursor.current().is_none());
    assert!(!cursor.move_next());
    assert!(cursor.next_leaf().is_none());
}

#[test]
fn test_current_matches_instance_array() {
    let (_scene, mut index, keys) = single_instance_leaves(&[IVec2::new(0, 0), IVec2::new(10, 10)]);
    let volume = everything();
    let mut cursor = index.frustum_cursor(&volume);

    let mut seen = Vec::new();
    while cursor.move_next() {
        let leaf = cursor.current().unwrap();
        assert_eq!(leaf.instances.len(), leaf.range.len());
        for (slot, &key) in leaf.range.clone().zip(leaf.instances) {
            assert_eq!(cursor.instance(slot), Some(key));
            seen.push(key);
        }
        assert!(leaf.bounds.is_valid());
    }
    assert!(cursor.current().is_none(), "no current leaf once exhausted");

    seen.sort();
    let mut expected = keys;
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn test_cursor_exposes_metadata() {
    let mut scene = MockScene::new();
    let mut index = Index::new();
    index.set_metadata_type::<u16>();
    let key = scene.spawn(IVec2::new(4, 4));
    let mutation = index.add(&scene, IVec2::new(4, 4), key);
    index.metadata_mut::<u16>().unwrap()[mutation.index as usize] = 321;

    let volume = everything();
    let mut cursor = index.frustum_cursor(&volume);
    assert!(cursor.move_next());
    let leaf = cursor.current().unwrap();
    assert_eq!(cursor.metadata::<u16>().unwrap()[leaf.range.start], 321);
    assert!(cursor.metadata::<u8>().is_err());
}

// ============================================================================
// Culling
// ============================================================================

#[test]
fn test_region_culls_outside_leaves() {
    let points = [
        IVec2::new(0, 0),
        IVec2::new(3, 5),
        IVec2::new(40, 40),
        IVec2::new(-30, 12),
        IVec2::new(6, 1),
    ];
    let (_scene, mut index, keys) = single_instance_leaves(&points);

    let region = MockScene::region(IVec2::new(0, 0), IVec2::new(8, 8));
    let mut visible = Vec::new();
    index.query_frustum(&region, &mut visible);
    visible.sort();

    let mut expected = vec![keys[0], keys[1], keys[4]];
    expected.sort();
    assert_eq!(visible, expected);
}

#[test]
fn test_camera_frustum_culling() {
    // Orthographic camera above the origin looking down -Y: view x = -world x,
    // view y = world z, so it sees the ground square [-10, 10] x [-10, 10]
    let projection = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 200.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO, Vec3::Z);
    let frustum = Frustum::from_view_projection(&(projection * view));

    let inside = [IVec2::new(0, 0), IVec2::new(-5, 5), IVec2::new(3, -7)];
    let outside = [IVec2::new(50, 50), IVec2::new(-30, 0), IVec2::new(0, 25)];
    let all: Vec<IVec2> = inside.iter().chain(outside.iter()).copied().collect();
    let (_scene, mut index, keys) = single_instance_leaves(&all);

    let mut visible = Vec::new();
    index.query_frustum(&frustum, &mut visible);
    visible.sort();

    let mut expected = keys[..inside.len()].to_vec();
    expected.sort();
    assert_eq!(visible, expected);
}

#[test]
fn test_fully_contained_flag() {
    let (_scene, mut index, _keys) = single_instance_leaves(&[IVec2::new(0, 0), IVec2::new(10, 10)]);

    let volume = everything();
    {
        let mut cursor = index.frustum_cursor(&volume);
        while let Some(leaf) = cursor.next_leaf() {
            assert!(leaf.fully_contained);
        }
    }

    // Cuts through the (10, 10) box only
    let partial = AABB::new(Vec3::splat(-1.0), Vec3::new(10.5, 2.0, 10.5));
    let mut flags = Vec::new();
    {
        let mut cursor = index.frustum_cursor(&partial);
        while let Some(leaf) = cursor.next_leaf() {
            flags.push(leaf.fully_contained);
        }
    }
    flags.sort();
    assert_eq!(flags, vec![false, true]);
}

#[test]
fn test_containment_inheritance_skips_tests() {
    let points: Vec<IVec2> = (0..16).map(|i| IVec2::new(i * 3, (i * 7) % 20)).collect();
    let (_scene, mut index, keys) = single_instance_leaves(&points);

    // Everything inside: only the root is tested
    let volume = CountingVolume::new(everything());
    let mut visible = Vec::new();
    index.query_frustum(&volume, &mut visible);
    assert_eq!(visible.len(), keys.len());
    assert_eq!(volume.calls.get(), 1);

    // Nothing inside: only the root is tested
    let far = CountingVolume::new(AABB::new(Vec3::splat(5000.0), Vec3::splat(6000.0)));
    visible.clear();
    index.query_frustum(&far, &mut visible);
    assert!(visible.is_empty());
    assert_eq!(far.calls.get(), 1);
}

#[test]
fn test_stale_bounds_after_remove_stay_conservative() {
    let (_scene, mut index, keys) = single_instance_leaves(&[IVec2::new(0, 0), IVec2::new(10, 10)]);
    index.remove(IVec2::new(10, 10), keys[1]).unwrap();

    // Root bounds still cover the removed instance
    assert!(index.bounds().contains(&MockScene::box_at(IVec2::new(10, 10))));

    let near_removed = MockScene::region(IVec2::new(9, 9), IVec2::new(12, 12));
    let mut visible = Vec::new();
    index.query_frustum(&near_removed, &mut visible);
    assert!(visible.is_empty());
    assert_eq!(index.stats().reclaimed_leaves, 1);
}
