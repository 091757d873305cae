/// InstanceSource - the scene-side lookups the quadtree needs.
///
/// The index stores only opaque handles. Whenever it needs geometry (a box to
/// grow cached bounds, a position to classify a member during a split) it
/// asks the scene that owns the instances.

use glam::IVec2;
use super::aabb::AABB;

/// Scene store queried by `QuadtreeSceneIndex`.
///
/// # Example
///
/// ```ignore
/// impl InstanceSource<RenderInstanceKey> for Scene {
///     fn instance_aabb(&self, key: RenderInstanceKey) -> AABB {
///         self.render_instance(key).map(|ri| *ri.world_aabb()).unwrap_or(AABB::INVALID)
///     }
///     fn instance_position(&self, key: RenderInstanceKey) -> IVec2 {
///         self.grid_position(key)
///     }
/// }
/// ```
pub trait InstanceSource<H> {
    /// Current world-space box of `instance`
    fn instance_aabb(&self, instance: H) -> AABB;

    /// Current integer position of `instance`, the same value the caller
    /// last passed to `add` or `move_instance`
    fn instance_position(&self, instance: H) -> IVec2;
}
