/// Frustum - six clipping planes for visibility culling.
///
/// Each plane is a Vec4 (A, B, C, D): (A, B, C) is the inward-pointing unit
/// normal and a point P is on the visible side when A·x + B·y + C·z + D >= 0.
///
/// The scene index never does plane math itself. It asks a `CullingVolume`
/// for a 3-way answer per cached node box and uses `Inside` to skip every
/// test below that node.

use glam::{Mat4, Vec3, Vec4};
use crate::scene::AABB;

/// Result of a 3-way volume/AABB classification.
///
/// - `Outside` → skip the entire subtree
/// - `Inside` → everything below is visible, no further tests
/// - `Partial` → keep testing children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the volume
    Outside,
    /// AABB is entirely inside the volume
    Inside,
    /// AABB partially overlaps the volume
    Partial,
}

impl FrustumTest {
    /// Visible at all (Inside or Partial)
    #[inline]
    pub fn is_visible(self) -> bool {
        self != FrustumTest::Outside
    }

    /// Fully contained (Inside)
    #[inline]
    pub fn is_fully_contained(self) -> bool {
        self == FrustumTest::Inside
    }
}

/// Anything the scene index can cull against.
///
/// Implemented for `Frustum` (camera culling) and for `AABB` (box region
/// queries, e.g. a shadow cascade's bounds or an editor selection box).
pub trait CullingVolume {
    /// Classify a world-space box against this volume.
    fn visibility(&self, aabb: &AABB) -> FrustumTest;
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes for culling.
///
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Build from explicit planes, normalizing each so (A, B, C) is unit length.
    pub fn from_planes(mut planes: [Vec4; 6]) -> Self {
        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix (Gribb & Hartmann).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        Self::from_planes([
            row3 + row0, // left
            row3 - row0, // right
            row3 + row1, // bottom
            row3 - row1, // top
            row3 + row2, // near
            row3 - row2, // far
        ])
    }

    /// Corner of `aabb` furthest along `normal` (positive vertex).
    #[inline]
    fn positive_vertex(normal: Vec3, aabb: &AABB) -> Vec3 {
        Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min)
    }

    /// Corner of `aabb` furthest against `normal` (negative vertex).
    #[inline]
    fn negative_vertex(normal: Vec3, aabb: &AABB) -> Vec3 {
        Vec3::select(normal.cmpge(Vec3::ZERO), aabb.min, aabb.max)
    }

    /// Test if an AABB (potentially) intersects this frustum.
    ///
    /// Conservative: may return false positives, never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            normal.dot(Self::positive_vertex(normal, aabb)) + plane.w >= 0.0
        })
    }

    /// Classify an AABB against the frustum (3-way test).
    ///
    /// The p-vertex outside any plane means `Outside`; the n-vertex outside
    /// any plane means the box straddles it, so at best `Partial`.
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();

            if normal.dot(Self::positive_vertex(normal, aabb)) + plane.w < 0.0 {
                return FrustumTest::Outside;
            }
            if normal.dot(Self::negative_vertex(normal, aabb)) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }
}

impl CullingVolume for Frustum {
    #[inline]
    fn visibility(&self, aabb: &AABB) -> FrustumTest {
        self.classify_aabb(aabb)
    }
}

impl CullingVolume for AABB {
    fn visibility(&self, aabb: &AABB) -> FrustumTest {
        if self.contains(aabb) {
            FrustumTest::Inside
        } else if self.intersects(aabb) {
            FrustumTest::Partial
        } else {
            FrustumTest::Outside
        }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
