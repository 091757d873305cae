//! Camera module - culling volumes.
//!
//! The scene index never stores a camera. Callers build a `Frustum` (or use
//! any other `CullingVolume`) each frame and hand it to the cursor.

mod frustum;

pub use frustum::{
    Frustum, FrustumTest, CullingVolume,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
