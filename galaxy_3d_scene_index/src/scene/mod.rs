//! Scene management module
//!
//! Provides the bounding-box type shared with the renderer, the scene-side
//! lookup trait the index consumes, and the dynamic quadtree scene index.

mod aabb;
mod instance_source;
mod quadtree;

pub use aabb::AABB;
pub use instance_source::InstanceSource;
pub use quadtree::{
    QuadtreeSceneIndex, QuadtreeConfig, QuadtreeStats,
    Cell, CellSides,
    Mutation, MoveOutcome, LeafInfo,
    FrustumCursor, VisibleLeaf,
    MetadataChannel, MetadataArray,
};
