/*!
# Galaxy 3D Scene Index

Dynamic spatial indexing for the Galaxy 3D rendering engine.

The core type is `QuadtreeSceneIndex`, a loose quadtree over the ground
plane maintained incrementally under churn (add / move / remove) and
enumerated each frame through a culling cursor. Instance handles are opaque
to the index; geometry comes from the scene through `InstanceSource`.

## Architecture

- **QuadtreeSceneIndex**: cell-addressed tree with lazy root growth, O(n)
  leaf splits, and never-shrinking cached bounds
- **FrustumCursor**: pull-style culling traversal with containment
  inheritance and lazy reclamation of empty leaves
- **MetadataChannel**: caller-typed side array kept index-aligned with the
  instance storage through every relocation
- **PooledArray**: block arena backing nodes, leaves, and instances
- **Frustum / CullingVolume**: the visibility tests the cursor consumes
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod scene;
pub mod utils;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Scene index
    pub use crate::scene::{QuadtreeSceneIndex, QuadtreeConfig, InstanceSource, AABB};

    // Logging sub-module (types only; the engine_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Utilities sub-module
    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
