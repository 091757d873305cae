//! QuadtreeSceneIndex - loose, incrementally maintained 2D spatial index.
//!
//! Instances are keyed by an integer position on the ground plane and stored
//! as opaque handles in leaf-owned slices of one shared instance array.
//! The tree is never rebuilt:
//! - the root is created on the first add and grows to fit every new point
//! - a leaf at capacity splits into four children in O(n)
//! - removals compact the leaf slice and leave cached bounds untouched
//! - empty leaves are reclaimed lazily by the frustum cursor
//!
//! Every structural operation returns a `Mutation` describing how the touched
//! leaf's slice moved, so a caller can mirror the instance array (e.g. a GPU
//! instance buffer) without a full rebuild.
//!
//! Single-threaded by construction: mutate during update, enumerate during
//! render. Indices returned by one operation are valid until the next
//! mutating call.

mod bounds;
mod cell;
mod config;
mod cursor;
mod insert;
mod metadata;
mod node;
mod remove;

#[cfg(test)]
pub(crate) mod mock_scene;

use std::any::type_name;
use glam::IVec2;
use smallvec::SmallVec;
use crate::{engine_debug, engine_warn};
use crate::error::{Error, Result};
use crate::utils::{PooledArray, SliceRange};
use crate::camera::CullingVolume;
use super::aabb::AABB;
use node::{Leaf, Node, NodeKind};

pub use cell::{Cell, CellSides};
pub use config::QuadtreeConfig;
pub use cursor::{FrustumCursor, VisibleLeaf};
pub use metadata::{MetadataChannel, MetadataArray};

const LOG_SOURCE: &str = "galaxy3d::QuadtreeSceneIndex";

/// How an operation changed the touched leaf's slice.
///
/// Offsets and `index` are absolute positions in the instance array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    /// Slice start before the operation (equals `new_offset` for a new leaf)
    pub old_offset: u32,
    /// Slice start after the operation
    pub new_offset: u32,
    /// Live instances in the leaf after the operation
    pub new_count: u32,
    /// Slot written by an add, or vacated by a remove
    pub index: u32,
    /// The add split one or more leaves, relocating entries of other leaves
    pub split: bool,
}

/// Result of `move_instance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// New position stays in the same leaf: only bounds were grown
    InPlace,
    /// Removed then re-added. `removed` is `None` when the instance was not
    /// found at the old position.
    Relocated {
        removed: Option<Mutation>,
        added: Mutation,
    },
}

impl MoveOutcome {
    /// Whether a structural relocation occurred
    #[inline]
    pub fn is_relocated(&self) -> bool {
        matches!(self, MoveOutcome::Relocated { .. })
    }
}

/// Index statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadtreeStats {
    /// Live instances
    pub instance_count: usize,
    /// Allocated leaves, including empty ones not reclaimed yet
    pub leaf_count: u32,
    /// Allocated nodes
    pub node_count: u32,
    /// Leaf splits since creation
    pub splits: u64,
    /// Root doublings since creation
    pub root_wraps: u64,
    /// Empty leaves reclaimed by frustum cursors
    pub reclaimed_leaves: u64,
}

/// Debug snapshot of one leaf (see `all_leaves`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafInfo {
    pub cell: Cell,
    pub slice: SliceRange,
    pub count: u32,
    pub bounds: AABB,
}

/// Root node id and the cell it covers
#[derive(Debug, Clone, Copy)]
struct Root {
    node: u32,
    cell: Cell,
}

/// Dynamic quadtree over opaque instance handles.
///
/// `H` is the caller's handle type (a slotmap key, an entity id...).
/// `Default` fills slots that hold no instance.
pub struct QuadtreeSceneIndex<H: Copy + PartialEq + Default> {
    config: QuadtreeConfig,
    root: Option<Root>,
    nodes: PooledArray<Node>,
    leaves: PooledArray<Leaf>,
    instances: PooledArray<H>,
    metadata: Option<Box<dyn MetadataChannel>>,
    /// Node ids from the root to the last visited node
    path: SmallVec<[u32; 32]>,
    /// Per-member quadrant of the leaf being split
    split_quadrants: Vec<u8>,
    instance_count: usize,
    splits: u64,
    root_wraps: u64,
    reclaimed_leaves: u64,
}

impl<H: Copy + PartialEq + Default> QuadtreeSceneIndex<H> {
    /// Create an empty index with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(QuadtreeConfig::default())
    }

    /// Create an empty index with a custom configuration
    pub fn with_config(config: QuadtreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: QuadtreeConfig) -> Self {
        Self {
            config,
            root: None,
            nodes: PooledArray::new(),
            leaves: PooledArray::new(),
            instances: PooledArray::new(),
            metadata: None,
            path: SmallVec::new(),
            split_quadrants: Vec::new(),
            instance_count: 0,
            splits: 0,
            root_wraps: 0,
            reclaimed_leaves: 0,
        }
    }

    // ===== QUERIES =====

    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.instance_count
    }

    pub fn is_empty(&self) -> bool {
        self.instance_count == 0
    }

    /// Cell covered by the root, `None` before the first add
    pub fn root_cell(&self) -> Option<Cell> {
        self.root.map(|root| root.cell)
    }

    /// Cached bounds of the whole tree (`AABB::INVALID` when empty)
    pub fn bounds(&self) -> AABB {
        self.root
            .map(|root| self.nodes[root.node as usize].bounds)
            .unwrap_or(AABB::INVALID)
    }

    pub fn stats(&self) -> QuadtreeStats {
        QuadtreeStats {
            instance_count: self.instance_count,
            leaf_count: self.leaves.live_blocks(),
            node_count: self.nodes.allocated_len(),
            splits: self.splits,
            root_wraps: self.root_wraps,
            reclaimed_leaves: self.reclaimed_leaves,
        }
    }

    /// Raw read of one instance slot, paired with the ranges a cursor yields
    pub fn instance(&self, index: usize) -> Option<H> {
        self.instances.get(index).copied()
    }

    /// Whole instance array, including unused slots
    pub fn instances(&self) -> &[H] {
        self.instances.as_slice()
    }

    /// Collect a snapshot of every allocated leaf, depth first
    pub fn all_leaves(&self, out: &mut Vec<LeafInfo>) {
        let Some(root) = self.root else {
            return;
        };

        let mut stack: SmallVec<[(u32, Cell); 32]> = SmallVec::new();
        stack.push((root.node, root.cell));

        while let Some((node_id, cell)) = stack.pop() {
            let node = self.nodes[node_id as usize];
            match node.kind {
                NodeKind::Empty => {}
                NodeKind::Leaf { leaf } => {
                    let entry = self.leaves[leaf as usize];
                    out.push(LeafInfo {
                        cell,
                        slice: entry.slice,
                        count: entry.count,
                        bounds: node.bounds,
                    });
                }
                NodeKind::Branch { first_child } => {
                    for q in (0..4u8).rev() {
                        stack.push((first_child + q as u32, cell.child(q)));
                    }
                }
            }
        }
    }

    // ===== CULLING =====

    /// Start a frustum enumeration.
    ///
    /// The cursor borrows the index mutably: it reclaims empty leaves it
    /// walks through.
    pub fn frustum_cursor<'a, V: CullingVolume + ?Sized>(
        &'a mut self,
        volume: &'a V,
    ) -> FrustumCursor<'a, H, V> {
        FrustumCursor::new(self, volume)
    }

    /// Collect every instance of every leaf visible to `volume`
    pub fn query_frustum<V: CullingVolume + ?Sized>(&mut self, volume: &V, results: &mut Vec<H>) {
        let mut cursor = self.frustum_cursor(volume);
        while let Some(leaf) = cursor.next_leaf() {
            results.extend_from_slice(leaf.instances);
        }
    }

    // ===== METADATA =====

    /// Register the per-instance metadata type, replacing any previous one.
    ///
    /// The new array is sized to the instance array and default-filled.
    pub fn set_metadata_type<T: Clone + Default + 'static>(&mut self) {
        let mut channel = MetadataArray::<T>::new();
        channel.grow(self.instances.len());

        match self.metadata.replace(Box::new(channel)) {
            Some(previous) if previous.type_name() != type_name::<T>() => {
                engine_warn!(LOG_SOURCE, "Metadata type {} replaced by {}", previous.type_name(), type_name::<T>());
            }
            _ => {
                engine_debug!(LOG_SOURCE, "Metadata type {} registered", type_name::<T>());
            }
        }
    }

    /// Metadata array, index-aligned with `instances()`
    pub fn metadata<T: 'static>(&self) -> Result<&[T]> {
        let channel = self.metadata.as_deref().ok_or(Error::MetadataNotRegistered)?;
        channel
            .as_any()
            .downcast_ref::<MetadataArray<T>>()
            .map(|array| array.values())
            .ok_or_else(|| Error::MetadataTypeMismatch {
                requested: type_name::<T>(),
                registered: channel.type_name(),
            })
    }

    /// Mutable metadata array, index-aligned with `instances()`
    pub fn metadata_mut<T: 'static>(&mut self) -> Result<&mut [T]> {
        let channel = self.metadata.as_deref_mut().ok_or(Error::MetadataNotRegistered)?;
        let registered = channel.type_name();
        channel
            .as_any_mut()
            .downcast_mut::<MetadataArray<T>>()
            .map(|array| array.values_mut())
            .ok_or(Error::MetadataTypeMismatch {
                requested: type_name::<T>(),
                registered,
            })
    }

    // ===== RESET =====

    /// Drop every node, leaf, and instance.
    ///
    /// Keeps the configuration, the registered metadata type, and the
    /// cumulative counters.
    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
        self.leaves.clear();
        self.instances.clear();
        if let Some(channel) = self.metadata.as_mut() {
            channel.clear();
        }
        self.instance_count = 0;
        engine_debug!(LOG_SOURCE, "Cleared");
    }

    // ===== INSTANCE STORAGE (shared by insert / remove / cursor) =====

    /// Allocate an instance slice, keeping the metadata array in step
    fn allocate_slice(&mut self, len: u32) -> SliceRange {
        let slice = self.instances.allocate(len);
        if let Some(channel) = self.metadata.as_mut() {
            channel.grow(self.instances.len());
        }
        slice
    }

    /// Resize an instance slice holding `live` entries, moving metadata with it
    fn resize_slice(&mut self, slice: &mut SliceRange, new_len: u32, live: u32) {
        let old = *slice;
        self.instances.reallocate(slice, new_len);

        if let Some(channel) = self.metadata.as_mut() {
            channel.grow(self.instances.len());
            if old.start != slice.start && live > 0 {
                channel.copy_range(old.start as usize, slice.start as usize, live as usize);
            }
        }
    }

    /// Swap two instance slots and their metadata
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.instances.swap(a, b);
        if let Some(channel) = self.metadata.as_mut() {
            channel.stage(a);
            channel.copy_range(b, a, 1);
            channel.restore(b);
        }
    }

    /// Copy `len` instance slots from `src` to `dst`, and their metadata
    fn copy_slots(&mut self, src: usize, dst: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.instances.copy_within(src..src + len, dst);
        if let Some(channel) = self.metadata.as_mut() {
            channel.copy_range(src, dst, len);
        }
    }

    /// Walk from `node` (covering `cell`) down to the first non-branch node
    /// containing `position`, appending every visited node to `path`.
    fn descend_from(&mut self, mut node: u32, mut cell: Cell, position: IVec2) -> (u32, Cell) {
        loop {
            self.path.push(node);
            match self.nodes[node as usize].kind {
                NodeKind::Branch { first_child } => {
                    let quadrant = cell.quadrant_of(position);
                    node = first_child + quadrant as u32;
                    cell = cell.child(quadrant);
                }
                NodeKind::Empty | NodeKind::Leaf { .. } => return (node, cell),
            }
        }
    }

    /// Descend from the root, resetting `path`
    fn descend(&mut self, root: Root, position: IVec2) -> (u32, Cell) {
        self.path.clear();
        self.descend_from(root.node, root.cell, position)
    }
}

impl<H: Copy + PartialEq + Default> Default for QuadtreeSceneIndex<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "quadtree_tests.rs"]
mod tests;
