//! Utility types shared across the engine

mod pooled_array;

pub use pooled_array::{PooledArray, SliceRange};
