/// Metadata channel - one caller-defined value per instance slot.
///
/// The index relocates instances on growth, split, and remove compaction.
/// It does not know the caller's type, so it drives the side array through
/// the type-erased primitives of `MetadataChannel`, keeping
/// `metadata[i]` paired with `instances[i]` for every live slot.

use std::any::{type_name, Any};

/// Type-erased side array driven by the index.
pub trait MetadataChannel: Any {
    /// Make sure at least `capacity` slots exist
    fn grow(&mut self, capacity: usize);

    /// Copy `len` slots from `src` to `dst` (ranges may overlap)
    fn copy_range(&mut self, src: usize, dst: usize, len: usize);

    /// Save slot `index` aside (one value at a time)
    fn stage(&mut self, index: usize);

    /// Write the staged value into slot `index`
    fn restore(&mut self, index: usize);

    /// Drop every slot
    fn clear(&mut self);

    /// Name of the stored value type
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// `Vec`-backed metadata channel
pub struct MetadataArray<T> {
    values: Vec<T>,
    staged: Option<T>,
}

impl<T> MetadataArray<T> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            staged: None,
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }
}

impl<T> Default for MetadataArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Default + 'static> MetadataChannel for MetadataArray<T> {
    fn grow(&mut self, capacity: usize) {
        if capacity > self.values.len() {
            self.values.resize(capacity, T::default());
        }
    }

    fn copy_range(&mut self, src: usize, dst: usize, len: usize) {
        if src == dst || len == 0 {
            return;
        }
        if src < dst {
            // Back to front so an overlapping source is read before it is overwritten
            for i in (0..len).rev() {
                self.values[dst + i] = self.values[src + i].clone();
            }
        } else {
            for i in 0..len {
                self.values[dst + i] = self.values[src + i].clone();
            }
        }
    }

    fn stage(&mut self, index: usize) {
        self.staged = Some(self.values[index].clone());
    }

    fn restore(&mut self, index: usize) {
        if let Some(value) = self.staged.take() {
            self.values[index] = value;
        }
    }

    fn clear(&mut self) {
        self.values.clear();
        self.staged = None;
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
