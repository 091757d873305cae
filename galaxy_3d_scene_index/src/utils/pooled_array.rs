/// Dense arena of `T` handed out as contiguous blocks.
///
/// Backs the scene index's node, leaf, and instance storage. Blocks are
/// addressed by `SliceRange` (start + length) rather than by pointer, so the
/// backing `Vec` can grow freely. Released blocks go to an exact-size free
/// list and are recycled by the next allocation of the same length.
///
/// # Example
///
/// ```ignore
/// let mut pool = PooledArray::<u32>::new();
/// let a = pool.allocate(4);      // [0, 4)
/// let b = pool.allocate(4);      // [4, 8)
/// pool.release(a);               // [0, 4) is now free
/// let c = pool.allocate(4);      // [0, 4) (recycled)
/// ```

use std::ops::{Index, IndexMut, Range};
use rustc_hash::FxHashMap;

/// A block of a `PooledArray`: `len` elements starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SliceRange {
    pub start: u32,
    pub len: u32,
}

impl SliceRange {
    /// Zero-length block. Never stored in a free list.
    pub const EMPTY: SliceRange = SliceRange { start: 0, len: 0 };

    pub fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    /// One past the last element
    #[inline]
    pub fn end(&self) -> u32 {
        self.start + self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }
}

pub struct PooledArray<T: Copy + Default> {
    items: Vec<T>,
    /// Free block starts, keyed by block length
    free_blocks: FxHashMap<u32, Vec<u32>>,
    /// Elements currently handed out
    allocated: u32,
    /// Blocks currently handed out
    live_blocks: u32,
}

impl<T: Copy + Default> PooledArray<T> {
    /// Create a new empty pool
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            free_blocks: FxHashMap::default(),
            allocated: 0,
            live_blocks: 0,
        }
    }

    /// Allocate a block of `len` default-initialized elements.
    ///
    /// Reuses a released block of exactly `len` elements when one exists,
    /// otherwise appends to the backing array.
    pub fn allocate(&mut self, len: u32) -> SliceRange {
        if len == 0 {
            return SliceRange::EMPTY;
        }

        let recycled = self.free_blocks.get_mut(&len).and_then(Vec::pop);
        let range = match recycled {
            Some(start) => {
                let range = SliceRange::new(start, len);
                self.items[range.as_range()].fill(T::default());
                range
            }
            None => {
                let start = self.items.len() as u32;
                self.items.resize((start + len) as usize, T::default());
                SliceRange::new(start, len)
            }
        };

        self.allocated += len;
        self.live_blocks += 1;
        range
    }

    /// Return a block to the pool. Releasing `SliceRange::EMPTY` is a no-op.
    pub fn release(&mut self, range: SliceRange) {
        if range.is_empty() {
            return;
        }
        debug_assert!(
            range.end() as usize <= self.items.len(),
            "releasing a block outside the pool: {:?}", range
        );

        self.push_free(range);
        self.live_blocks -= 1;
    }

    /// Resize a block, preserving its first `min(old, new)` elements.
    ///
    /// Shrinking and growing the block that ends the array happen in place;
    /// any other growth moves the block, so callers must re-read `range.start`.
    pub fn reallocate(&mut self, range: &mut SliceRange, new_len: u32) {
        if range.is_empty() {
            *range = self.allocate(new_len);
            return;
        }
        if new_len == range.len {
            return;
        }
        if new_len == 0 {
            self.release(*range);
            *range = SliceRange::EMPTY;
            return;
        }

        if new_len < range.len {
            self.push_free(SliceRange::new(range.start + new_len, range.len - new_len));
            range.len = new_len;
            return;
        }

        if range.end() as usize == self.items.len() {
            self.items.resize((range.start + new_len) as usize, T::default());
            self.allocated += new_len - range.len;
            range.len = new_len;
            return;
        }

        let moved = self.allocate(new_len);
        self.items.copy_within(range.as_range(), moved.start as usize);
        self.release(*range);
        *range = moved;
    }

    /// Copy `src` elements to `dest` (overlap-safe)
    #[inline]
    pub fn copy_within(&mut self, src: Range<usize>, dest: usize) {
        self.items.copy_within(src, dest);
    }

    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
    }

    #[inline]
    pub fn slice(&self, range: SliceRange) -> &[T] {
        &self.items[range.as_range()]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Whole backing array, including free blocks
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Length of the backing array (high-water mark)
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements currently handed out
    pub fn allocated_len(&self) -> u32 {
        self.allocated
    }

    /// Blocks currently handed out
    pub fn live_blocks(&self) -> u32 {
        self.live_blocks
    }

    /// Drop every block and the backing storage
    pub fn clear(&mut self) {
        self.items.clear();
        self.free_blocks.clear();
        self.allocated = 0;
        self.live_blocks = 0;
    }

    fn push_free(&mut self, range: SliceRange) {
        self.free_blocks.entry(range.len).or_default().push(range.start);
        self.allocated -= range.len;
    }
}

impl<T: Copy + Default> Default for PooledArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> Index<usize> for PooledArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T: Copy + Default> IndexMut<usize> for PooledArray<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "pooled_array_tests.rs"]
mod tests;
