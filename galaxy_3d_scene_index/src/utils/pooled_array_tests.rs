use super::*;

// ============================================================================
// SliceRange
// ============================================================================

#[test]
fn test_slice_range_helpers() {
    let r = SliceRange::new(4, 3);
    assert_eq!(r.end(), 7);
    assert_eq!(r.as_range(), 4..7);
    assert!(!r.is_empty());
    assert!(SliceRange::EMPTY.is_empty());
}

// ============================================================================
// Allocation
// ============================================================================

#[test]
fn test_new_is_empty() {
    let pool = PooledArray::<u32>::new();
    assert!(pool.is_empty());
    assert_eq!(pool.len(), 0);
    assert_eq!(pool.allocated_len(), 0);
    assert_eq!(pool.live_blocks(), 0);
}

#[test]
fn test_sequential_allocate() {
    let mut pool = PooledArray::<u32>::new();
    assert_eq!(pool.allocate(4), SliceRange::new(0, 4));
    assert_eq!(pool.allocate(2), SliceRange::new(4, 2));
    assert_eq!(pool.len(), 6);
    assert_eq!(pool.allocated_len(), 6);
    assert_eq!(pool.live_blocks(), 2);
}

#[test]
fn test_allocate_zero_returns_empty() {
    let mut pool = PooledArray::<u32>::new();
    assert_eq!(pool.allocate(0), SliceRange::EMPTY);
    assert_eq!(pool.live_blocks(), 0);
    assert_eq!(pool.len(), 0);
}

#[test]
fn test_release_and_recycle_same_size() {
    let mut pool = PooledArray::<u32>::new();
    let a = pool.allocate(4);
    let _b = pool.allocate(4);
    pool.release(a);
    assert_eq!(pool.allocated_len(), 4);

    let c = pool.allocate(4);
    assert_eq!(c, a);
    assert_eq!(pool.len(), 8, "recycling must not grow the backing array");
}

#[test]
fn test_release_does_not_recycle_other_sizes() {
    let mut pool = PooledArray::<u32>::new();
    let a = pool.allocate(4);
    pool.release(a);

    let b = pool.allocate(2);
    assert_eq!(b.start, 4);
}

#[test]
fn test_recycled_block_is_reset_to_default() {
    let mut pool = PooledArray::<u32>::new();
    let a = pool.allocate(2);
    pool[0] = 7;
    pool[1] = 8;
    pool.release(a);

    let b = pool.allocate(2);
    assert_eq!(pool.slice(b), &[0, 0]);
}

#[test]
fn test_release_empty_is_noop() {
    let mut pool = PooledArray::<u32>::new();
    pool.allocate(1);
    pool.release(SliceRange::EMPTY);
    assert_eq!(pool.live_blocks(), 1);
}

// ============================================================================
// Reallocation
// ============================================================================

#[test]
fn test_reallocate_empty_allocates() {
    let mut pool = PooledArray::<u32>::new();
    let mut r = SliceRange::EMPTY;
    pool.reallocate(&mut r, 4);
    assert_eq!(r, SliceRange::new(0, 4));
    assert_eq!(pool.live_blocks(), 1);
}

#[test]
fn test_reallocate_tail_block_grows_in_place() {
    let mut pool = PooledArray::<u32>::new();
    let _a = pool.allocate(4);
    let mut b = pool.allocate(2);
    pool[4] = 11;
    pool[5] = 12;

    pool.reallocate(&mut b, 8);
    assert_eq!(b, SliceRange::new(4, 8));
    assert_eq!(&pool.slice(b)[..2], &[11, 12]);
    assert_eq!(pool.len(), 12);
    assert_eq!(pool.allocated_len(), 12);
}

#[test]
fn test_reallocate_inner_block_moves_and_preserves() {
    let mut pool = PooledArray::<u32>::new();
    let mut a = pool.allocate(2);
    let _b = pool.allocate(2);
    pool[0] = 1;
    pool[1] = 2;

    pool.reallocate(&mut a, 4);
    assert_eq!(a.start, 4);
    assert_eq!(&pool.slice(a)[..2], &[1, 2]);
    assert_eq!(pool.live_blocks(), 2);
    assert_eq!(pool.allocated_len(), 6);

    // The old block went back to the free list
    assert_eq!(pool.allocate(2).start, 0);
}

#[test]
fn test_reallocate_shrink_returns_tail() {
    let mut pool = PooledArray::<u32>::new();
    let mut a = pool.allocate(8);
    pool[0] = 5;

    pool.reallocate(&mut a, 4);
    assert_eq!(a, SliceRange::new(0, 4));
    assert_eq!(pool[0], 5);
    assert_eq!(pool.allocated_len(), 4);
    assert_eq!(pool.allocate(4).start, 4);
}

#[test]
fn test_reallocate_to_zero_releases() {
    let mut pool = PooledArray::<u32>::new();
    let mut a = pool.allocate(4);
    pool.reallocate(&mut a, 0);
    assert!(a.is_empty());
    assert_eq!(pool.live_blocks(), 0);
    assert_eq!(pool.allocated_len(), 0);
}

// ============================================================================
// Element access
// ============================================================================

#[test]
fn test_copy_within_and_swap() {
    let mut pool = PooledArray::<u32>::new();
    pool.allocate(4);
    pool.as_mut_slice().copy_from_slice(&[1, 2, 3, 4]);

    pool.copy_within(0..2, 1);
    assert_eq!(pool.as_slice(), &[1, 1, 2, 4]);

    pool.swap(0, 3);
    assert_eq!(pool.as_slice(), &[4, 1, 2, 1]);
    assert_eq!(pool.get(3), Some(&1));
    assert_eq!(pool.get(4), None);
}

#[test]
fn test_clear_resets_everything() {
    let mut pool = PooledArray::<u32>::new();
    let a = pool.allocate(4);
    pool.allocate(4);
    pool.release(a);

    pool.clear();
    assert!(pool.is_empty());
    assert_eq!(pool.live_blocks(), 0);
    assert_eq!(pool.allocated_len(), 0);
    assert_eq!(pool.allocate(4).start, 0);
}
