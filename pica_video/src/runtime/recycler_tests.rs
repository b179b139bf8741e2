//! Unit tests for recycler.rs
//!
//! Tests the multimap pooling contract: exact-tag matching, claim removes
//! from the pool, and multiple allocations under one tag.

use crate::runtime::{HostTextureTag, TextureRecycler};
use crate::surface::{PixelFormat, TextureType};

fn tag(native_format: u32, width: u32, height: u32) -> HostTextureTag<u32> {
    HostTextureTag {
        native_format,
        pixel_format: PixelFormat::RGBA8,
        texture_type: TextureType::Texture2D,
        width,
        height,
        levels: 1,
    }
}

#[test]
fn test_acquire_from_empty_pool() {
    let mut recycler: TextureRecycler<u32, u64> = TextureRecycler::new();
    assert!(recycler.acquire(&tag(1, 256, 256)).is_none());
    assert_eq!(recycler.pooled(), 0);
}

#[test]
fn test_recycle_then_acquire_returns_same_allocation() {
    let mut recycler: TextureRecycler<u32, u64> = TextureRecycler::new();
    recycler.recycle(tag(1, 256, 256), 0xDEAD);
    assert_eq!(recycler.pooled(), 1);

    let alloc = recycler.acquire(&tag(1, 256, 256));
    assert_eq!(alloc, Some(0xDEAD));

    // Claim removed the entry; a second acquire misses
    assert_eq!(recycler.pooled(), 0);
    assert!(recycler.acquire(&tag(1, 256, 256)).is_none());
}

#[test]
fn test_acquire_requires_exact_tag_match() {
    let mut recycler: TextureRecycler<u32, u64> = TextureRecycler::new();
    recycler.recycle(tag(1, 256, 256), 1);

    // Different dimensions miss
    assert!(recycler.acquire(&tag(1, 128, 128)).is_none());
    // Different native format misses
    assert!(recycler.acquire(&tag(2, 256, 256)).is_none());
    // Different level count misses
    let mut multi_level = tag(1, 256, 256);
    multi_level.levels = 4;
    assert!(recycler.acquire(&multi_level).is_none());

    // Nothing was consumed by the misses
    assert_eq!(recycler.pooled(), 1);
    assert!(recycler.acquire(&tag(1, 256, 256)).is_some());
}

#[test]
fn test_multimap_holds_several_allocations_per_tag() {
    let mut recycler: TextureRecycler<u32, u64> = TextureRecycler::new();
    recycler.recycle(tag(1, 64, 64), 10);
    recycler.recycle(tag(1, 64, 64), 11);
    recycler.recycle(tag(1, 64, 64), 12);
    assert_eq!(recycler.pooled(), 3);

    let mut claimed = vec![
        recycler.acquire(&tag(1, 64, 64)).unwrap(),
        recycler.acquire(&tag(1, 64, 64)).unwrap(),
        recycler.acquire(&tag(1, 64, 64)).unwrap(),
    ];
    claimed.sort();
    assert_eq!(claimed, vec![10, 11, 12]);
    assert!(recycler.acquire(&tag(1, 64, 64)).is_none());
}

#[test]
fn test_drain_empties_the_pool() {
    let mut recycler: TextureRecycler<u32, u64> = TextureRecycler::new();
    recycler.recycle(tag(1, 64, 64), 1);
    recycler.recycle(tag(2, 32, 32), 2);

    let drained = recycler.drain();
    assert_eq!(drained.len(), 2);
    assert_eq!(recycler.pooled(), 0);
    assert!(recycler.acquire(&tag(1, 64, 64)).is_none());
}
