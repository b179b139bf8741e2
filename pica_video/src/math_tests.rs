//! Unit tests for math.rs
//!
//! Tests Rect with its bottom-left origin convention, scaling, and containment.

use crate::math::Rect;

// ============================================================================
// RECT BASICS
// ============================================================================

#[test]
fn test_rect_from_extent() {
    let rect = Rect::from_extent(256, 128);
    assert_eq!(rect.left, 0);
    assert_eq!(rect.bottom, 0);
    assert_eq!(rect.right, 256);
    assert_eq!(rect.top, 128);
    assert_eq!(rect.width(), 256);
    assert_eq!(rect.height(), 128);
}

#[test]
fn test_rect_width_height_with_offset() {
    // Bottom-left origin: top > bottom
    let rect = Rect::new(16, 96, 48, 32);
    assert_eq!(rect.width(), 32);
    assert_eq!(rect.height(), 64);
}

#[test]
fn test_rect_default_is_empty() {
    let rect = Rect::default();
    assert_eq!(rect.width(), 0);
    assert_eq!(rect.height(), 0);
}

// ============================================================================
// SCALING
// ============================================================================

#[test]
fn test_rect_scale() {
    let rect = Rect::new(8, 64, 40, 16);
    let scaled = rect.scale(4);
    assert_eq!(scaled, Rect::new(32, 256, 160, 64));
    assert_eq!(scaled.width(), rect.width() * 4);
    assert_eq!(scaled.height(), rect.height() * 4);
}

#[test]
fn test_rect_scale_identity() {
    let rect = Rect::from_extent(400, 240);
    assert_eq!(rect.scale(1), rect);
}

// ============================================================================
// CONTAINMENT
// ============================================================================

#[test]
fn test_rect_contains() {
    let outer = Rect::from_extent(256, 256);
    let inner = Rect::new(32, 128, 96, 64);
    assert!(outer.contains(&inner));
    assert!(outer.contains(&outer));
    assert!(!inner.contains(&outer));
}

#[test]
fn test_rect_contains_touching_edges() {
    let outer = Rect::from_extent(64, 64);
    let touching = Rect::new(0, 64, 64, 32);
    assert!(outer.contains(&touching));

    let overflowing = Rect::new(0, 65, 64, 32);
    assert!(!outer.contains(&overflowing));
}
