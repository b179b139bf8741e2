//! Unit tests for vulkan_stream_buffer.rs
//!
//! Tests the device-independent cursor math: alignment and growth policy.

use crate::vulkan_stream_buffer::{align_up, grown_size, STREAM_BUFFER_SIZE};

#[test]
fn test_align_up() {
    assert_eq!(align_up(0, 4), 0);
    assert_eq!(align_up(1, 4), 4);
    assert_eq!(align_up(4, 4), 4);
    assert_eq!(align_up(5, 8), 8);
    assert_eq!(align_up(17, 16), 32);
    assert_eq!(align_up(1000, 256), 1024);
}

#[test]
fn test_grown_size_doubles() {
    assert_eq!(grown_size(1024, 100), 2048);
    assert_eq!(grown_size(STREAM_BUFFER_SIZE, 1), STREAM_BUFFER_SIZE * 2);
}

#[test]
fn test_grown_size_fits_large_requests() {
    // One giant request can outgrow a single doubling
    let needed = STREAM_BUFFER_SIZE * 3;
    let new_size = grown_size(STREAM_BUFFER_SIZE, needed);
    assert!(new_size >= needed);
    assert_eq!(new_size, STREAM_BUFFER_SIZE * 4);
}
