//! Unit tests for unpack.rs
//!
//! Tests the in-place D24S8 plane split and its inverse against
//! hand-computed words.

use crate::runtime::{
    pack_d24s8, stencil_plane_offset, unpack_d24s8, unpack_depth_stencil,
    D24S8_STAGING_BYTES_PER_PIXEL,
};
use crate::surface::PixelFormat;

/// Build a 5-bytes-per-texel staging region from interleaved d24s8 words
fn staging_from_words(words: &[u32]) -> Vec<u8> {
    let mut staging = vec![0u8; words.len() * D24S8_STAGING_BYTES_PER_PIXEL as usize];
    for (i, word) in words.iter().enumerate() {
        staging[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    staging
}

#[test]
fn test_stencil_plane_offset() {
    // 4 texels -> 20 staging bytes, stencil plane at byte 16
    assert_eq!(stencil_plane_offset(20), 16);
    // 400x240 texels
    let len = 400 * 240 * D24S8_STAGING_BYTES_PER_PIXEL as usize;
    assert_eq!(stencil_plane_offset(len), 400 * 240 * 4);
}

#[test]
fn test_unpack_single_texel() {
    // depth = 0xABCDEF, stencil = 0x42
    let mut staging = staging_from_words(&[0xABCDEF42]);
    let stencil_base = unpack_d24s8(&mut staging);

    assert_eq!(stencil_base, 4);
    let depth = u32::from_le_bytes(staging[0..4].try_into().unwrap());
    assert_eq!(depth, 0x00ABCDEF);
    assert_eq!(staging[4], 0x42);
}

#[test]
fn test_unpack_multiple_texels() {
    let words = [0x000001FF, 0xFFFFFF00, 0x12345678, 0x00000000];
    let mut staging = staging_from_words(&words);
    let stencil_base = unpack_d24s8(&mut staging);

    assert_eq!(stencil_base, 16);
    let expected_depth = [0x000001, 0xFFFFFF, 0x123456, 0x000000];
    let expected_stencil = [0xFF, 0x00, 0x78, 0x00];
    for i in 0..4 {
        let depth = u32::from_le_bytes(staging[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(depth, expected_depth[i], "depth mismatch at texel {}", i);
        assert_eq!(
            staging[stencil_base + i],
            expected_stencil[i],
            "stencil mismatch at texel {}",
            i
        );
    }
}

#[test]
fn test_pack_is_inverse_of_unpack() {
    let words = [0xDEADBEEF, 0x00000001, 0x80000000, 0x7FFFFFFF, 0x01020304];
    let mut staging = staging_from_words(&words);
    unpack_d24s8(&mut staging);
    pack_d24s8(&mut staging);

    for (i, word) in words.iter().enumerate() {
        let repacked = u32::from_le_bytes(staging[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(repacked, *word, "word mismatch at texel {}", i);
    }
}

#[test]
fn test_pack_ignores_depth_garbage_bits() {
    // Host depth aspect copies may leave the top byte of each depth word
    // undefined; pack must mask it off
    let mut staging = vec![0u8; 5];
    staging[0..4].copy_from_slice(&0xFF123456u32.to_le_bytes());
    staging[4] = 0x9A;
    pack_d24s8(&mut staging);

    let word = u32::from_le_bytes(staging[0..4].try_into().unwrap());
    assert_eq!(word, 0x1234569A);
}

#[test]
fn test_unpack_empty_region() {
    let mut staging: Vec<u8> = Vec::new();
    assert_eq!(unpack_d24s8(&mut staging), 0);
}

#[test]
fn test_unpack_dispatch_d24s8() {
    let mut staging = staging_from_words(&[0xABCDEF42]);
    let stencil_base = unpack_depth_stencil(&mut staging, PixelFormat::D24S8);

    assert_eq!(stencil_base, 4);
    let depth = u32::from_le_bytes(staging[0..4].try_into().unwrap());
    assert_eq!(depth, 0x00ABCDEF);
    assert_eq!(staging[4], 0x42);
}

#[test]
#[serial_test::serial]
#[should_panic]
fn test_unpack_dispatch_rejects_non_depth_stencil() {
    let mut staging = vec![0u8; 5];
    unpack_depth_stencil(&mut staging, PixelFormat::D16);
}
