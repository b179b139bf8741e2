use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::FramebufferKey;

fn key(color: gl::types::GLuint, depth_stencil: gl::types::GLuint) -> FramebufferKey {
    FramebufferKey {
        color,
        depth_stencil,
    }
}

fn hash_of(key: &FramebufferKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

// ============================================================
// Cache key identity
// ============================================================

#[test]
fn equal_attachment_pairs_produce_equal_keys() {
    assert_eq!(key(1, 2), key(1, 2));
    assert_eq!(hash_of(&key(1, 2)), hash_of(&key(1, 2)));
}

#[test]
fn differing_attachments_produce_distinct_keys() {
    assert_ne!(key(1, 2), key(3, 2));
    assert_ne!(key(1, 2), key(1, 3));
    // Swapping the attachment roles is a different framebuffer
    assert_ne!(key(1, 2), key(2, 1));
}

#[test]
fn missing_attachment_is_part_of_the_identity() {
    // Color-only and full pairs must not share an FBO
    assert_ne!(key(1, 0), key(1, 2));
    assert_ne!(key(0, 2), key(1, 2));
}
