/// Texture allocation recycler
///
/// Destroying and recreating GPU textures is expensive and the emulated
/// cache churns surfaces constantly. Retired allocations are kept in a
/// multimap keyed by their full host description and handed back verbatim
/// when a compatible allocation is requested.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::surface::{PixelFormat, TextureType};

/// Complete host description of a texture allocation
///
/// Two allocations with equal tags are interchangeable. `N` is the
/// backend's native format type (vk::Format, GLenum tuple index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostTextureTag<N> {
    pub native_format: N,
    pub pixel_format: PixelFormat,
    pub texture_type: TextureType,
    pub width: u32,
    pub height: u32,
    pub levels: u32,
}

/// Multimap pool of retired allocations
///
/// `A` is the backend allocation type. The pool never inspects it; an
/// entry is removed from the pool the moment it is claimed, so an
/// allocation is owned by exactly one surface or by the pool, never both.
pub struct TextureRecycler<N, A> {
    pool: FxHashMap<HostTextureTag<N>, Vec<A>>,
    pooled: usize,
}

impl<N: Copy + Eq + Hash, A> TextureRecycler<N, A> {
    pub fn new() -> Self {
        Self {
            pool: FxHashMap::default(),
            pooled: 0,
        }
    }

    /// Claim a pooled allocation with an exactly matching tag
    ///
    /// Returns the allocation contents as-is; the caller must treat them
    /// as undefined and reinitialize.
    pub fn acquire(&mut self, tag: &HostTextureTag<N>) -> Option<A> {
        let bucket = self.pool.get_mut(tag)?;
        let alloc = bucket.pop()?;
        if bucket.is_empty() {
            self.pool.remove(tag);
        }
        self.pooled -= 1;
        Some(alloc)
    }

    /// Return a retired allocation to the pool
    pub fn recycle(&mut self, tag: HostTextureTag<N>, alloc: A) {
        self.pool.entry(tag).or_default().push(alloc);
        self.pooled += 1;
    }

    /// Number of allocations currently pooled
    pub fn pooled(&self) -> usize {
        self.pooled
    }

    /// Remove and return every pooled allocation, for teardown
    pub fn drain(&mut self) -> Vec<A> {
        self.pooled = 0;
        self.pool.drain().flat_map(|(_, bucket)| bucket).collect()
    }
}

impl<N: Copy + Eq + Hash, A> Default for TextureRecycler<N, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "recycler_tests.rs"]
mod tests;
