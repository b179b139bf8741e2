/// D24S8 plane splitting for combined depth-stencil transfers
///
/// Host APIs address the depth and stencil aspects of a D24S8 texture
/// separately, while the emulated format interleaves them as one 32-bit
/// word per texel with depth in the high 24 bits and stencil in the low 8.
///
/// Staging regions for D24S8 are sized at 5 bytes per texel: 4 bytes of
/// depth words followed by 1 byte of stencil, so both planes fit in one
/// contiguous region and the split can run in place.

use crate::surface::PixelFormat;

/// Staging bytes per texel for D24S8 transfers (4 depth + 1 stencil)
pub const D24S8_STAGING_BYTES_PER_PIXEL: u32 = 5;

/// Offset of the stencil plane inside a 5-bytes-per-texel staging region
pub const fn stencil_plane_offset(staging_len: usize) -> usize {
    4 * staging_len / 5
}

/// Split interleaved D24S8 words into depth and stencil planes, in place
///
/// On entry the region holds `N` interleaved words in its first `4 * N`
/// bytes. On exit the first `4 * N` bytes hold depth words (value in the
/// low 24 bits, as the host depth aspect expects) and the last `N` bytes
/// hold the stencil plane. Returns the stencil plane offset.
///
/// The region length must be a multiple of 5.
pub fn unpack_d24s8(mapped: &mut [u8]) -> usize {
    debug_assert_eq!(mapped.len() % 5, 0);

    let stencil_base = stencil_plane_offset(mapped.len());
    let mut depth_offset = 0;
    let mut stencil_offset = stencil_base;
    while stencil_offset < mapped.len() {
        let word: u32 = bytemuck::pod_read_unaligned(&mapped[depth_offset..depth_offset + 4]);
        mapped[stencil_offset] = (word & 0xFF) as u8;
        mapped[depth_offset..depth_offset + 4].copy_from_slice(&(word >> 8).to_le_bytes());
        depth_offset += 4;
        stencil_offset += 1;
    }
    stencil_base
}

/// Interleave split depth and stencil planes back into D24S8 words, in place
///
/// Inverse of [`unpack_d24s8`]: the first `4 * N` bytes hold depth words
/// (low 24 bits), the last `N` bytes the stencil plane; on exit the first
/// `4 * N` bytes hold interleaved D24S8 words. Used after depth-stencil
/// downloads, once both per-aspect copies have landed in staging.
pub fn pack_d24s8(mapped: &mut [u8]) {
    debug_assert_eq!(mapped.len() % 5, 0);

    let stencil_base = stencil_plane_offset(mapped.len());
    let mut depth_offset = 0;
    let mut stencil_offset = stencil_base;
    while stencil_offset < mapped.len() {
        let depth: u32 = bytemuck::pod_read_unaligned(&mapped[depth_offset..depth_offset + 4]);
        let stencil = mapped[stencil_offset] as u32;
        let word = ((depth & 0x00FF_FFFF) << 8) | stencil;
        mapped[depth_offset..depth_offset + 4].copy_from_slice(&word.to_le_bytes());
        depth_offset += 4;
        stencil_offset += 1;
    }
}

/// Split a depth-stencil staging region for the given format
///
/// Returns the stencil plane offset. Reaching this with any format other
/// than D24S8 is a bug in the caller's format tables.
pub fn unpack_depth_stencil(mapped: &mut [u8], format: PixelFormat) -> usize {
    match format {
        PixelFormat::D24S8 => unpack_d24s8(mapped),
        _ => {
            crate::video_critical!(
                "video::Runtime",
                "Unimplemented depth unpack for format {:?}",
                format
            );
            unreachable!("no depth-stencil unpack for {:?}", format)
        }
    }
}

#[cfg(test)]
#[path = "unpack_tests.rs"]
mod tests;
