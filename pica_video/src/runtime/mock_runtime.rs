//! Mock texture runtime for GPU-free testing
//!
//! Implements the [`TextureRuntime`] trait with plain CPU byte buffers so
//! transfer semantics can be tested without a device. Every operation
//! executes immediately; `finish` only bumps a counter. The mock counts
//! driver allocations so recycler behavior is observable.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::runtime::{unpack_d24s8, HostTextureTag, TextureRecycler, TextureRuntime};
use crate::surface::{
    BufferTextureCopy, ClearValue, PixelFormat, SurfaceParams, SurfaceType, TextureBlit,
    TextureClear, TextureCopy,
};

use super::pack_d24s8;

/// CPU-side stand-in for a GPU texture allocation
pub struct MockAllocation {
    /// One byte buffer per mip level, scaled dimensions
    pub levels: Vec<Vec<u8>>,
}

type SharedRecycler = Arc<Mutex<TextureRecycler<PixelFormat, MockAllocation>>>;

/// Surface backed by a [`MockAllocation`]
pub struct MockSurface {
    pub params: SurfaceParams,
    alloc: Option<MockAllocation>,
    recycler: SharedRecycler,
}

impl MockSurface {
    fn tag(&self) -> HostTextureTag<PixelFormat> {
        HostTextureTag {
            native_format: self.params.pixel_format,
            pixel_format: self.params.pixel_format,
            texture_type: self.params.texture_type,
            width: self.params.scaled_width(),
            height: self.params.scaled_height(),
            levels: self.params.levels,
        }
    }

    /// Dimensions of a mip level in host texels
    fn level_extent(&self, level: u32) -> (u32, u32) {
        (
            (self.params.scaled_width() >> level).max(1),
            (self.params.scaled_height() >> level).max(1),
        )
    }

    fn level_bytes(&self, level: u32) -> &[u8] {
        &self.alloc.as_ref().map(|a| &a.levels).unwrap()[level as usize]
    }

    /// Read one texel as raw bytes
    pub fn texel(&self, level: u32, x: u32, y: u32) -> &[u8] {
        let (width, _) = self.level_extent(level);
        let bpp = self.params.pixel_format.bytes_per_pixel() as usize;
        let offset = ((y * width + x) as usize) * bpp;
        &self.level_bytes(level)[offset..offset + bpp]
    }
}

impl Drop for MockSurface {
    fn drop(&mut self) {
        if let Some(alloc) = self.alloc.take() {
            if let Ok(mut recycler) = self.recycler.lock() {
                recycler.recycle(self.tag(), alloc);
            }
        }
    }
}

/// Call-counting CPU runtime
pub struct MockRuntime {
    recycler: SharedRecycler,
    /// Allocations that missed the pool and hit the "driver"
    pub driver_allocations: usize,
    pub clears: usize,
    pub copies: usize,
    pub blits: usize,
    pub finishes: usize,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            recycler: Arc::new(Mutex::new(TextureRecycler::new())),
            driver_allocations: 0,
            clears: 0,
            copies: 0,
            blits: 0,
            finishes: 0,
        }
    }

    pub fn pooled(&self) -> usize {
        self.recycler.lock().map(|r| r.pooled()).unwrap_or(0)
    }

    /// Create a surface, claiming a pooled allocation when one matches
    pub fn create_surface(&mut self, params: SurfaceParams) -> MockSurface {
        let mut surface = MockSurface {
            params,
            alloc: None,
            recycler: self.recycler.clone(),
        };
        let tag = surface.tag();

        let recycled = self
            .recycler
            .lock()
            .ok()
            .and_then(|mut recycler| recycler.acquire(&tag));
        let alloc = match recycled {
            Some(mut alloc) => {
                // Recycled contents are undefined; zero them like a fresh
                // allocation so tests observe the reinitialization contract
                for level in &mut alloc.levels {
                    level.fill(0);
                }
                alloc
            }
            None => {
                self.driver_allocations += 1;
                let bpp = params.pixel_format.bytes_per_pixel() as usize;
                let levels = (0..params.levels)
                    .map(|level| {
                        let width = (params.scaled_width() >> level).max(1) as usize;
                        let height = (params.scaled_height() >> level).max(1) as usize;
                        vec![0u8; width * height * bpp]
                    })
                    .collect();
                MockAllocation { levels }
            }
        };
        surface.alloc = Some(alloc);
        surface
    }

    /// Copy staged bytes into a surface level region
    ///
    /// `copy.texture_rect` is in unscaled texels; scaled surfaces stage
    /// through an ephemeral 1x surface and rescale with a blit, the same
    /// two-step path the real backends take. For D24S8 the staging
    /// region is 5 bytes per texel and gets split into planes exactly
    /// like a real backend would before the copy.
    pub fn upload(
        &mut self,
        surface: &mut MockSurface,
        copy: &BufferTextureCopy,
        staging: &mut [u8],
    ) -> Result<()> {
        if surface.params.res_scale > 1 {
            return self.scaled_upload(surface, copy, staging);
        }

        let bpp = surface.params.pixel_format.bytes_per_pixel() as usize;
        let rect = copy.texture_rect;
        let texels = (rect.width() * rect.height()) as usize;

        if surface.params.pixel_format == PixelFormat::D24S8 {
            if staging.len() < texels * 5 {
                return Err(Error::InvalidResource(format!(
                    "D24S8 staging too small: {} < {}",
                    staging.len(),
                    texels * 5
                )));
            }
            // Split into planes, then interleave back: the stored
            // representation is the emulated word layout
            unpack_d24s8(&mut staging[..texels * 5]);
            pack_d24s8(&mut staging[..texels * 5]);
        } else if staging.len() < texels * bpp {
            return Err(Error::InvalidResource(format!(
                "staging too small: {} < {}",
                staging.len(),
                texels * bpp
            )));
        }

        let (level_width, _) = surface.level_extent(copy.texture_level);
        let level = &mut surface.alloc.as_mut().map(|a| &mut a.levels).unwrap()
            [copy.texture_level as usize];
        for row in 0..rect.height() {
            let src = ((row * rect.width()) as usize) * bpp;
            let dst = (((rect.bottom + row) * level_width + rect.left) as usize) * bpp;
            let len = rect.width() as usize * bpp;
            level[dst..dst + len].copy_from_slice(&staging[src..src + len]);
        }
        Ok(())
    }

    /// Copy a surface level region out into staging
    ///
    /// `copy.texture_rect` is in unscaled texels; scaled surfaces
    /// downscale into an ephemeral 1x surface first and read that back.
    pub fn download(
        &mut self,
        surface: &mut MockSurface,
        copy: &BufferTextureCopy,
        staging: &mut [u8],
    ) -> Result<()> {
        if surface.params.res_scale > 1 {
            return self.scaled_download(surface, copy, staging);
        }

        let bpp = surface.params.pixel_format.bytes_per_pixel() as usize;
        let rect = copy.texture_rect;
        let (level_width, _) = surface.level_extent(copy.texture_level);
        let level = surface.level_bytes(copy.texture_level);

        for row in 0..rect.height() {
            let dst = ((row * rect.width()) as usize) * bpp;
            let src = (((rect.bottom + row) * level_width + rect.left) as usize) * bpp;
            let len = rect.width() as usize * bpp;
            staging[dst..dst + len].copy_from_slice(&level[src..src + len]);
        }
        Ok(())
    }

    fn scaled_upload(
        &mut self,
        surface: &mut MockSurface,
        copy: &BufferTextureCopy,
        staging: &mut [u8],
    ) -> Result<()> {
        let unscaled_params = surface.params.unscaled(copy.texture_rect);
        let mut unscaled = self.create_surface(unscaled_params);

        let unscaled_copy = BufferTextureCopy {
            buffer_offset: copy.buffer_offset,
            buffer_size: copy.buffer_size,
            texture_rect: unscaled_params.rect(),
            texture_level: 0,
        };
        self.upload(&mut unscaled, &unscaled_copy, staging)?;

        let blit = TextureBlit {
            src_level: 0,
            dst_level: copy.texture_level,
            src_layer: 0,
            dst_layer: 0,
            src_rect: unscaled_params.rect(),
            dst_rect: copy.texture_rect.scale(surface.params.res_scale),
        };
        self.blit_textures(&mut unscaled, surface, &blit)
        // The unscaled surface drops here and its allocation is recycled
    }

    fn scaled_download(
        &mut self,
        surface: &mut MockSurface,
        copy: &BufferTextureCopy,
        staging: &mut [u8],
    ) -> Result<()> {
        let unscaled_params = surface.params.unscaled(copy.texture_rect);
        let mut unscaled = self.create_surface(unscaled_params);

        let blit = TextureBlit {
            src_level: copy.texture_level,
            dst_level: 0,
            src_layer: 0,
            dst_layer: 0,
            src_rect: copy.texture_rect.scale(surface.params.res_scale),
            dst_rect: unscaled_params.rect(),
        };
        self.blit_textures(surface, &mut unscaled, &blit)?;

        let unscaled_copy = BufferTextureCopy {
            buffer_offset: copy.buffer_offset,
            buffer_size: copy.buffer_size,
            texture_rect: unscaled_params.rect(),
            texture_level: 0,
        };
        self.download(&mut unscaled, &unscaled_copy, staging)
    }

    /// Encode a clear value in the surface's emulated format
    fn encode_clear(format: PixelFormat, value: ClearValue) -> Vec<u8> {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        match format.surface_type() {
            SurfaceType::Depth | SurfaceType::DepthStencil => {
                let depth24 = (value.depth.clamp(0.0, 1.0) * 16_777_215.0) as u32;
                match format {
                    PixelFormat::D16 => {
                        let depth16 = (value.depth.clamp(0.0, 1.0) * 65_535.0) as u16;
                        depth16.to_le_bytes().to_vec()
                    }
                    PixelFormat::D24 => depth24.to_le_bytes()[..3].to_vec(),
                    _ => ((depth24 << 8) | value.stencil as u32).to_le_bytes().to_vec(),
                }
            }
            _ => {
                let rgba = [
                    channel(value.color[0]),
                    channel(value.color[1]),
                    channel(value.color[2]),
                    channel(value.color[3]),
                ];
                rgba[..format.bytes_per_pixel() as usize].to_vec()
            }
        }
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureRuntime for MockRuntime {
    type Surface = MockSurface;

    fn finish(&mut self) -> Result<()> {
        self.finishes += 1;
        Ok(())
    }

    fn clear_texture(
        &mut self,
        surface: &mut MockSurface,
        clear: &TextureClear,
        value: ClearValue,
    ) -> Result<()> {
        self.clears += 1;
        let texel = Self::encode_clear(surface.params.pixel_format, value);
        let rect = clear.texture_rect;
        let (level_width, _) = surface.level_extent(clear.texture_level);
        let level = &mut surface.alloc.as_mut().map(|a| &mut a.levels).unwrap()
            [clear.texture_level as usize];

        for y in rect.bottom..rect.top {
            for x in rect.left..rect.right {
                let offset = ((y * level_width + x) as usize) * texel.len();
                level[offset..offset + texel.len()].copy_from_slice(&texel);
            }
        }
        Ok(())
    }

    fn copy_textures(
        &mut self,
        source: &mut MockSurface,
        dest: &mut MockSurface,
        copy: &TextureCopy,
    ) -> Result<()> {
        if source.params.pixel_format != dest.params.pixel_format {
            return Err(Error::InvalidResource(
                "copy between mismatched formats".to_string(),
            ));
        }
        self.copies += 1;

        let bpp = source.params.pixel_format.bytes_per_pixel() as usize;
        let (src_width, _) = source.level_extent(copy.src_level);
        let (dst_width, _) = dest.level_extent(copy.dst_level);
        let src_level = source.level_bytes(copy.src_level).to_vec();
        let dst_level =
            &mut dest.alloc.as_mut().map(|a| &mut a.levels).unwrap()[copy.dst_level as usize];

        for row in 0..copy.extent.height {
            let src =
                (((copy.src_offset.y + row) * src_width + copy.src_offset.x) as usize) * bpp;
            let dst =
                (((copy.dst_offset.y + row) * dst_width + copy.dst_offset.x) as usize) * bpp;
            let len = copy.extent.width as usize * bpp;
            dst_level[dst..dst + len].copy_from_slice(&src_level[src..src + len]);
        }
        Ok(())
    }

    fn blit_textures(
        &mut self,
        source: &mut MockSurface,
        dest: &mut MockSurface,
        blit: &TextureBlit,
    ) -> Result<()> {
        self.blits += 1;

        let bpp = source.params.pixel_format.bytes_per_pixel() as usize;
        let (src_width, _) = source.level_extent(blit.src_level);
        let (dst_width, _) = dest.level_extent(blit.dst_level);
        let src_level = source.level_bytes(blit.src_level).to_vec();
        let dst_level =
            &mut dest.alloc.as_mut().map(|a| &mut a.levels).unwrap()[blit.dst_level as usize];

        // Nearest-neighbor rescale
        let src_rect = blit.src_rect;
        let dst_rect = blit.dst_rect;
        for dy in 0..dst_rect.height() {
            let sy = src_rect.bottom + dy * src_rect.height() / dst_rect.height();
            for dx in 0..dst_rect.width() {
                let sx = src_rect.left + dx * src_rect.width() / dst_rect.width();
                let src = ((sy * src_width + sx) as usize) * bpp;
                let dst = (((dst_rect.bottom + dy) * dst_width + dst_rect.left + dx) as usize)
                    * bpp;
                dst_level[dst..dst + bpp].copy_from_slice(&src_level[src..src + bpp]);
            }
        }
        Ok(())
    }

    fn generate_mipmaps(&mut self, surface: &mut MockSurface) -> Result<()> {
        for level in 1..surface.params.levels {
            let (src_width, src_height) = surface.level_extent(level - 1);
            let (dst_width, dst_height) = surface.level_extent(level);
            let blit = TextureBlit {
                src_level: level - 1,
                dst_level: level,
                src_rect: crate::math::Rect::from_extent(src_width, src_height),
                dst_rect: crate::math::Rect::from_extent(dst_width, dst_height),
                ..Default::default()
            };

            // Levels live in one allocation; route through the blit logic
            // on a copy of the source level
            let bpp = surface.params.pixel_format.bytes_per_pixel() as usize;
            let src_level = surface.level_bytes(level - 1).to_vec();
            let dst_level = &mut surface.alloc.as_mut().map(|a| &mut a.levels).unwrap()
                [level as usize];
            for dy in 0..blit.dst_rect.height() {
                let sy = dy * src_height / dst_height;
                for dx in 0..blit.dst_rect.width() {
                    let sx = dx * src_width / dst_width;
                    let src = ((sy * src_width + sx) as usize) * bpp;
                    let dst = ((dy * dst_width + dx) as usize) * bpp;
                    dst_level[dst..dst + bpp].copy_from_slice(&src_level[src..src + bpp]);
                }
            }
        }
        Ok(())
    }

    fn needs_conversion(&self, format: PixelFormat) -> bool {
        // RGB8 has no widely supported host texture format
        format == PixelFormat::RGB8
    }
}

#[cfg(test)]
#[path = "mock_runtime_tests.rs"]
mod tests;
