/// Sampler state for cached surfaces

/// Texel filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Linear,
}

/// Addressing mode outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    ClampToBorder,
    Repeat,
    MirroredRepeat,
}

/// Key describing a sampler object
///
/// Backends hash this to deduplicate sampler objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerParams {
    pub mag_filter: TextureFilter,
    pub min_filter: TextureFilter,
    pub mip_filter: TextureFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    /// RGBA border color, 8 bits per channel
    pub border_color: [u8; 4],
    /// Level-of-detail range, fixed to integral mip levels
    pub lod_min: u32,
    pub lod_max: u32,
}
