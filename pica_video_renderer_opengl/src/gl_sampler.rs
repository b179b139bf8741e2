/// Sampler translation and cache

use gl::types::{GLenum, GLint, GLuint};
use rustc_hash::FxHashMap;

use pica_video::{SamplerParams, TextureFilter, WrapMode};

use crate::gl_handles::OglSampler;

fn to_gl_mag_filter(filter: TextureFilter) -> GLenum {
    match filter {
        TextureFilter::Nearest => gl::NEAREST,
        TextureFilter::Linear => gl::LINEAR,
    }
}

/// Minification filter combined with the mip filter, as GL wants it
fn to_gl_min_filter(min: TextureFilter, mip: TextureFilter) -> GLenum {
    match (min, mip) {
        (TextureFilter::Nearest, TextureFilter::Nearest) => gl::NEAREST_MIPMAP_NEAREST,
        (TextureFilter::Nearest, TextureFilter::Linear) => gl::NEAREST_MIPMAP_LINEAR,
        (TextureFilter::Linear, TextureFilter::Nearest) => gl::LINEAR_MIPMAP_NEAREST,
        (TextureFilter::Linear, TextureFilter::Linear) => gl::LINEAR_MIPMAP_LINEAR,
    }
}

fn to_gl_wrap_mode(mode: WrapMode) -> GLenum {
    match mode {
        WrapMode::ClampToEdge => gl::CLAMP_TO_EDGE,
        WrapMode::ClampToBorder => gl::CLAMP_TO_BORDER,
        WrapMode::Repeat => gl::REPEAT,
        WrapMode::MirroredRepeat => gl::MIRRORED_REPEAT,
    }
}

/// Sampler objects cached by their emulated parameters
pub struct SamplerCache {
    cache: FxHashMap<SamplerParams, OglSampler>,
}

impl SamplerCache {
    pub(crate) fn new() -> Self {
        Self {
            cache: FxHashMap::default(),
        }
    }

    /// Get or create the sampler for the given parameters
    pub fn get(&mut self, params: SamplerParams) -> GLuint {
        if let Some(sampler) = self.cache.get(&params) {
            return sampler.handle;
        }

        let sampler = OglSampler::new();
        let handle = sampler.handle;
        let border_color = [
            params.border_color[0] as f32 / 255.0,
            params.border_color[1] as f32 / 255.0,
            params.border_color[2] as f32 / 255.0,
            params.border_color[3] as f32 / 255.0,
        ];
        unsafe {
            gl::SamplerParameteri(
                handle,
                gl::TEXTURE_MAG_FILTER,
                to_gl_mag_filter(params.mag_filter) as GLint,
            );
            gl::SamplerParameteri(
                handle,
                gl::TEXTURE_MIN_FILTER,
                to_gl_min_filter(params.min_filter, params.mip_filter) as GLint,
            );
            gl::SamplerParameteri(
                handle,
                gl::TEXTURE_WRAP_S,
                to_gl_wrap_mode(params.wrap_s) as GLint,
            );
            gl::SamplerParameteri(
                handle,
                gl::TEXTURE_WRAP_T,
                to_gl_wrap_mode(params.wrap_t) as GLint,
            );
            gl::SamplerParameterfv(handle, gl::TEXTURE_BORDER_COLOR, border_color.as_ptr());
            gl::SamplerParameterf(handle, gl::TEXTURE_MIN_LOD, params.lod_min as f32);
            gl::SamplerParameterf(handle, gl::TEXTURE_MAX_LOD, params.lod_max as f32);
        }

        self.cache.insert(params, sampler);
        handle
    }
}
