use super::*;

// ============================================================
// Format tuples
// ============================================================

#[test]
fn color_tuples_use_packed_wire_types_on_desktop() {
    let tuple = format_tuple(PixelFormat::RGBA8, false);
    assert_eq!(tuple.internal_format, gl::RGBA8);
    assert_eq!(tuple.ty, gl::UNSIGNED_INT_8_8_8_8);

    let tuple = format_tuple(PixelFormat::RGB5A1, false);
    assert_eq!(tuple.internal_format, gl::RGB5_A1);
    assert_eq!(tuple.ty, gl::UNSIGNED_SHORT_5_5_5_1);

    let tuple = format_tuple(PixelFormat::RGB565, false);
    assert_eq!(tuple.internal_format, gl::RGB565);
    assert_eq!(tuple.ty, gl::UNSIGNED_SHORT_5_6_5);

    let tuple = format_tuple(PixelFormat::RGBA4, false);
    assert_eq!(tuple.internal_format, gl::RGBA4);
    assert_eq!(tuple.ty, gl::UNSIGNED_SHORT_4_4_4_4);
}

#[test]
fn rgb8_uses_bgr_on_desktop_and_rgba8_on_gles() {
    let desktop = format_tuple(PixelFormat::RGB8, false);
    assert_eq!(desktop.internal_format, gl::RGB8);
    assert_eq!(desktop.format, gl::BGR);

    let gles = format_tuple(PixelFormat::RGB8, true);
    assert_eq!(gles.internal_format, gl::RGBA8);
    assert_eq!(gles.format, gl::RGBA);
    assert_eq!(gles.ty, gl::UNSIGNED_BYTE);
}

#[test]
fn depth_tuples() {
    let tuple = format_tuple(PixelFormat::D16, false);
    assert_eq!(tuple.internal_format, gl::DEPTH_COMPONENT16);
    assert_eq!(tuple.format, gl::DEPTH_COMPONENT);

    let tuple = format_tuple(PixelFormat::D24, false);
    assert_eq!(tuple.internal_format, gl::DEPTH_COMPONENT24);

    let tuple = format_tuple(PixelFormat::D24S8, false);
    assert_eq!(tuple.internal_format, gl::DEPTH24_STENCIL8);
    assert_eq!(tuple.format, gl::DEPTH_STENCIL);
    assert_eq!(tuple.ty, gl::UNSIGNED_INT_24_8);
}

#[test]
fn depth_tuples_ignore_the_gles_flag() {
    for format in [PixelFormat::D16, PixelFormat::D24, PixelFormat::D24S8] {
        assert_eq!(format_tuple(format, false), format_tuple(format, true));
    }
}

#[test]
fn invalid_maps_to_the_default_tuple() {
    let tuple = format_tuple(PixelFormat::Invalid, false);
    assert_eq!(tuple.internal_format, gl::RGBA8);
    assert_eq!(tuple.format, gl::RGBA);
    assert_eq!(tuple.ty, gl::UNSIGNED_BYTE);
}

// ============================================================
// Conversion and buffer masks
// ============================================================

#[test]
fn only_gles_needs_conversion() {
    for format in [
        PixelFormat::RGBA8,
        PixelFormat::RGB8,
        PixelFormat::RGB565,
        PixelFormat::D24S8,
    ] {
        assert!(!needs_conversion(format, false));
    }
    assert!(needs_conversion(PixelFormat::RGBA8, true));
    assert!(needs_conversion(PixelFormat::RGB8, true));
    assert!(!needs_conversion(PixelFormat::RGB565, true));
    assert!(!needs_conversion(PixelFormat::D24S8, true));
}

#[test]
fn staging_footprint_matches_the_emulated_footprint() {
    // Interleaved 24.8 transfers keep D24S8 at its emulated 4 bytes
    assert_eq!(staging_bytes_per_pixel(PixelFormat::D24S8), 4);
    assert_eq!(staging_bytes_per_pixel(PixelFormat::RGBA8), 4);
    assert_eq!(staging_bytes_per_pixel(PixelFormat::D24), 3);
    assert_eq!(staging_bytes_per_pixel(PixelFormat::RGB565), 2);
}

#[test]
fn buffer_masks_follow_the_surface_type() {
    assert_eq!(buffer_mask(SurfaceType::Color), gl::COLOR_BUFFER_BIT);
    assert_eq!(buffer_mask(SurfaceType::Texture), gl::COLOR_BUFFER_BIT);
    assert_eq!(buffer_mask(SurfaceType::Fill), gl::COLOR_BUFFER_BIT);
    assert_eq!(buffer_mask(SurfaceType::Depth), gl::DEPTH_BUFFER_BIT);
    assert_eq!(
        buffer_mask(SurfaceType::DepthStencil),
        gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT
    );
}
