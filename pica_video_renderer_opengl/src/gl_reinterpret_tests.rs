use super::*;

// ============================================================
// RGBA4 -> RGB5A1 texel conversion
// ============================================================

#[test]
fn black_and_white_are_preserved() {
    assert_eq!(rgba4_to_rgb5a1(0x0000), 0x0000);
    assert_eq!(rgba4_to_rgb5a1(0xFFFF), 0xFFFF);
}

#[test]
fn channels_widen_independently() {
    // Full red only
    assert_eq!(rgba4_to_rgb5a1(0xF000), 0xF800);
    // Full green only
    assert_eq!(rgba4_to_rgb5a1(0x0F00), 0x07C0);
    // Full blue only
    assert_eq!(rgba4_to_rgb5a1(0x00F0), 0x003E);
    // Full alpha only
    assert_eq!(rgba4_to_rgb5a1(0x000F), 0x0001);
}

#[test]
fn four_bit_channels_replicate_their_top_bit() {
    // 0x8 widens to 0b10001, keeping the relative intensity
    let texel = rgba4_to_rgb5a1(0x8000);
    assert_eq!(texel >> 11, 0b10001);
}

#[test]
fn alpha_keeps_only_its_top_bit() {
    assert_eq!(rgba4_to_rgb5a1(0x0007) & 1, 0);
    assert_eq!(rgba4_to_rgb5a1(0x0008) & 1, 1);
}

// ============================================================
// Strategy lists
// ============================================================

#[test]
fn reinterpreters_are_keyed_by_destination_format() {
    let to_rgba8 = possible_reinterpretations(PixelFormat::RGBA8);
    assert_eq!(to_rgba8.len(), 1);
    assert_eq!(to_rgba8[0].source_format(), PixelFormat::D24S8);

    let to_rgb5a1 = possible_reinterpretations(PixelFormat::RGB5A1);
    assert_eq!(to_rgb5a1.len(), 1);
    assert_eq!(to_rgb5a1[0].source_format(), PixelFormat::RGBA4);

    assert!(possible_reinterpretations(PixelFormat::RGB565).is_empty());
    assert!(possible_reinterpretations(PixelFormat::D24S8).is_empty());
}
