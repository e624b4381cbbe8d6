// Author: Dustin Pilgrim
// License: MIT
//
// ARGB helpers for the darken tint.
// Format: 0xAARRGGBB

/// Default darken tint (#a0000000).
pub const DEFAULT_DARK_COLOUR: u32 = 0xA000_0000;

pub const TRANSPARENT: u32 = 0x0000_0000;

#[inline]
pub fn a(argb: u32) -> u8 { ((argb >> 24) & 0xFF) as u8 }
#[inline]
pub fn r(argb: u32) -> u8 { ((argb >> 16) & 0xFF) as u8 }
#[inline]
pub fn g(argb: u32) -> u8 { ((argb >> 8) & 0xFF) as u8 }
#[inline]
pub fn b(argb: u32) -> u8 { (argb & 0xFF) as u8 }

#[inline]
pub fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Keeps RGB, swaps alpha.
#[inline]
pub fn with_alpha(colour: u32, alpha: u8) -> u32 {
    (colour & 0x00FF_FFFF) | ((alpha as u32) << 24)
}

/// Source-over blend of an ARGB tint onto one RGB(A) pixel, in place.
/// The destination alpha is left alone.
#[inline]
pub fn blend_over(px: &mut [u8], tint: u32) {
    let alpha = a(tint) as u32;
    if alpha == 0 {
        return;
    }
    let inv = 255 - alpha;
    for (dst, src) in px.iter_mut().take(3).zip([r(tint), g(tint), b(tint)]) {
        let v = src as u32 * alpha + *dst as u32 * inv;
        *dst = ((v + 127) / 255) as u8;
    }
}

/// Parse `#RRGGBB` (opaque) or `#AARRGGBB`.
pub fn parse_hex_colour(s: &str) -> Result<u32, String> {
    let s = s.trim();

    let Some(hex) = s.strip_prefix('#') else {
        return Err("colour must start with #".into());
    };

    let value = u32::from_str_radix(hex, 16).map_err(|_| "invalid hex colour".to_string())?;

    match hex.len() {
        6 => Ok(0xFF00_0000 | value),
        8 => Ok(value),
        _ => Err("colour must be 6 or 8 hex digits (RRGGBB or AARRGGBB)".into()),
    }
}
