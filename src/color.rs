//! Color parsing utilities.
//!
//! Annotation colors arrive as CSS-style hex strings (`#rgb` or
//! `#rrggbb`). Parsing is strict at the persistence boundary and
//! forgiving at paint time, where an unparseable color falls back to
//! the default white fill.

use image::Rgba;

use crate::constants::DEFAULT_FILL;
use crate::error::MemeError;

/// Parse a CSS hex color string (`#rgb`, `#rrggbb`, or `#rrggbbaa`).
pub fn parse_hex(value: &str) -> Result<Rgba<u8>, MemeError> {
    let invalid = || MemeError::InvalidColor {
        value: value.to_string(),
    };

    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                channels[i] = v * 16 + v;
            }
            Ok(Rgba([channels[0], channels[1], channels[2], 0xff]))
        }
        6 | 8 => {
            let mut channels = [0u8, 0, 0, 0xff];
            for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
                let s = std::str::from_utf8(chunk).map_err(|_| invalid())?;
                channels[i] = u8::from_str_radix(s, 16).map_err(|_| invalid())?;
            }
            Ok(Rgba(channels))
        }
        _ => Err(invalid()),
    }
}

/// Resolve an annotation's fill color for painting.
///
/// Empty or unparseable colors fall back to the default white fill,
/// matching the paint routine's contract.
pub fn fill_color(value: &str) -> Rgba<u8> {
    if value.is_empty() {
        return Rgba(DEFAULT_FILL);
    }
    match parse_hex(value) {
        Ok(color) => color,
        Err(_) => {
            log::debug!("unparseable fill color {:?}, using default", value);
            Rgba(DEFAULT_FILL)
        }
    }
}
