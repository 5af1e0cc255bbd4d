//! Color utility functions shared across the application.
//!
//! Hotspot colors are stored as lowercase `#rrggbb` strings. These helpers
//! parse and normalise the hex notations users and legacy data produce.

/// Parse a hex color (`#rgb`, `#rrggbb`, with or without the leading `#`).
///
/// # Returns
/// RGB bytes, or `None` if the string isn't a hex color.
pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(rgb)
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b])
        }
        _ => None,
    }
}

/// Format RGB bytes as `#rrggbb`.
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Normalise a hex color to `#rrggbb`, or `None` if it isn't one.
pub fn normalize_hex(color: &str) -> Option<String> {
    parse_hex(color).map(to_hex)
}
