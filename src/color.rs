//! 8-bit color values used for solid-fill rendering.

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Create a color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB components.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with all four channels set to the same byte.
    pub const fn gray(v: u8) -> Self {
        Self {
            r: v,
            g: v,
            b: v,
            a: v,
        }
    }

    /// Parse a `#RRGGBB` or `#RRGGBBAA` hex string (leading `#` optional).
    ///
    /// Malformed input yields opaque black, mirroring permissive hex color
    /// handling in document styles.
    pub fn from_hex(hex: &str) -> Self {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let byte = |i: usize| -> Option<u8> {
            u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()
        };
        match hex.len() {
            6 => match (byte(0), byte(2), byte(4)) {
                (Some(r), Some(g), Some(b)) => Self::opaque(r, g, b),
                _ => Self::BLACK,
            },
            8 => match (byte(0), byte(2), byte(4), byte(6)) {
                (Some(r), Some(g), Some(b), Some(a)) => Self::new(r, g, b, a),
                _ => Self::BLACK,
            },
            _ => Self::BLACK,
        }
    }

    /// Return the same color with a new alpha value.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Luminance approximation used when rendering color into a
    /// grayscale target (BT.601 integer weights).
    pub fn luminance(self) -> u8 {
        ((self.r as u32 * 77 + self.g as u32 * 151 + self.b as u32 * 28) >> 8) as u8
    }
}

/// Integer lerp of a single channel: `dst + (src - dst) * t / 255`.
///
/// Exact at t = 0 and t = 255; this is the blend kernel every pixel format
/// funnels through.
#[inline]
pub(crate) fn lerp_u8(dst: u8, src: u8, t: u8) -> u8 {
    let d = dst as i32;
    let s = src as i32;
    (d + (((s - d) * t as i32 + 127) / 255)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parse_rgb() {
        assert_eq!(Color::from_hex("#ff8000"), Color::opaque(255, 128, 0));
        assert_eq!(Color::from_hex("ff8000"), Color::opaque(255, 128, 0));
    }

    #[test]
    fn hex_parse_rgba() {
        assert_eq!(Color::from_hex("#10203040"), Color::new(16, 32, 48, 64));
    }

    #[test]
    fn hex_parse_malformed_is_black() {
        assert_eq!(Color::from_hex("zzz"), Color::BLACK);
        assert_eq!(Color::from_hex(""), Color::BLACK);
        assert_eq!(Color::from_hex("#12345"), Color::BLACK);
    }

    #[test]
    fn lerp_endpoints_exact() {
        assert_eq!(lerp_u8(10, 250, 0), 10);
        assert_eq!(lerp_u8(10, 250, 255), 250);
    }

    #[test]
    fn luminance_white_black() {
        assert_eq!(Color::WHITE.luminance(), 255);
        assert_eq!(Color::BLACK.luminance(), 0);
    }
}
