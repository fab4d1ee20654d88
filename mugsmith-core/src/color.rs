//! Hex color parsing.

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, CanvasResult};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Create an opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidColor`] for any other shape or non-hex digits.
    pub fn from_hex(input: &str) -> CanvasResult<Self> {
        let hex = input.trim().trim_start_matches('#');
        let invalid = || CanvasError::InvalidColor(input.to_string());

        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Ok(Self::opaque(expand(0)?, expand(1)?, expand(2)?))
            }
            6 | 8 => {
                let r = channel(&hex[0..2])?;
                let g = channel(&hex[2..4])?;
                let b = channel(&hex[4..6])?;
                let a = if hex.len() == 8 {
                    channel(&hex[6..8])?
                } else {
                    255
                };
                Ok(Self { r, g, b, a })
            }
            _ => Err(invalid()),
        }
    }

    /// Format as `#rrggbb` (alpha omitted when opaque).
    #[must_use]
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short() {
        assert_eq!(Rgba::from_hex("#ff8000"), Ok(Rgba::opaque(255, 128, 0)));
        assert_eq!(Rgba::from_hex("#f80"), Ok(Rgba::opaque(255, 136, 0)));
        assert_eq!(Rgba::from_hex("00000080").map(|c| c.a), Ok(128));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgba::from_hex("#12345").is_err());
        assert!(Rgba::from_hex("#gggggg").is_err());
        assert!(Rgba::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgba::opaque(255, 255, 255).to_hex(), "#ffffff");
        assert_eq!(Rgba { r: 1, g: 2, b: 3, a: 4 }.to_hex(), "#01020304");
    }
}
