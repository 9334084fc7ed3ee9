//! Hex color parsing for run colors.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// Create a color from its components.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#fff`, `#ffffff`, `fff` or `ffffff`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(hex.to_string()));
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(Error::InvalidColor(hex.to_string())),
        };

        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| Error::InvalidColor(hex.to_string()))
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Upper-case `RRGGBB`, the form DrawingML `a:srgbClr` expects.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for RgbColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        assert_eq!(RgbColor::from_hex("#fff").unwrap(), RgbColor::new(255, 255, 255));
        assert_eq!(RgbColor::from_hex("0a8").unwrap(), RgbColor::new(0x00, 0xAA, 0x88));
    }

    #[test]
    fn test_long_form() {
        let color: RgbColor = "#1e90FF".parse().unwrap();
        assert_eq!(color, RgbColor::new(0x1E, 0x90, 0xFF));
        assert_eq!(color.to_hex(), "1E90FF");
        assert_eq!(color.to_string(), "#1E90FF");
    }

    #[test]
    fn test_invalid() {
        assert!(RgbColor::from_hex("#ff").is_err());
        assert!(RgbColor::from_hex("#gggggg").is_err());
        assert!(RgbColor::from_hex("").is_err());
    }
}
