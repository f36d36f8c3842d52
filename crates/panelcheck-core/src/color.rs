#![forbid(unsafe_code)]

//! Opaque RGB colors used by patterns, motion shapes, and the flasher.

use std::str::FromStr;

use crate::error::ParseError;

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red channel (0–255).
    pub r: u8,
    /// Green channel (0–255).
    pub g: u8,
    /// Blue channel (0–255).
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const CYAN: Self = Self::new(0, 255, 255);
    pub const MAGENTA: Self = Self::new(255, 0, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0);

    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Neutral gray with all channels at `level`.
    #[must_use]
    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// Gray at `percent` of full intensity (clamped to 0–100).
    #[must_use]
    pub fn gray_percent(percent: u8) -> Self {
        let percent = u32::from(percent.min(100));
        Self::gray(((percent * 255 + 50) / 100) as u8)
    }

    /// Pack into a `0x00RRGGBB` word.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Compute perceived luminance (BT.709) as a `u8` (0 = black, 255 = white).
    #[must_use]
    pub fn luminance_u8(self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        let luma = 2126 * r + 7152 * g + 722 * b;
        ((luma + 5000) / 10_000) as u8
    }

    /// Black or white, whichever reads better on top of `self`.
    #[must_use]
    pub fn contrasting(self) -> Self {
        if self.luminance_u8() >= 128 {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }

    /// Linear interpolation towards `other`; `t` is clamped to [0, 1].
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let v = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// CSS hex notation (`#rrggbb`).
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseError;

    /// Parse `#rrggbb`, `#rgb` (leading `#` optional) or a basic color name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            "red" => return Ok(Self::RED),
            "green" => return Ok(Self::GREEN),
            "blue" => return Ok(Self::BLUE),
            "cyan" => return Ok(Self::CYAN),
            "magenta" => return Ok(Self::MAGENTA),
            "yellow" => return Ok(Self::YELLOW),
            _ => {}
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let err = || ParseError::new("color", s);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        match hex.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
                Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Self::new(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(err()),
        }
    }
}

impl core::fmt::Display for Rgb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_long_short_and_named_forms() {
        assert_eq!("#ff8000".parse::<Rgb>().unwrap(), Rgb::new(255, 128, 0));
        assert_eq!("0f0".parse::<Rgb>().unwrap(), Rgb::GREEN);
        assert_eq!("Magenta".parse::<Rgb>().unwrap(), Rgb::MAGENTA);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("".parse::<Rgb>().is_err());
    }

    #[test]
    fn hex_formatting_matches_display() {
        let c = Rgb::new(1, 171, 255);
        assert_eq!(c.to_hex(), "#01abff");
        assert_eq!(c.to_string(), c.to_hex());
    }

    #[test]
    fn luminance_extremes() {
        assert_eq!(Rgb::BLACK.luminance_u8(), 0);
        assert_eq!(Rgb::WHITE.luminance_u8(), 255);
        assert_eq!(Rgb::WHITE.contrasting(), Rgb::BLACK);
        assert_eq!(Rgb::BLUE.contrasting(), Rgb::WHITE);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 0.0), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 0.5), Rgb::gray(128));
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 7.0), Rgb::WHITE);
    }

    #[test]
    fn gray_percent_rounds() {
        assert_eq!(Rgb::gray_percent(0), Rgb::BLACK);
        assert_eq!(Rgb::gray_percent(100), Rgb::WHITE);
        assert_eq!(Rgb::gray_percent(50), Rgb::gray(128));
        assert_eq!(Rgb::gray_percent(200), Rgb::WHITE);
    }
}
