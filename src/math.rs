use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context};

/// Linear interpolation from `x` to `y` by `p`
pub fn lerp(x: f32, y: f32, p: f32) -> f32 {
    x + (y - x) * p
}

/// Inverse of `lerp`: where `p` sits between `x` and `y`
pub fn normalize(x: f32, y: f32, p: f32) -> f32 {
    (p - x) / (y - x)
}

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// 24-bit color packed as 0xRRGGBB
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);

    pub fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn channels(self) -> [u8; 3] {
        [
            ((self.0 & 0xff0000) >> 16) as u8,
            ((self.0 & 0x00ff00) >> 8) as u8,
            (self.0 & 0x0000ff) as u8,
        ]
    }

    /// Channels scaled to [0, 1], still sRGB-encoded
    pub fn to_unit(self) -> [f32; 3] {
        let [r, g, b] = self.channels();
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }

    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0 & 0xffffff)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    /// Accepts `#rrggbb`, `rrggbb` and `0xrrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .unwrap_or(trimmed);
        if digits.len() != 6 {
            return Err(anyhow!("expected six hex digits, got {:?}", s));
        }
        let value = u32::from_str_radix(digits, 16)
            .with_context(|| format!("invalid hex color {:?}", s))?;
        Ok(Rgb(value))
    }
}

/// Per-channel interpolation between two colors.
///
/// Channels are truncated toward zero, so `lerp_color(c, c, p) == c`.
pub fn lerp_color(from: Rgb, to: Rgb, p: f32) -> Rgb {
    let a = from.channels();
    let b = to.channels();
    let mix = |i: usize| -> u8 {
        let channel = a[i] as f32 + p * (b[i] as f32 - a[i] as f32);
        // `as` saturates, keeping out-of-range `p` inside 0..=255
        channel as u8
    };
    Rgb::from_channels(mix(0), mix(1), mix(2))
}
