//! Export settings shared by the raster and vector renderers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest border width in output pixels.
pub const MIN_BORDER_WIDTH: f64 = 1.0;
/// Largest border width in output pixels.
pub const MAX_BORDER_WIDTH: f64 = 20.0;

/// A color string that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid color: {0:?}")]
pub struct ParseColorError(pub String);

/// Straight-alpha 8-bit color.
///
/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `white`, `black` and
/// `transparent`. Serializes as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opacity in 0-1.
    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// `#rrggbb` without the alpha channel, for SVG paint attributes.
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => {}
        }

        let err = || ParseColorError(s.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize, len: usize| {
            let digits = &hex[i * len..(i + 1) * len];
            u8::from_str_radix(digits, 16)
                .map(|v| if len == 1 { v * 17 } else { v })
                .map_err(|_| err())
        };

        match hex.len() {
            3 => Ok(Self::opaque(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Ok(Self::opaque(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            8 => Ok(Self {
                r: channel(0, 2)?,
                g: channel(1, 2)?,
                b: channel(2, 2)?,
                a: channel(3, 2)?,
            }),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

/// Side length of exported images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum OutputSize {
    Px256,
    #[default]
    Px512,
    Px1024,
    Px2048,
}

impl OutputSize {
    pub const ALL: [OutputSize; 4] = [
        OutputSize::Px256,
        OutputSize::Px512,
        OutputSize::Px1024,
        OutputSize::Px2048,
    ];

    pub fn pixels(self) -> u32 {
        match self {
            OutputSize::Px256 => 256,
            OutputSize::Px512 => 512,
            OutputSize::Px1024 => 1024,
            OutputSize::Px2048 => 2048,
        }
    }
}

/// An output size outside the supported set.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Unsupported output size {0}, expected 256, 512, 1024 or 2048")]
pub struct UnsupportedSize(pub u32);

impl TryFrom<u32> for OutputSize {
    type Error = UnsupportedSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        OutputSize::ALL
            .into_iter()
            .find(|s| s.pixels() == value)
            .ok_or(UnsupportedSize(value))
    }
}

impl From<OutputSize> for u32 {
    fn from(value: OutputSize) -> Self {
        value.pixels()
    }
}

/// Fill behind the clipped image.
///
/// Serialized as `"transparent"` or a hex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Background {
    #[default]
    Transparent,
    Solid(Rgba),
}

impl Background {
    pub const WHITE: Background = Background::Solid(Rgba::WHITE);
    pub const BLACK: Background = Background::Solid(Rgba::BLACK);

    /// Fill color, if anything is painted.
    pub fn fill(&self) -> Option<Rgba> {
        match self {
            Background::Transparent => None,
            Background::Solid(c) if c.a == 0 => None,
            Background::Solid(c) => Some(*c),
        }
    }
}

impl TryFrom<String> for Background {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("transparent") {
            return Ok(Background::Transparent);
        }
        value.parse().map(Background::Solid)
    }
}

impl From<Background> for String {
    fn from(value: Background) -> Self {
        match value {
            Background::Transparent => "transparent".to_string(),
            Background::Solid(c) => c.to_string(),
        }
    }
}

/// Optional stroke along the shape outline, drawn on top and never clipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Border {
    pub enabled: bool,
    /// Width in output pixels. Positive widths are clamped to 1-20; zero,
    /// negative or NaN widths draw nothing.
    pub width: f64,
    pub color: Rgba,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 2.0,
            color: Rgba::BLACK,
        }
    }
}

impl Border {
    /// Width clamped to the supported range, or `None` unless positive.
    pub fn clamped_width(&self) -> Option<f64> {
        (self.width > 0.0).then(|| self.width.clamp(MIN_BORDER_WIDTH, MAX_BORDER_WIDTH))
    }

    /// Stroke to draw, as `(width_px, color)`, when the border is visible.
    pub fn stroke(&self) -> Option<(f64, Rgba)> {
        if !self.enabled || self.color.a == 0 {
            return None;
        }
        self.clamped_width().map(|width| (width, self.color))
    }
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

/// Everything that controls how a transformed image is exported.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    pub output_size: OutputSize,
    pub background: Background,
    pub border: Border,
    pub format: ExportFormat,
}
