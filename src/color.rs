//! Color parsing.
//!
//! Accepts CSS color names (`black`, `navy`, ...), `#RGB`, `#RRGGBB`,
//! `#RRGGBBAA` and functional notation such as `rgb(255, 0, 0)`.

use crate::error::{QrBuilderError, Result};
use image::Rgba;
use std::fmt;
use std::str::FromStr;

/// An RGBA color validated at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Parse any supported color notation.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let parsed = csscolorparser::parse(trimmed).map_err(|_| {
            QrBuilderError::invalid_input(format!("Invalid color: '{}'.", input))
        })?;
        let [r, g, b, a] = parsed.to_rgba8();
        Ok(Self { r, g, b, a })
    }

    /// Build a color from loose RGB components, as the halftone mode takes them.
    ///
    /// All-zero components mean black, which is also the default.
    pub fn from_components(r: i64, g: i64, b: i64) -> Result<Self> {
        let channel = |name: &str, value: i64| -> Result<u8> {
            u8::try_from(value).map_err(|_| {
                QrBuilderError::invalid_input(format!("{} must be between 0 and 255.", name))
            })
        };
        Ok(Self::new(
            channel("color_r", r)?,
            channel("color_g", g)?,
            channel("color_b", b)?,
        ))
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl FromStr for Color {
    type Err = QrBuilderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}
