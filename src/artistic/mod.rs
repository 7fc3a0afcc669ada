//! Artistic and halftone QR modes.
//!
//! These modes blend a picture into the QR pattern itself. The heavy lifting
//! is done by a codec behind [`ArtisticCodec`] or [`HalftoneCodec`]; this
//! module owns parameter validation, preset lookup and the temporary-file
//! staging the codecs need.

pub mod codec;
pub mod command;
pub mod staging;

pub use codec::{ArtisticCodec, BuiltinArtistic, BuiltinHalftone, HalftoneCodec};
pub use command::AmzqrCommand;
pub use staging::StagedJob;

use crate::color::Color;
use crate::constants::{DEFAULT_ARTISTIC_VERSION, DEFAULT_BORDER, DEFAULT_POINT_SIZE};
use crate::error::{QrBuilderError, Result};
use crate::validate::{
    validate_data, validate_factor, validate_halftone_side, validate_point_size, validate_version,
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Named artistic quality presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Small,
    Medium,
    Large,
    Hd,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Small, Preset::Medium, Preset::Large, Preset::Hd];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Small => "small",
            Preset::Medium => "medium",
            Preset::Large => "large",
            Preset::Hd => "hd",
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            Preset::Small => 5,
            Preset::Medium => 10,
            Preset::Large => 15,
            Preset::Hd => 20,
        }
    }

    pub fn contrast(&self) -> f32 {
        match self {
            Preset::Small => 1.5,
            Preset::Medium => 1.3,
            Preset::Large => 1.2,
            Preset::Hd => 1.1,
        }
    }

    pub fn brightness(&self) -> f32 {
        match self {
            Preset::Small => 1.2,
            Preset::Medium => 1.1,
            Preset::Large | Preset::Hd => 1.0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Small => "Compact, high contrast",
            Preset::Medium => "Balanced (default)",
            Preset::Large => "High detail",
            Preset::Hd => "Maximum detail",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = QrBuilderError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == lowered)
            .ok_or_else(|| {
                QrBuilderError::invalid_input(format!(
                    "Unknown preset '{}'. Valid presets: small, medium, large, hd.",
                    s
                ))
            })
    }
}

/// Parameters for an artistic QR where the picture forms the pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtisticRequest {
    pub data: String,
    pub version: u8,
    pub contrast: f32,
    pub brightness: f32,
    /// Keep the picture's colors instead of converting to grayscale
    pub colorized: bool,
}

impl ArtisticRequest {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            version: DEFAULT_ARTISTIC_VERSION,
            contrast: 1.0,
            brightness: 1.0,
            colorized: true,
        }
    }

    /// Build from loose inputs. A preset overrides version, contrast and brightness.
    pub fn from_parts(
        data: impl Into<String>,
        preset: Option<Preset>,
        version: i64,
        contrast: f32,
        brightness: f32,
        colorized: bool,
    ) -> Result<Self> {
        let data = data.into();
        let request = match preset {
            Some(preset) => Self::new(data).with_preset(preset),
            None => {
                validate_version(version)?;
                Self {
                    data,
                    version: version as u8,
                    contrast,
                    brightness,
                    colorized: true,
                }
            }
        };
        let request = Self {
            colorized,
            ..request
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.version = preset.version();
        self.contrast = preset.contrast();
        self.brightness = preset.brightness();
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_data(&self.data)?;
        validate_version(self.version as i64)?;
        validate_factor("contrast", self.contrast)?;
        validate_factor("brightness", self.brightness)?;
        Ok(())
    }
}

/// Parameters for a halftone (QArt-style) QR.
#[derive(Debug, Clone, PartialEq)]
pub struct QartRequest {
    pub data: String,
    pub version: u8,
    /// Pixels per halftone dot
    pub point_size: u32,
    /// Floyd-Steinberg dithering instead of a plain threshold
    pub dither: bool,
    /// Restrict the picture to the symbol area
    pub fast: bool,
    pub color: Color,
}

impl QartRequest {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            version: DEFAULT_ARTISTIC_VERSION,
            point_size: DEFAULT_POINT_SIZE,
            dither: true,
            fast: false,
            color: Color::black(),
        }
    }

    pub fn from_parts(
        data: impl Into<String>,
        version: i64,
        point_size: i64,
        dither: bool,
        fast: bool,
        color: Color,
    ) -> Result<Self> {
        validate_version(version)?;
        validate_point_size(point_size)?;
        let request = Self {
            data: data.into(),
            version: version as u8,
            point_size: point_size as u32,
            dither,
            fast,
            color,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        validate_data(&self.data)?;
        validate_version(self.version as i64)?;
        validate_point_size(self.point_size as i64)?;
        validate_halftone_side(self.output_side())?;
        Ok(())
    }

    /// Edge in pixels of the rendered halftone, quiet zone included.
    pub fn output_side(&self) -> u64 {
        let modules = 17 + 4 * self.version as u64;
        codec::halftone_side(modules, self.point_size)
    }
}

/// Entry of the `/styles` catalog.
#[derive(Debug, Clone, Serialize)]
pub struct StyleInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub requires_image: bool,
}

/// Preset entry of the `/styles` catalog.
#[derive(Debug, Clone, Serialize)]
pub struct PresetInfo {
    pub name: &'static str,
    pub version: u8,
    pub description: &'static str,
}

/// Static catalog of the available styles and artistic presets.
#[derive(Debug, Clone, Serialize)]
pub struct StyleCatalog {
    pub styles: Vec<StyleInfo>,
    pub artistic_presets: Vec<PresetInfo>,
}

impl StyleCatalog {
    pub fn builtin() -> Self {
        let style = |name, description, requires_image| StyleInfo {
            name,
            description,
            requires_image,
        };
        Self {
            styles: vec![
                style("basic", "Simple QR with custom colors", false),
                style("logo", "Logo embedded in QR center", true),
                style("text", "Text or words in QR center", false),
                style("artistic", "Image IS the QR code (colorful)", true),
                style("qart", "Halftone/dithered style", true),
                style("embed", "QR placed on background image", true),
            ],
            artistic_presets: Preset::ALL
                .into_iter()
                .map(|p| PresetInfo {
                    name: p.name(),
                    version: p.version(),
                    description: p.description(),
                })
                .collect(),
        }
    }
}
