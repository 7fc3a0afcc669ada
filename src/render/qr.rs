//! QR code rendering.
//!
//! Symbol encoding is delegated to the `qrcode` crate at error-correction
//! level H. Modules are painted at a fixed box size and the result is then
//! resampled to the exact requested edge length.

use image::{Rgba, RgbaImage};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode, Version};

use super::resize::resize_rgba;
use crate::color::Color;
use crate::constants::{DEFAULT_BORDER, DEFAULT_BOX_SIZE, DEFAULT_QR_SIZE};
use crate::error::{QrBuilderError, Result};
use crate::validate::{checked_size, validate_data};

/// What to encode and how it should look.
#[derive(Debug, Clone, PartialEq)]
pub struct QrRequest {
    pub data: String,
    /// Output edge length in pixels
    pub size: i64,
    pub fill_color: Color,
    pub back_color: Color,
}

impl QrRequest {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            size: DEFAULT_QR_SIZE as i64,
            fill_color: Color::black(),
            back_color: Color::white(),
        }
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub fn with_colors(mut self, fill_color: Color, back_color: Color) -> Self {
        self.fill_color = fill_color;
        self.back_color = back_color;
        self
    }

    /// Check data and size, returning the size in pixels.
    pub fn validate(&self) -> Result<u32> {
        validate_data(&self.data)?;
        checked_size(self.size)
    }
}

/// Dark/light module matrix of an encoded symbol.
#[derive(Debug, Clone)]
pub struct ModuleMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl ModuleMatrix {
    /// Encode `data` at level H, picking the smallest version unless one is given.
    pub fn encode(data: &str, version: Option<i16>) -> Result<Self> {
        let code = match version {
            Some(v) => QrCode::with_version(data.as_bytes(), Version::Normal(v), EcLevel::H),
            None => QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H),
        }
        .map_err(|e| map_codec_error(e, version))?;

        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        Ok(Self { width, dark })
    }

    /// Modules per side, excluding the quiet zone.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Whether a module belongs to one of the three finder patterns
    /// (including their separators).
    pub fn is_finder(&self, x: usize, y: usize) -> bool {
        let far = self.width.saturating_sub(8);
        (x < 8 && y < 8) || (x >= far && y < 8) || (x < 8 && y >= far)
    }
}

fn map_codec_error(err: QrError, version: Option<i16>) -> QrBuilderError {
    match err {
        QrError::DataTooLong => match version {
            Some(v) => QrBuilderError::invalid_input(format!(
                "Data is too long for QR version {} at error correction level H.",
                v
            )),
            None => QrBuilderError::invalid_input(
                "Data is too long to encode at error correction level H.",
            ),
        },
        QrError::InvalidVersion => QrBuilderError::invalid_input("Invalid QR version."),
        other => QrBuilderError::Codec(other.to_string()),
    }
}

/// Paints module matrices into images.
#[derive(Debug, Clone, Copy)]
pub struct QrRenderer {
    /// Quiet zone width in modules
    pub border: u32,
    /// Pixels per module before resampling
    pub box_size: u32,
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self {
            border: DEFAULT_BORDER,
            box_size: DEFAULT_BOX_SIZE,
        }
    }
}

impl QrRenderer {
    pub fn new(border: u32, box_size: u32) -> Self {
        Self {
            border,
            box_size: box_size.max(1),
        }
    }

    /// Render `request` to an RGBA image of exactly `size x size` pixels.
    pub fn render(&self, request: &QrRequest) -> Result<RgbaImage> {
        let size = request.validate()?;
        let matrix = ModuleMatrix::encode(&request.data, None)?;
        let raw = self.paint(&matrix, request.fill_color, request.back_color);

        tracing::debug!(
            modules = matrix.width(),
            raw_size = raw.width(),
            size,
            "Rendered QR symbol"
        );

        resize_rgba(&raw, size, size)
    }

    /// Paint modules at `box_size` pixels each, surrounded by the quiet zone.
    pub fn paint(&self, matrix: &ModuleMatrix, fill: Color, back: Color) -> RgbaImage {
        let fill: Rgba<u8> = fill.to_rgba();
        let back: Rgba<u8> = back.to_rgba();
        let border = self.border as usize;
        let modules = (matrix.width() + border * 2) as u32;
        let side = modules * self.box_size;
        let box_size = self.box_size;

        RgbaImage::from_fn(side, side, |x, y| {
            let mx = (x / box_size) as usize;
            let my = (y / box_size) as usize;
            let dark = mx >= border && my >= border && matrix.is_dark(mx - border, my - border);
            if dark {
                fill
            } else {
                back
            }
        })
    }
}
