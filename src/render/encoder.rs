//! Image decoding and PNG encoding.
//!
//! Decoding checks the header dimensions before the full decode so a small
//! upload cannot expand into a huge allocation. PNG output can optionally be
//! recompressed with oxipng.

use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::constants::MAX_SOURCE_PIXELS;
use crate::error::{QrBuilderError, Result};

/// Decode image bytes of any supported format.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    if data.is_empty() {
        return Err(QrBuilderError::invalid_input("Uploaded image is empty."));
    }

    let (width, height) = reader(data)?
        .into_dimensions()
        .map_err(|e| QrBuilderError::invalid_input(format!("Could not decode image: {}", e)))?;
    validate_dimensions(width, height)?;

    reader(data)?
        .decode()
        .map_err(|e| QrBuilderError::invalid_input(format!("Could not decode image: {}", e)))
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| QrBuilderError::invalid_input(format!("Could not decode image: {}", e)))
}

/// Reject images whose pixel count exceeds [`MAX_SOURCE_PIXELS`].
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    let pixels = width as u64 * height as u64;
    if pixels > MAX_SOURCE_PIXELS {
        return Err(QrBuilderError::invalid_input(format!(
            "Image too large: {}x{} ({} pixels) exceeds the limit of {} pixels.",
            width, height, pixels, MAX_SOURCE_PIXELS
        )));
    }
    Ok(())
}

/// Read and decode a local image file.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    if !path.is_file() {
        return Err(QrBuilderError::not_found(path));
    }
    let data = std::fs::read(path)?;
    decode_image(&data)
}

/// PNG encoder with optional lossless recompression.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder {
    /// Run oxipng over the encoded bytes
    pub optimize: bool,
}

impl PngEncoder {
    pub fn new(optimize: bool) -> Self {
        Self { optimize }
    }

    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut output = Cursor::new(Vec::new());
        image
            .write_to(&mut output, ImageFormat::Png)
            .map_err(|e| QrBuilderError::image(format!("PNG encoding failed: {}", e)))?;
        let encoded = output.into_inner();

        if !self.optimize {
            return Ok(encoded);
        }

        let options = oxipng::Options::from_preset(2);
        match oxipng::optimize_from_memory(&encoded, &options) {
            Ok(optimized) if optimized.len() < encoded.len() => Ok(optimized),
            Ok(_) => Ok(encoded),
            Err(e) => {
                tracing::warn!(error = %e, "PNG optimization failed, using unoptimized output");
                Ok(encoded)
            }
        }
    }

    /// Encode and write to `path`.
    pub fn save(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let bytes = self.encode(image)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
