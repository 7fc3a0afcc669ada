//! Input validation.
//!
//! Every check here is pure and cheap, and runs before any decoding or
//! rendering so that bad requests fail fast.

use crate::constants::{
    MAX_DATA_LENGTH, MAX_HALFTONE_SIDE, MAX_OVERLAY_SCALE, MAX_POINT_SIZE, MAX_QR_SIZE,
    MAX_SYMBOL_VERSION, MIN_OVERLAY_SCALE, MIN_QR_SIZE, MIN_SYMBOL_VERSION,
};
use crate::error::{QrBuilderError, Result};

/// Validate QR payload text.
///
/// Fails when the data is empty or whitespace-only, or longer than
/// [`MAX_DATA_LENGTH`] characters.
pub fn validate_data(data: &str) -> Result<()> {
    if data.trim().is_empty() {
        return Err(QrBuilderError::invalid_input("Data cannot be empty."));
    }
    if data.chars().count() > MAX_DATA_LENGTH {
        return Err(QrBuilderError::invalid_input(format!(
            "Data exceeds maximum length of {} characters.",
            MAX_DATA_LENGTH
        )));
    }
    Ok(())
}

/// Validate a QR image edge length in pixels.
pub fn validate_size(size: i64) -> Result<()> {
    if !(MIN_QR_SIZE..=MAX_QR_SIZE).contains(&size) {
        return Err(QrBuilderError::invalid_input(format!(
            "Size must be between {} and {} pixels.",
            MIN_QR_SIZE, MAX_QR_SIZE
        )));
    }
    Ok(())
}

/// Validate a size and narrow it to pixels.
pub fn checked_size(size: i64) -> Result<u32> {
    validate_size(size)?;
    u32::try_from(size).map_err(|_| QrBuilderError::invalid_input("Size is out of range."))
}

/// Validate the fraction of the background width used by an embedded QR.
pub fn validate_embed_scale(scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 || scale > 1.0 {
        return Err(QrBuilderError::invalid_input(
            "scale must be between 0 and 1.",
        ));
    }
    Ok(())
}

/// Validate a center overlay scale (logo or text area).
///
/// `name` is the parameter name echoed back in the error message.
pub fn validate_overlay_scale(name: &str, scale: f32) -> Result<()> {
    if !scale.is_finite() || !(MIN_OVERLAY_SCALE..=MAX_OVERLAY_SCALE).contains(&scale) {
        return Err(QrBuilderError::invalid_input(format!(
            "{} should be between {} and {} for reliable scanning.",
            name, MIN_OVERLAY_SCALE, MAX_OVERLAY_SCALE
        )));
    }
    Ok(())
}

/// Validate a QR symbol version (1-40).
pub fn validate_version(version: i64) -> Result<()> {
    if !(MIN_SYMBOL_VERSION..=MAX_SYMBOL_VERSION).contains(&version) {
        return Err(QrBuilderError::invalid_input(format!(
            "version must be between {} and {}.",
            MIN_SYMBOL_VERSION, MAX_SYMBOL_VERSION
        )));
    }
    Ok(())
}

/// Validate a multiplicative image enhancement factor (contrast, brightness).
pub fn validate_factor(name: &str, factor: f32) -> Result<()> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(QrBuilderError::invalid_input(format!(
            "{} must be a positive number.",
            name
        )));
    }
    Ok(())
}

/// Validate a halftone point size in pixels.
pub fn validate_point_size(point_size: i64) -> Result<()> {
    if !(1..=MAX_POINT_SIZE).contains(&point_size) {
        return Err(QrBuilderError::invalid_input(format!(
            "point_size must be between 1 and {}.",
            MAX_POINT_SIZE
        )));
    }
    Ok(())
}

/// Validate the edge length a halftone render would produce.
///
/// Version and point size are each bounded, but their product is not, so
/// the canvas is checked before anything is allocated.
pub fn validate_halftone_side(side: u64) -> Result<()> {
    if side > MAX_HALFTONE_SIDE {
        return Err(QrBuilderError::invalid_input(format!(
            "Halftone output would be {}px wide; lower version or point_size to stay within {}px.",
            side, MAX_HALFTONE_SIDE
        )));
    }
    Ok(())
}

/// Validate an explicit font size against the text area edge.
pub fn validate_font_size(font_size: f32, area_side: u32) -> Result<()> {
    if !font_size.is_finite() || font_size <= 0.0 {
        return Err(QrBuilderError::invalid_input(
            "font_size must be a positive number.",
        ));
    }
    if font_size > area_side as f32 {
        return Err(QrBuilderError::invalid_input(format!(
            "font_size must not exceed the text area ({}px).",
            area_side
        )));
    }
    Ok(())
}
