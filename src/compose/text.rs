//! Text overlay rendering.
//!
//! Renders a short caption with an embedded monospace font onto a
//! transparent square canvas, ready to be center-overlaid on a QR.
//!
//! When no font size is requested the largest size that fits the square is
//! chosen, never going below [`MIN_AUTO_FONT_SIZE`].

use crate::color::Color;
use crate::constants::MIN_AUTO_FONT_SIZE;
use crate::error::{QrBuilderError, Result};
use crate::validate::validate_font_size;
use ab_glyph::{Font, FontRef, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::sync::OnceLock;

/// Embedded font data (DejaVu Sans Mono, free license).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

static DEFAULT_FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();

fn default_font() -> Result<&'static FontRef<'static>> {
    DEFAULT_FONT
        .get_or_init(|| FontRef::try_from_slice(EMBEDDED_FONT_DATA).ok())
        .as_ref()
        .ok_or_else(|| QrBuilderError::internal("Failed to load embedded font"))
}

/// Width and height in pixels of `text` at `font_size`.
pub fn measure_text(text: &str, font_size: f32) -> Result<(u32, u32)> {
    let font = default_font()?;
    let scaled_font = font.as_scaled(PxScale::from(font_size));

    let mut width = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;
    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }
        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Ok((width.ceil() as u32, scaled_font.height().ceil() as u32))
}

/// Largest whole font size whose rendering fits inside a `side` square.
pub fn fit_font_size(text: &str, side: u32) -> Result<f32> {
    let fits = |size: u32| -> Result<bool> {
        let (w, h) = measure_text(text, size as f32)?;
        Ok(w <= side && h <= side)
    };

    // Rendered extent grows monotonically with size, so bisect
    let mut low = MIN_AUTO_FONT_SIZE as u32;
    let mut high = side;
    if high <= low || !fits(low + 1)? {
        return Ok(MIN_AUTO_FONT_SIZE);
    }
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if fits(mid)? {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low as f32)
}

/// Render `text` centered on a transparent `side x side` canvas.
///
/// An explicit font size may not exceed `side`. Glyphs that still do not
/// fit are clipped at the canvas edge.
pub fn render_text_square(
    text: &str,
    side: u32,
    font_size: Option<f32>,
    color: Color,
) -> Result<RgbaImage> {
    if text.trim().is_empty() {
        return Err(QrBuilderError::invalid_input("Text cannot be empty."));
    }
    if side == 0 {
        return Err(QrBuilderError::invalid_input("Text area is too small."));
    }

    let font_size = match font_size {
        Some(size) => {
            validate_font_size(size, side)?;
            size
        }
        None => fit_font_size(text, side)?,
    };

    let font = default_font()?;
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);

    let (text_w, text_h) = measure_text(text, font_size)?;
    let offset_x = (side as f32 - text_w as f32) / 2.0;
    let offset_y = (side as f32 - text_h as f32) / 2.0;
    let baseline_y = offset_y + scaled_font.ascent();

    let mut canvas = RgbaImage::new(side, side);
    let mut cursor_x = offset_x;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x < 0 || y < 0 || x >= side as i32 || y >= side as i32 {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * color.a as f32) as u8;
                let existing = canvas.get_pixel(x as u32, y as u32);
                // Overlapping antialiased edges keep the strongest coverage
                if alpha > existing[3] {
                    canvas.put_pixel(x as u32, y as u32, Rgba([color.r, color.g, color.b, alpha]));
                }
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Ok(canvas)
}
