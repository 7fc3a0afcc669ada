//! Compositor for pasting QR codes and overlays onto images.
//!
//! Two modes are supported:
//!
//! - **Background embed**: a rendered QR is alpha-blended onto a background
//!   photo at a computed placement. The output keeps the background's
//!   dimensions and drops the alpha channel again if the background had none.
//! - **Center overlay**: a logo or text image is pasted in the middle of a QR,
//!   on top of an opaque box painted in the QR back color so the overlay
//!   stays readable and the remaining modules keep their contrast.
//!
//! Layers may lie partially or completely outside the canvas. Pixels that
//! fall off the target are dropped; nothing here ever fails on placement.

use super::position::{Placement, PlacementPosition};
use crate::color::Color;
use image::{DynamicImage, Rgba, RgbaImage};

/// Composite `qr` onto `background` at `placement`.
///
/// The QR alpha channel is the blend mask.
pub fn embed(background: &DynamicImage, qr: &RgbaImage, placement: Placement) -> DynamicImage {
    let had_alpha = background.color().has_alpha();
    let mut canvas = background.to_rgba8();

    let position = placement.resolve(canvas.width(), canvas.height(), qr.width());
    paste(&mut canvas, qr, position);

    tracing::debug!(
        width = canvas.width(),
        height = canvas.height(),
        qr_size = qr.width(),
        x = position.x,
        y = position.y,
        anchor = %placement.anchor,
        "Embedded QR into background"
    );

    if had_alpha {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }
}

/// Paste `overlay` in the center of `qr` over a `back`-colored box.
///
/// The box side is the overlay side plus `padding` on each edge.
pub fn overlay_center(qr: &mut RgbaImage, overlay: &RgbaImage, padding: u32, back: Color) {
    let (qr_w, qr_h) = (qr.width() as i64, qr.height() as i64);
    let (ov_w, ov_h) = (overlay.width() as i64, overlay.height() as i64);
    let pad = padding as i64;

    let box_w = ov_w + pad * 2;
    let box_h = ov_h + pad * 2;
    let box_pos = PlacementPosition::new(
        (qr_w - box_w).div_euclid(2) as i32,
        (qr_h - box_h).div_euclid(2) as i32,
    );
    fill_rect(qr, box_pos, box_w as u32, box_h as u32, back.to_rgba());

    let overlay_pos = PlacementPosition::new(
        (qr_w - ov_w).div_euclid(2) as i32,
        (qr_h - ov_h).div_euclid(2) as i32,
    );
    paste(qr, overlay, overlay_pos);
}

/// Fill a rectangle with an opaque color, clipped to the target.
pub fn fill_rect(target: &mut RgbaImage, origin: PlacementPosition, width: u32, height: u32, color: Rgba<u8>) {
    let target_width = target.width() as i64;
    let target_height = target.height() as i64;

    let x_start = (origin.x as i64).max(0);
    let y_start = (origin.y as i64).max(0);
    let x_end = (origin.x as i64 + width as i64).min(target_width);
    let y_end = (origin.y as i64 + height as i64).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            target.put_pixel(tx as u32, ty as u32, color);
        }
    }
}

/// Alpha-blend `layer` onto `target` with its top-left corner at `position`.
pub fn paste(target: &mut RgbaImage, layer: &RgbaImage, position: PlacementPosition) {
    let target_width = target.width() as i64;
    let target_height = target.height() as i64;

    let px = position.x as i64;
    let py = position.y as i64;

    // Visible region, clamped to target bounds
    let x_start = px.max(0);
    let y_start = py.max(0);
    let x_end = (px + layer.width() as i64).min(target_width);
    let y_end = (py + layer.height() as i64).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let lx = (tx - px) as u32;
            let ly = (ty - py) as u32;

            let fg = *layer.get_pixel(lx, ly);
            let bg = *target.get_pixel(tx as u32, ty as u32);
            target.put_pixel(tx as u32, ty as u32, blend_pixels(bg, fg));
        }
    }
}

/// Porter-Duff "over": result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    match foreground[3] {
        255 => return foreground,
        0 => return background,
        _ => {}
    }

    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
