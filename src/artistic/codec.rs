//! Artistic and halftone codecs.
//!
//! Codecs work on file paths: they read a picture from disk and write a PNG
//! to the given output path. This keeps external tools and the built-in
//! renderers interchangeable.

use image::imageops::{self, BiLevel};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use std::path::Path;

use super::{ArtisticRequest, QartRequest};
use crate::color::Color;
use crate::constants::DEFAULT_BORDER;
use crate::error::Result;
use crate::render::{open_image, resize_rgba, ModuleMatrix, PngEncoder};
use crate::validate::validate_halftone_side;

/// Sub-cells per module edge; the center cell carries the module bit.
const CELLS_PER_MODULE: u32 = 3;

/// Pixels per sub-cell in built-in artistic output.
const ARTISTIC_CELL_PX: u32 = 4;

/// Halftone canvas edge for a symbol of `modules` modules.
pub(crate) fn halftone_side(modules: u64, point_size: u32) -> u64 {
    (modules + DEFAULT_BORDER as u64 * 2) * CELLS_PER_MODULE as u64 * point_size as u64
}

/// Renders a picture-as-pattern QR.
pub trait ArtisticCodec: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, request: &ArtisticRequest, picture: &Path, output: &Path) -> Result<()>;
}

/// Renders a halftone (dithered dots) QR.
pub trait HalftoneCodec: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, request: &QartRequest, picture: &Path, output: &Path) -> Result<()>;
}

/// In-process artistic codec.
///
/// The picture, after contrast/brightness adjustment, fills the symbol
/// area. Every module's center cell is painted black or white according to
/// the module bit, and finder patterns are drawn solid so scanners can
/// lock on.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinArtistic {
    pub encoder: PngEncoder,
}

impl ArtisticCodec for BuiltinArtistic {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn render(&self, request: &ArtisticRequest, picture: &Path, output: &Path) -> Result<()> {
        let matrix = ModuleMatrix::encode(&request.data, Some(request.version as i16))?;
        let modules = matrix.width() as u32;
        let border = DEFAULT_BORDER;
        let module_px = CELLS_PER_MODULE * ARTISTIC_CELL_PX;
        let side = (modules + border * 2) * module_px;
        let symbol_px = modules * module_px;

        let mut picture = open_image(picture)?.to_rgba8();
        enhance(&mut picture, request.contrast, request.brightness);
        if !request.colorized {
            picture = grayscale_rgba(&picture);
        }
        let picture = resize_rgba(&picture, symbol_px, symbol_px)?;

        let dark = Rgba([0, 0, 0, 255]);
        let light = Rgba([255, 255, 255, 255]);
        let origin = border * module_px;

        let canvas = RgbaImage::from_fn(side, side, |x, y| {
            if x < origin || y < origin || x >= origin + symbol_px || y >= origin + symbol_px {
                return light;
            }
            let (sx, sy) = (x - origin, y - origin);
            let (mx, my) = ((sx / module_px) as usize, (sy / module_px) as usize);
            let module_color = if matrix.is_dark(mx, my) { dark } else { light };

            let cell_x = (sx % module_px) / ARTISTIC_CELL_PX;
            let cell_y = (sy % module_px) / ARTISTIC_CELL_PX;
            let is_center = cell_x == CELLS_PER_MODULE / 2 && cell_y == CELLS_PER_MODULE / 2;

            if matrix.is_finder(mx, my) || is_center {
                module_color
            } else {
                let mut px = *picture.get_pixel(sx, sy);
                px[3] = 255;
                px
            }
        });

        tracing::debug!(
            version = request.version,
            modules,
            side,
            colorized = request.colorized,
            "Rendered artistic QR"
        );

        self.encoder.save(&image::DynamicImage::ImageRgba8(canvas), output)
    }
}

/// In-process halftone codec.
///
/// The picture is reduced to one luma sample per dot, dithered (or
/// thresholded) to black and white, and drawn as `point_size` pixel dots.
/// Each module's center dot is forced to the module bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinHalftone {
    pub encoder: PngEncoder,
}

impl HalftoneCodec for BuiltinHalftone {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn render(&self, request: &QartRequest, picture: &Path, output: &Path) -> Result<()> {
        let matrix = ModuleMatrix::encode(&request.data, Some(request.version as i16))?;
        let modules = matrix.width() as u32;
        validate_halftone_side(halftone_side(modules as u64, request.point_size))?;
        let border = DEFAULT_BORDER;
        let grid = (modules + border * 2) * CELLS_PER_MODULE;
        let symbol_dots = modules * CELLS_PER_MODULE;
        let origin = border * CELLS_PER_MODULE;

        // With `fast` only the symbol area carries picture dots
        let (picture_dots, picture_origin) = if request.fast {
            (symbol_dots, origin)
        } else {
            (grid, 0)
        };

        let source = open_image(picture)?.to_rgba8();
        let sampled = resize_rgba(&source, picture_dots, picture_dots)?;
        let mut halftone = luma_over_white(&sampled);
        if request.dither {
            imageops::dither(&mut halftone, &BiLevel);
        } else {
            threshold(&mut halftone, 128);
        }

        let ink = request.color.to_rgba();
        let paper = Color::white().to_rgba();
        let dot_is_dark = |dx: u32, dy: u32| -> bool {
            // Symbol modules: finders solid, center dots forced
            if dx >= origin && dy >= origin && dx < origin + symbol_dots && dy < origin + symbol_dots {
                let (sx, sy) = (dx - origin, dy - origin);
                let (mx, my) = ((sx / CELLS_PER_MODULE) as usize, (sy / CELLS_PER_MODULE) as usize);
                let center = sx % CELLS_PER_MODULE == 1 && sy % CELLS_PER_MODULE == 1;
                if center || matrix.is_finder(mx, my) {
                    return matrix.is_dark(mx, my);
                }
            }
            let in_picture = dx >= picture_origin
                && dy >= picture_origin
                && dx < picture_origin + picture_dots
                && dy < picture_origin + picture_dots;
            in_picture && halftone.get_pixel(dx - picture_origin, dy - picture_origin)[0] < 128
        };

        let point = request.point_size;
        let side = grid * point;
        let canvas = RgbaImage::from_fn(side, side, |x, y| {
            if dot_is_dark(x / point, y / point) {
                ink
            } else {
                paper
            }
        });

        tracing::debug!(
            version = request.version,
            modules,
            point_size = point,
            dither = request.dither,
            fast = request.fast,
            "Rendered halftone QR"
        );

        self.encoder.save(&image::DynamicImage::ImageRgba8(canvas), output)
    }
}

/// Apply brightness then contrast with multiplicative factors.
///
/// Brightness scales every channel; contrast pushes channels away from
/// (or toward) the image's mean luma. A factor of 1.0 is the identity.
pub fn enhance(image: &mut RgbaImage, contrast: f32, brightness: f32) {
    if (brightness - 1.0).abs() > f32::EPSILON {
        for px in image.pixels_mut() {
            for c in 0..3 {
                px[c] = (px[c] as f32 * brightness).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    if (contrast - 1.0).abs() > f32::EPSILON {
        let count = (image.width() as u64 * image.height() as u64).max(1) as f32;
        let mean = image.pixels().map(|p| luma(p) as f32).sum::<f32>() / count;
        for px in image.pixels_mut() {
            for c in 0..3 {
                let value = mean + (px[c] as f32 - mean) * contrast;
                px[c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn luma(px: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = px.0;
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

fn grayscale_rgba(image: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let l = luma(px);
        Rgba([l, l, l, px[3]])
    })
}

/// Luma of the picture flattened over a white page.
fn luma_over_white(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let alpha = px[3] as f32 / 255.0;
        let l = luma(px) as f32 * alpha + 255.0 * (1.0 - alpha);
        Luma([l.round().clamp(0.0, 255.0) as u8])
    })
}

fn threshold(image: &mut GrayImage, level: u8) {
    for px in image.pixels_mut() {
        px[0] = if px[0] < level { 0 } else { 255 };
    }
}
