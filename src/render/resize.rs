//! Lanczos3 resampling via fast_image_resize.

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::RgbaImage;
use std::num::NonZeroU32;

use crate::error::{QrBuilderError, Result};

/// Resize an RGBA image to exactly `target_w x target_h`.
///
/// Alpha is premultiplied around the convolution so transparent pixels do
/// not bleed their color into opaque neighbours.
pub fn resize_rgba(img: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage> {
    if img.width() == target_w && img.height() == target_h {
        return Ok(img.clone());
    }

    let src_width = NonZeroU32::new(img.width())
        .ok_or_else(|| QrBuilderError::image("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| QrBuilderError::image("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| QrBuilderError::image("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| QrBuilderError::image("Target height is 0"))?;

    let mut src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)
        .map_err(|e| QrBuilderError::image(format!("Failed to create source image: {:?}", e)))?;

    let alpha_mul_div = MulDiv::default();
    alpha_mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| QrBuilderError::image(format!("Alpha premultiply failed: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| QrBuilderError::image(format!("Resize operation failed: {:?}", e)))?;

    alpha_mul_div
        .divide_alpha_inplace(&mut dst_image.view_mut())
        .map_err(|e| QrBuilderError::image(format!("Alpha divide failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| QrBuilderError::image("Failed to create output image buffer"))
}

/// Resize to a `side x side` square, ignoring the source aspect ratio.
pub fn resize_square(img: &RgbaImage, side: u32) -> Result<RgbaImage> {
    resize_rgba(img, side, side)
}
