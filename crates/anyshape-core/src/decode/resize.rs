//! Image resizing for thumbnails.
//!
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Errors
///
/// Returns `DecodeError::InvalidSize` for a zero target dimension.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidSize { width, height });
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba = to_rgba(image)?;
    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());
    Ok(DecodedImage::from_rgba_image(resized))
}

/// Square thumbnail that covers `size x size`: the image is scaled so its
/// shorter edge fills the square, then center-cropped.
///
/// Small images are upscaled so list thumbnails stay uniform.
///
/// # Errors
///
/// Returns `DecodeError::InvalidSize` for `size == 0` or an empty source.
pub fn cover_thumbnail(image: &DecodedImage, size: u32) -> Result<DecodedImage, DecodeError> {
    if size == 0 || image.is_empty() {
        return Err(DecodeError::InvalidSize {
            width: size,
            height: size,
        });
    }

    let (crop_x, crop_y, crop_side) = center_square(image.width, image.height);
    let rgba = to_rgba(image)?;
    let cropped = image::imageops::crop_imm(&rgba, crop_x, crop_y, crop_side, crop_side).to_image();
    let square = DecodedImage::from_rgba_image(cropped);

    resize(&square, size, size, FilterType::Bilinear)
}

/// Largest centered square inside `width x height`, as `(x, y, side)`.
fn center_square(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}

fn to_rgba(image: &DecodedImage) -> Result<image::RgbaImage, DecodeError> {
    image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))
}
