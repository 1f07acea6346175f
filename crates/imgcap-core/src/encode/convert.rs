//! Color layout conversion ahead of JPEG encoding.

use std::borrow::Cow;

use image::{ColorType, DynamicImage};

/// Convert an image to a layout the JPEG encoder accepts.
///
/// * 8-bit RGB and 8-bit grayscale are borrowed unchanged.
/// * 16-bit grayscale is narrowed to 8-bit grayscale.
/// * Everything else (alpha-bearing, palette-expanded, 16-bit or float color)
///   becomes three-channel 8-bit RGB. Alpha is dropped, not composited.
///
/// The conversion is idempotent: converting an already converted image
/// borrows it.
pub fn to_jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::Rgb8 | ColorType::L8 => Cow::Borrowed(image),
        ColorType::L16 => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}
