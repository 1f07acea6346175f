//! Natural-format encoding: the first, unreduced encode of an upload.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageFormat};

use super::{to_jpeg_compatible, EncodeError};

/// Container used when the source format is unknown or not JPEG/PNG.
pub const FALLBACK_FORMAT: ImageFormat = ImageFormat::Jpeg;

/// The JPEG codec's default quality, used for the natural encode.
pub const NATURAL_JPEG_QUALITY: u8 = 75;

/// Pick the container the natural encode is written in.
///
/// JPEG and PNG sources keep their format; anything else (GIF, BMP, WebP,
/// TIFF, unknown) falls back to [`FALLBACK_FORMAT`].
pub fn natural_format(source: Option<ImageFormat>) -> ImageFormat {
    match source {
        Some(ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Some(ImageFormat::Png) => ImageFormat::Png,
        _ => FALLBACK_FORMAT,
    }
}

/// Encode an image once in `format` with the codec's default settings.
///
/// JPEG output is written from the [`to_jpeg_compatible`] form of the image;
/// PNG keeps every layout the PNG codec supports (8/16-bit gray, gray+alpha,
/// RGB, RGBA) and narrows float images to 16-bit.
///
/// # Errors
///
/// Returns `UnsupportedFormat` for anything but JPEG or PNG, and
/// `EncodingFailed` if the codec rejects the image.
pub fn encode_natural(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let mut buffer = Cursor::new(Vec::new());

    match format {
        ImageFormat::Jpeg => {
            let compatible = to_jpeg_compatible(image);
            JpegEncoder::new_with_quality(&mut buffer, NATURAL_JPEG_QUALITY)
                .write_image(
                    compatible.as_bytes(),
                    width,
                    height,
                    ExtendedColorType::from(compatible.color()),
                )
                .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
        }
        ImageFormat::Png => {
            let storable;
            let png_ready = match image {
                DynamicImage::ImageRgb32F(_) => {
                    storable = DynamicImage::ImageRgb16(image.to_rgb16());
                    &storable
                }
                DynamicImage::ImageRgba32F(_) => {
                    storable = DynamicImage::ImageRgba16(image.to_rgba16());
                    &storable
                }
                other => other,
            };
            PngEncoder::new(&mut buffer)
                .write_image(
                    png_ready.as_bytes(),
                    width,
                    height,
                    ExtendedColorType::from(png_ready.color()),
                )
                .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
        }
        other => return Err(EncodeError::UnsupportedFormat(other)),
    }

    Ok(buffer.into_inner())
}
