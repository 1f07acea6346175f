//! Image decoding for imgcap.
//!
//! This module provides functionality for:
//! - Decoding uploaded bytes of any enabled container format (JPEG, PNG,
//!   GIF, BMP, WebP, TIFF), detected from magic bytes
//! - Baking EXIF orientation into the pixels
//! - Reporting the stored color layout, including palette-indexed files
//!
//! # Examples
//!
//! ```ignore
//! use imgcap_core::decode::decode;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width(), image.height());
//! ```

mod orientation;
mod types;

use std::io::Cursor;

use image::{GenericImageView, ImageError, ImageFormat, ImageReader};
use tracing::debug;

pub use orientation::{apply_orientation, get_orientation};
pub use types::{ColorMode, DecodeError, Orientation, SourceImage};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Byte offset of the IHDR color type in a PNG stream.
const PNG_COLOR_TYPE_OFFSET: usize = 25;

const PNG_COLOR_TYPE_INDEXED: u8 = 3;

/// Decode an uploaded image, applying EXIF orientation correction.
///
/// # Arguments
///
/// * `bytes` - Raw file bytes as uploaded
///
/// # Returns
///
/// A `SourceImage` carrying the pixels, the detected container format and
/// the stored color mode.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for zero-length input,
/// `DecodeError::InvalidFormat` if the format is not recognized or its
/// decoder is not enabled, and `DecodeError::CorruptedFile` if decoding fails.
pub fn decode(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let orientation = get_orientation(bytes);
    let img = apply_orientation(img, orientation);

    let color_mode = if is_indexed(bytes, format) {
        ColorMode::Indexed
    } else {
        ColorMode::from_color_type(img.color())
    };

    debug!(
        ?format,
        ?color_mode,
        ?orientation,
        width = img.width(),
        height = img.height(),
        "decoded upload"
    );

    Ok(SourceImage::with_color_mode(img, Some(format), color_mode))
}

/// Whether the container stores palette indices rather than color samples.
///
/// GIF is always indexed; PNG declares it in the IHDR color type.
fn is_indexed(bytes: &[u8], format: ImageFormat) -> bool {
    match format {
        ImageFormat::Gif => true,
        ImageFormat::Png => {
            bytes.starts_with(PNG_SIGNATURE)
                && bytes.get(PNG_COLOR_TYPE_OFFSET) == Some(&PNG_COLOR_TYPE_INDEXED)
        }
        _ => false,
    }
}
