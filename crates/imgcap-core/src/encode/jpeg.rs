//! JPEG encoding at an explicit quality.
//!
//! Uses `jpeg-encoder` with optimized Huffman tables.

use image::{ColorType, DynamicImage, GenericImageView};
use jpeg_encoder::{ColorType as JpegColor, Encoder};

use super::EncodeError;

/// Encode an 8-bit RGB or grayscale image to JPEG bytes.
///
/// # Arguments
///
/// * `image` - Image in `Rgb8` or `L8` layout (see [`super::to_jpeg_compatible`])
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Returns
///
/// JPEG-encoded bytes on success, or an error if encoding fails.
///
/// # Errors
///
/// * `UnsupportedColor` if the image carries alpha, a palette, or more than
///   8 bits per sample
/// * `InvalidDimensions` if either side is zero or above 65535
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    let (w, h) = jpeg_dimensions(width, height)?;

    let color = match image.color() {
        ColorType::Rgb8 => JpegColor::Rgb,
        ColorType::L8 => JpegColor::Luma,
        other => return Err(EncodeError::UnsupportedColor(other)),
    };

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, quality);
    encoder.set_optimized_huffman_tables(true);

    encoder
        .encode(image.as_bytes(), w, h, color)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}

/// JPEG frame headers address each side in 16 bits.
fn jpeg_dimensions(width: u32, height: u32) -> Result<(u16, u16), EncodeError> {
    let invalid = || EncodeError::InvalidDimensions { width, height };

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    let w = u16::try_from(width).map_err(|_| invalid())?;
    let h = u16::try_from(height).map_err(|_| invalid())?;
    Ok((w, h))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
