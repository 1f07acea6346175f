//! Size-bounded re-encoding.
//!
//! # Algorithm
//!
//! 1. Encode once in the natural format (the source format when it is JPEG
//!    or PNG, JPEG otherwise) with codec defaults. If that fits the budget it
//!    is returned as-is and no quality search happens.
//! 2. Otherwise flatten the image to a JPEG-compatible layout, once. Images
//!    stored with alpha or a palette always become three-channel RGB.
//! 3. Encode JPEG at qualities 95, 90, ... while the quality stays strictly
//!    above the floor of 10, i.e. down to 15. The first candidate that fits
//!    wins.
//! 4. If nothing fits, fail. An over-budget buffer is never returned.
//!
//! Output size is not monotone in quality, so the search never skips ahead
//! or bisects; every step is tried in order.

use std::borrow::Cow;

use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::{debug, info};

use crate::budget::SizeBudget;
use crate::decode::SourceImage;
use crate::encode::{encode_jpeg, encode_natural, natural_format, to_jpeg_compatible, EncodeError};

/// First quality tried once the natural encode is over budget.
pub const QUALITY_START: u8 = 95;

/// Distance between consecutive qualities.
pub const QUALITY_STEP: u8 = 5;

/// Exclusive lower bound: the search stops before reaching it.
pub const QUALITY_FLOOR: u8 = 10;

/// Errors that end a compression attempt without a result.
#[derive(Debug, Error)]
pub enum CompressError {
    /// An encoder failed outright
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Every quality step was tried and none fit
    #[error(
        "no JPEG quality above {floor} fits within {budget} (smallest attempt: {smallest_bytes} bytes)",
        floor = QUALITY_FLOOR
    )]
    BudgetUnreachable {
        budget: SizeBudget,
        smallest_bytes: usize,
    },
}

/// An encoded image that satisfies its budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeResult {
    bytes: Vec<u8>,
    format: ImageFormat,
    quality: Option<u8>,
}

impl EncodeResult {
    fn new(bytes: Vec<u8>, format: ImageFormat, quality: Option<u8>) -> Self {
        Self {
            bytes,
            format,
            quality,
        }
    }

    /// The encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the encoded bytes.
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// JPEG quality that produced the bytes, or `None` for the natural encode.
    pub fn quality(&self) -> Option<u8> {
        self.quality
    }

    /// Container the bytes are written in.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type of [`Self::format`].
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Qualities the search tries, highest first: 95, 90, ..., 15.
pub fn quality_steps() -> impl Iterator<Item = u8> {
    std::iter::successors(Some(QUALITY_START), |q| q.checked_sub(QUALITY_STEP))
        .take_while(|q| *q > QUALITY_FLOOR)
}

/// Re-encode `source` so it fits within `budget`.
///
/// # Returns
///
/// The natural encode unchanged (`quality() == None`) when it already fits,
/// otherwise the first JPEG candidate that fits.
///
/// # Errors
///
/// `CompressError::BudgetUnreachable` when no candidate fits, and
/// `CompressError::Encode` if an encoder rejects the image.
pub fn compress(source: &SourceImage, budget: SizeBudget) -> Result<EncodeResult, CompressError> {
    let format = natural_format(source.source_format());

    // A JPEG natural encode already needs the flattened buffer; keep it for the search.
    let mut converted = None;
    let natural = match format {
        ImageFormat::Jpeg => encode_natural(converted.insert(jpeg_input(source)), format)?,
        _ => encode_natural(source.image(), format)?,
    };

    if budget.fits(natural.len()) {
        info!(
            ?format,
            size = natural.len(),
            %budget,
            "natural encoding fits, returning unchanged"
        );
        return Ok(EncodeResult::new(natural, format, None));
    }

    debug!(
        ?format,
        size = natural.len(),
        %budget,
        color_mode = ?source.color_mode(),
        "natural encoding over budget, searching JPEG quality"
    );

    let converted = converted.unwrap_or_else(|| jpeg_input(source));
    let result = search_quality(budget, |quality| encode_jpeg(&converted, quality))?;

    info!(
        quality = ?result.quality(),
        size = result.size_bytes(),
        %budget,
        "compressed within budget"
    );
    Ok(result)
}

/// The buffer every quality candidate is encoded from.
///
/// The stored color mode decides first: alpha and palette sources are
/// flattened to RGB even when their decoded pixels are grayscale.
fn jpeg_input(source: &SourceImage) -> Cow<'_, DynamicImage> {
    if source.color_mode().needs_rgb_conversion() {
        Cow::Owned(DynamicImage::ImageRgb8(source.image().to_rgb8()))
    } else {
        to_jpeg_compatible(source.image())
    }
}

/// Walk [`quality_steps`] with `encode_at`, returning the first candidate
/// that fits.
pub(crate) fn search_quality<F>(budget: SizeBudget, mut encode_at: F) -> Result<EncodeResult, CompressError>
where
    F: FnMut(u8) -> Result<Vec<u8>, EncodeError>,
{
    let mut smallest_bytes = usize::MAX;

    for quality in quality_steps() {
        let candidate = encode_at(quality)?;
        let size = candidate.len();
        debug!(quality, size, "encoded candidate");

        if budget.fits(size) {
            return Ok(EncodeResult::new(candidate, ImageFormat::Jpeg, Some(quality)));
        }
        smallest_bytes = smallest_bytes.min(size);
    }

    Err(CompressError::BudgetUnreachable {
        budget,
        smallest_bytes,
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use proptest::prelude::*;

    proptest! {
        /// Property: a result always fits its budget; otherwise the failure is definitive.
        #[test]
        fn prop_result_fits_or_fails(
            (width, height) in (1u32..=48, 1u32..=48),
            kb in 0u32..=4,
            seed in any::<u32>(),
            png in any::<bool>(),
        ) {
            let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
                let v = seed.wrapping_mul(x + 1).wrapping_add(y.wrapping_mul(2654435761));
                image::Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
            }));
            let format = if png { ImageFormat::Png } else { ImageFormat::Jpeg };
            let budget = SizeBudget::from_kilobytes(kb);

            match compress(&SourceImage::new(img, Some(format)), budget) {
                Ok(result) => prop_assert!(budget.fits(result.size_bytes())),
                Err(CompressError::BudgetUnreachable { smallest_bytes, .. }) => {
                    prop_assert!(!budget.fits(smallest_bytes))
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        /// Property: images whose natural encode fits come back byte-for-byte.
        #[test]
        fn prop_pass_through_is_identity(
            (width, height) in (1u32..=32, 1u32..=32),
            value in any::<u8>(),
        ) {
            let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([value, value, 255 - value])));
            let source = SourceImage::new(img.clone(), Some(ImageFormat::Png));

            let result = compress(&source, SizeBudget::default()).unwrap();

            prop_assert_eq!(result.quality(), None);
            prop_assert_eq!(result.into_bytes(), encode_natural(&img, ImageFormat::Png).unwrap());
        }
    }
}
