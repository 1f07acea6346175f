use image::{ColorType, ImageFormat};
use thiserror::Error;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero, or exceeds what the container can address
    #[error("Invalid dimensions: {width}x{height} cannot be encoded")]
    InvalidDimensions { width: u32, height: u32 },

    /// The pixel layout must be converted before encoding
    #[error("Unsupported color type for JPEG: {0:?}")]
    UnsupportedColor(ColorType),

    /// Only JPEG and PNG are produced
    #[error("Unsupported output format: {0:?}")]
    UnsupportedFormat(ImageFormat),

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}
