//! Image encoding for imgcap.
//!
//! This module provides functionality for:
//! - Encoding an image once in its natural container (JPEG or PNG) with
//!   codec defaults
//! - Encoding JPEG at an explicit quality with optimized Huffman tables
//! - Flattening color layouts that JPEG cannot carry
//!
//! All operations are synchronous and work on in-memory buffers.

mod convert;
mod error;
mod jpeg;
mod natural;

pub use convert::to_jpeg_compatible;
pub use error::EncodeError;
pub use jpeg::encode_jpeg;
pub use natural::{encode_natural, natural_format, FALLBACK_FORMAT, NATURAL_JPEG_QUALITY};
