//! imgcap Core - Size-bounded image re-encoding
//!
//! This crate provides the image side of imgcap: decoding uploads, encoding
//! them in their natural format, and searching JPEG quality until the output
//! fits a byte budget.
//!
//! # Module Structure
//!
//! - `decode` - Format detection, decoding and EXIF orientation
//! - `encode` - Natural-format and quality-controlled JPEG encoding
//! - `budget` - The kilobyte ceiling and its comparison rule
//! - `compress` - The bounded quality search

pub mod budget;
pub mod compress;
pub mod decode;
pub mod encode;

pub use budget::SizeBudget;
pub use compress::{compress, quality_steps, CompressError, EncodeResult};
pub use decode::{decode, ColorMode, DecodeError, SourceImage};
pub use encode::EncodeError;
