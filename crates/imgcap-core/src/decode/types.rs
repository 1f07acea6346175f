//! Core types for image decoding.

use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No bytes were supplied.
    #[error("Image data is empty")]
    Empty,

    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Per-pixel channel layout of a decoded image.
///
/// `Indexed` reports the layout the file was stored in. The decoder expands
/// palette entries, so the pixels of an indexed image are RGB or RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Three-channel truecolor.
    Rgb,
    /// Four-channel truecolor with alpha.
    Rgba,
    /// Single-channel luminance.
    Grayscale,
    /// Luminance with alpha.
    GrayscaleAlpha,
    /// Palette-indexed color.
    Indexed,
}

impl ColorMode {
    /// Classify a decoded buffer's color type, ignoring bit depth.
    pub fn from_color_type(color: ColorType) -> Self {
        match (color.has_color(), color.has_alpha()) {
            (true, true) => ColorMode::Rgba,
            (true, false) => ColorMode::Rgb,
            (false, true) => ColorMode::GrayscaleAlpha,
            (false, false) => ColorMode::Grayscale,
        }
    }

    /// Whether JPEG output needs the image flattened to three channels first.
    ///
    /// JPEG has no alpha or palette channel.
    pub fn needs_rgb_conversion(self) -> bool {
        matches!(
            self,
            ColorMode::Rgba | ColorMode::GrayscaleAlpha | ColorMode::Indexed
        )
    }
}

/// A decoded image together with where it came from.
///
/// Owned by a single upload for its whole lifetime.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
    source_format: Option<ImageFormat>,
    color_mode: ColorMode,
}

impl SourceImage {
    /// Wrap a decoded image, deriving the color mode from its pixel layout.
    pub fn new(image: DynamicImage, source_format: Option<ImageFormat>) -> Self {
        let color_mode = ColorMode::from_color_type(image.color());
        Self {
            image,
            source_format,
            color_mode,
        }
    }

    /// Wrap a decoded image with an explicitly known color mode.
    pub fn with_color_mode(
        image: DynamicImage,
        source_format: Option<ImageFormat>,
        color_mode: ColorMode,
    ) -> Self {
        Self {
            image,
            source_format,
            color_mode,
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Channel layout the image was stored with.
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Container format the image was decoded from, if known.
    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    /// Borrow the decoded pixels.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}
