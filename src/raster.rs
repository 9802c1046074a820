//! Raster encoding of bar models.
//!
//! # Responsibilities
//! - Map output formats to MIME types
//! - Serialize a BarModel as GIF, JPEG or PNG bytes
//!
//! # Design Decisions
//! - One pixel per module; scaling happens before rasterization
//! - Dark modules are black, light modules white, 8-bit grayscale
//! - JPEG quality fixed at 90

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Frame, GrayImage, ImageFormat, Luma};
use thiserror::Error;

use crate::symbology::BarModel;

const JPEG_QUALITY: u8 = 90;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Gif,
    Jpg,
    Png,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Gif, OutputFormat::Jpg, OutputFormat::Png];

    /// File extension as it appears in request paths.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "gif",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "image/gif",
            OutputFormat::Jpg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.extension() == s)
            .ok_or_else(|| RasterError::UnknownFormat(s.to_string()))
    }
}

/// Errors raised while producing image bytes.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Capability that serializes a bar model into image bytes.
pub trait RasterEncoder: Send + Sync {
    fn encode(&self, model: &BarModel, format: OutputFormat) -> Result<Vec<u8>, RasterError>;
}

/// Raster encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRaster;

impl RasterEncoder for ImageRaster {
    fn encode(&self, model: &BarModel, format: OutputFormat) -> Result<Vec<u8>, RasterError> {
        let image = to_gray_image(model);
        let mut bytes = Vec::new();

        match format {
            OutputFormat::Gif => {
                let rgba = DynamicImage::ImageLuma8(image).to_rgba8();
                let mut encoder = GifEncoder::new(&mut bytes);
                encoder.encode_frame(Frame::new(rgba))?;
            }
            OutputFormat::Jpg => {
                let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
                DynamicImage::ImageLuma8(image).write_with_encoder(encoder)?;
            }
            OutputFormat::Png => {
                image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
            }
        }

        Ok(bytes)
    }
}

fn to_gray_image(model: &BarModel) -> GrayImage {
    GrayImage::from_fn(model.width(), model.height(), |x, y| {
        if model.is_dark(x, y) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}
