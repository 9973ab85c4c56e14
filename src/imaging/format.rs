//! Supported image formats and their static lookup tables.

use std::fmt;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::error::{FormatError, ImageError};

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Image formats the service can decode and produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Png,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
}

/// Every supported format, in lookup order.
pub const ALL_IMAGE_TYPES: [ImageType; 5] = [
    ImageType::Png,
    ImageType::Jpeg,
    ImageType::Bmp,
    ImageType::Gif,
    ImageType::Tiff,
];

impl ImageType {
    /// Format name as accepted by [`ImageType::parse`].
    pub fn name(self) -> &'static str {
        match self {
            ImageType::Png => "Png",
            ImageType::Jpeg => "Jpeg",
            ImageType::Bmp => "Bmp",
            ImageType::Gif => "Gif",
            ImageType::Tiff => "Tiff",
        }
    }

    /// MIME type served for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Bmp => "image/bmp",
            ImageType::Gif => "image/gif",
            ImageType::Tiff => "image/tiff",
        }
    }

    /// File extensions (without the dot) recognised for this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageType::Png => &["png"],
            ImageType::Jpeg => &["jpg", "jpeg"],
            ImageType::Bmp => &["bmp"],
            ImageType::Gif => &["gif"],
            ImageType::Tiff => &["tiff", "tif"],
        }
    }

    /// The `image` crate's codec identifier.
    pub fn image_format(self) -> ImageFormat {
        match self {
            ImageType::Png => ImageFormat::Png,
            ImageType::Jpeg => ImageFormat::Jpeg,
            ImageType::Bmp => ImageFormat::Bmp,
            ImageType::Gif => ImageFormat::Gif,
            ImageType::Tiff => ImageFormat::Tiff,
        }
    }

    /// Map a codec identifier back to a supported format.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        ALL_IMAGE_TYPES
            .into_iter()
            .find(|t| t.image_format() == format)
    }

    /// Parse a requested output format by name, ignoring case.
    ///
    /// Returns `Ok(None)` for a blank input, meaning "keep the source format".
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::ImageType`] for names outside the supported set.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, FormatError> {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let text = raw.trim();

        ALL_IMAGE_TYPES
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(text))
            .map(Some)
            .ok_or_else(|| FormatError::ImageType {
                raw: raw.to_string(),
            })
    }

    /// Encode a raster in this format.
    ///
    /// JPEG has no alpha channel, so rasters are flattened to RGB first.
    pub fn encode(self, raster: &DynamicImage, jpeg_quality: u8) -> Result<Vec<u8>, ImageError> {
        let encode_error = |e: image::ImageError| ImageError::Encode {
            format: self.name(),
            message: e.to_string(),
        };

        let mut output = Vec::new();
        match self {
            ImageType::Jpeg => {
                let quality = clamp_quality(jpeg_quality);
                let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
                encoder
                    .encode_image(&raster.to_rgb8())
                    .map_err(encode_error)?;
            }
            // The GIF encoder only takes 8-bit RGB(A)
            ImageType::Gif => {
                DynamicImage::ImageRgba8(raster.to_rgba8())
                    .write_to(&mut Cursor::new(&mut output), self.image_format())
                    .map_err(encode_error)?;
            }
            _ => {
                raster
                    .write_to(&mut Cursor::new(&mut output), self.image_format())
                    .map_err(encode_error)?;
            }
        }
        Ok(output)
    }

    /// Decode bytes that are known to be in this format.
    pub fn decode(self, data: &[u8]) -> Result<DynamicImage, ImageError> {
        image::load_from_memory_with_format(data, self.image_format()).map_err(|e| {
            ImageError::Decode {
                message: e.to_string(),
            }
        })
    }
}

impl fmt::Display for ImageType {
    /// Canonical lowercase name, as used in cache keys.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_ascii_lowercase())
    }
}

/// Every file extension any supported format uses.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    ALL_IMAGE_TYPES
        .into_iter()
        .flat_map(|t| t.extensions().iter().copied())
}

/// Decode bytes of unknown format, detecting it from the content.
///
/// # Errors
///
/// Returns [`ImageError::Decode`] if the content is not a supported format or
/// fails to decode.
pub fn decode_any(data: &[u8]) -> Result<(DynamicImage, ImageType), ImageError> {
    let detected = image::guess_format(data).map_err(|e| ImageError::Decode {
        message: e.to_string(),
    })?;
    let image_type = ImageType::from_image_format(detected).ok_or_else(|| ImageError::Decode {
        message: format!("unsupported image format {detected:?}"),
    })?;
    let raster = image_type.decode(data)?;
    Ok((raster, image_type))
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}
