//! Transform engine.
//!
//! Applies the requested transforms in a fixed order:
//!
//! ```text
//! parse params → allocate canvas → fill background → draw source
//!              → watermark → re-encode into output format
//! ```
//!
//! # Design Decisions
//!
//! - **Always composite**: whenever any parameter is present the source is
//!   drawn onto a fresh opaque canvas (white unless a colour is requested), so
//!   transparent source pixels never survive into the output.
//!
//! - **Always re-encode**: the canvas is a raw RGBA buffer with no codec
//!   format of its own, so it is passed through the output format's encoder
//!   and decoder. The returned pixels then match what the format can hold
//!   (no alpha for JPEG, a palette for GIF), and the encoded bytes travel
//!   with them so later writes never encode again.
//!
//! - **Consumes its input**: the source image is moved in and dropped once
//!   drawn; callers receive a distinct image.

use bytes::Bytes;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::error::TransformError;
use crate::imaging::{
    clamp_quality, BackgroundColour, Image, ImageType, Raster, Resolution, DEFAULT_JPEG_QUALITY,
};

use super::watermark::draw_watermark;

// =============================================================================
// Transform Parameters
// =============================================================================

/// Raw, unparsed transform parameters as received from a request.
///
/// Blank values (empty or whitespace) count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformParams {
    /// Output resolution, `"W"` or `"WxH"`
    pub resolution: Option<String>,

    /// Background colour name or six hex digits
    pub background_colour: Option<String>,

    /// Watermark text
    pub watermark: Option<String>,

    /// Output format name
    pub image_type: Option<String>,
}

impl TransformParams {
    /// Parameters requesting no transforms.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_background_colour(mut self, colour: impl Into<String>) -> Self {
        self.background_colour = Some(colour.into());
        self
    }

    pub fn with_watermark(mut self, text: impl Into<String>) -> Self {
        self.watermark = Some(text.into());
        self
    }

    pub fn with_image_type(mut self, image_type: impl Into<String>) -> Self {
        self.image_type = Some(image_type.into());
        self
    }

    /// Returns `true` if every parameter is absent or blank.
    pub fn is_empty(&self) -> bool {
        [
            &self.resolution,
            &self.background_colour,
            &self.watermark,
            &self.image_type,
        ]
        .into_iter()
        .all(|p| p.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

// =============================================================================
// Transformer Trait
// =============================================================================

/// Applies transform parameters to an image.
///
/// Implementations are synchronous and CPU-bound; async callers should run
/// them on a blocking thread.
pub trait ImageTransformer: Send + Sync {
    /// Transform `image`, consuming it.
    ///
    /// # Errors
    ///
    /// - [`TransformError::InvalidArgument`] if the image has no raster
    /// - [`TransformError::Format`] if a parameter fails to parse
    /// - [`TransformError::Image`] if re-encoding fails
    fn apply(&self, image: Image, params: &TransformParams) -> Result<Image, TransformError>;
}

// =============================================================================
// Transform Engine
// =============================================================================

/// The default [`ImageTransformer`], backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    jpeg_quality: u8,
}

impl TransformEngine {
    /// Create an engine encoding JPEG output at the default quality.
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Create an engine encoding JPEG output at `quality` (clamped to 1-100).
    pub fn with_jpeg_quality(quality: u8) -> Self {
        Self {
            jpeg_quality: clamp_quality(quality),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Pass the canvas through `format`'s codec, keeping the encoded bytes.
    fn reencode(&self, canvas: RgbaImage, format: ImageType) -> Result<Raster, TransformError> {
        let encoded = format.encode(&DynamicImage::ImageRgba8(canvas), self.jpeg_quality)?;
        let pixels = format.decode(&encoded)?;
        Ok(Raster::with_encoded(pixels, format, Bytes::from(encoded)))
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTransformer for TransformEngine {
    fn apply(&self, image: Image, params: &TransformParams) -> Result<Image, TransformError> {
        if image.raster().is_none() {
            return Err(TransformError::InvalidArgument(format!(
                "image '{}' has no raster to transform",
                image.name()
            )));
        }
        if params.is_empty() {
            return Ok(image);
        }

        let resolution = Resolution::parse(params.resolution.as_deref())?;
        let background = BackgroundColour::parse(params.background_colour.as_deref())?
            .unwrap_or(BackgroundColour::WHITE);
        let requested_type = ImageType::parse(params.image_type.as_deref())?;
        let watermark = params
            .watermark
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());

        let name = image.name().to_string();
        let Some(source) = image.into_raster() else {
            return Err(TransformError::InvalidArgument(format!(
                "image '{name}' has no raster to transform"
            )));
        };
        let source_format = source.format();
        let source_pixels = source.into_pixels().into_rgba8();

        let (width, height) = match resolution {
            Some(res) => (res.width, res.height),
            None => source_pixels.dimensions(),
        };

        let mut canvas = RgbaImage::from_pixel(width, height, background.to_rgba());

        match resolution {
            Some(res) => {
                let scaled =
                    imageops::resize(&source_pixels, res.width, res.height, FilterType::CatmullRom);
                imageops::overlay(&mut canvas, &scaled, 0, 0);
            }
            None => imageops::overlay(&mut canvas, &source_pixels, 0, 0),
        }
        drop(source_pixels);

        if let Some(text) = watermark {
            draw_watermark(&mut canvas, text);
        }

        let output_format = requested_type.unwrap_or(source_format);
        let raster = self.reencode(canvas, output_format)?;

        Ok(Image::new(name, raster))
    }
}

// =============================================================================
// Tests
// =============================================================================
