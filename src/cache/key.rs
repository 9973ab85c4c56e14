//! Cache keys for transformed images.
//!
//! # Canonical Form
//!
//! A key prints as the image name followed by one `|tag=value` suffix per
//! requested transform, always in this order:
//!
//! | tag    | value                                  |
//! |--------|----------------------------------------|
//! | `res`  | resolution as `WxH`                    |
//! | `bgr`  | colour as `#aarrggbb`                  |
//! | `wm`   | base64 SHA-256 of the watermark text   |
//! | `type` | lowercase output format name           |
//!
//! Absent parameters produce no suffix, so a plain request for `"sample"` is
//! keyed as `sample`. Equivalent spellings (`"100"` / `"100x100"`,
//! `"AliceBlue"` / `"f0f8ff"`) produce the same key.

use std::fmt;
use std::hash::{Hash, Hasher};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::error::FormatError;
use crate::imaging::{BackgroundColour, ImageType, Resolution};
use crate::transform::TransformParams;

/// Separator between the image name and each transform suffix.
pub const KEY_SEPARATOR: char = '|';

/// Cache key identifying one image rendered with one set of transforms.
///
/// Equality and hashing use only the canonical string.
#[derive(Debug, Clone)]
pub struct CacheKey {
    image_name: String,
    resolution: Option<Resolution>,
    background_colour: Option<BackgroundColour>,
    watermark_hash: Option<String>,
    image_type: Option<ImageType>,
    canonical: String,
}

impl CacheKey {
    /// Build a key from an image name and raw transform parameters.
    ///
    /// The image name is used verbatim and must not contain
    /// [`KEY_SEPARATOR`]; otherwise it can print the same as another name with
    /// parameters. [`ImageLibrary`](crate::library::ImageLibrary) rejects such
    /// names before a key is built.
    ///
    /// # Errors
    ///
    /// Returns the [`FormatError`] of the first parameter that fails to parse.
    pub fn new(
        image_name: impl Into<String>,
        resolution: Option<&str>,
        background_colour: Option<&str>,
        watermark: Option<&str>,
        image_type: Option<&str>,
    ) -> Result<Self, FormatError> {
        let image_name = image_name.into();
        let resolution = Resolution::parse(resolution)?;
        let background_colour = BackgroundColour::parse(background_colour)?;
        let watermark_hash = watermark
            .filter(|text| !text.trim().is_empty())
            .map(hash_watermark);
        let image_type = ImageType::parse(image_type)?;

        let canonical = canonical_string(
            &image_name,
            resolution.as_ref(),
            background_colour.as_ref(),
            watermark_hash.as_deref(),
            image_type.as_ref(),
        );

        Ok(Self {
            image_name,
            resolution,
            background_colour,
            watermark_hash,
            image_type,
            canonical,
        })
    }

    /// Build a key from an image name and a [`TransformParams`].
    pub fn for_request(
        image_name: impl Into<String>,
        params: &TransformParams,
    ) -> Result<Self, FormatError> {
        Self::new(
            image_name,
            params.resolution.as_deref(),
            params.background_colour.as_deref(),
            params.watermark.as_deref(),
            params.image_type.as_deref(),
        )
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn background_colour(&self) -> Option<BackgroundColour> {
        self.background_colour
    }

    pub fn watermark_hash(&self) -> Option<&str> {
        self.watermark_hash.as_deref()
    }

    pub fn image_type(&self) -> Option<ImageType> {
        self.image_type
    }

    /// The canonical string, used as the store key.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

/// Base64-encoded SHA-256 digest of the watermark text.
pub fn hash_watermark(text: &str) -> String {
    STANDARD.encode(Sha256::digest(text.as_bytes()))
}

fn canonical_string(
    image_name: &str,
    resolution: Option<&Resolution>,
    background_colour: Option<&BackgroundColour>,
    watermark_hash: Option<&str>,
    image_type: Option<&ImageType>,
) -> String {
    let mut key = String::from(image_name);
    if let Some(res) = resolution {
        key.push_str(&format!("{KEY_SEPARATOR}res={res}"));
    }
    if let Some(colour) = background_colour {
        key.push_str(&format!("{KEY_SEPARATOR}bgr={colour}"));
    }
    if let Some(hash) = watermark_hash {
        key.push_str(&format!("{KEY_SEPARATOR}wm={hash}"));
    }
    if let Some(image_type) = image_type {
        key.push_str(&format!("{KEY_SEPARATOR}type={image_type}"));
    }
    key
}
