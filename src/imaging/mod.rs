//! Image value types.
//!
//! - [`Image`] / [`Raster`]: a named, owned raster and its cache record format
//! - [`Resolution`]: requested output size (`"W"` or `"WxH"`)
//! - [`BackgroundColour`]: named or hex canvas fill colour
//! - [`ImageType`]: supported formats with their MIME types and extensions
//!
//! Every parameter type parses from an optional raw string to
//! `Result<Option<T>, FormatError>`, where `None` is the "not requested"
//! sentinel, and prints back in a canonical form used by cache keys.

mod colour;
mod format;
mod model;
mod resolution;

pub use colour::BackgroundColour;
pub use format::{
    clamp_quality, decode_any, supported_extensions, ImageType, ALL_IMAGE_TYPES,
    DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use model::{Image, Raster, IMAGE_RECORD_TAG};
pub use resolution::{Resolution, MAX_DIMENSION};
