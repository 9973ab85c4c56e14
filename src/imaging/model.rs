//! The named image passed between the loader, transformer and cache.
//!
//! # Serialized Form
//!
//! Cached images are stored as a tagged binary record:
//!
//! ```text
//! ┌───────────────┬──────────────┬────────────────────┬──────────────────┐
//! │ "Image" tag   │ name         │ payload length     │ payload          │
//! │ (string)      │ (string)     │ (i32 little-endian)│ (encoded raster) │
//! └───────────────┴──────────────┴────────────────────┴──────────────────┘
//! ```
//!
//! Strings are UTF-8 prefixed by their byte length as a 7-bit variable-length
//! integer. The payload is the raster encoded in its own format, copied from
//! the bytes the raster was decoded from when it has them; a zero length
//! marks a name-only placeholder.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use image::DynamicImage;

use crate::error::ImageError;

use super::format::{decode_any, ImageType, DEFAULT_JPEG_QUALITY};

/// Type tag that opens every serialized image record.
pub const IMAGE_RECORD_TAG: &str = "Image";

/// A decoded raster together with the format it was decoded from (or will be
/// served as).
///
/// A raster may also hold the encoded bytes its pixels were decoded from.
/// Those bytes are reused verbatim whenever the raster is written out, so a
/// lossy format is never encoded a second time. Equality compares pixels and
/// format only.
#[derive(Debug, Clone)]
pub struct Raster {
    pixels: DynamicImage,
    format: ImageType,
    encoded: Option<Bytes>,
}

impl Raster {
    /// Create a raster with no encoded form yet.
    pub fn new(pixels: DynamicImage, format: ImageType) -> Self {
        Self {
            pixels,
            format,
            encoded: None,
        }
    }

    /// Create a raster from pixels and the `format` bytes they decode from.
    pub fn with_encoded(pixels: DynamicImage, format: ImageType, encoded: Bytes) -> Self {
        Self {
            pixels,
            format,
            encoded: Some(encoded),
        }
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn format(&self) -> ImageType {
        self.format
    }

    /// The encoded bytes backing these pixels, if known.
    pub fn encoded(&self) -> Option<&Bytes> {
        self.encoded.as_ref()
    }

    pub fn into_pixels(self) -> DynamicImage {
        self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The raster in its own format.
    ///
    /// Returns the stored encoded bytes when present; otherwise encodes the
    /// pixels, using the default quality for JPEG.
    pub fn encode(&self) -> Result<Bytes, ImageError> {
        match &self.encoded {
            Some(bytes) => Ok(bytes.clone()),
            None => self
                .format
                .encode(&self.pixels, DEFAULT_JPEG_QUALITY)
                .map(Bytes::from),
        }
    }
}

impl PartialEq for Raster {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format && self.pixels == other.pixels
    }
}

/// A named image, optionally carrying a raster.
///
/// Images are owned exclusively by whichever component holds them; transform
/// steps take them by value and hand back a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    name: String,
    raster: Option<Raster>,
}

impl Image {
    /// Create an image with a raster.
    pub fn new(name: impl Into<String>, raster: Raster) -> Self {
        Self {
            name: name.into(),
            raster: Some(raster),
        }
    }

    /// Create a name-only placeholder with no raster payload.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raster: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    /// Take the raster out of the image, consuming it.
    pub fn into_raster(self) -> Option<Raster> {
        self.raster
    }

    /// The raster's format, if the image has one.
    pub fn format(&self) -> Option<ImageType> {
        self.raster.as_ref().map(Raster::format)
    }

    /// Serialize into the tagged binary record.
    pub fn to_bytes(&self) -> Result<Bytes, ImageError> {
        let payload = match &self.raster {
            Some(raster) => raster.encode()?,
            None => Bytes::new(),
        };
        let payload_len = i32::try_from(payload.len()).map_err(|_| {
            ImageError::Corrupt(format!("payload of {} bytes is too large", payload.len()))
        })?;

        let mut buf = BytesMut::with_capacity(payload.len() + self.name.len() + 16);
        put_string(&mut buf, IMAGE_RECORD_TAG);
        put_string(&mut buf, &self.name);
        buf.put_i32_le(payload_len);
        buf.put_slice(&payload);
        Ok(buf.freeze())
    }

    /// Deserialize a tagged binary record.
    ///
    /// Returns `Ok(None)` when the buffer does not start with the image tag,
    /// so foreign values in a shared store read as misses rather than errors.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Corrupt`] for a tagged record that is truncated,
    /// and [`ImageError::Decode`] if the payload is not a decodable image.
    pub fn from_bytes(data: &[u8]) -> Result<Option<Self>, ImageError> {
        let mut buf = data;
        match get_string(&mut buf) {
            Ok(tag) if tag == IMAGE_RECORD_TAG => {}
            _ => return Ok(None),
        }

        let name = get_string(&mut buf)?;

        if buf.remaining() < 4 {
            return Err(ImageError::Corrupt("missing payload length".to_string()));
        }
        let payload_len = buf.get_i32_le();
        if payload_len <= 0 {
            return Ok(Some(Image::placeholder(name)));
        }

        let payload_len = payload_len as usize;
        if buf.remaining() < payload_len {
            return Err(ImageError::Corrupt(format!(
                "payload needs {} bytes, {} remain",
                payload_len,
                buf.remaining()
            )));
        }

        let payload = Bytes::copy_from_slice(&buf[..payload_len]);
        let (pixels, format) = decode_any(&payload)?;
        Ok(Some(Image::new(
            name,
            Raster::with_encoded(pixels, format, payload),
        )))
    }
}

/// Write a string with a 7-bit variable-length byte count prefix.
fn put_string(buf: &mut BytesMut, value: &str) {
    let mut len = value.len();
    while len >= 0x80 {
        buf.put_u8((len as u8 & 0x7f) | 0x80);
        len >>= 7;
    }
    buf.put_u8(len as u8);
    buf.put_slice(value.as_bytes());
}

/// Read a string written by [`put_string`].
fn get_string(buf: &mut &[u8]) -> Result<String, ImageError> {
    let mut len: usize = 0;
    let mut shift = 0;
    loop {
        if !buf.has_remaining() {
            return Err(ImageError::Corrupt("truncated string length".to_string()));
        }
        if shift > 28 {
            return Err(ImageError::Corrupt("string length overflow".to_string()));
        }
        let byte = buf.get_u8();
        len |= ((byte & 0x7f) as usize) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }

    if buf.remaining() < len {
        return Err(ImageError::Corrupt(format!(
            "string needs {} bytes, {} remain",
            len,
            buf.remaining()
        )));
    }
    let value = String::from_utf8(buf[..len].to_vec())
        .map_err(|e| ImageError::Corrupt(format!("string is not UTF-8: {e}")))?;
    buf.advance(len);
    Ok(value)
}
