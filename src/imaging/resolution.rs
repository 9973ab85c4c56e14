//! Requested output resolution.

use std::fmt;

use crate::error::FormatError;

/// Largest accepted width or height.
///
/// Guards against requests that would allocate an enormous canvas.
pub const MAX_DIMENSION: u32 = 10_000;

/// A requested output size in pixels.
///
/// Parsing yields `None` for a blank input, which means "keep the source
/// image's native size".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a resolution string.
    ///
    /// Accepts `"W"` for a square or `"WxH"`. The separator is matched
    /// case-insensitively and empty segments are ignored, so `"100x"` is the
    /// same as `"100"`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Resolution`] for more than two segments, for any
    /// segment that is not a positive integer, or for dimensions above
    /// [`MAX_DIMENSION`].
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, FormatError> {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let text = raw.trim();

        let invalid = || FormatError::Resolution {
            raw: raw.to_string(),
        };

        let lowered = text.to_ascii_lowercase();
        let parts: Vec<&str> = lowered.split('x').filter(|p| !p.is_empty()).collect();
        if parts.is_empty() || parts.len() > 2 {
            return Err(invalid());
        }

        let mut values = Vec::with_capacity(parts.len());
        for part in parts {
            match part.parse::<u32>() {
                Ok(value) if value > 0 && value <= MAX_DIMENSION => values.push(value),
                _ => return Err(invalid()),
            }
        }

        let width = values[0];
        let height = values.get(1).copied().unwrap_or(width);
        Ok(Some(Self::new(width, height)))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
