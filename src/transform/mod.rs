//! Image transforms.
//!
//! [`TransformEngine`] resizes, fills the background, watermarks and
//! re-encodes an [`Image`](crate::imaging::Image) according to a set of raw
//! [`TransformParams`]. The pipeline calls it through the [`ImageTransformer`]
//! trait so tests can substitute their own implementation.

mod engine;
mod watermark;

pub use engine::{ImageTransformer, TransformEngine, TransformParams};
pub use watermark::{draw_watermark, WATERMARK_COLOUR, WATERMARK_MARGIN};
