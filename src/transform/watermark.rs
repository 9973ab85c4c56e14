//! Text watermark overlay.
//!
//! Glyphs come from the 8x8 bitmap font in `font8x8` and are drawn scaled up,
//! alpha-blended onto the canvas.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Pixel, Rgba, RgbaImage};

/// Watermark colour: black at roughly 60% opacity.
pub const WATERMARK_COLOUR: Rgba<u8> = Rgba([0, 0, 0, 150]);

/// Offset of the first glyph from the top-left corner, in pixels.
pub const WATERMARK_MARGIN: u32 = 5;

/// Each font pixel is drawn as a `GLYPH_SCALE` x `GLYPH_SCALE` block.
const GLYPH_SCALE: u32 = 2;

const GLYPH_SIZE: u32 = 8;

/// Draw `text` near the top-left corner of `canvas`.
///
/// Characters without a glyph in the basic Latin set are drawn as `?`.
/// Text that runs past the right or bottom edge is clipped.
pub fn draw_watermark(canvas: &mut RgbaImage, text: &str) {
    let advance = GLYPH_SIZE * GLYPH_SCALE;
    let mut origin_x = WATERMARK_MARGIN;

    for ch in text.chars() {
        if origin_x >= canvas.width() {
            break;
        }
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        draw_glyph(canvas, &glyph, origin_x, WATERMARK_MARGIN);
        origin_x += advance;
    }
}

fn draw_glyph(canvas: &mut RgbaImage, glyph: &[u8; 8], origin_x: u32, origin_y: u32) {
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_SIZE {
            if bits & (1 << col) == 0 {
                continue;
            }
            let x0 = origin_x + col * GLYPH_SCALE;
            let y0 = origin_y + row as u32 * GLYPH_SCALE;
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    let (x, y) = (x0 + dx, y0 + dy);
                    if x < canvas.width() && y < canvas.height() {
                        canvas.get_pixel_mut(x, y).blend(&WATERMARK_COLOUR);
                    }
                }
            }
        }
    }
}
