//! Shared test doubles for the collaborator seams.
//!
//! - [`MockRasterizer`]: a font with fixed, size-proportional metrics that
//!   records every draw call.
//! - [`MockCodec`]: a codec that hands out canned pixels and records every
//!   decode and encode.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let font = Arc::new(MockRasterizer::new());
//! let options = TextOptions::new(FontRef::Loaded(font.clone()));
//! text(&mut canvas, "Hi", &options)?;
//! assert_eq!(font.drawn()[0].text, "Hi");
//! ```

use std::sync::Mutex;

use image::{Rgba, RgbaImage};

use crate::canvas::{Canvas, ImageMime};
use crate::error::{ImageError, Result};
use crate::imaging::{Codec, Decoded, Quality};
use crate::paint::font::{GlyphRasterizer, PX_PER_PT, TextBox, text_box};

// =========================================================================
// Fonts
// =========================================================================

/// One recorded [`GlyphRasterizer::draw`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnText {
    pub text: String,
    pub origin: (i32, i32),
    pub ink: Rgba<u8>,
}

/// Font with predictable metrics, in pixels of the requested size:
///
/// | Measure | Value |
/// |---|---|
/// | advance per char | size / 2 |
/// | cap height | size × 0.7 |
/// | descender | size × 0.2, only when the string has one |
///
/// Drawing blends the ink onto the origin pixel and records the call.
#[derive(Default)]
pub struct MockRasterizer {
    drawn: Mutex<Vec<DrawnText>>,
}

impl MockRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drawn(&self) -> Vec<DrawnText> {
        self.drawn.lock().unwrap().clone()
    }

    fn px(points: f32) -> f32 {
        (points * PX_PER_PT).round()
    }
}

impl GlyphRasterizer for MockRasterizer {
    fn bbox(&self, points: f32, angle: f32, text: &str) -> Result<TextBox> {
        let px = Self::px(points);
        let width = text.chars().count() as f32 * (px / 2.0).round();
        let cap = (px * 0.7).round();
        let descends = text.chars().any(|c| "Qgjpqy".contains(c));
        let descender = if descends { (px * 0.2).round() } else { 0.0 };
        Ok(text_box((0.0, -cap), (width, descender), angle))
    }

    fn draw(
        &self,
        canvas: &mut Canvas,
        _points: f32,
        _angle: f32,
        origin: (i32, i32),
        ink: Rgba<u8>,
        text: &str,
    ) -> Result<()> {
        canvas.blend_pixel(origin.0, origin.1, ink);
        self.drawn.lock().unwrap().push(DrawnText {
            text: text.to_string(),
            origin,
            ink,
        });
        Ok(())
    }
}

// =========================================================================
// Codecs
// =========================================================================

/// What a [`MockCodec`] was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    Decode { len: usize },
    Encode {
        width: u32,
        height: u32,
        mime: ImageMime,
        quality: u32,
    },
}

/// Codec that decodes every input to the same canned image, and encodes to
/// a short tag naming the request.
pub struct MockCodec {
    decoded: Option<Decoded>,
    operations: Mutex<Vec<RecordedOp>>,
}

impl MockCodec {
    /// Decodes to a `width`×`height` opaque gray image of `mime`.
    pub fn with_image(width: u32, height: u32, mime: ImageMime) -> Self {
        Self {
            decoded: Some(Decoded {
                pixels: RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255])),
                mime,
            }),
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Fails every decode with `InvalidImage`.
    pub fn failing() -> Self {
        Self {
            decoded: None,
            operations: Mutex::new(Vec::new()),
        }
    }

    pub fn get_operations(&self) -> Vec<RecordedOp> {
        self.operations.lock().unwrap().clone()
    }
}

impl Codec for MockCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        self.operations
            .lock()
            .unwrap()
            .push(RecordedOp::Decode { len: bytes.len() });
        self.decoded
            .clone()
            .ok_or_else(|| ImageError::InvalidImage("mock decode failure".to_string()))
    }

    fn encode(&self, pixels: &RgbaImage, mime: ImageMime, quality: Quality) -> Result<Vec<u8>> {
        self.operations.lock().unwrap().push(RecordedOp::Encode {
            width: pixels.width(),
            height: pixels.height(),
            mime,
            quality: quality.value(),
        });
        Ok(format!("{mime}:{}", quality.value()).into_bytes())
    }
}

// =========================================================================
// Canvases
// =========================================================================

/// Canvas where the pixel at `(x, y)` is `(x, y, 0, 255)`.
pub fn coordinate_canvas(width: u32, height: u32) -> Canvas {
    let pixels = RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]));
    Canvas::from_pixels(pixels, ImageMime::Png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_rasterizer_metrics() {
        let font = MockRasterizer::new();
        let points = 20.0 / PX_PER_PT;
        let plain = font.bbox(points, 0.0, "XX").unwrap();
        assert_eq!(plain, [0, 0, 20, 0, 20, -14, 0, -14]);

        let with_tail = font.bbox(points, 0.0, "X Qgjpqy").unwrap();
        assert_eq!((with_tail[7] - with_tail[1]).abs(), 18);
    }

    #[test]
    fn mock_rasterizer_records_draws() {
        let font = MockRasterizer::new();
        let mut canvas = Canvas::new(4, 4);
        font.draw(&mut canvas, 9.0, 0.0, (1, 2), Rgba([255, 0, 0, 255]), "a")
            .unwrap();
        assert_eq!(canvas.pixel(1, 2).unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(font.drawn()[0].origin, (1, 2));
    }

    #[test]
    fn mock_codec_records_operations() {
        let codec = MockCodec::with_image(3, 2, ImageMime::Jpeg);
        let decoded = codec.decode(b"abc").unwrap();
        assert_eq!(decoded.pixels.dimensions(), (3, 2));
        let bytes = codec
            .encode(&decoded.pixels, ImageMime::Png, Quality::new(80))
            .unwrap();
        assert_eq!(bytes, b"image/png:80");

        let ops = codec.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], RecordedOp::Decode { len: 3 }));
        assert!(matches!(
            ops[1],
            RecordedOp::Encode {
                width: 3,
                quality: 80,
                ..
            }
        ));
    }

    #[test]
    fn failing_codec_reports_invalid_image() {
        let err = MockCodec::failing().decode(b"x").unwrap_err();
        assert_eq!(err.code(), 7);
    }
}
