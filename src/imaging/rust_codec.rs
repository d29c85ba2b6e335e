//! Pure Rust codec on top of the `image` crate.
//!
//! ## Format mapping
//!
//! | Format | Decode | Encode |
//! |---|---|---|
//! | GIF | `image` GIF decoder | `GifEncoder` (first frame, RGBA) |
//! | JPEG | `image` JPEG decoder | `JpegEncoder::new_with_quality`, alpha dropped |
//! | PNG | `image` PNG decoder | `PngEncoder`, quality mapped to a 0–9 compression level |
//! | WEBP | `image` WebP decoder (`webp` feature) | lossless `WebPEncoder` (`webp` feature) |
//!
//! Everything decodes to 8-bit RGBA so palette and grayscale sources behave
//! like true-color ones downstream.

use super::codec::{Codec, Decoded};
use super::params::Quality;
use crate::canvas::ImageMime;
use crate::error::{ImageError, Result};
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

/// Pure Rust codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the format mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

/// Whether a format can be decoded and encoded in this build.
pub fn format_enabled(mime: ImageMime) -> bool {
    match mime {
        ImageMime::Webp => cfg!(feature = "webp"),
        _ => true,
    }
}

/// PNG compression level (0–9) for an encoder quality.
pub fn png_compression_level(quality: Quality) -> u32 {
    (9.0 * quality.value() as f64 / 100.0).round() as u32
}

fn png_compression(level: u32) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn encode_failed(mime: ImageMime, err: image::ImageError) -> ImageError {
    ImageError::Write(format!("failed to encode {mime}: {err}"))
}

impl Codec for RustCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        let format = image::guess_format(bytes)
            .map_err(|e| ImageError::InvalidImage(format!("unrecognized image data: {e}")))?;
        let mime = ImageMime::from_format(format)
            .filter(|mime| format_enabled(*mime))
            .ok_or_else(|| ImageError::UnsupportedFormat(format!("{format:?}")))?;

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ImageError::InvalidImage(format!("failed to decode {mime}: {e}")))?;

        Ok(Decoded {
            pixels: decoded.into_rgba8(),
            mime,
        })
    }

    fn encode(&self, pixels: &RgbaImage, mime: ImageMime, quality: Quality) -> Result<Vec<u8>> {
        let (width, height) = pixels.dimensions();
        let mut out = Vec::new();

        match mime {
            ImageMime::Gif => {
                let mut encoder = GifEncoder::new(&mut out);
                encoder
                    .encode(pixels.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| encode_failed(mime, e))?;
            }
            ImageMime::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(pixels.clone()).into_rgb8();
                let q = quality.value().clamp(1, 100) as u8;
                JpegEncoder::new_with_quality(&mut out, q)
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| encode_failed(mime, e))?;
            }
            ImageMime::Png => {
                let compression = png_compression(png_compression_level(quality));
                PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive)
                    .write_image(pixels.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| encode_failed(mime, e))?;
            }
            ImageMime::Webp => encode_webp(pixels, &mut out)?,
        }

        tracing::debug!(%mime, width, height, bytes = out.len(), "encoded image");
        Ok(out)
    }
}

#[cfg(feature = "webp")]
fn encode_webp(pixels: &RgbaImage, out: &mut Vec<u8>) -> Result<()> {
    use image::codecs::webp::WebPEncoder;

    let (width, height) = pixels.dimensions();
    WebPEncoder::new_lossless(out)
        .write_image(pixels.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| encode_failed(ImageMime::Webp, e))
}

#[cfg(not(feature = "webp"))]
fn encode_webp(_pixels: &RgbaImage, _out: &mut Vec<u8>) -> Result<()> {
    Err(ImageError::WebpNotEnabled)
}
