//! Codec seam: bytes in, pixels out, and back.
//!
//! The [`Codec`] trait defines the two operations every codec must support:
//! `decode` and `encode`. Loaders and savers are generic over it so tests can
//! substitute a recording mock for the real decoders.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec), built on the `image` crate.

use super::params::Quality;
use crate::canvas::ImageMime;
use crate::error::Result;
use image::RgbaImage;

/// Result of a decode: the pixels plus the format they were stored in.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub pixels: RgbaImage,
    pub mime: ImageMime,
}

/// Trait for raster codecs.
///
/// `decode` fails with `UnsupportedFormat` for formats the codec does not
/// handle and `InvalidImage` for corrupt data. `encode` fails with
/// `UnsupportedFormat` or, for formats compiled out, a dedicated error such
/// as `WebpNotEnabled`.
pub trait Codec {
    /// Decode encoded bytes into RGBA pixels.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded>;

    /// Encode RGBA pixels as `mime` at the given quality.
    fn encode(&self, pixels: &RgbaImage, mime: ImageMime, quality: Quality) -> Result<Vec<u8>>;
}
