//! Verification-code images.
//!
//! A fresh canvas with the code drawn in the middle, then three random
//! lines and a hundred random dots in the noise color. Randomness comes from
//! the caller's RNG so a seeded generator reproduces an image exactly.

use crate::color::{ColorInput, normalize_color};
use crate::error::Result;
use crate::imaging::Anchor;
use crate::paint::FontRef;
use crate::paint::text::TextOptions;
use crate::pipeline::Image;
use rand::Rng;

const NOISE_LINES: usize = 3;
const NOISE_DOTS: usize = 100;

/// Text options for a code image `height` pixels tall: black, centred, at
/// half the height.
pub fn verify_code_options(font: impl Into<FontRef>, height: u32) -> TextOptions {
    TextOptions {
        size: height / 2,
        anchor: Anchor::Center,
        ..TextOptions::new(font)
    }
}

/// Draw `text` on a new `width`×`height` image and scatter noise over it.
///
/// Each noise line runs from a random point to another point no further up
/// or left than its start.
pub fn verify_code(
    text: &str,
    width: u32,
    height: u32,
    background: impl Into<ColorInput>,
    options: &TextOptions,
    noise_color: impl Into<ColorInput>,
    rng: &mut impl Rng,
) -> Result<Image> {
    let noise = normalize_color(&noise_color.into())?;
    let mut image = Image::from_new(width, height, background)?;
    image.text(text, options)?;

    let (w, h) = (width as i32, height as i32);
    for _ in 0..NOISE_LINES {
        let start = (rng.gen_range(0..=w), rng.gen_range(0..=h));
        let end = (rng.gen_range(start.0..=w), rng.gen_range(start.1..=h));
        image.line(start, end, noise, 1)?;
    }
    for _ in 0..NOISE_DOTS {
        let (x, y) = (rng.gen_range(0..=w), rng.gen_range(0..=h));
        image.dot(x, y, noise)?;
    }
    tracing::debug!(width, height, len = text.len(), "generated verification code");
    Ok(image)
}
