//! Resize, crop and thumbnail.
//!
//! Every operation here that changes dimensions builds a new pixel grid and
//! swaps it into the canvas, dropping the old one. Resampling uses the
//! triangle (bilinear) filter on straight RGBA, so transparent regions stay
//! transparent.

use super::calculations::{
    calculate_anchor_crop_origin, calculate_best_fit_dimensions, calculate_cover_dimensions,
    calculate_crop_region, calculate_resize_dimensions,
};
use super::params::Anchor;
use crate::canvas::Canvas;
use crate::error::{ImageError, Result};
use image::imageops::{self, FilterType};

/// Resize to the given dimensions. Give one side to keep the aspect ratio.
///
/// No-op when neither side is given or the size already matches.
pub fn resize(canvas: &mut Canvas, width: Option<u32>, height: Option<u32>) {
    let Some((w, h)) = calculate_resize_dimensions(canvas.dimensions(), width, height) else {
        return;
    };
    let resized = imageops::resize(canvas.pixels(), w, h, FilterType::Triangle);
    canvas.replace_pixels(resized);
}

/// Proportionally resize to `width`.
pub fn fit_to_width(canvas: &mut Canvas, width: u32) {
    resize(canvas, Some(width), None);
}

/// Proportionally resize to `height`.
pub fn fit_to_height(canvas: &mut Canvas, height: u32) {
    resize(canvas, None, Some(height));
}

/// Shrink proportionally until the canvas fits inside `max_width`×`max_height`.
pub fn best_fit(canvas: &mut Canvas, max_width: u32, max_height: u32) {
    if let Some((w, h)) = calculate_best_fit_dimensions(canvas.dimensions(), (max_width, max_height))
    {
        resize(canvas, Some(w), Some(h));
    }
}

/// Crop to the rectangle between two corners.
///
/// Coordinates are clamped into the canvas independently; a rectangle with
/// no area after clamping fails with `InvalidCoordinate`.
pub fn crop(canvas: &mut Canvas, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
    let region = calculate_crop_region(canvas.dimensions(), x1, y1, x2, y2).ok_or_else(|| {
        ImageError::InvalidCoordinate(format!(
            "crop ({x1}, {y1})-({x2}, {y2}) has no area inside {}x{}",
            canvas.width(),
            canvas.height()
        ))
    })?;
    let cropped =
        imageops::crop_imm(canvas.pixels(), region.x, region.y, region.width, region.height)
            .to_image();
    canvas.replace_pixels(cropped);
    Ok(())
}

/// Resize to cover `width`×`height`, then crop to exactly that size.
///
/// `anchor` chooses which part of the oversized intermediate survives.
pub fn thumbnail(canvas: &mut Canvas, width: u32, height: u32, anchor: Anchor) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidCoordinate(format!(
            "thumbnail size {width}x{height} must be positive"
        )));
    }
    let (cover_w, cover_h) = calculate_cover_dimensions(canvas.dimensions(), (width, height));
    resize(canvas, Some(cover_w), Some(cover_h));

    let (x1, y1) = calculate_anchor_crop_origin(canvas.dimensions(), (width, height), anchor);
    crop(canvas, x1, y1, x1 + width as i32, y1 + height as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ImageMime;
    use crate::color::Color;
    use image::{Rgba, RgbaImage};

    fn opaque(width: u32, height: u32) -> Canvas {
        Canvas::filled(width, height, Color::rgb(200, 100, 50))
    }

    #[test]
    fn resize_one_side_keeps_ratio() {
        let mut canvas = opaque(400, 300);
        resize(&mut canvas, Some(200), None);
        assert_eq!(canvas.dimensions(), (200, 150));

        fit_to_height(&mut canvas, 30);
        assert_eq!(canvas.dimensions(), (40, 30));

        fit_to_width(&mut canvas, 80);
        assert_eq!(canvas.dimensions(), (80, 60));
    }

    #[test]
    fn resize_without_sides_is_noop() {
        let mut canvas = opaque(10, 10);
        resize(&mut canvas, None, None);
        assert_eq!(canvas.dimensions(), (10, 10));
    }

    #[test]
    fn resize_keeps_transparent_regions_transparent() {
        let pixels = RgbaImage::from_fn(40, 40, |x, _| {
            if x < 20 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 0, 0, 255])
            }
        });
        let mut canvas = Canvas::from_pixels(pixels, ImageMime::Png);
        resize(&mut canvas, Some(20), Some(20));

        assert_eq!(canvas.pixel(0, 10).unwrap()[3], 0);
        assert_eq!(canvas.pixel(19, 10).unwrap(), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn best_fit_landscape() {
        let mut canvas = opaque(400, 300);
        best_fit(&mut canvas, 100, 100);
        assert_eq!(canvas.dimensions(), (100, 75));
    }

    #[test]
    fn best_fit_inside_bounds_is_noop() {
        let mut canvas = opaque(50, 40);
        best_fit(&mut canvas, 100, 100);
        assert_eq!(canvas.dimensions(), (50, 40));
    }

    #[test]
    fn crop_picks_region() {
        let pixels = RgbaImage::from_fn(10, 10, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let mut canvas = Canvas::from_pixels(pixels, ImageMime::Png);
        crop(&mut canvas, 8, 6, 2, 3).unwrap();

        assert_eq!(canvas.dimensions(), (6, 3));
        assert_eq!(canvas.pixel(0, 0).unwrap(), Rgba([2, 3, 0, 255]));
    }

    #[test]
    fn crop_full_extent_is_idempotent() {
        let mut canvas = opaque(64, 48);
        crop(&mut canvas, 10, 5, 50, 45).unwrap();
        let (w, h) = canvas.dimensions();
        crop(&mut canvas, 0, 0, w as i32, h as i32).unwrap();
        assert_eq!(canvas.dimensions(), (40, 40));
    }

    #[test]
    fn crop_degenerate_fails() {
        let mut canvas = opaque(64, 48);
        let err = crop(&mut canvas, 10, 10, 10, 40).unwrap_err();
        assert_eq!(err.code(), 12);
        assert_eq!(canvas.dimensions(), (64, 48));
    }

    #[test]
    fn thumbnail_exact_for_every_anchor() {
        for source in [(400, 300), (300, 400), (640, 427), (100, 100)] {
            for anchor in Anchor::ALL {
                let mut canvas = opaque(source.0, source.1);
                thumbnail(&mut canvas, 120, 90, anchor).unwrap();
                assert_eq!(canvas.dimensions(), (120, 90), "{source:?} {anchor}");
            }
        }
    }

    #[test]
    fn thumbnail_upscales_small_sources() {
        let mut canvas = opaque(10, 20);
        thumbnail(&mut canvas, 100, 100, Anchor::Center).unwrap();
        assert_eq!(canvas.dimensions(), (100, 100));
    }

    #[test]
    fn thumbnail_zero_size_fails() {
        let mut canvas = opaque(10, 20);
        assert!(thumbnail(&mut canvas, 0, 100, Anchor::Center).is_err());
    }
}
