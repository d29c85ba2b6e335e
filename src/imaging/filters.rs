//! Tone and convolution filters.
//!
//! Each filter mutates the canvas in place and keeps the dimensions. The
//! arithmetic follows the classic GD filter set so results match what
//! GD-based tooling produces:
//!
//! | Filter | Rule |
//! |---|---|
//! | brighten / darken | add `±255·pct/100` to each channel |
//! | contrast | `((v/255 − 0.5)·c + 0.5)·255` rounded, `c = ((100 − level)/100)²` |
//! | colorize | add RGB, fade alpha by the color's GD alpha |
//! | desaturate | `0.299R + 0.587G + 0.114B`, truncated |
//! | edge detect | `[[-1,0,-1],[0,4,0],[-1,0,-1]]`, offset 127 |
//! | emboss | `[[1.5,0,0],[0,0,0],[0,0,-1.5]]`, offset 127 |
//! | gaussian blur | `[[1,2,1],[2,4,2],[1,2,1]] / 16` |
//! | selective blur | neighbours weighted by `1/|Δ|` per channel |
//! | sharpen | `[[0,-1,0],[-1,5,-1],[0,-1,0]]` |
//! | sketch | mean removal `[[-1,-1,-1],[-1,9,-1],[-1,-1,-1]]` |
//! | smooth | `[[1,1,1],[1,w,1],[1,1,1]] / (w + 8)` |
//!
//! Convolutions sample a snapshot of the canvas, clamp at the edges, clamp
//! results into `0..=255` and keep each pixel's own alpha.

use super::params::BlurKind;
use crate::canvas::Canvas;
use crate::color::Color;
use image::{Rgba, RgbaImage};

type Kernel = [[f32; 3]; 3];

const EDGE_DETECT: Kernel = [[-1.0, 0.0, -1.0], [0.0, 4.0, 0.0], [-1.0, 0.0, -1.0]];
const EMBOSS: Kernel = [[1.5, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, -1.5]];
const GAUSSIAN: Kernel = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
const SHARPEN: Kernel = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];
const MEAN_REMOVAL: Kernel = [[-1.0, -1.0, -1.0], [-1.0, 9.0, -1.0], [-1.0, -1.0, -1.0]];

/// Sepia tint added after desaturation.
const SEPIA_TINT: (i32, i32, i32) = (70, 35, 0);

/// Add a GD-scale alpha amount (0 opaque .. 127 transparent) to an 8-bit
/// alpha, returning the faded 8-bit alpha.
pub(crate) fn add_gd_alpha(alpha: u8, amount: u8) -> u8 {
    if amount == 0 {
        return alpha;
    }
    let gd = 127 - (alpha as f32 * 127.0 / 255.0).round() as i32;
    let faded = (gd + amount as i32).min(127);
    ((127 - faded) as f32 * 255.0 / 127.0).round() as u8
}

fn clamp_u8(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

fn map_pixels(canvas: &mut Canvas, f: impl Fn(Rgba<u8>) -> Rgba<u8>) {
    for pixel in canvas.pixels_mut().pixels_mut() {
        *pixel = f(*pixel);
    }
}

/// Brighten by `percentage` (0–100).
pub fn brighten(canvas: &mut Canvas, percentage: f32) {
    adjust_brightness(canvas, (255.0 * percentage / 100.0).clamp(0.0, 255.0) as i32);
}

/// Darken by `percentage` (0–100).
pub fn darken(canvas: &mut Canvas, percentage: f32) {
    adjust_brightness(canvas, -((255.0 * percentage / 100.0).clamp(0.0, 255.0) as i32));
}

fn adjust_brightness(canvas: &mut Canvas, delta: i32) {
    map_pixels(canvas, |Rgba([r, g, b, a])| {
        let shift = |c: u8| (c as i32 + delta).clamp(0, 255) as u8;
        Rgba([shift(r), shift(g), shift(b), a])
    });
}

/// Tint by adding the color's channels; its transparency fades the pixels.
pub fn colorize(canvas: &mut Canvas, color: Color) {
    colorize_channels(
        canvas,
        (color.red as i32, color.green as i32, color.blue as i32),
        color.gd_alpha(),
    );
}

fn colorize_channels(canvas: &mut Canvas, (dr, dg, db): (i32, i32, i32), gd_alpha: u8) {
    map_pixels(canvas, |Rgba([r, g, b, a])| {
        Rgba([
            (r as i32 + dr).clamp(0, 255) as u8,
            (g as i32 + dg).clamp(0, 255) as u8,
            (b as i32 + db).clamp(0, 255) as u8,
            add_gd_alpha(a, gd_alpha),
        ])
    });
}

/// Adjust contrast by `level` in -100..=100. Negative values increase
/// contrast, positive values flatten it.
pub fn contrast(canvas: &mut Canvas, level: f32) {
    let c = (100.0 - level.clamp(-100.0, 100.0)) / 100.0;
    let c = c * c;
    map_pixels(canvas, |Rgba([r, g, b, a])| {
        let adjust = |v: u8| clamp_u8((((v as f32 / 255.0 - 0.5) * c + 0.5) * 255.0).round());
        Rgba([adjust(r), adjust(g), adjust(b), a])
    });
}

/// Grayscale luminance, truncated like GD.
pub(crate) fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Convert to grayscale.
pub fn desaturate(canvas: &mut Canvas) {
    map_pixels(canvas, |Rgba([r, g, b, a])| {
        let y = luminance(r, g, b);
        Rgba([y, y, y, a])
    });
}

/// Invert the color channels.
pub fn invert(canvas: &mut Canvas) {
    map_pixels(canvas, |Rgba([r, g, b, a])| Rgba([255 - r, 255 - g, 255 - b, a]));
}

/// Desaturate, then tint brown.
pub fn sepia(canvas: &mut Canvas) {
    desaturate(canvas);
    colorize_channels(canvas, SEPIA_TINT, 0);
}

pub fn edge_detect(canvas: &mut Canvas) {
    convolve(canvas, &EDGE_DETECT, 1.0, 127.0);
}

pub fn emboss(canvas: &mut Canvas) {
    convolve(canvas, &EMBOSS, 1.0, 127.0);
}

pub fn sharpen(canvas: &mut Canvas) {
    let divisor: f32 = SHARPEN.iter().flatten().sum();
    convolve(canvas, &SHARPEN, divisor, 0.0);
}

/// Mean-removal convolution, giving a sketched look.
pub fn sketch(canvas: &mut Canvas) {
    convolve(canvas, &MEAN_REMOVAL, 1.0, 0.0);
}

/// Smoothing convolution with centre weight `level`.
pub fn smooth(canvas: &mut Canvas, level: f32) {
    let kernel = [[1.0, 1.0, 1.0], [1.0, level, 1.0], [1.0, 1.0, 1.0]];
    convolve(canvas, &kernel, level + 8.0, 0.0);
}

/// Blur `passes` times with the chosen kernel.
pub fn blur(canvas: &mut Canvas, kind: BlurKind, passes: u32) {
    for _ in 0..passes {
        match kind {
            BlurKind::Gaussian => convolve(canvas, &GAUSSIAN, 16.0, 0.0),
            BlurKind::Selective => selective_blur(canvas),
        }
    }
}

/// Replace each `size`×`size` block with its average color.
pub fn pixelate(canvas: &mut Canvas, size: u32) {
    if size <= 1 {
        return;
    }
    let (width, height) = canvas.dimensions();
    let pixels = canvas.pixels_mut();

    for by in (0..height).step_by(size as usize) {
        for bx in (0..width).step_by(size as usize) {
            let x_end = (bx + size).min(width);
            let y_end = (by + size).min(height);

            let mut sum = [0u64; 4];
            for y in by..y_end {
                for x in bx..x_end {
                    for (acc, c) in sum.iter_mut().zip(pixels.get_pixel(x, y).0) {
                        *acc += c as u64;
                    }
                }
            }
            let count = ((x_end - bx) * (y_end - by)) as u64;
            let average = Rgba(sum.map(|s| (s / count) as u8));

            for y in by..y_end {
                for x in bx..x_end {
                    pixels.put_pixel(x, y, average);
                }
            }
        }
    }
}

fn clamped(source: &RgbaImage, x: i64, y: i64) -> Rgba<u8> {
    let x = x.clamp(0, source.width() as i64 - 1) as u32;
    let y = y.clamp(0, source.height() as i64 - 1) as u32;
    *source.get_pixel(x, y)
}

fn convolve(canvas: &mut Canvas, kernel: &Kernel, divisor: f32, offset: f32) {
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }
    let divisor = if divisor == 0.0 { 1.0 } else { divisor };
    let source = canvas.pixels().clone();

    for (x, y, pixel) in canvas.pixels_mut().enumerate_pixels_mut() {
        let mut acc = [0.0f32; 3];
        for (j, row) in kernel.iter().enumerate() {
            for (i, weight) in row.iter().enumerate() {
                let sample = clamped(&source, x as i64 + i as i64 - 1, y as i64 + j as i64 - 1);
                for (a, c) in acc.iter_mut().zip(sample.0) {
                    *a += c as f32 * weight;
                }
            }
        }
        let alpha = pixel[3];
        *pixel = Rgba([
            clamp_u8(acc[0] / divisor + offset),
            clamp_u8(acc[1] / divisor + offset),
            clamp_u8(acc[2] / divisor + offset),
            alpha,
        ]);
    }
}

/// Blur that favours neighbours close in color to the centre pixel, so
/// edges survive.
fn selective_blur(canvas: &mut Canvas) {
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }
    let source = canvas.pixels().clone();

    for (x, y, pixel) in canvas.pixels_mut().enumerate_pixels_mut() {
        let centre = *source.get_pixel(x, y);
        let mut weighted = [0.0f32; 3];
        let mut weights = [0.0f32; 3];

        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let sample = clamped(&source, x as i64 + dx, y as i64 + dy);
                for ch in 0..3 {
                    let diff = (sample[ch] as f32 - centre[ch] as f32).abs();
                    let weight = if diff == 0.0 { 1.0 } else { 1.0 / diff };
                    weights[ch] += weight;
                    weighted[ch] += weight * sample[ch] as f32;
                }
            }
        }

        *pixel = Rgba([
            clamp_u8(weighted[0] / weights[0]),
            clamp_u8(weighted[1] / weights[1]),
            clamp_u8(weighted[2] / weights[2]),
            centre[3],
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ImageMime;

    fn solid(r: u8, g: u8, b: u8) -> Canvas {
        Canvas::filled(4, 4, Color::rgb(r, g, b))
    }

    fn first(canvas: &Canvas) -> Rgba<u8> {
        canvas.pixel(0, 0).unwrap()
    }

    // =========================================================================
    // Tone filters
    // =========================================================================

    #[test]
    fn brighten_and_darken_shift_channels() {
        let mut canvas = solid(100, 200, 250);
        brighten(&mut canvas, 10.0);
        assert_eq!(first(&canvas), Rgba([125, 225, 255, 255]));

        darken(&mut canvas, 100.0);
        assert_eq!(first(&canvas), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn contrast_zero_is_identity() {
        let mut canvas = solid(10, 128, 240);
        contrast(&mut canvas, 0.0);
        assert_eq!(first(&canvas), Rgba([10, 128, 240, 255]));
    }

    #[test]
    fn contrast_full_positive_flattens_to_mid_gray() {
        let mut canvas = solid(10, 128, 240);
        contrast(&mut canvas, 100.0);
        assert_eq!(first(&canvas), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn colorize_adds_and_fades() {
        let mut canvas = solid(100, 100, 100);
        colorize(&mut canvas, Color::rgb(50, 0, 200));
        assert_eq!(first(&canvas), Rgba([150, 100, 255, 255]));

        colorize(&mut canvas, Color::rgba(0, 0, 0, 0.0));
        assert_eq!(first(&canvas)[3], 0);
    }

    #[test]
    fn desaturate_uses_luma_weights() {
        let mut canvas = solid(255, 0, 0);
        desaturate(&mut canvas);
        assert_eq!(first(&canvas), Rgba([76, 76, 76, 255]));
    }

    #[test]
    fn invert_twice_restores() {
        let mut canvas = solid(1, 2, 3);
        invert(&mut canvas);
        assert_eq!(first(&canvas), Rgba([254, 253, 252, 255]));
        invert(&mut canvas);
        assert_eq!(first(&canvas), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn sepia_tints_gray() {
        let mut canvas = solid(100, 100, 100);
        sepia(&mut canvas);
        assert_eq!(first(&canvas), Rgba([170, 135, 100, 255]));
    }

    #[test]
    fn tone_filters_keep_alpha() {
        let mut canvas = Canvas::filled(2, 2, Color::rgba(10, 20, 30, 0.5));
        let alpha = first(&canvas)[3];
        brighten(&mut canvas, 50.0);
        desaturate(&mut canvas);
        invert(&mut canvas);
        contrast(&mut canvas, -20.0);
        assert_eq!(first(&canvas)[3], alpha);
    }

    #[test]
    fn add_gd_alpha_zero_is_identity() {
        for a in [0, 1, 77, 128, 254, 255] {
            assert_eq!(add_gd_alpha(a, 0), a);
        }
        assert_eq!(add_gd_alpha(255, 127), 0);
    }

    // =========================================================================
    // Convolutions
    // =========================================================================

    #[test]
    fn flat_image_convolutions() {
        let mut canvas = solid(100, 100, 100);
        sharpen(&mut canvas);
        assert_eq!(first(&canvas), Rgba([100, 100, 100, 255]));

        blur(&mut canvas, BlurKind::Gaussian, 3);
        assert_eq!(first(&canvas), Rgba([100, 100, 100, 255]));

        blur(&mut canvas, BlurKind::Selective, 1);
        assert_eq!(first(&canvas), Rgba([100, 100, 100, 255]));

        smooth(&mut canvas, 10.0);
        assert_eq!(first(&canvas), Rgba([100, 100, 100, 255]));

        sketch(&mut canvas);
        assert_eq!(first(&canvas), Rgba([100, 100, 100, 255]));
    }

    #[test]
    fn edge_detect_and_emboss_flat_become_mid_gray() {
        let mut canvas = solid(40, 80, 200);
        edge_detect(&mut canvas);
        assert_eq!(first(&canvas), Rgba([127, 127, 127, 255]));

        let mut canvas = solid(40, 80, 200);
        emboss(&mut canvas);
        assert_eq!(first(&canvas), Rgba([127, 127, 127, 255]));
    }

    #[test]
    fn gaussian_blur_softens_a_dot() {
        let mut canvas = solid(0, 0, 0);
        canvas.set_pixel(1, 1, Rgba([255, 255, 255, 255]));
        blur(&mut canvas, BlurKind::Gaussian, 1);
        assert_eq!(canvas.pixel(1, 1).unwrap()[0], 63);
        assert_eq!(canvas.pixel(2, 1).unwrap()[0], 31);
        assert_eq!(canvas.pixel(2, 2).unwrap()[0], 15);
    }

    #[test]
    fn pixelate_averages_blocks() {
        let pixels = RgbaImage::from_fn(4, 2, |x, _| {
            if x % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([200, 100, 50, 255])
            }
        });
        let mut canvas = Canvas::from_pixels(pixels, ImageMime::Png);
        pixelate(&mut canvas, 2);
        for x in 0..4 {
            for y in 0..2 {
                assert_eq!(canvas.pixel(x, y).unwrap(), Rgba([100, 50, 25, 255]));
            }
        }
    }

    #[test]
    fn pixelate_partial_edge_blocks() {
        let mut canvas = Canvas::filled(5, 5, Color::WHITE);
        pixelate(&mut canvas, 4);
        assert_eq!(canvas.pixel(4, 4).unwrap(), Rgba([255, 255, 255, 255]));
    }
}
