//! Whole-canvas color remapping: opacity, duotone and palette reduction.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::paint::compositor::copy_merge_alpha;
use image::Rgba;
use image::imageops::{self, ColorMap};
use std::collections::HashMap;

/// Fade the whole canvas to `level` (0.0 transparent .. 1.0 unchanged).
///
/// The canvas is merged onto a fresh transparent buffer at `level·100`
/// percent, which then replaces the original.
pub fn opacity(canvas: &mut Canvas, level: f32) {
    let level = level.clamp(0.0, 1.0);
    let (width, height) = canvas.dimensions();
    let mut faded = Canvas::new(width, height);
    copy_merge_alpha(
        &mut faded,
        canvas,
        0,
        0,
        0,
        0,
        width,
        height,
        level as f64 * 100.0,
    );
    canvas.replace_pixels(faded.into_pixels());
}

/// Luminance used to index the duotone ramp.
fn duotone_luminance(Rgba([r, g, b, _]): Rgba<u8>) -> usize {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64)
        .round()
        .min(255.0) as usize
}

/// Map every pixel onto the gradient from `dark` (black) to `light` (white)
/// by its luminance. Pixel alpha is preserved.
pub fn duotone(canvas: &mut Canvas, light: Color, dark: Color) {
    let ramp: Vec<[u8; 3]> = (0..=255u32)
        .map(|i| {
            let t = i as f64 / 255.0;
            let mix = |d: u8, l: u8| (d as f64 + t * (l as f64 - d as f64)).round() as u8;
            [
                mix(dark.red, light.red),
                mix(dark.green, light.green),
                mix(dark.blue, light.blue),
            ]
        })
        .collect();

    for pixel in canvas.pixels_mut().pixels_mut() {
        let [r, g, b] = ramp[duotone_luminance(*pixel)];
        *pixel = Rgba([r, g, b, pixel[3]]);
    }
}

/// Reduce the canvas to at most `max` colors (clamped to 1..=256), with
/// optional Floyd–Steinberg dithering. The resulting palette is recorded on
/// the canvas.
pub fn max_colors(canvas: &mut Canvas, max: u32, dither: bool) {
    let max = max.clamp(1, 256) as usize;
    let entries = median_cut(canvas, max);
    tracing::debug!(requested = max, colors = entries.len(), dither, "palette reduction");

    let map = PaletteMap {
        entries: entries.clone(),
    };
    if dither {
        imageops::dither(canvas.pixels_mut(), &map);
    } else {
        for pixel in canvas.pixels_mut().pixels_mut() {
            map.map_color(pixel);
        }
    }
    canvas.set_palette(entries);
}

/// A set of distinct colors with their pixel counts.
struct ColorBox {
    colors: Vec<([u8; 4], u64)>,
}

impl ColorBox {
    /// Channel with the widest spread, and that spread.
    fn widest_channel(&self) -> (usize, u8) {
        (0..4)
            .map(|ch| {
                let (lo, hi) = self.colors.iter().fold((u8::MAX, u8::MIN), |(lo, hi), (c, _)| {
                    (lo.min(c[ch]), hi.max(c[ch]))
                });
                (ch, hi.saturating_sub(lo))
            })
            .max_by_key(|&(_, range)| range)
            .unwrap_or((0, 0))
    }

    fn split(mut self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest_channel();
        self.colors.sort_by_key(|(c, _)| c[channel]);

        let total: u64 = self.colors.iter().map(|(_, n)| n).sum();
        let mut running = 0;
        let mut index = self.colors.len() / 2;
        for (i, (_, n)) in self.colors.iter().enumerate() {
            running += n;
            if running * 2 >= total {
                index = i + 1;
                break;
            }
        }
        let index = index.clamp(1, self.colors.len() - 1);
        let upper = self.colors.split_off(index);
        (self, ColorBox { colors: upper })
    }

    fn average(&self) -> Rgba<u8> {
        let total: u64 = self.colors.iter().map(|(_, n)| n).sum::<u64>().max(1);
        let mut sum = [0u64; 4];
        for (color, n) in &self.colors {
            for (acc, c) in sum.iter_mut().zip(color) {
                *acc += *c as u64 * n;
            }
        }
        Rgba(sum.map(|s| ((s as f64) / total as f64).round() as u8))
    }
}

fn median_cut(canvas: &Canvas, max: usize) -> Vec<Rgba<u8>> {
    let mut counts: HashMap<[u8; 4], u64> = HashMap::new();
    for pixel in canvas.pixels().pixels() {
        *counts.entry(pixel.0).or_default() += 1;
    }

    if counts.len() <= max {
        let mut exact: Vec<[u8; 4]> = counts.into_keys().collect();
        exact.sort_unstable();
        return exact.into_iter().map(Rgba).collect();
    }

    let mut boxes = vec![ColorBox {
        colors: counts.into_iter().collect(),
    }];
    while boxes.len() < max {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.colors.len() > 1)
            .map(|(i, b)| (i, b.widest_channel().1))
            .filter(|&(_, range)| range > 0)
            .max_by_key(|&(_, range)| range);
        let Some((index, _)) = candidate else {
            break;
        };
        let (lower, upper) = boxes.swap_remove(index).split();
        boxes.push(lower);
        boxes.push(upper);
    }

    boxes.iter().map(ColorBox::average).collect()
}

/// Nearest-color lookup over a fixed palette.
struct PaletteMap {
    entries: Vec<Rgba<u8>>,
}

impl ColorMap for PaletteMap {
    type Color = Rgba<u8>;

    fn index_of(&self, color: &Rgba<u8>) -> usize {
        let distance = |entry: &Rgba<u8>| -> i64 {
            entry
                .0
                .iter()
                .zip(color.0.iter())
                .map(|(a, b)| (*a as i64 - *b as i64).pow(2))
                .sum()
        };
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| distance(entry))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn lookup(&self, index: usize) -> Option<Rgba<u8>> {
        self.entries.get(index).copied()
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Rgba<u8>) {
        if let Some(entry) = self.entries.get(self.index_of(color)) {
            *color = *entry;
        }
    }
}
