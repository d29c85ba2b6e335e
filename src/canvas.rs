//! The pixel buffer every operation works on.
//!
//! A [`Canvas`] owns an 8-bit straight-alpha RGBA grid plus the mime type it
//! was loaded from (or created for). Drawing and filters mutate it in place;
//! operations that change dimensions swap the grid through
//! [`Canvas::replace_pixels`], which drops the previous buffer immediately.
//!
//! After palette reduction the canvas also remembers its palette, and
//! [`Canvas::allocate_color`] then hands out palette indices (reusing exact
//! matches) instead of packed true-color values.

use crate::color::Color;
use image::{Pixel, Rgba, RgbaImage};
use std::fmt;
use std::path::Path;

/// Raster formats the toolkit reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Gif,
    Jpeg,
    Png,
    Webp,
}

impl ImageMime {
    pub const ALL: [ImageMime; 4] = [Self::Gif, Self::Jpeg, Self::Png, Self::Webp];

    /// Parse a mime type string such as `"image/png"`.
    pub fn parse(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/gif" => Some(Self::Gif),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "gif" => Some(Self::Gif),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gif => "image/gif",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub(crate) fn from_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A color resolved against a specific canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorHandle {
    /// GD-style packed value: 7-bit inverted alpha in the top byte, then RGB.
    TrueColor(u32),
    /// Index into the canvas palette.
    Palette(u8),
}

/// An owned RGBA pixel grid with its format hint.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
    mime: ImageMime,
    palette: Option<Vec<Rgba<u8>>>,
}

impl Canvas {
    /// A fully transparent canvas, tagged as PNG.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_pixels(RgbaImage::new(width, height), ImageMime::Png)
    }

    /// A canvas flooded with one color, tagged as PNG.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self::from_pixels(
            RgbaImage::from_pixel(width, height, color.to_rgba()),
            ImageMime::Png,
        )
    }

    pub fn from_pixels(pixels: RgbaImage, mime: ImageMime) -> Self {
        Self {
            pixels,
            mime,
            palette: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width() as f64 / self.height() as f64
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn set_mime(&mut self, mime: ImageMime) {
        self.mime = mime;
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Swap in a new pixel grid, releasing the old one.
    ///
    /// The palette is kept: a reallocated canvas stays palette-backed until
    /// something resets it.
    pub fn replace_pixels(&mut self, pixels: RgbaImage) {
        tracing::debug!(
            from_width = self.width(),
            from_height = self.height(),
            to_width = pixels.width(),
            to_height = pixels.height(),
            "replacing canvas buffer"
        );
        self.pixels = pixels;
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Raw pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if self.in_bounds(x, y) {
            Some(*self.pixels.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    /// Canonical color at `(x, y)`, or `None` outside the canvas.
    pub fn color_at(&self, x: i32, y: i32) -> Option<Color> {
        self.pixel(x, y).map(Color::from_rgba)
    }

    /// Overwrite one pixel. Writes outside the canvas are dropped.
    pub fn set_pixel(&mut self, x: i32, y: i32, pixel: Rgba<u8>) {
        if self.in_bounds(x, y) {
            self.pixels.put_pixel(x as u32, y as u32, pixel);
        }
    }

    /// Alpha-blend one pixel over the existing value. Writes outside the
    /// canvas are dropped.
    pub fn blend_pixel(&mut self, x: i32, y: i32, pixel: Rgba<u8>) {
        if self.in_bounds(x, y) {
            self.pixels.get_pixel_mut(x as u32, y as u32).blend(&pixel);
        }
    }

    /// Palette entries once the canvas has been reduced, otherwise `None`.
    pub fn palette(&self) -> Option<&[Rgba<u8>]> {
        self.palette.as_deref()
    }

    pub fn set_palette(&mut self, palette: Vec<Rgba<u8>>) {
        self.palette = Some(palette);
    }

    pub fn is_true_color(&self) -> bool {
        self.palette.is_none()
    }

    /// Resolve `color` into a handle for subsequent draw calls.
    ///
    /// True-color canvases pack the color directly. Palette canvases reuse an
    /// exact match, append a new entry while there is room, and fall back to
    /// the closest entry once all 256 slots are taken.
    pub fn allocate_color(&mut self, color: Color) -> ColorHandle {
        let Some(palette) = self.palette.as_mut() else {
            return ColorHandle::TrueColor(pack_true_color(color));
        };
        let wanted = quantize_alpha(color);
        if let Some(index) = palette.iter().position(|entry| *entry == wanted) {
            return ColorHandle::Palette(index as u8);
        }
        if palette.len() < 256 {
            palette.push(wanted);
            return ColorHandle::Palette((palette.len() - 1) as u8);
        }
        ColorHandle::Palette(closest_entry(palette, wanted))
    }

    /// The pixel value a handle stands for on this canvas.
    pub fn resolve(&self, handle: ColorHandle) -> Rgba<u8> {
        match handle {
            ColorHandle::TrueColor(packed) => unpack_true_color(packed),
            ColorHandle::Palette(index) => self
                .palette
                .as_ref()
                .and_then(|palette| palette.get(index as usize).copied())
                .unwrap_or(Rgba([0, 0, 0, 0])),
        }
    }
}

fn pack_true_color(color: Color) -> u32 {
    (color.gd_alpha() as u32) << 24
        | (color.red as u32) << 16
        | (color.green as u32) << 8
        | color.blue as u32
}

fn unpack_true_color(packed: u32) -> Rgba<u8> {
    let gd_alpha = ((packed >> 24) & 0x7f) as f32;
    let alpha = ((127.0 - gd_alpha) * 255.0 / 127.0).round() as u8;
    Rgba([(packed >> 16) as u8, (packed >> 8) as u8, packed as u8, alpha])
}

/// Round-trip through the 7-bit alpha so palette entries match packed colors.
fn quantize_alpha(color: Color) -> Rgba<u8> {
    unpack_true_color(pack_true_color(color))
}

fn closest_entry(palette: &[Rgba<u8>], wanted: Rgba<u8>) -> u8 {
    let distance = |entry: &Rgba<u8>| -> u32 {
        entry
            .0
            .iter()
            .zip(wanted.0.iter())
            .map(|(a, b)| (*a as i32 - *b as i32).unsigned_abs().pow(2))
            .sum()
    };
    palette
        .iter()
        .enumerate()
        .min_by_key(|(_, entry)| distance(entry))
        .map(|(index, _)| index as u8)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_transparent_png() {
        let canvas = Canvas::new(4, 3);
        assert_eq!(canvas.dimensions(), (4, 3));
        assert_eq!(canvas.mime(), ImageMime::Png);
        assert_eq!(canvas.color_at(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn color_at_out_of_range_is_none() {
        let canvas = Canvas::filled(4, 3, Color::WHITE);
        assert_eq!(canvas.color_at(3, 2), Some(Color::WHITE));
        assert_eq!(canvas.color_at(4, 0), None);
        assert_eq!(canvas.color_at(0, 3), None);
        assert_eq!(canvas.color_at(-1, 0), None);
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        assert_eq!(Canvas::new(400, 300).aspect_ratio(), 400.0 / 300.0);
    }

    #[test]
    fn mime_parse_and_display() {
        assert_eq!(ImageMime::parse("image/JPEG"), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::parse("image/jpg"), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::parse("image/bmp"), None);
        assert_eq!(ImageMime::Webp.to_string(), "image/webp");
        assert_eq!(
            ImageMime::from_path(Path::new("a/b/photo.JPEG")),
            Some(ImageMime::Jpeg)
        );
        assert_eq!(ImageMime::from_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn blend_pixel_composites_over() {
        let mut canvas = Canvas::filled(1, 1, Color::WHITE);
        canvas.blend_pixel(0, 0, Rgba([0, 0, 0, 128]));
        let px = canvas.pixel(0, 0).unwrap();
        assert_eq!(px[3], 255);
        assert!((126..=128).contains(&px[0]), "got {px:?}");
    }

    #[test]
    fn writes_outside_are_dropped() {
        let mut canvas = Canvas::new(2, 2);
        canvas.set_pixel(5, 5, Rgba([1, 2, 3, 255]));
        canvas.blend_pixel(-1, 0, Rgba([1, 2, 3, 255]));
        assert!(canvas.pixels().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn true_color_handle_packs_inverted_alpha() {
        let mut canvas = Canvas::new(1, 1);
        let handle = canvas.allocate_color(Color::rgb(0x12, 0x34, 0x56));
        assert_eq!(handle, ColorHandle::TrueColor(0x0012_3456));
        assert_eq!(canvas.resolve(handle), Rgba([0x12, 0x34, 0x56, 255]));

        let clear = canvas.allocate_color(Color::TRANSPARENT);
        assert_eq!(clear, ColorHandle::TrueColor(0x7f00_0000));
        assert_eq!(canvas.resolve(clear)[3], 0);
    }

    #[test]
    fn palette_allocation_reuses_exact_match() {
        let mut canvas = Canvas::new(1, 1);
        canvas.set_palette(vec![Rgba([255, 0, 0, 255])]);

        assert_eq!(
            canvas.allocate_color(Color::rgb(255, 0, 0)),
            ColorHandle::Palette(0)
        );
        assert_eq!(
            canvas.allocate_color(Color::rgb(0, 0, 255)),
            ColorHandle::Palette(1)
        );
        assert_eq!(
            canvas.allocate_color(Color::rgb(0, 0, 255)),
            ColorHandle::Palette(1)
        );
        assert_eq!(canvas.palette().unwrap().len(), 2);
    }

    #[test]
    fn full_palette_falls_back_to_closest() {
        let mut canvas = Canvas::new(1, 1);
        let palette = (0..=255u8).map(|v| Rgba([v, v, v, 255])).collect();
        canvas.set_palette(palette);

        let handle = canvas.allocate_color(Color::rgb(10, 12, 11));
        assert_eq!(handle, ColorHandle::Palette(11));
        assert_eq!(canvas.palette().unwrap().len(), 256);
    }
}
