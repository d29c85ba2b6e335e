//! The fluent pipeline: one [`Image`] owning one canvas.
//!
//! Load a source, chain operations, then save:
//!
//! ```no_run
//! use vimage::{Anchor, Image};
//!
//! let mut image = Image::from_file("photo.jpg")?;
//! image.auto_orient().thumbnail(200, 200, Anchor::Center)?.sepia();
//! image.to_file("thumb.jpg", None, Some(85))?;
//! # Ok::<(), vimage::ImageError>(())
//! ```
//!
//! Operations take `&mut self` and return `&mut Self` (or `Result<&mut Self>`
//! when they can fail, usually on a color that does not normalize), so a
//! chain stops at the first error. Operations that change dimensions swap
//! the pixel buffer; the previous one is dropped at that point, and the last
//! one when the `Image` is dropped or [released](Image::release).
//!
//! Colors are accepted as anything convertible to
//! [`ColorInput`](crate::color::ColorInput): CSS names, hex strings, tuples
//! or a [`Color`].

use crate::canvas::{Canvas, ColorHandle, ImageMime};
use crate::color::{Color, ColorInput, normalize_color};
use crate::config::Config;
use crate::error::Result;
use crate::exif::ExifData;
use crate::imaging::{
    Anchor, BlurKind, FlipDirection, Orientation, Rect, Thickness, filters, orient, palette, sizer,
};
use crate::loader::{ImageSource, Loaded, Loader};
use crate::paint::text::{self as text_layout, TextBoundary, TextOptions};
use crate::paint::{QrOptions, compositor, qr, shapes};
use crate::saver::{Download, Encoded, Saver};
use std::io::Write;
use std::path::Path;

fn color(input: impl Into<ColorInput>) -> Result<Color> {
    normalize_color(&input.into())
}

/// A loaded image and the operations that can be applied to it.
#[derive(Debug, Clone)]
pub struct Image {
    canvas: Canvas,
    exif: Option<ExifData>,
    config: Config,
}

impl From<Canvas> for Image {
    fn from(canvas: Canvas) -> Self {
        Self {
            canvas,
            exif: None,
            config: Config::default(),
        }
    }
}

impl<'a> From<&'a Image> for ImageSource<'a> {
    fn from(image: &'a Image) -> Self {
        ImageSource::Handle(&image.canvas)
    }
}

impl Image {
    // =========================================================================
    // Loading
    // =========================================================================

    /// Load `source` with the given config; the config is kept for the
    /// savers.
    pub fn load<'a>(source: impl Into<ImageSource<'a>>, config: Config) -> Result<Self> {
        let Loaded { canvas, exif } = Loader::new(config.loader.clone()).load(source.into())?;
        Ok(Self {
            canvas,
            exif,
            config,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path.as_ref(), Config::default())
    }

    pub fn from_data_uri(uri: &str) -> Result<Self> {
        Self::load(ImageSource::DataUri(uri), Config::default())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::load(bytes, Config::default())
    }

    /// A new `width`×`height` canvas flooded with `background`.
    pub fn from_new(width: u32, height: u32, background: impl Into<ColorInput>) -> Result<Self> {
        let background = color(background)?;
        let Loaded { canvas, exif } = Loader::default().from_new(width, height, background);
        Ok(Self {
            canvas,
            exif,
            config: Config::default(),
        })
    }

    /// Replace the config used by the savers.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Saving
    // =========================================================================

    fn saver(&self) -> Saver {
        Saver::new(self.config.saver.clone())
    }

    pub fn to_data_uri(&self, mime: Option<ImageMime>, quality: Option<u32>) -> Result<String> {
        self.saver().to_data_uri(&self.canvas, mime, quality)
    }

    pub fn to_download(
        &self,
        filename: &str,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<Download> {
        self.saver()
            .to_download(&self.canvas, filename, mime, quality)
    }

    pub fn to_file(
        &self,
        path: impl AsRef<Path>,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<Encoded> {
        self.saver()
            .to_file(&self.canvas, path.as_ref(), mime, quality)
    }

    pub fn to_bytes(&self, mime: Option<ImageMime>, quality: Option<u32>) -> Result<Vec<u8>> {
        self.saver().to_bytes(&self.canvas, mime, quality)
    }

    pub fn to_screen(
        &self,
        out: &mut impl Write,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<ImageMime> {
        self.saver().to_screen(&self.canvas, out, mime, quality)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The format the image was loaded from.
    pub fn mime_type(&self) -> ImageMime {
        self.canvas.mime()
    }

    pub fn exif(&self) -> Option<&ExifData> {
        self.exif.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.canvas.aspect_ratio()
    }

    pub fn orientation(&self) -> Orientation {
        orient::orientation(&self.canvas)
    }

    /// Color at `(x, y)`, `None` outside the image.
    pub fn color_at(&self, x: i32, y: i32) -> Option<Color> {
        self.canvas.color_at(x, y)
    }

    pub fn allocate_color(&mut self, input: impl Into<ColorInput>) -> Result<ColorHandle> {
        Ok(self.canvas.allocate_color(color(input)?))
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Give up the image, keeping only its canvas.
    pub fn release(self) -> Canvas {
        self.canvas
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn resize(&mut self, width: Option<u32>, height: Option<u32>) -> &mut Self {
        sizer::resize(&mut self.canvas, width, height);
        self
    }

    pub fn fit_to_width(&mut self, width: u32) -> &mut Self {
        sizer::fit_to_width(&mut self.canvas, width);
        self
    }

    pub fn fit_to_height(&mut self, height: u32) -> &mut Self {
        sizer::fit_to_height(&mut self.canvas, height);
        self
    }

    pub fn best_fit(&mut self, max_width: u32, max_height: u32) -> &mut Self {
        sizer::best_fit(&mut self.canvas, max_width, max_height);
        self
    }

    pub fn crop(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<&mut Self> {
        sizer::crop(&mut self.canvas, x1, y1, x2, y2)?;
        Ok(self)
    }

    pub fn thumbnail(&mut self, width: u32, height: u32, anchor: Anchor) -> Result<&mut Self> {
        sizer::thumbnail(&mut self.canvas, width, height, anchor)?;
        Ok(self)
    }

    pub fn rotate(&mut self, angle: f64, background: impl Into<ColorInput>) -> Result<&mut Self> {
        orient::rotate(&mut self.canvas, angle, color(background)?);
        Ok(self)
    }

    pub fn flip(&mut self, direction: FlipDirection) -> &mut Self {
        orient::flip(&mut self.canvas, direction);
        self
    }

    /// Undo the camera orientation recorded in the source's EXIF data.
    pub fn auto_orient(&mut self) -> &mut Self {
        let tag = self.exif.as_ref().and_then(|exif| exif.orientation);
        orient::auto_orient(&mut self.canvas, tag);
        self
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn brighten(&mut self, percentage: f32) -> &mut Self {
        filters::brighten(&mut self.canvas, percentage);
        self
    }

    pub fn darken(&mut self, percentage: f32) -> &mut Self {
        filters::darken(&mut self.canvas, percentage);
        self
    }

    pub fn colorize(&mut self, tint: impl Into<ColorInput>) -> Result<&mut Self> {
        filters::colorize(&mut self.canvas, color(tint)?);
        Ok(self)
    }

    pub fn contrast(&mut self, level: f32) -> &mut Self {
        filters::contrast(&mut self.canvas, level);
        self
    }

    pub fn desaturate(&mut self) -> &mut Self {
        filters::desaturate(&mut self.canvas);
        self
    }

    pub fn invert(&mut self) -> &mut Self {
        filters::invert(&mut self.canvas);
        self
    }

    pub fn sepia(&mut self) -> &mut Self {
        filters::sepia(&mut self.canvas);
        self
    }

    pub fn edge_detect(&mut self) -> &mut Self {
        filters::edge_detect(&mut self.canvas);
        self
    }

    pub fn emboss(&mut self) -> &mut Self {
        filters::emboss(&mut self.canvas);
        self
    }

    pub fn sharpen(&mut self) -> &mut Self {
        filters::sharpen(&mut self.canvas);
        self
    }

    pub fn sketch(&mut self) -> &mut Self {
        filters::sketch(&mut self.canvas);
        self
    }

    pub fn smooth(&mut self, level: f32) -> &mut Self {
        filters::smooth(&mut self.canvas, level);
        self
    }

    pub fn blur(&mut self, kind: BlurKind, passes: u32) -> &mut Self {
        filters::blur(&mut self.canvas, kind, passes);
        self
    }

    pub fn pixelate(&mut self, size: u32) -> &mut Self {
        filters::pixelate(&mut self.canvas, size);
        self
    }

    // =========================================================================
    // Palette
    // =========================================================================

    pub fn opacity(&mut self, level: f32) -> &mut Self {
        palette::opacity(&mut self.canvas, level);
        self
    }

    pub fn duotone(
        &mut self,
        light: impl Into<ColorInput>,
        dark: impl Into<ColorInput>,
    ) -> Result<&mut Self> {
        palette::duotone(&mut self.canvas, color(light)?, color(dark)?);
        Ok(self)
    }

    pub fn max_colors(&mut self, max: u32, dither: bool) -> &mut Self {
        palette::max_colors(&mut self.canvas, max, dither);
        self
    }

    // =========================================================================
    // Compositing and drawing
    // =========================================================================

    /// Place another image on this one. A borrowed canvas is used as is;
    /// other sources are loaded with this image's config first.
    pub fn overlay<'a>(
        &mut self,
        source: impl Into<ImageSource<'a>>,
        anchor: Anchor,
        opacity: f32,
        x_offset: i32,
        y_offset: i32,
    ) -> Result<&mut Self> {
        match source.into() {
            ImageSource::Handle(src) => {
                compositor::overlay(&mut self.canvas, src, anchor, opacity, x_offset, y_offset);
            }
            other => {
                let loaded = Loader::new(self.config.loader.clone()).load(other)?;
                compositor::overlay(
                    &mut self.canvas,
                    &loaded.canvas,
                    anchor,
                    opacity,
                    x_offset,
                    y_offset,
                );
            }
        }
        Ok(self)
    }

    pub fn dot(&mut self, x: i32, y: i32, ink: impl Into<ColorInput>) -> Result<&mut Self> {
        shapes::dot(&mut self.canvas, x, y, color(ink)?);
        Ok(self)
    }

    pub fn line(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        ink: impl Into<ColorInput>,
        thickness: u32,
    ) -> Result<&mut Self> {
        shapes::line(&mut self.canvas, from, to, color(ink)?, thickness);
        Ok(self)
    }

    pub fn polygon(
        &mut self,
        vertices: &[(i32, i32)],
        ink: impl Into<ColorInput>,
        thickness: impl Into<Thickness>,
    ) -> Result<&mut Self> {
        shapes::polygon(&mut self.canvas, vertices, color(ink)?, thickness.into());
        Ok(self)
    }

    pub fn rectangle(
        &mut self,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        ink: impl Into<ColorInput>,
        thickness: impl Into<Thickness>,
    ) -> Result<&mut Self> {
        shapes::rectangle(
            &mut self.canvas,
            top_left,
            bottom_right,
            color(ink)?,
            thickness.into(),
        );
        Ok(self)
    }

    pub fn rounded_rectangle(
        &mut self,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        radius: i32,
        ink: impl Into<ColorInput>,
        thickness: impl Into<Thickness>,
    ) -> Result<&mut Self> {
        shapes::rounded_rectangle(
            &mut self.canvas,
            top_left,
            bottom_right,
            radius,
            color(ink)?,
            thickness.into(),
        );
        Ok(self)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        center: (i32, i32),
        width: i32,
        height: i32,
        start: i32,
        end: i32,
        ink: impl Into<ColorInput>,
        thickness: impl Into<Thickness>,
    ) -> Result<&mut Self> {
        shapes::arc(
            &mut self.canvas,
            center,
            width,
            height,
            start,
            end,
            color(ink)?,
            thickness.into(),
        );
        Ok(self)
    }

    pub fn ellipse(
        &mut self,
        center: (i32, i32),
        width: i32,
        height: i32,
        ink: impl Into<ColorInput>,
        thickness: impl Into<Thickness>,
    ) -> Result<&mut Self> {
        shapes::ellipse(
            &mut self.canvas,
            center,
            width,
            height,
            color(ink)?,
            thickness.into(),
        );
        Ok(self)
    }

    pub fn border(&mut self, ink: impl Into<ColorInput>, thickness: u32) -> Result<&mut Self> {
        shapes::border(&mut self.canvas, color(ink)?, thickness);
        Ok(self)
    }

    pub fn fill(&mut self, ink: impl Into<ColorInput>) -> Result<&mut Self> {
        shapes::fill(&mut self.canvas, color(ink)?);
        Ok(self)
    }

    pub fn flood_fill(&mut self, x: i32, y: i32, ink: impl Into<ColorInput>) -> Result<&mut Self> {
        shapes::flood_fill(&mut self.canvas, x, y, color(ink)?);
        Ok(self)
    }

    pub fn text(&mut self, text: &str, options: &TextOptions) -> Result<TextBoundary> {
        text_layout::text(&mut self.canvas, text, options)
    }

    pub fn text_in_rect(
        &mut self,
        rect: impl Into<Rect>,
        text: &str,
        options: &TextOptions,
    ) -> Result<TextBoundary> {
        text_layout::text_in_rect(&mut self.canvas, rect.into(), text, options)
    }

    pub fn text_in_vertical_rect_with_div(
        &mut self,
        text: &str,
        rect: impl Into<Rect>,
        options: &TextOptions,
    ) -> Result<TextBoundary> {
        text_layout::text_in_vertical_rect_with_div(&mut self.canvas, text, rect.into(), options)
    }

    pub fn qr_code(&mut self, text: &str, options: &QrOptions) -> Result<&mut Self> {
        qr::qr_code(&mut self.canvas, text, options)?;
        Ok(self)
    }
}
