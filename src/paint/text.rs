//! Anchored text layout.
//!
//! Font bounding boxes are measured from the baseline, so two strings at the
//! same size can report different heights depending on their descenders. To
//! place text consistently the layout uses a fixed box:
//!
//! - **width**: the measured width of the string
//! - **height**: the requested size in pixels
//!
//! The descender depth (height of `"X Qgjpqy"` minus the cap height of
//! `"X"`) is subtracted from the baseline before rendering, so the visible
//! glyphs sit inside that box rather than hanging below it.
//!
//! Every operation returns the [`TextBoundary`] of what it placed.

use super::font::{FontRef, GlyphRasterizer, PX_PER_PT, TextBox};
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::{ImageError, Result};
use crate::imaging::{Anchor, Rect, calculate_text_baseline};
use image::Rgba;

/// A drop shadow drawn under the text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

/// How to render a piece of text.
///
/// Build from [`TextOptions::new`] and override fields with struct update
/// syntax.
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub font: FontRef,
    /// Font size in pixels.
    pub size: u32,
    pub color: Color,
    pub anchor: Anchor,
    pub x_offset: i32,
    pub y_offset: i32,
    pub shadow: Option<Shadow>,
    /// Counter-clockwise rotation in degrees. Only [`text`] honours it.
    pub angle: f32,
    /// Vertical layout only: put the first and last characters flush against
    /// the rect edges.
    pub align_border: bool,
}

impl TextOptions {
    pub fn new(font: impl Into<FontRef>) -> Self {
        Self {
            font: font.into(),
            size: 12,
            color: Color::BLACK,
            anchor: Anchor::Center,
            x_offset: 0,
            y_offset: 0,
            shadow: None,
            angle: 0.0,
            align_border: true,
        }
    }

    fn points(&self) -> f32 {
        self.size as f32 / PX_PER_PT
    }
}

/// The box a text operation placed, in canvas coordinates. `y2` is the
/// baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBoundary {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub width: i32,
    pub height: i32,
}

impl TextBoundary {
    fn at_baseline(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y - height,
            x2: x + width,
            y2: y,
            width,
            height,
        }
    }

    fn union(self, other: Self) -> Self {
        let (x1, y1) = (self.x1.min(other.x1), self.y1.min(other.y1));
        let (x2, y2) = (self.x2.max(other.x2), self.y2.max(other.y2));
        Self {
            x1,
            y1,
            x2,
            y2,
            width: x2 - x1,
            height: y2 - y1,
        }
    }
}

/// Box metrics shared by every layout mode.
struct Metrics {
    box_width: i32,
    box_height: i32,
    descender: i32,
}

fn box_width(b: &TextBox) -> i32 {
    (b[6] - b[2]).abs()
}

fn box_height(b: &TextBox) -> i32 {
    (b[7] - b[1]).abs()
}

fn measure(
    font: &dyn GlyphRasterizer,
    options: &TextOptions,
    angle: f32,
    sample: &str,
) -> Result<Metrics> {
    let points = options.points();
    let measured = font.bbox(points, angle, sample)?;
    let cap = box_height(&font.bbox(points, angle, "X")?);
    let full = box_height(&font.bbox(points, angle, "X Qgjpqy")?);
    Ok(Metrics {
        box_width: box_width(&measured),
        box_height: options.size as i32,
        descender: full - cap,
    })
}

/// Draw the shadow (if any) and then the text, baseline at `(x, y)`.
#[allow(clippy::too_many_arguments)]
fn render(
    canvas: &mut Canvas,
    font: &dyn GlyphRasterizer,
    options: &TextOptions,
    angle: f32,
    ink: Rgba<u8>,
    (x, y): (i32, i32),
    descender: i32,
    text: &str,
) -> Result<()> {
    let points = options.points();
    if let Some(shadow) = options.shadow {
        let handle = canvas.allocate_color(shadow.color);
        let shade = canvas.resolve(handle);
        font.draw(
            canvas,
            points,
            angle,
            (x + shadow.x, y + shadow.y - descender),
            shade,
            text,
        )?;
    }
    font.draw(canvas, points, angle, (x, y - descender), ink, text)
}

fn ink_for(canvas: &mut Canvas, color: Color) -> Rgba<u8> {
    let handle = canvas.allocate_color(color);
    canvas.resolve(handle)
}

fn invalid_rect(rect: Rect) -> ImageError {
    ImageError::InvalidCoordinate(format!(
        "text rect ({}, {})-({}, {}) has no area",
        rect.x1, rect.y1, rect.x2, rect.y2
    ))
}

/// Draw `text` anchored within the whole canvas.
pub fn text(canvas: &mut Canvas, text: &str, options: &TextOptions) -> Result<TextBoundary> {
    let font = options.font.resolve()?;
    let ink = ink_for(canvas, options.color);
    let metrics = measure(font.as_ref(), options, options.angle, text)?;
    let (w, h) = canvas.dimensions();

    let (x, y) = calculate_text_baseline(
        (w as i32, h as i32),
        (metrics.box_width, metrics.box_height),
        options.anchor,
        (options.x_offset, options.y_offset),
    );
    tracing::debug!(x, y, anchor = %options.anchor, size = options.size, "placing text");

    render(
        canvas,
        font.as_ref(),
        options,
        options.angle,
        ink,
        (x, y),
        metrics.descender,
        text,
    )?;
    Ok(TextBoundary::at_baseline(
        x,
        y,
        metrics.box_width,
        metrics.box_height,
    ))
}

/// Draw `text` anchored within `rect` instead of the whole canvas.
///
/// Offsets are relative to the rect's top-left corner. Fails with
/// `InvalidCoordinate` if the rect has no area.
pub fn text_in_rect(
    canvas: &mut Canvas,
    rect: Rect,
    text: &str,
    options: &TextOptions,
) -> Result<TextBoundary> {
    let font = options.font.resolve()?;
    let ink = ink_for(canvas, options.color);
    let metrics = measure(font.as_ref(), options, 0.0, text)?;
    if rect.width() <= 0 || rect.height() <= 0 {
        return Err(invalid_rect(rect));
    }

    let (x, y) = calculate_text_baseline(
        (rect.width(), rect.height()),
        (metrics.box_width, metrics.box_height),
        options.anchor,
        (options.x_offset + rect.x1, options.y_offset + rect.y1),
    );
    tracing::debug!(x, y, anchor = %options.anchor, "placing text in rect");

    render(
        canvas,
        font.as_ref(),
        options,
        0.0,
        ink,
        (x, y),
        metrics.descender,
        text,
    )?;
    Ok(TextBoundary::at_baseline(
        x,
        y,
        metrics.box_width,
        metrics.box_height,
    ))
}

/// Gap between consecutive characters of a vertical layout.
///
/// The rect height left over after `count` rows of `size` pixels is shared
/// out over `count - 1` gaps when the text is flush with the rect edges,
/// otherwise over `count + 1` gaps. A layout with no gaps gets zero.
fn vertical_gap(rect_height: i32, count: usize, size: u32, align_border: bool) -> Option<f64> {
    let chars_height = (count as f64 * size as f64).round();
    let spare = rect_height as f64 - chars_height;
    if spare < 0.0 {
        return None;
    }
    let gaps = if align_border {
        count as f64 - 1.0
    } else {
        count as f64 + 1.0
    };
    Some(if gaps == 0.0 { 0.0 } else { spare / gaps })
}

/// Lay `text` out one character per row down `rect`, evenly spaced.
///
/// Horizontal placement uses the first character's width and honours
/// `TopLeft`, `TopRight`; every other anchor centres the column. Fails with
/// `InvalidCoordinate` if the rect has no area or is too short for the text.
/// The returned boundary covers every character.
pub fn text_in_vertical_rect_with_div(
    canvas: &mut Canvas,
    text: &str,
    rect: Rect,
    options: &TextOptions,
) -> Result<TextBoundary> {
    let font = options.font.resolve()?;
    let ink = ink_for(canvas, options.color);
    let chars: Vec<char> = text.chars().collect();
    let first: String = chars.iter().take(1).collect();
    let metrics = measure(font.as_ref(), options, 0.0, &first)?;

    let (rect_w, rect_h) = (rect.width(), rect.height());
    if rect_w <= 0 || rect_h <= 0 {
        return Err(invalid_rect(rect));
    }
    let gap = vertical_gap(rect_h, chars.len(), options.size, options.align_border)
        .ok_or_else(|| {
            ImageError::InvalidCoordinate(format!(
                "rect height {rect_h} cannot hold {} characters at {}px",
                chars.len(),
                options.size
            ))
        })?;

    let x_base = (options.x_offset + rect.x1) as f64;
    let y_base = (options.y_offset + rect.y1) as f64;
    let (box_w, box_h) = (metrics.box_width as f64, metrics.box_height as f64);
    let x = match options.anchor {
        Anchor::TopLeft => x_base,
        Anchor::TopRight => rect_w as f64 - box_w + x_base,
        _ => rect_w as f64 / 2.0 - box_w / 2.0 + x_base,
    }
    .round() as i32;
    let lead = if options.align_border { 0.0 } else { 1.0 };
    tracing::debug!(chars = chars.len(), gap, x, "placing vertical text");

    let mut boundary: Option<TextBoundary> = None;
    let mut buf = [0u8; 4];
    for (i, c) in chars.iter().enumerate() {
        let y = (y_base + box_h * (1.0 + i as f64) + gap * (lead + i as f64)).round() as i32;
        let placed = TextBoundary::at_baseline(x, y, metrics.box_width, metrics.box_height);
        boundary = Some(boundary.map_or(placed, |b| b.union(placed)));
        render(
            canvas,
            font.as_ref(),
            options,
            0.0,
            ink,
            (x, y),
            metrics.descender,
            c.encode_utf8(&mut buf),
        )?;
    }

    Ok(boundary.unwrap_or(TextBoundary {
        x1: x,
        y1: rect.y1,
        x2: x,
        y2: rect.y1,
        width: 0,
        height: 0,
    }))
}
