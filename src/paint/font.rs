//! Font collaborator seam.
//!
//! Text layout only needs two things from a font: the bounding box a string
//! would occupy, and a way to render that string at a baseline origin. The
//! [`GlyphRasterizer`] trait captures exactly that, so layout can be tested
//! against a mock with fixed metrics.
//!
//! Sizes are in points. Rendering assumes 96 DPI, so `points * 96 / 72`
//! is the em size in pixels.
//!
//! ## Bounding box layout
//!
//! [`TextBox`] is eight integers, relative to the baseline origin with `y`
//! growing downward:
//!
//! | Index | Corner |
//! |---|---|
//! | 0, 1 | lower left |
//! | 2, 3 | lower right |
//! | 4, 5 | upper right |
//! | 6, 7 | upper left |

use crate::canvas::Canvas;
use crate::error::{ImageError, Result};
use image::{GrayImage, Luma, Rgba};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Corner coordinates of a rendered string, see the [module docs](self).
pub type TextBox = [i32; 8];

/// Pixels per point at the rendering resolution.
pub const PX_PER_PT: f32 = 96.0 / 72.0;

/// Measures and renders strings in one font.
pub trait GlyphRasterizer: Send + Sync {
    /// Bounding box of `text` at `points`, rotated counter-clockwise by
    /// `angle` degrees around the baseline origin.
    fn bbox(&self, points: f32, angle: f32, text: &str) -> Result<TextBox>;

    /// Render `text` with its baseline origin at `origin`, blending `ink`
    /// scaled by glyph coverage.
    fn draw(
        &self,
        canvas: &mut Canvas,
        points: f32,
        angle: f32,
        origin: (i32, i32),
        ink: Rgba<u8>,
        text: &str,
    ) -> Result<()>;
}

/// A font to lay text out with: a file loaded on use, or an already-loaded
/// rasterizer shared between calls.
#[derive(Clone)]
pub enum FontRef {
    File(PathBuf),
    Loaded(Arc<dyn GlyphRasterizer>),
}

impl FontRef {
    /// Load the font if needed.
    ///
    /// Fails with `FreetypeNotEnabled` when built without the `text` feature
    /// and `FontFile` when the file cannot be read or parsed.
    pub fn resolve(&self) -> Result<Arc<dyn GlyphRasterizer>> {
        match self {
            FontRef::Loaded(font) => Ok(Arc::clone(font)),
            FontRef::File(path) => load_font_file(path),
        }
    }
}

impl fmt::Debug for FontRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontRef::File(path) => f.debug_tuple("File").field(path).finish(),
            FontRef::Loaded(_) => f.write_str("Loaded(..)"),
        }
    }
}

impl From<PathBuf> for FontRef {
    fn from(path: PathBuf) -> Self {
        FontRef::File(path)
    }
}

impl From<&Path> for FontRef {
    fn from(path: &Path) -> Self {
        FontRef::File(path.to_path_buf())
    }
}

impl From<&str> for FontRef {
    fn from(path: &str) -> Self {
        FontRef::File(PathBuf::from(path))
    }
}

#[cfg(feature = "text")]
fn load_font_file(path: &Path) -> Result<Arc<dyn GlyphRasterizer>> {
    Ok(Arc::new(TrueTypeFont::load(path)?))
}

#[cfg(not(feature = "text"))]
fn load_font_file(_path: &Path) -> Result<Arc<dyn GlyphRasterizer>> {
    Err(ImageError::FreetypeNotEnabled)
}

/// Rotate a point counter-clockwise (as seen on screen) by `angle` degrees.
fn rotate_point((x, y): (f32, f32), angle: f32) -> (f32, f32) {
    if angle == 0.0 {
        return (x, y);
    }
    let (sin, cos) = angle.to_radians().sin_cos();
    (x * cos + y * sin, -x * sin + y * cos)
}

/// Build a [`TextBox`] from an axis-aligned extent, rotated by `angle`.
pub(crate) fn text_box(min: (f32, f32), max: (f32, f32), angle: f32) -> TextBox {
    let corners = [
        (min.0, max.1),
        (max.0, max.1),
        (max.0, min.1),
        (min.0, min.1),
    ];
    let mut out = [0; 8];
    for (i, corner) in corners.into_iter().enumerate() {
        let (x, y) = rotate_point(corner, angle);
        out[i * 2] = x.round() as i32;
        out[i * 2 + 1] = y.round() as i32;
    }
    out
}

/// Rotate an upright coverage mask counter-clockwise by `angle` degrees
/// around the baseline origin. `min` is the mask's top-left relative to the
/// origin; the rotated mask is returned with its own top-left.
///
/// Every destination pixel samples the upright mask, so rotation never
/// leaves gaps inside filled areas.
#[cfg_attr(not(feature = "text"), allow(dead_code))]
pub(crate) fn rotate_mask(
    mask: &GrayImage,
    min: (i32, i32),
    angle: f32,
) -> (GrayImage, (i32, i32)) {
    let (w, h) = (mask.width() as f32, mask.height() as f32);
    let (left, top) = (min.0 as f32, min.1 as f32);
    let corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
        .map(|(x, y)| rotate_point((left + x, top + y), angle));
    let x0 = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min).floor();
    let y0 = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min).floor();
    let x1 = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max).ceil();
    let y1 = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max).ceil();

    let projection = Projection::translate(-x0, -y0)
        * Projection::rotate(-angle.to_radians())
        * Projection::translate(left, top);
    let mut out = GrayImage::new((x1 - x0) as u32 + 1, (y1 - y0) as u32 + 1);
    warp_into(mask, &projection, Interpolation::Bilinear, Luma([0]), &mut out);
    (out, (x0 as i32, y0 as i32))
}

/// A TrueType/OpenType font rendered with `ab_glyph`.
#[cfg(feature = "text")]
pub struct TrueTypeFont {
    font: ab_glyph::FontVec,
}

#[cfg(feature = "text")]
mod truetype {
    use super::*;
    use ab_glyph::{Font, FontVec, Glyph, OutlinedGlyph, PxScale, ScaleFont, point};

    type Extent = ((f32, f32), (f32, f32));

    /// Union of the pixel bounds of `outlined`, `None` when nothing has ink.
    fn extent(outlined: &[OutlinedGlyph]) -> Option<Extent> {
        outlined
            .iter()
            .map(|glyph| glyph.px_bounds())
            .fold(None, |acc: Option<Extent>, r| {
                Some(match acc {
                    None => ((r.min.x, r.min.y), (r.max.x, r.max.y)),
                    Some((min, max)) => (
                        (f32::min(min.0, r.min.x), f32::min(min.1, r.min.y)),
                        (f32::max(max.0, r.max.x), f32::max(max.1, r.max.y)),
                    ),
                })
            })
    }

    impl TrueTypeFont {
        /// Read and parse a font file.
        pub fn load(path: &Path) -> Result<Self> {
            let bytes = std::fs::read(path).map_err(|e| {
                ImageError::FontFile(format!("unable to load font file {}: {e}", path.display()))
            })?;
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded font file");
            Self::from_bytes(bytes)
        }

        /// Parse a font from memory.
        pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
            let font = FontVec::try_from_vec(bytes)
                .map_err(|e| ImageError::FontFile(format!("invalid font data: {e}")))?;
            Ok(Self { font })
        }

        fn scale(&self, points: f32) -> PxScale {
            self.font
                .pt_to_px_scale(points)
                .unwrap_or_else(|| PxScale::from(points * PX_PER_PT))
        }

        /// Positioned glyphs along a baseline at y = 0, and the final caret.
        fn layout(&self, points: f32, text: &str) -> (Vec<Glyph>, f32) {
            let scale = self.scale(points);
            let scaled = self.font.as_scaled(scale);
            let mut glyphs = Vec::new();
            let mut caret = 0.0;
            let mut previous = None;
            for c in text.chars().filter(|c| !c.is_control()) {
                let id = scaled.glyph_id(c);
                if let Some(prev) = previous {
                    caret += scaled.kern(prev, id);
                }
                glyphs.push(id.with_scale_and_position(scale, point(caret, 0.0)));
                caret += scaled.h_advance(id);
                previous = Some(id);
            }
            (glyphs, caret)
        }

        fn outline(&self, points: f32, text: &str) -> (Vec<OutlinedGlyph>, f32) {
            let (glyphs, caret) = self.layout(points, text);
            let outlined = glyphs
                .into_iter()
                .filter_map(|glyph| self.font.outline_glyph(glyph))
                .collect();
            (outlined, caret)
        }

        /// Upright coverage of `text` with a one pixel empty border, and the
        /// mask's top-left relative to the baseline origin.
        fn coverage(&self, points: f32, text: &str) -> Option<(GrayImage, (i32, i32))> {
            let (outlined, _) = self.outline(points, text);
            let (min, max) = extent(&outlined)?;
            let left = min.0 as i32 - 1;
            let top = min.1 as i32 - 1;
            let width = (max.0 as i32 - left + 1) as u32;
            let height = (max.1 as i32 - top + 1) as u32;

            let mut mask = GrayImage::new(width, height);
            for glyph in &outlined {
                let bounds = glyph.px_bounds();
                let dx = (bounds.min.x as i32 - left) as u32;
                let dy = (bounds.min.y as i32 - top) as u32;
                glyph.draw(|gx, gy, coverage| {
                    let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    if let Some(Luma([cell])) = mask.get_pixel_mut_checked(dx + gx, dy + gy) {
                        *cell = (*cell).max(value);
                    }
                });
            }
            Some((mask, (left, top)))
        }
    }

    /// Blend `ink` through a coverage mask whose top-left sits at `at`.
    fn blend_mask(canvas: &mut Canvas, mask: &GrayImage, at: (i32, i32), ink: Rgba<u8>) {
        for (x, y, Luma([coverage])) in mask.enumerate_pixels() {
            if *coverage == 0 {
                continue;
            }
            let mut pixel = ink;
            pixel[3] = (ink[3] as f32 * *coverage as f32 / 255.0).round() as u8;
            canvas.blend_pixel(at.0 + x as i32, at.1 + y as i32, pixel);
        }
    }

    impl GlyphRasterizer for TrueTypeFont {
        fn bbox(&self, points: f32, angle: f32, text: &str) -> Result<TextBox> {
            let (outlined, caret) = self.outline(points, text);
            let (min, max) = extent(&outlined).unwrap_or(((0.0, 0.0), (caret, 0.0)));
            Ok(text_box(min, max, angle))
        }

        fn draw(
            &self,
            canvas: &mut Canvas,
            points: f32,
            angle: f32,
            origin: (i32, i32),
            ink: Rgba<u8>,
            text: &str,
        ) -> Result<()> {
            let Some((mask, min)) = self.coverage(points, text) else {
                return Ok(());
            };
            let (mask, min) = if angle == 0.0 {
                (mask, min)
            } else {
                rotate_mask(&mask, min, angle)
            };
            blend_mask(canvas, &mask, (origin.0 + min.0, origin.1 + min.1), ink);
            Ok(())
        }
    }
}
