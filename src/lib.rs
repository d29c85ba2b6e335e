//! # vimage
//!
//! A fluent image-manipulation toolkit. Load a raster image from a file, a
//! data URI or raw bytes; chain geometric, color, compositing and drawing
//! operations; then emit the result as bytes, a file, a data URI or an HTTP
//! style response.
//!
//! ```no_run
//! use vimage::{Anchor, Image, ImageMime};
//!
//! let mut image = Image::from_file("photo.jpg")?;
//! image
//!     .auto_orient()
//!     .best_fit(1200, 1200)
//!     .overlay("watermark.png", Anchor::BottomRight, 0.5, -10, -10)?
//!     .sharpen();
//! let uri = image.to_data_uri(Some(ImageMime::Webp), Some(80))?;
//! # Ok::<(), vimage::ImageError>(())
//! ```
//!
//! # Architecture: One Canvas, Many Operations
//!
//! An [`Image`] owns exactly one [`Canvas`](canvas::Canvas): an 8-bit RGBA
//! grid tagged with the format it came from. Operations run in the order the
//! caller chains them, each to completion before the next:
//!
//! ```text
//! Loader   file / data URI / bytes / blank  →  Canvas
//! imaging  resize, crop, rotate, filters, palette  (Canvas → Canvas)
//! paint    overlay, shapes, text, QR codes        (Canvas → Canvas)
//! Saver    Canvas  →  bytes / file / data URI / download / stream
//! ```
//!
//! Operations that change dimensions build a new grid and drop the old one
//! immediately, so long chains never hold more than one intermediate buffer.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | The fluent [`Image`] type tying everything together |
//! | [`loader`] | Decoding sources into a canvas, with EXIF |
//! | [`saver`] | Encoding a canvas to every output form |
//! | [`imaging`] | Geometry math, codecs, sizer, orientation, palette, filters |
//! | [`paint`] | Overlay compositing, shapes, text layout, QR codes |
//! | [`color`] | Friendly color inputs and their canonical RGBA form |
//! | [`canvas`] | The pixel buffer, mime types and palette state |
//! | [`exif`] | EXIF extraction for JPEG sources |
//! | [`captcha`] | Verification-code images |
//! | [`config`] | Loader and saver settings, TOML loading and validation |
//! | [`error`] | The error taxonomy with stable numeric codes |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Collaborators Behind Traits
//!
//! Decoding and encoding go through the [`Codec`](imaging::Codec) trait and
//! glyph rendering through [`GlyphRasterizer`](paint::GlyphRasterizer). The
//! production implementations sit on the `image` and `ab_glyph` crates; tests
//! swap in recording mocks, so layout and pipeline logic are verified without
//! real fonts or encoders.
//!
//! ## GD-Compatible Arithmetic
//!
//! Filter, overlay and color-allocation math follows the classic GD rules
//! (7-bit inverted alpha for packed colors, GD's convolution kernels and
//! contrast curve), so output lines up with what GD-based tooling produces.
//!
//! ## Explicit Configuration
//!
//! Behaviour switches such as EXIF reading and the default output format
//! live in a [`Config`] passed to loaders and savers, never in global
//! state. See [`config`] for the file format.
//!
//! ## Optional Features
//!
//! `text` (TrueType via `ab_glyph`), `qr` (via `qrcode`) and `webp` are on
//! by default. Without them the corresponding operations fail with
//! `FreetypeNotEnabled`, `LibNotLoaded` and `WebpNotEnabled` respectively.

pub mod canvas;
pub mod captcha;
pub mod color;
pub mod config;
pub mod error;
pub mod exif;
pub mod imaging;
pub mod loader;
pub mod output;
pub mod paint;
pub mod pipeline;
pub mod saver;

pub use canvas::{Canvas, ImageMime};
pub use color::{Color, ColorInput};
pub use config::Config;
pub use error::{ImageError, Result};
pub use imaging::{Anchor, BlurKind, FlipDirection, Orientation, Rect, Thickness};
pub use loader::ImageSource;
pub use paint::{ErrorCorrection, FontRef, QrOptions, Shadow, TextBoundary, TextOptions};
pub use pipeline::Image;

#[cfg(test)]
pub(crate) mod test_helpers;
