//! Compositing and drawing onto a canvas.
//!
//! | Module | Draws |
//! |---|---|
//! | [`compositor`] | one canvas over another, with opacity |
//! | [`shapes`] | dots, lines, polygons, rectangles, arcs, ellipses, fills |
//! | [`text`] | anchored, rect-confined and vertical text |
//! | [`qr`] | QR codes, via the overlay rule |
//!
//! [`font`] is the seam to the glyph rasterizer text layout relies on.

pub mod compositor;
pub mod font;
pub mod qr;
pub mod shapes;
pub mod text;

pub use compositor::{copy_merge_alpha, overlay};
pub use font::{FontRef, GlyphRasterizer, TextBox};
#[cfg(feature = "text")]
pub use font::TrueTypeFont;
pub use qr::{ErrorCorrection, QrOptions, qr_code};
pub use text::{Shadow, TextBoundary, TextOptions};
