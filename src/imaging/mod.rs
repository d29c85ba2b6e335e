//! Raster operations over a [`Canvas`](crate::canvas::Canvas).
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` (GIF, JPEG, PNG, WEBP behind a feature) |
//! | **Resize / thumbnail** | `imageops::resize` (Triangle) + `crop_imm` |
//! | **Rotate** | `imageops::rotate90/180/270`, `imageproc` warp for other angles |
//! | **Flip** | `imageops::flip_*_in_place` |
//! | **Palette reduction** | median cut + `imageops::dither` |
//! | **Filters** | per-pixel tone maps and 3×3 convolutions |
//!
//! The module is split into:
//! - **Calculations**: pure dimension and placement math (unit testable)
//! - **Parameters**: small value types describing operations
//! - **Codec**: the [`Codec`] trait + [`RustCodec`]
//! - **Operations**: [`sizer`], [`orient`], [`palette`], [`filters`]

mod calculations;
pub mod codec;
pub mod filters;
pub mod orient;
pub mod palette;
mod params;
pub mod rust_codec;
pub mod sizer;

pub use calculations::{
    CropRegion, calculate_anchor_crop_origin, calculate_anchor_position,
    calculate_best_fit_dimensions, calculate_cover_dimensions, calculate_crop_region,
    calculate_resize_dimensions, calculate_rotated_bounds, calculate_text_baseline,
};
pub use codec::{Codec, Decoded};
pub use params::{Anchor, BlurKind, FlipDirection, Orientation, Quality, Rect, Thickness};
pub use rust_codec::RustCodec;
