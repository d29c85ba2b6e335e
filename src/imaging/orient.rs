//! Rotation, mirroring and EXIF orientation.
//!
//! Positive angles rotate clockwise. Right angles are exact pixel
//! permutations; other angles resample bilinearly into a canvas large enough
//! to hold the rotated rectangle, with uncovered corners painted in the
//! background color.
//!
//! ## EXIF orientation
//!
//! | Tag | Stored as | Correction |
//! |---|---|---|
//! | 1 | upright | none |
//! | 2 | mirrored | flip x |
//! | 3 | upside down | rotate 180 |
//! | 4 | mirrored upside down | flip y |
//! | 5 | transposed | rotate 90, flip x |
//! | 6 | rotated 90° counter-clockwise | rotate 90 |
//! | 7 | transversed | rotate 270, flip x |
//! | 8 | rotated 90° clockwise | rotate 270 |

use super::calculations::calculate_rotated_bounds;
use super::params::{FlipDirection, Orientation};
use crate::canvas::Canvas;
use crate::color::Color;
use image::RgbaImage;
use image::imageops;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

/// Landscape, portrait or square.
pub fn orientation(canvas: &Canvas) -> Orientation {
    Orientation::of(canvas.width(), canvas.height())
}

/// Rotate clockwise by `angle` degrees, clamped to ±360.
pub fn rotate(canvas: &mut Canvas, angle: f64, background: Color) {
    let angle = if angle.is_nan() {
        0.0
    } else {
        angle.clamp(-360.0, 360.0)
    };
    let normalized = angle.rem_euclid(360.0);

    let rotated = if normalized == 0.0 {
        return;
    } else if normalized == 90.0 {
        imageops::rotate90(canvas.pixels())
    } else if normalized == 180.0 {
        imageops::rotate180(canvas.pixels())
    } else if normalized == 270.0 {
        imageops::rotate270(canvas.pixels())
    } else {
        rotate_free(canvas.pixels(), normalized, background)
    };
    canvas.replace_pixels(rotated);
}

fn rotate_free(pixels: &RgbaImage, degrees: f64, background: Color) -> RgbaImage {
    let (w, h) = pixels.dimensions();
    let (new_w, new_h) = calculate_rotated_bounds((w, h), degrees);

    let projection = Projection::translate(new_w as f32 / 2.0, new_h as f32 / 2.0)
        * Projection::rotate(degrees.to_radians() as f32)
        * Projection::translate(-(w as f32) / 2.0, -(h as f32) / 2.0);

    let fill = background.to_rgba();
    let mut out = RgbaImage::from_pixel(new_w, new_h, fill);
    warp_into(pixels, &projection, Interpolation::Bilinear, fill, &mut out);
    out
}

/// Mirror in place.
pub fn flip(canvas: &mut Canvas, direction: FlipDirection) {
    let pixels = canvas.pixels_mut();
    match direction {
        FlipDirection::X => imageops::flip_horizontal_in_place(pixels),
        FlipDirection::Y => imageops::flip_vertical_in_place(pixels),
        FlipDirection::Both => {
            imageops::flip_horizontal_in_place(pixels);
            imageops::flip_vertical_in_place(pixels);
        }
    }
}

/// Undo the camera orientation recorded in EXIF. `None` or an unknown tag
/// leaves the canvas untouched.
pub fn auto_orient(canvas: &mut Canvas, exif_orientation: Option<u32>) {
    let Some(tag) = exif_orientation else {
        return;
    };
    tracing::debug!(tag, "applying EXIF orientation");
    match tag {
        2 => flip(canvas, FlipDirection::X),
        3 => rotate(canvas, 180.0, Color::TRANSPARENT),
        4 => flip(canvas, FlipDirection::Y),
        5 => {
            rotate(canvas, 90.0, Color::TRANSPARENT);
            flip(canvas, FlipDirection::X);
        }
        6 => rotate(canvas, 90.0, Color::TRANSPARENT),
        7 => {
            rotate(canvas, 270.0, Color::TRANSPARENT);
            flip(canvas, FlipDirection::X);
        }
        8 => rotate(canvas, 270.0, Color::TRANSPARENT),
        _ => {}
    }
}
