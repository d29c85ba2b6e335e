//! Alpha-aware compositing of one canvas onto another.
//!
//! The merge rule: when the requested opacity is below 100%, each source
//! pixel first has its alpha reduced in proportion to `100 - pct`, then it is
//! blended over the destination with the standard "over" operator. The
//! source canvas itself is never modified; the fade is applied per pixel on
//! the way through.

use crate::canvas::Canvas;
use crate::imaging::filters::add_gd_alpha;
use crate::imaging::{Anchor, calculate_anchor_position};

/// GD-scale alpha to add for a merge at `pct` percent.
fn fade_amount(pct: f64) -> u8 {
    if pct >= 100.0 {
        return 0;
    }
    (127.0 * ((100.0 - pct.max(0.0)) / 100.0)) as u8
}

/// Blend the `width`×`height` block at `(src_x, src_y)` of `src` onto `dst`
/// at `(dst_x, dst_y)`, at `pct` percent opacity (0–100).
///
/// Parts of the block falling outside either canvas are skipped.
#[allow(clippy::too_many_arguments)]
pub fn copy_merge_alpha(
    dst: &mut Canvas,
    src: &Canvas,
    dst_x: i32,
    dst_y: i32,
    src_x: i32,
    src_y: i32,
    width: u32,
    height: u32,
    pct: f64,
) {
    let fade = fade_amount(pct);
    for j in 0..height as i32 {
        for i in 0..width as i32 {
            let Some(mut pixel) = src.pixel(src_x + i, src_y + j) else {
                continue;
            };
            if fade > 0 {
                pixel[3] = add_gd_alpha(pixel[3], fade);
            }
            dst.blend_pixel(dst_x + i, dst_y + j, pixel);
        }
    }
}

/// Place `src` on `dst` at `anchor` plus offsets, with `opacity` in 0–1.
///
/// Returns the top-left corner the source landed at.
pub fn overlay(
    dst: &mut Canvas,
    src: &Canvas,
    anchor: Anchor,
    opacity: f32,
    x_offset: i32,
    y_offset: i32,
) -> (i32, i32) {
    let pct = opacity.clamp(0.0, 1.0) as f64 * 100.0;
    let (x, y) = calculate_anchor_position(
        dst.dimensions(),
        src.dimensions(),
        anchor,
        (x_offset, y_offset),
    );
    tracing::debug!(x, y, %anchor, pct, "overlay");
    copy_merge_alpha(dst, src, x, y, 0, 0, src.width(), src.height(), pct);
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use image::Rgba;

    #[test]
    fn full_opacity_copies_opaque_source() {
        let mut dst = Canvas::filled(10, 10, Color::WHITE);
        let src = Canvas::filled(4, 4, Color::rgb(255, 0, 0));
        let at = overlay(&mut dst, &src, Anchor::Center, 1.0, 0, 0);

        assert_eq!(at, (3, 3));
        assert_eq!(dst.pixel(3, 3).unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(dst.pixel(6, 6).unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(dst.pixel(2, 2).unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(dst.pixel(7, 7).unwrap(), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn half_opacity_mixes_channels() {
        let mut dst = Canvas::filled(2, 2, Color::rgb(0, 0, 255));
        let src = Canvas::filled(2, 2, Color::rgb(255, 0, 0));
        overlay(&mut dst, &src, Anchor::TopLeft, 0.5, 0, 0);

        let px = dst.pixel(0, 0).unwrap();
        assert!((125..=131).contains(&px[0]), "red {px:?}");
        assert!((124..=130).contains(&px[2]), "blue {px:?}");
        assert_eq!(px[1], 0);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn zero_opacity_leaves_destination() {
        let mut dst = Canvas::filled(2, 2, Color::rgb(0, 0, 255));
        let src = Canvas::filled(2, 2, Color::rgb(255, 0, 0));
        overlay(&mut dst, &src, Anchor::Center, 0.0, 0, 0);
        assert_eq!(dst.pixel(1, 1).unwrap(), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn source_is_not_modified() {
        let mut dst = Canvas::filled(4, 4, Color::WHITE);
        let src = Canvas::filled(2, 2, Color::rgb(255, 0, 0));
        let before = src.pixels().clone();
        overlay(&mut dst, &src, Anchor::Center, 0.3, 0, 0);
        assert_eq!(src.pixels(), &before);
    }

    #[test]
    fn transparent_source_pixels_keep_destination() {
        let mut dst = Canvas::filled(3, 3, Color::rgb(0, 255, 0));
        let src = Canvas::new(3, 3);
        overlay(&mut dst, &src, Anchor::Center, 1.0, 0, 0);
        assert_eq!(dst.pixel(1, 1).unwrap(), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn overlay_clips_at_edges() {
        let mut dst = Canvas::filled(4, 4, Color::WHITE);
        let src = Canvas::filled(4, 4, Color::BLACK);
        overlay(&mut dst, &src, Anchor::BottomRight, 1.0, 2, 2);
        assert_eq!(dst.pixel(1, 1).unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(dst.pixel(3, 3).unwrap(), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn copy_merge_alpha_sub_block() {
        let mut dst = Canvas::new(4, 4);
        let src = Canvas::filled(4, 4, Color::BLACK);
        copy_merge_alpha(&mut dst, &src, 1, 1, 2, 2, 2, 2, 100.0);
        assert_eq!(dst.pixel(0, 0).unwrap()[3], 0);
        assert_eq!(dst.pixel(1, 1).unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(dst.pixel(2, 2).unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(dst.pixel(3, 3).unwrap()[3], 0);
    }
}
