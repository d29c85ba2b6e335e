//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any pixels. The sizer,
//! the compositor and the orientation code call into them and then do the
//! actual buffer work.

use super::params::Anchor;

/// Dimensions for a proportional resize.
///
/// Zero counts as "not given". When only one side is given the other is
/// derived from the current aspect ratio and rounded (never below 1 pixel).
///
/// # Returns
/// * `None` - nothing to do (neither side given, or already at that size)
/// * `Some((width, height))` - the new canvas size
///
/// # Examples
/// ```
/// # use vimage::imaging::calculate_resize_dimensions;
/// assert_eq!(calculate_resize_dimensions((400, 300), Some(200), None), Some((200, 150)));
/// assert_eq!(calculate_resize_dimensions((400, 300), None, None), None);
/// ```
pub fn calculate_resize_dimensions(
    current: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
) -> Option<(u32, u32)> {
    let (cur_w, cur_h) = current;
    let width = width.filter(|&w| w > 0);
    let height = height.filter(|&h| h > 0);

    let target = match (width, height) {
        (None, None) => return None,
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scale(w, cur_h, cur_w)),
        (None, Some(h)) => (scale(h, cur_w, cur_h), h),
    };

    if target == current { None } else { Some(target) }
}

/// `given * numerator / denominator`, rounded, at least 1.
fn scale(given: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return given.max(1);
    }
    ((given as f64 * numerator as f64 / denominator as f64).round() as u32).max(1)
}

/// Dimensions that fit inside `max` while keeping the aspect ratio.
///
/// Portrait sources are fitted by height first, everything else by width
/// first; the result is then clamped against the other bound.
///
/// # Returns
/// * `None` if the source already fits both bounds
pub fn calculate_best_fit_dimensions(current: (u32, u32), max: (u32, u32)) -> Option<(u32, u32)> {
    let (cur_w, cur_h) = current;
    let (max_w, max_h) = max;

    if cur_w <= max_w && cur_h <= max_h {
        return None;
    }

    let aspect = cur_w as f64 / cur_h as f64;
    let (mut w, mut h) = if cur_h > cur_w {
        (max_h as f64 * aspect, max_h as f64)
    } else {
        (max_w as f64, max_w as f64 / aspect)
    };

    if w > max_w as f64 {
        w = max_w as f64;
        h = w / aspect;
    }
    if h > max_h as f64 {
        h = max_h as f64;
        w = h * aspect;
    }

    Some(((w.round() as u32).max(1), (h.round() as u32).max(1)))
}

/// Dimensions that completely cover `target` (resize step of a thumbnail).
///
/// Compares height/width ratios: when the target is relatively taller than
/// the source, the height matches and the width overflows; otherwise the
/// width matches and the height overflows.
pub fn calculate_cover_dimensions(current: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (cur_w, cur_h) = current;
    let (tgt_w, tgt_h) = target;

    let current_ratio = cur_h as f64 / cur_w as f64;
    let target_ratio = tgt_h as f64 / tgt_w as f64;

    if target_ratio > current_ratio {
        (scale(tgt_h, cur_w, cur_h), tgt_h)
    } else {
        (tgt_w, scale(tgt_w, cur_h, cur_w))
    }
}

/// Top-left corner of a `target`-sized crop out of `current`, per anchor.
///
/// Centered axes use `floor(current / 2 - target / 2)`.
pub fn calculate_anchor_crop_origin(
    current: (u32, u32),
    target: (u32, u32),
    anchor: Anchor,
) -> (i32, i32) {
    let (cur_w, cur_h) = (current.0 as f64, current.1 as f64);
    let (tgt_w, tgt_h) = (target.0 as f64, target.1 as f64);

    let start = 0.0;
    let center_x = (cur_w / 2.0 - tgt_w / 2.0).floor();
    let center_y = (cur_h / 2.0 - tgt_h / 2.0).floor();
    let end_x = cur_w - tgt_w;
    let end_y = cur_h - tgt_h;

    let (x, y) = match anchor {
        Anchor::Top => (center_x, start),
        Anchor::Bottom => (center_x, end_y),
        Anchor::Left => (start, center_y),
        Anchor::Right => (end_x, center_y),
        Anchor::TopLeft => (start, start),
        Anchor::TopRight => (end_x, start),
        Anchor::BottomLeft => (start, end_y),
        Anchor::BottomRight => (end_x, end_y),
        Anchor::Center => (center_x, center_y),
    };
    (x as i32, y as i32)
}

/// Where content of size `content` lands inside `container`, per anchor,
/// after adding `offset`.
///
/// Centered axes use `container / 2 - content / 2 + offset`, truncated
/// toward zero. The result may lie partly or fully outside the container.
pub fn calculate_anchor_position(
    container: (u32, u32),
    content: (u32, u32),
    anchor: Anchor,
    offset: (i32, i32),
) -> (i32, i32) {
    let (dst_w, dst_h) = (container.0 as f64, container.1 as f64);
    let (src_w, src_h) = (content.0 as f64, content.1 as f64);
    let (off_x, off_y) = (offset.0 as f64, offset.1 as f64);

    let center_x = dst_w / 2.0 - src_w / 2.0;
    let center_y = dst_h / 2.0 - src_h / 2.0;
    let end_x = dst_w - src_w;
    let end_y = dst_h - src_h;

    let (x, y) = match anchor {
        Anchor::TopLeft => (0.0, 0.0),
        Anchor::TopRight => (end_x, 0.0),
        Anchor::Top => (center_x, 0.0),
        Anchor::BottomLeft => (0.0, end_y),
        Anchor::BottomRight => (end_x, end_y),
        Anchor::Bottom => (center_x, end_y),
        Anchor::Left => (0.0, center_y),
        Anchor::Right => (end_x, center_y),
        Anchor::Center => (center_x, center_y),
    };
    ((x + off_x) as i32, (y + off_y) as i32)
}

/// Baseline origin for a text box of `text_box` (width, height) placed in
/// `container` at `anchor`, plus `offset`.
///
/// The returned `y` is the baseline: the box occupies `y - height ..= y`.
/// Centred axes use the exact half-difference, and the result is rounded.
pub fn calculate_text_baseline(
    container: (i32, i32),
    text_box: (i32, i32),
    anchor: Anchor,
    offset: (i32, i32),
) -> (i32, i32) {
    let (dst_w, dst_h) = (container.0 as f64, container.1 as f64);
    let (box_w, box_h) = (text_box.0 as f64, text_box.1 as f64);
    let (off_x, off_y) = (offset.0 as f64, offset.1 as f64);

    let left = off_x;
    let center_x = dst_w / 2.0 - box_w / 2.0 + off_x;
    let right = dst_w - box_w + off_x;
    let top = off_y + box_h;
    let middle = dst_h / 2.0 + box_h / 2.0 + off_y;
    let bottom = dst_h + off_y;

    let (x, y) = match anchor {
        Anchor::TopLeft => (left, top),
        Anchor::TopRight => (right, top),
        Anchor::Top => (center_x, top),
        Anchor::BottomLeft => (left, bottom),
        Anchor::BottomRight => (right, bottom),
        Anchor::Bottom => (center_x, bottom),
        Anchor::Left => (left, middle),
        Anchor::Right => (right, middle),
        Anchor::Center => (center_x, middle),
    };
    (x.round() as i32, y.round() as i32)
}

/// A crop region in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Clamp two corners into the canvas and build the crop region.
///
/// Each coordinate is clamped independently into `[0, width]` × `[0, height]`;
/// the corners may be given in any order.
///
/// # Returns
/// * `None` if the clamped region has zero width or height
pub fn calculate_crop_region(
    current: (u32, u32),
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
) -> Option<CropRegion> {
    let (w, h) = (current.0 as i64, current.1 as i64);
    let x1 = (x1 as i64).clamp(0, w);
    let x2 = (x2 as i64).clamp(0, w);
    let y1 = (y1 as i64).clamp(0, h);
    let y2 = (y2 as i64).clamp(0, h);

    let region = CropRegion {
        x: x1.min(x2) as u32,
        y: y1.min(y2) as u32,
        width: (x2 - x1).unsigned_abs() as u32,
        height: (y2 - y1).unsigned_abs() as u32,
    };
    if region.width == 0 || region.height == 0 {
        None
    } else {
        Some(region)
    }
}

/// Size of the box that bounds a `width`×`height` rectangle rotated by
/// `degrees`.
pub fn calculate_rotated_bounds(current: (u32, u32), degrees: f64) -> (u32, u32) {
    let (w, h) = (current.0 as f64, current.1 as f64);
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());

    let new_w = w * cos + h * sin;
    let new_h = w * sin + h * cos;
    // Trig noise on exact right angles must not add a pixel.
    let snap = |v: f64| ((v - 1e-9).ceil() as u32).max(1);
    (snap(new_w), snap(new_h))
}
