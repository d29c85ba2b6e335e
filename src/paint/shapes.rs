//! Primitive drawing: dots, lines, polygons, rectangles, arcs, ellipses.
//!
//! Every primitive allocates its color once against the target canvas, then
//! rasterizes its geometry into a coverage stencil and blends the ink over each
//! covered pixel exactly once. Overlapping strokes inside one primitive
//! (thick line joins, the pieces of a rounded rectangle) therefore never
//! double up a translucent color.
//!
//! Coordinates follow the usual raster convention: rectangle corners are
//! inclusive, angles are in degrees with 0 at three o'clock, increasing
//! clockwise.

use crate::canvas::Canvas;
use crate::color::Color;
use crate::imaging::Thickness;
use image::{Luma, Rgba};
use imageproc::drawing::{
    Canvas as DrawTarget, draw_filled_ellipse_mut, draw_hollow_ellipse_mut,
    draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;

/// Coverage mask the size of a canvas.
struct Stencil {
    width: u32,
    height: u32,
    covered: Vec<bool>,
}

impl Stencil {
    fn for_canvas(canvas: &Canvas) -> Self {
        let (width, height) = canvas.dimensions();
        Self {
            width,
            height,
            covered: vec![false; width as usize * height as usize],
        }
    }

    fn mark(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.covered[y as usize * self.width as usize + x as usize] = true;
        }
    }

    fn mark_span(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.mark(x, y);
        }
    }

    /// Blend `ink` over every covered pixel of `canvas`.
    fn apply(self, canvas: &mut Canvas, ink: Rgba<u8>) {
        let width = self.width as usize;
        for (index, _) in self.covered.iter().enumerate().filter(|(_, c)| **c) {
            canvas.blend_pixel((index % width) as i32, (index / width) as i32, ink);
        }
    }
}

impl DrawTarget for Stencil {
    type Pixel = Luma<u8>;

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Luma<u8> {
        let on = self.covered[y as usize * self.width as usize + x as usize];
        Luma([if on { 255 } else { 0 }])
    }

    fn draw_pixel(&mut self, x: u32, y: u32, _: Luma<u8>) {
        self.mark(x as i32, y as i32);
    }
}

const INK: Luma<u8> = Luma([255]);

/// Resolve `color` once for the whole primitive.
fn ink_for(canvas: &mut Canvas, color: Color) -> Rgba<u8> {
    let handle = canvas.allocate_color(color);
    canvas.resolve(handle)
}

/// A straight segment `thickness` pixels wide.
fn stroke_segment(stencil: &mut Stencil, from: (i32, i32), to: (i32, i32), thickness: u32) {
    if thickness <= 1 {
        draw_line_segment_mut(
            stencil,
            (from.0 as f32, from.1 as f32),
            (to.0 as f32, to.1 as f32),
            INK,
        );
        stencil.mark(from.0, from.1);
        stencil.mark(to.0, to.1);
        return;
    }

    let half = (thickness - 1) as f64 / 2.0;
    let (dx, dy) = ((to.0 - from.0) as f64, (to.1 - from.1) as f64);
    let length = dx.hypot(dy);
    if length == 0.0 {
        let (lo, hi) = (-half.floor() as i32, half.ceil() as i32);
        for y in lo..=hi {
            stencil.mark_span(from.0 + lo, from.0 + hi, from.1 + y);
        }
        return;
    }

    let (nx, ny) = (-dy / length * half, dx / length * half);
    let corner = |x: i32, y: i32, sign: f64| {
        Point::new(
            (x as f64 + sign * nx).round() as i32,
            (y as f64 + sign * ny).round() as i32,
        )
    };
    fill_polygon(
        stencil,
        vec![
            corner(from.0, from.1, -1.0),
            corner(to.0, to.1, -1.0),
            corner(to.0, to.1, 1.0),
            corner(from.0, from.1, 1.0),
        ],
    );
}

/// Fill a polygon, tolerating repeated and closing vertices.
fn fill_polygon(stencil: &mut Stencil, mut points: Vec<Point<i32>>) {
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    match points.len() {
        0 => {}
        1 => stencil.mark(points[0].x, points[0].y),
        2 => stroke_segment(stencil, (points[0].x, points[0].y), (points[1].x, points[1].y), 1),
        _ => draw_polygon_mut(stencil, &points, INK),
    }
}

/// Closed outline through `points`.
fn stroke_closed(stencil: &mut Stencil, points: &[(i32, i32)], thickness: u32) {
    for (i, &from) in points.iter().enumerate() {
        let to = points[(i + 1) % points.len()];
        stroke_segment(stencil, from, to, thickness);
    }
}

/// One-pixel outline of the inclusive rectangle between two corners.
fn outline_rect(stencil: &mut Stencil, x1: i32, y1: i32, x2: i32, y2: i32) {
    stencil.mark_span(x1, x2, y1);
    stencil.mark_span(x1, x2, y2);
    for y in y1.min(y2)..=y1.max(y2) {
        stencil.mark(x1, y);
        stencil.mark(x2, y);
    }
}

fn fill_rect(stencil: &mut Stencil, x1: i32, y1: i32, x2: i32, y2: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        stencil.mark_span(x1, x2, y);
    }
}

/// Points along an elliptical arc from `start` to `end` degrees, one per
/// degree.
fn arc_points(
    center: (i32, i32),
    width: i32,
    height: i32,
    start: i32,
    end: i32,
) -> Vec<(i32, i32)> {
    let (start, end) = normalize_arc(start, end);
    (start..=end)
        .map(|deg| {
            let rad = (deg as f64).to_radians();
            (
                center.0 + (rad.cos() * width as f64 / 2.0) as i32,
                center.1 + (rad.sin() * height as f64 / 2.0) as i32,
            )
        })
        .collect()
}

/// Bring an angle range into `start <= end`, with equal angles meaning a
/// full turn.
fn normalize_arc(mut start: i32, mut end: i32) -> (i32, i32) {
    if start.rem_euclid(360) == end.rem_euclid(360) {
        return (0, 360);
    }
    if start > 360 {
        start %= 360;
    }
    if end > 360 {
        end %= 360;
    }
    while start < 0 {
        start += 360;
    }
    while end < start {
        end += 360;
    }
    (start, end)
}

// ============================================================================
// Primitives
// ============================================================================

/// Blend one pixel.
pub fn dot(canvas: &mut Canvas, x: i32, y: i32, color: Color) {
    let ink = ink_for(canvas, color);
    canvas.blend_pixel(x, y, ink);
}

/// A line `thickness` pixels wide between two points, both ends included.
pub fn line(canvas: &mut Canvas, from: (i32, i32), to: (i32, i32), color: Color, thickness: u32) {
    let ink = ink_for(canvas, color);
    let mut stencil = Stencil::for_canvas(canvas);
    stroke_segment(&mut stencil, from, to, thickness);
    stencil.apply(canvas, ink);
}

/// A closed polygon through `vertices`. Repeating the first vertex at the
/// end is allowed.
pub fn polygon(canvas: &mut Canvas, vertices: &[(i32, i32)], color: Color, thickness: Thickness) {
    if vertices.is_empty() {
        return;
    }
    let ink = ink_for(canvas, color);
    let mut stencil = Stencil::for_canvas(canvas);
    match thickness {
        Thickness::Filled => fill_polygon(
            &mut stencil,
            vertices.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        ),
        Thickness::Stroke(width) => stroke_closed(&mut stencil, vertices, width),
    }
    stencil.apply(canvas, ink);
}

/// A rectangle between two inclusive corners. Thick outlines grow inward.
pub fn rectangle(
    canvas: &mut Canvas,
    (x1, y1): (i32, i32),
    (x2, y2): (i32, i32),
    color: Color,
    thickness: Thickness,
) {
    let ink = ink_for(canvas, color);
    let mut stencil = Stencil::for_canvas(canvas);
    let (left, right) = (x1.min(x2), x1.max(x2));
    let (top, bottom) = (y1.min(y2), y1.max(y2));
    match thickness {
        Thickness::Filled => fill_rect(&mut stencil, left, top, right, bottom),
        Thickness::Stroke(width) => {
            for i in 0..width.max(1) as i32 {
                if left + i > right - i || top + i > bottom - i {
                    break;
                }
                outline_rect(&mut stencil, left + i, top + i, right - i, bottom - i);
            }
        }
    }
    stencil.apply(canvas, ink);
}

/// A frame `thickness` pixels wide along the canvas edges.
pub fn border(canvas: &mut Canvas, color: Color, thickness: u32) {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    rectangle(
        canvas,
        (0, 0),
        (w as i32 - 1, h as i32 - 1),
        color,
        Thickness::Stroke(thickness),
    );
}

/// An elliptical arc centred at `center`. Filled arcs are pie slices.
#[allow(clippy::too_many_arguments)]
pub fn arc(
    canvas: &mut Canvas,
    center: (i32, i32),
    width: i32,
    height: i32,
    start: i32,
    end: i32,
    color: Color,
    thickness: Thickness,
) {
    let ink = ink_for(canvas, color);
    let mut stencil = Stencil::for_canvas(canvas);
    draw_arc(&mut stencil, center, width, height, start, end, thickness);
    stencil.apply(canvas, ink);
}

fn draw_arc(
    stencil: &mut Stencil,
    center: (i32, i32),
    width: i32,
    height: i32,
    start: i32,
    end: i32,
    thickness: Thickness,
) {
    let points = arc_points(center, width, height, start, end);
    match thickness {
        Thickness::Filled => {
            let pie = std::iter::once(center)
                .chain(points)
                .map(|(x, y)| Point::new(x, y))
                .collect();
            fill_polygon(stencil, pie);
        }
        Thickness::Stroke(stroke) => {
            for pair in points.windows(2) {
                stroke_segment(stencil, pair[0], pair[1], stroke);
            }
            if let [only] = points.as_slice() {
                stencil.mark(only.0, only.1);
            }
        }
    }
}

/// An ellipse centred at `center`.
///
/// Thick outlines are built from `thickness * 2 - 1` concentric one-pixel
/// passes, each a pixel narrower and shorter than the last.
pub fn ellipse(
    canvas: &mut Canvas,
    center: (i32, i32),
    width: i32,
    height: i32,
    color: Color,
    thickness: Thickness,
) {
    let ink = ink_for(canvas, color);
    let mut stencil = Stencil::for_canvas(canvas);
    match thickness {
        Thickness::Filled => {
            if width >= 0 && height >= 0 {
                draw_filled_ellipse_mut(&mut stencil, center, width / 2, height / 2, INK);
            }
        }
        Thickness::Stroke(stroke) => {
            // Passes past the larger radius draw nothing
            let limit = width.max(height).max(0) as u32 + 2;
            let passes = stroke.clamp(1, limit).saturating_mul(2) - 1;
            let (mut w, mut h) = (width, height);
            for _ in 0..passes {
                w -= 1;
                outline_ellipse(&mut stencil, center, w / 2, h / 2);
                h -= 1;
            }
        }
    }
    stencil.apply(canvas, ink);
}

fn outline_ellipse(stencil: &mut Stencil, (cx, cy): (i32, i32), rx: i32, ry: i32) {
    if rx < 0 || ry < 0 {
        return;
    }
    if rx == 0 || ry == 0 {
        stroke_segment(stencil, (cx - rx, cy - ry), (cx + rx, cy + ry), 1);
        return;
    }
    draw_hollow_ellipse_mut(stencil, (cx, cy), rx, ry, INK);
}

/// A rectangle with corners rounded to `radius`.
///
/// Filled: three bands plus four pie corners. Outlined: four edges plus
/// four corner arcs, all `thickness` wide.
pub fn rounded_rectangle(
    canvas: &mut Canvas,
    (x1, y1): (i32, i32),
    (x2, y2): (i32, i32),
    radius: i32,
    color: Color,
    thickness: Thickness,
) {
    let ink = ink_for(canvas, color);
    let mut stencil = Stencil::for_canvas(canvas);
    let r = radius.max(0);
    let d = r * 2;
    let corners = [
        ((x1 + r, y1 + r), 180, 270),
        ((x2 - r, y1 + r), 270, 360),
        ((x1 + r, y2 - r), 90, 180),
        ((x2 - r, y2 - r), 360, 90),
    ];

    match thickness {
        Thickness::Filled => {
            fill_rect(&mut stencil, x1 + r + 1, y1, x2 - r - 1, y2);
            fill_rect(&mut stencil, x1, y1 + r + 1, x1 + r, y2 - r - 1);
            fill_rect(&mut stencil, x2 - r, y1 + r + 1, x2, y2 - r - 1);
        }
        Thickness::Stroke(stroke) => {
            stroke_segment(&mut stencil, (x1 + r, y1), (x2 - r, y1), stroke);
            stroke_segment(&mut stencil, (x1 + r, y2), (x2 - r, y2), stroke);
            stroke_segment(&mut stencil, (x1, y1 + r), (x1, y2 - r), stroke);
            stroke_segment(&mut stencil, (x2, y1 + r), (x2, y2 - r), stroke);
        }
    }
    for (center, start, end) in corners {
        draw_arc(&mut stencil, center, d, d, start, end, thickness);
    }
    stencil.apply(canvas, ink);
}

/// Flood the whole canvas with `color`.
///
/// The canvas is first painted opaque white so the flood from the origin
/// reaches every pixel, whatever the previous content.
pub fn fill(canvas: &mut Canvas, color: Color) {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    rectangle(
        canvas,
        (0, 0),
        (w as i32 - 1, h as i32 - 1),
        Color::WHITE,
        Thickness::Filled,
    );
    flood_fill(canvas, 0, 0, color);
}

/// Replace the 4-connected region sharing the seed pixel's exact value.
///
/// Pixels are overwritten, not blended. A seed outside the canvas does
/// nothing.
pub fn flood_fill(canvas: &mut Canvas, x: i32, y: i32, color: Color) {
    let Some(seed) = canvas.pixel(x, y) else {
        return;
    };
    let ink = ink_for(canvas, color);
    if seed == ink {
        return;
    }

    let mut pending = vec![(x, y)];
    while let Some((px, py)) = pending.pop() {
        if canvas.pixel(px, py) != Some(seed) {
            continue;
        }
        canvas.set_pixel(px, py, ink);
        pending.extend([(px + 1, py), (px - 1, py), (px, py + 1), (px, py - 1)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const RED_PX: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE_PX: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn white(w: u32, h: u32) -> Canvas {
        Canvas::filled(w, h, Color::WHITE)
    }

    fn is_red(canvas: &Canvas, x: i32, y: i32) -> bool {
        canvas.pixel(x, y) == Some(RED_PX)
    }

    fn count_red(canvas: &Canvas) -> usize {
        canvas.pixels().pixels().filter(|p| **p == RED_PX).count()
    }

    // =========================================================================
    // dot / line
    // =========================================================================

    #[test]
    fn dot_blends_translucent_ink() {
        let mut canvas = white(3, 3);
        dot(&mut canvas, 1, 1, Color::rgba(0, 0, 0, 0.5));
        let px = canvas.pixel(1, 1).unwrap();
        assert!((125..=130).contains(&px[0]), "{px:?}");
        assert_eq!(px[3], 255);
        assert_eq!(canvas.pixel(0, 0).unwrap(), WHITE_PX);
    }

    #[test]
    fn dot_outside_canvas_is_ignored() {
        let mut canvas = white(3, 3);
        dot(&mut canvas, -1, 5, RED);
        assert_eq!(count_red(&canvas), 0);
    }

    #[test]
    fn thin_line_includes_both_ends() {
        let mut canvas = white(10, 10);
        line(&mut canvas, (1, 4), (8, 4), RED, 1);
        assert_eq!(count_red(&canvas), 8);
        assert!(is_red(&canvas, 1, 4));
        assert!(is_red(&canvas, 8, 4));
    }

    #[test]
    fn thick_line_spans_thickness_rows() {
        let mut canvas = white(20, 20);
        line(&mut canvas, (2, 10), (17, 10), RED, 3);
        assert!(is_red(&canvas, 10, 9));
        assert!(is_red(&canvas, 10, 10));
        assert!(is_red(&canvas, 10, 11));
        assert!(!is_red(&canvas, 10, 8));
        assert!(!is_red(&canvas, 10, 12));
    }

    #[test]
    fn translucent_thick_line_blends_once() {
        let mut canvas = white(20, 20);
        line(&mut canvas, (2, 2), (17, 17), Color::rgba(0, 0, 0, 0.5), 4);
        let shades: std::collections::HashSet<u8> = canvas
            .pixels()
            .pixels()
            .filter(|p| **p != WHITE_PX)
            .map(|p| p[0])
            .collect();
        assert_eq!(shades.len(), 1, "{shades:?}");
    }

    // =========================================================================
    // polygon / rectangle / border
    // =========================================================================

    #[test]
    fn filled_polygon_accepts_closing_vertex() {
        let mut canvas = white(20, 20);
        let triangle = [(2, 2), (17, 2), (2, 17), (2, 2)];
        polygon(&mut canvas, &triangle, RED, Thickness::Filled);
        assert!(is_red(&canvas, 5, 5));
        assert!(!is_red(&canvas, 16, 16));
    }

    #[test]
    fn stroked_polygon_leaves_interior() {
        let mut canvas = white(20, 20);
        let square = [(2, 2), (17, 2), (17, 17), (2, 17)];
        polygon(&mut canvas, &square, RED, Thickness::Stroke(1));
        assert!(is_red(&canvas, 2, 10));
        assert!(is_red(&canvas, 17, 10));
        assert!(!is_red(&canvas, 10, 10));
    }

    #[test]
    fn filled_rectangle_is_inclusive() {
        let mut canvas = white(10, 10);
        rectangle(&mut canvas, (7, 6), (2, 3), RED, Thickness::Filled);
        assert_eq!(count_red(&canvas), 6 * 4);
        assert!(is_red(&canvas, 2, 3));
        assert!(is_red(&canvas, 7, 6));
    }

    #[test]
    fn thick_rectangle_grows_inward() {
        let mut canvas = white(10, 10);
        rectangle(&mut canvas, (0, 0), (9, 9), RED, Thickness::Stroke(2));
        assert!(is_red(&canvas, 0, 5));
        assert!(is_red(&canvas, 1, 5));
        assert!(!is_red(&canvas, 2, 5));
        assert_eq!(count_red(&canvas), 100 - 36);
    }

    #[test]
    fn border_frames_canvas() {
        let mut canvas = white(10, 8);
        border(&mut canvas, RED, 1);
        assert!(is_red(&canvas, 0, 0));
        assert!(is_red(&canvas, 9, 7));
        assert!(!is_red(&canvas, 1, 1));
        assert_eq!(count_red(&canvas), 2 * 10 + 2 * 6);
    }

    // =========================================================================
    // arc / ellipse / rounded rectangle
    // =========================================================================

    #[test]
    fn normalize_arc_handles_wraparound() {
        assert_eq!(normalize_arc(360, 90), (360, 450));
        assert_eq!(normalize_arc(180, 270), (180, 270));
        assert_eq!(normalize_arc(0, 360), (0, 360));
        assert_eq!(normalize_arc(-90, 0), (270, 360));
    }

    #[test]
    fn filled_arc_is_a_pie_slice() {
        let mut canvas = white(21, 21);
        arc(&mut canvas, (10, 10), 16, 16, 0, 90, RED, Thickness::Filled);
        assert!(is_red(&canvas, 13, 13));
        assert!(!is_red(&canvas, 7, 7));
        assert!(!is_red(&canvas, 13, 7));
    }

    #[test]
    fn stroked_arc_touches_its_end_points() {
        let mut canvas = white(21, 21);
        arc(&mut canvas, (10, 10), 16, 16, 0, 90, RED, Thickness::Stroke(1));
        assert!(is_red(&canvas, 18, 10));
        assert!(is_red(&canvas, 10, 18));
        assert!(!is_red(&canvas, 10, 10));
    }

    #[test]
    fn filled_ellipse_covers_center_not_corners() {
        let mut canvas = white(30, 20);
        ellipse(&mut canvas, (15, 10), 20, 10, RED, Thickness::Filled);
        assert!(is_red(&canvas, 15, 10));
        assert!(is_red(&canvas, 24, 10));
        assert!(!is_red(&canvas, 6, 6));
    }

    #[test]
    fn ellipse_outline_is_hollow_and_thickens() {
        let mut thin = white(40, 40);
        ellipse(&mut thin, (20, 20), 30, 30, RED, Thickness::Stroke(1));
        assert!(!is_red(&thin, 20, 20));
        assert!(is_red(&thin, 34, 20));

        let mut thick = white(40, 40);
        ellipse(&mut thick, (20, 20), 30, 30, RED, Thickness::Stroke(3));
        assert!(!is_red(&thick, 20, 20));
        assert!(count_red(&thick) > count_red(&thin));
    }

    #[test]
    fn huge_ellipse_stroke_fills_to_the_centre() {
        let mut canvas = white(40, 40);
        ellipse(&mut canvas, (20, 20), 30, 30, RED, Thickness::Stroke(u32::MAX));
        assert!(is_red(&canvas, 20, 20));
        assert!(is_red(&canvas, 34, 20));
        assert!(!is_red(&canvas, 0, 0));
    }

    #[test]
    fn filled_rounded_rectangle_clips_corners() {
        let mut canvas = white(21, 21);
        rounded_rectangle(&mut canvas, (0, 0), (20, 20), 5, RED, Thickness::Filled);
        assert!(!is_red(&canvas, 0, 0));
        assert!(!is_red(&canvas, 20, 20));
        assert!(is_red(&canvas, 3, 3));
        assert!(is_red(&canvas, 10, 10));
        assert!(is_red(&canvas, 10, 0));
        assert!(is_red(&canvas, 0, 10));
    }

    #[test]
    fn outlined_rounded_rectangle_is_hollow() {
        let mut canvas = white(21, 21);
        rounded_rectangle(&mut canvas, (0, 0), (20, 20), 5, RED, Thickness::Stroke(1));
        assert!(is_red(&canvas, 10, 0));
        assert!(is_red(&canvas, 20, 10));
        assert!(!is_red(&canvas, 10, 10));
        assert!(!is_red(&canvas, 0, 0));
    }

    // =========================================================================
    // fill / flood_fill
    // =========================================================================

    #[test]
    fn fill_covers_transparent_and_mixed_content() {
        let mut canvas = Canvas::new(6, 6);
        dot(&mut canvas, 3, 3, Color::BLACK);
        let green = Color::rgba(0, 128, 0, 0.5);
        fill(&mut canvas, green);
        let handle = canvas.allocate_color(green);
        let expected = canvas.resolve(handle);
        assert_eq!(&expected.0[..3], &[0, 128, 0]);
        assert!(canvas.pixels().pixels().all(|p| *p == expected));
    }

    #[test]
    fn flood_fill_stops_at_boundary() {
        let mut canvas = white(10, 10);
        line(&mut canvas, (5, 0), (5, 9), Color::BLACK, 1);
        flood_fill(&mut canvas, 0, 0, RED);
        assert!(is_red(&canvas, 4, 9));
        assert!(!is_red(&canvas, 6, 0));
        assert_eq!(count_red(&canvas), 50);
    }

    #[test]
    fn flood_fill_outside_is_noop() {
        let mut canvas = white(4, 4);
        flood_fill(&mut canvas, 10, 10, RED);
        assert_eq!(count_red(&canvas), 0);
    }
}
