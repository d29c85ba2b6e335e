//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! photo.jpg
//!     Format: image/jpeg
//!     Size: 4000x3000 (landscape, 1.333)
//!     EXIF
//!         Make: Canon
//!         Orientation: row 0 at right and column 0 at top
//! ```
//!
//! ## Convert / thumbnail / verify-code
//!
//! ```text
//! photo.jpg → thumb.webp
//!     Size: 4000x3000 → 200x200
//!     Output: image/webp, 18734 bytes
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::canvas::ImageMime;
use serde::Serialize;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_value(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

fn dimensions(size: (u32, u32)) -> String {
    format!("{}x{}", size.0, size.1)
}

// ============================================================================
// Info
// ============================================================================

/// What `vimage info` reports about one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub source: String,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub orientation: String,
    pub exif: Vec<(String, String)>,
}

impl ImageInfo {
    pub fn new(source: &str, image: &crate::pipeline::Image) -> Self {
        Self {
            source: source.to_string(),
            mime: image.mime_type().to_string(),
            width: image.width(),
            height: image.height(),
            aspect_ratio: image.aspect_ratio(),
            orientation: image.orientation().to_string(),
            exif: image
                .exif()
                .map(|exif| exif.fields.clone())
                .unwrap_or_default(),
        }
    }
}

/// Long EXIF values (maker notes, thumbnails) are cut to this many characters.
const MAX_EXIF_VALUE: usize = 60;

pub fn format_info(info: &ImageInfo) -> Vec<String> {
    let mut lines = vec![
        info.source.clone(),
        format!("{}Format: {}", indent(1), info.mime),
        format!(
            "{}Size: {} ({}, {:.3})",
            indent(1),
            dimensions((info.width, info.height)),
            info.orientation,
            info.aspect_ratio
        ),
    ];
    if !info.exif.is_empty() {
        lines.push(format!("{}EXIF", indent(1)));
        for (tag, value) in &info.exif {
            lines.push(format!(
                "{}{}: {}",
                indent(2),
                tag,
                truncate_value(value, MAX_EXIF_VALUE)
            ));
        }
    }
    lines
}

pub fn print_info(info: &ImageInfo) {
    for line in format_info(info) {
        println!("{}", line);
    }
}

pub fn format_info_json(info: &ImageInfo) -> serde_json::Result<String> {
    serde_json::to_string_pretty(info)
}

// ============================================================================
// Saved output
// ============================================================================

/// Summary of one written image.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedImage {
    pub source: String,
    pub destination: String,
    pub before: (u32, u32),
    pub after: (u32, u32),
    pub mime: ImageMime,
    pub bytes: usize,
}

pub fn format_saved(saved: &SavedImage) -> Vec<String> {
    let size = if saved.before == saved.after {
        dimensions(saved.after)
    } else {
        format!("{} → {}", dimensions(saved.before), dimensions(saved.after))
    };
    vec![
        format!("{} → {}", saved.source, saved.destination),
        format!("{}Size: {}", indent(1), size),
        format!("{}Output: {}, {} bytes", indent(1), saved.mime, saved.bytes),
    ]
}

pub fn print_saved(saved: &SavedImage) {
    for line in format_saved(saved) {
        println!("{}", line);
    }
}
