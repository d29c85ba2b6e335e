//! Parameter types for image operations.
//!
//! These are the small vocabulary types shared by the sizer, the paint
//! brush and the savers. They describe *what* to do; the modules that take
//! them decide *how*.
//!
//! ## Types
//!
//! - [`Quality`]: Encoder quality (0–100, default 100). Clamped on construction.
//! - [`Anchor`]: One of nine reference points used by thumbnail crops, overlays and text.
//! - [`FlipDirection`]: Mirror axis for `flip`.
//! - [`Orientation`]: Landscape, portrait or square.
//! - [`Thickness`]: Stroke width in pixels, or `Filled`.
//! - [`BlurKind`]: Selective or gaussian blur kernel.
//! - [`Rect`]: An `(x1, y1)`–`(x2, y2)` rectangle used for confined text.

use std::fmt;
use std::str::FromStr;

/// Quality setting for encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Reference point used to place content inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Self::Center,
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::TopLeft => "top left",
            Self::TopRight => "top right",
            Self::BottomLeft => "bottom left",
            Self::BottomRight => "bottom right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = String;

    /// Accepts `"top left"`, `"top-left"` and `"top_left"` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        match key.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "center" | "centre" => Ok(Self::Center),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top left" => Ok(Self::TopLeft),
            "top right" => Ok(Self::TopRight),
            "bottom left" => Ok(Self::BottomLeft),
            "bottom right" => Ok(Self::BottomRight),
            _ => Err(format!("unknown anchor '{s}'")),
        }
    }
}

/// Axis to mirror across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// Mirror left-right.
    X,
    /// Mirror top-bottom.
    Y,
    Both,
}

impl FromStr for FlipDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "both" => Ok(Self::Both),
            _ => Err(format!("unknown flip direction '{s}'")),
        }
    }
}

/// Shape of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn of(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else if width < height {
            Self::Portrait
        } else {
            Self::Square
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Square => "square",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stroke style for shape primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thickness {
    /// Outline of the given width in pixels.
    Stroke(u32),
    Filled,
}

impl Default for Thickness {
    fn default() -> Self {
        Self::Stroke(1)
    }
}

impl From<u32> for Thickness {
    fn from(width: u32) -> Self {
        Self::Stroke(width)
    }
}

/// Kernel used by `blur`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlurKind {
    #[default]
    Selective,
    Gaussian,
}

impl FromStr for BlurKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "selective" => Ok(Self::Selective),
            "gaussian" => Ok(Self::Gaussian),
            _ => Err(format!("unknown blur type '{s}'")),
        }
    }
}

/// Axis-aligned rectangle given by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `x2 - x1`; non-positive for degenerate or inverted rectangles.
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    /// `y2 - y1`; non-positive for degenerate or inverted rectangles.
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}

impl From<[i32; 4]> for Rect {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}
