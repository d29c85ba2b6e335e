//! Friendly color descriptions and their canonical RGBA form.
//!
//! Every drawing, filter and compositing operation accepts a [`ColorInput`]
//! and normalizes it once with [`normalize_color`]. Three shapes are accepted:
//!
//! | Input | Example | Notes |
//! |---|---|---|
//! | CSS color name | `"cornflowerblue"`, `"transparent"` | case-insensitive |
//! | Hex string | `"#f00"`, `"ff8800"` | 3 or 6 digits, `#` optional |
//! | Components | `red: Some(255), alpha: Some(0.5)` | omitted channels are 0, omitted alpha is 1.0 |
//!
//! Components are clamped (`0..=255` for RGB, `0.0..=1.0` for alpha), so a
//! [`Color`] is always in range once it exists.
//!
//! ## Alpha conventions
//!
//! The canonical model is `0.0` = transparent, `1.0` = opaque. Pixel storage
//! uses 8-bit straight alpha (`0` transparent, `255` opaque). Packed color
//! handles follow the GD convention of a 7-bit *inverted* alpha
//! (`0` opaque, `127` transparent); see [`Color::gd_alpha`].

use crate::error::{ImageError, Result};
use image::Rgba;
use std::fmt;

/// Canonical RGBA color. Channels are always within range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Opacity, 0.0 (transparent) to 1.0 (opaque).
    pub alpha: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// 8-bit straight-alpha pixel for this color.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([
            self.red,
            self.green,
            self.blue,
            (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        ])
    }

    pub fn from_rgba(pixel: Rgba<u8>) -> Self {
        let [red, green, blue, a] = pixel.0;
        Self {
            red,
            green,
            blue,
            alpha: a as f32 / 255.0,
        }
    }

    /// Inverted 7-bit alpha as stored by GD-style packed colors
    /// (`0` = opaque, `127` = transparent).
    pub fn gd_alpha(self) -> u8 {
        (127.0 - self.alpha.clamp(0.0, 1.0) * 127.0).round() as u8
    }

    /// Whether the color is fully opaque.
    pub fn is_opaque(self) -> bool {
        self.alpha >= 1.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

/// A color as a caller describes it, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorInput {
    /// A CSS color keyword such as `"red"` or `"transparent"`.
    Named(String),
    /// A 3- or 6-digit hex string, with or without a leading `#`.
    Hex(String),
    /// Individual channels. Missing RGB channels default to 0 and missing
    /// alpha to 1.0; out-of-range values are clamped.
    Components {
        red: Option<i32>,
        green: Option<i32>,
        blue: Option<i32>,
        alpha: Option<f32>,
    },
}

impl ColorInput {
    /// Opaque components.
    pub fn rgb(red: i32, green: i32, blue: i32) -> Self {
        Self::Components {
            red: Some(red),
            green: Some(green),
            blue: Some(blue),
            alpha: None,
        }
    }

    pub fn rgba(red: i32, green: i32, blue: i32, alpha: f32) -> Self {
        Self::Components {
            red: Some(red),
            green: Some(green),
            blue: Some(blue),
            alpha: Some(alpha),
        }
    }
}

impl From<&str> for ColorInput {
    /// Strings that name a CSS color become [`ColorInput::Named`]; anything
    /// else is treated as hex and validated during normalization.
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if !trimmed.starts_with('#') && lookup_named(trimmed).is_some() {
            Self::Named(trimmed.to_string())
        } else {
            Self::Hex(trimmed.to_string())
        }
    }
}

impl From<String> for ColorInput {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Color> for ColorInput {
    fn from(color: Color) -> Self {
        Self::Components {
            red: Some(color.red as i32),
            green: Some(color.green as i32),
            blue: Some(color.blue as i32),
            alpha: Some(color.alpha),
        }
    }
}

impl From<(u8, u8, u8)> for ColorInput {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::rgb(red as i32, green as i32, blue as i32)
    }
}

impl From<(u8, u8, u8, f32)> for ColorInput {
    fn from((red, green, blue, alpha): (u8, u8, u8, f32)) -> Self {
        Self::rgba(red as i32, green as i32, blue as i32, alpha)
    }
}

impl From<[u8; 3]> for ColorInput {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::rgb(red as i32, green as i32, blue as i32)
    }
}

/// Normalize a friendly color into a canonical [`Color`].
///
/// Fails with [`ImageError::InvalidColor`] for unknown names and malformed
/// hex strings. Normalizing an already-canonical color returns it unchanged.
pub fn normalize_color(input: &ColorInput) -> Result<Color> {
    match input {
        ColorInput::Named(name) => {
            if name.trim().eq_ignore_ascii_case("transparent") {
                return Ok(Color::TRANSPARENT);
            }
            lookup_named(name)
                .map(unpack_rgb)
                .ok_or_else(|| ImageError::InvalidColor(name.clone()))
        }
        ColorInput::Hex(hex) => parse_hex(hex),
        ColorInput::Components {
            red,
            green,
            blue,
            alpha,
        } => Ok(Color {
            red: clamp_channel(red.unwrap_or(0)),
            green: clamp_channel(green.unwrap_or(0)),
            blue: clamp_channel(blue.unwrap_or(0)),
            alpha: clamp_alpha(alpha.unwrap_or(1.0)),
        }),
    }
}

fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

fn clamp_alpha(value: f32) -> f32 {
    if value.is_nan() {
        return 1.0;
    }
    value.clamp(0.0, 1.0)
}

fn unpack_rgb(rgb: u32) -> Color {
    Color::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

fn parse_hex(input: &str) -> Result<Color> {
    let invalid = || ImageError::InvalidColor(input.to_string());
    let hex = input.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return Err(invalid()),
    };
    let rgb = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
    Ok(unpack_rgb(rgb))
}

fn lookup_named(name: &str) -> Option<u32> {
    let name = name.trim();
    if name.eq_ignore_ascii_case("transparent") {
        return Some(0);
    }
    CSS_COLORS
        .iter()
        .find(|(css, _)| css.eq_ignore_ascii_case(name))
        .map(|&(_, rgb)| rgb)
}

/// CSS named colors.
const CSS_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgrey", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgrey", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];
