//! QR codes composited onto a canvas.
//!
//! The `qrcode` crate produces the module matrix; each module becomes a
//! `module_size`-pixel square, dark on white, with no quiet zone. The
//! rendered grid is resized to the requested box and then placed with the
//! ordinary overlay rule.

use super::compositor::overlay;
use crate::canvas::Canvas;
use crate::error::{ImageError, Result};
use crate::imaging::Anchor;
use crate::imaging::sizer::resize;
use std::fmt;
use std::str::FromStr;

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    /// ~7% recovery.
    #[default]
    L,
    /// ~15% recovery.
    M,
    /// ~25% recovery.
    Q,
    /// ~30% recovery.
    H,
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            _ => Err(format!("unknown QR error correction level '{s}'")),
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(level)
    }
}

/// Size and placement of a QR code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrOptions {
    /// Final width in pixels.
    pub width: u32,
    /// Final height in pixels.
    pub height: u32,
    pub anchor: Anchor,
    pub level: ErrorCorrection,
    /// Pixels per module before the final resize.
    pub module_size: u32,
    /// 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f32,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl QrOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            anchor: Anchor::Center,
            level: ErrorCorrection::L,
            module_size: 4,
            opacity: 1.0,
            x_offset: 0,
            y_offset: 0,
        }
    }
}

/// Render `text` as a QR module grid: dark modules black, light ones white.
#[cfg(feature = "qr")]
pub fn render_qr(text: &str, level: ErrorCorrection, module_size: u32) -> Result<Canvas> {
    use crate::color::Color;
    use image::{Rgba, RgbaImage};
    use qrcode::{EcLevel, QrCode};

    let ec = match level {
        ErrorCorrection::L => EcLevel::L,
        ErrorCorrection::M => EcLevel::M,
        ErrorCorrection::Q => EcLevel::Q,
        ErrorCorrection::H => EcLevel::H,
    };
    let code = QrCode::with_error_correction_level(text.as_bytes(), ec)
        .map_err(|e| ImageError::InvalidImage(format!("cannot encode QR code: {e}")))?;

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let scale = module_size.max(1);
    let side = modules * scale;
    let dark = Color::BLACK.to_rgba();
    let light = Rgba([255, 255, 255, 255]);
    let pixels = RgbaImage::from_fn(side, side, |x, y| {
        let index = ((y / scale) * modules + x / scale) as usize;
        match colors.get(index) {
            Some(qrcode::Color::Dark) => dark,
            _ => light,
        }
    });
    tracing::debug!(modules, side, %level, "rendered QR code");
    Ok(Canvas::from_pixels(pixels, crate::canvas::ImageMime::Png))
}

#[cfg(not(feature = "qr"))]
pub fn render_qr(_text: &str, _level: ErrorCorrection, _module_size: u32) -> Result<Canvas> {
    Err(ImageError::LibNotLoaded(
        "QR code support is not enabled in this build".to_string(),
    ))
}

/// Render `text` as a QR code, resize it to the requested box and overlay
/// it onto `dst`. Returns the top-left corner it landed at.
pub fn qr_code(dst: &mut Canvas, text: &str, options: &QrOptions) -> Result<(i32, i32)> {
    let mut qr = render_qr(text, options.level, options.module_size)?;
    resize(&mut qr, Some(options.width), Some(options.height));
    Ok(overlay(
        dst,
        &qr,
        options.anchor,
        options.opacity,
        options.x_offset,
        options.y_offset,
    ))
}
