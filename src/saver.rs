//! Getting pixels out: data URIs, downloads, files, bytes, or a stream.
//!
//! Every saver resolves its output format the same way: the caller's mime
//! type if one is given, otherwise `saver.default_mime_type` from the
//! config. Quality defaults to `saver.default_quality` and is clamped to
//! 0–100.
//!
//! ## Outputs
//!
//! | Saver | Result |
//! |---|---|
//! | [`Saver::to_data_uri`] | `data:<mime>;base64,<payload>` |
//! | [`Saver::to_download`] | [`Download`]: bytes plus attachment headers |
//! | [`Saver::to_file`] | bytes written to a path, `Write` error on failure |
//! | [`Saver::to_bytes`] | the encoded bytes |
//! | [`Saver::to_screen`] | a `Content-Type` header block followed by the bytes |

use crate::canvas::{Canvas, ImageMime};
use crate::config::SaverConfig;
use crate::error::{ImageError, Result};
use crate::imaging::{Codec, Quality, RustCodec};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::instrument;

/// Encoded image data with its format.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub data: Vec<u8>,
    pub mime: ImageMime,
}

/// An encoded image packaged as a file download.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub data: Vec<u8>,
    pub mime: ImageMime,
}

impl Download {
    pub const CONTENT_TYPE: &'static str = "application/octet-stream";

    /// Response headers for sending the download, in send order.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "Cache-Control",
                "must-revalidate, post-check=0, pre-check=0".to_string(),
            ),
            ("Content-Description", "File Transfer".to_string()),
            ("Content-Length", self.data.len().to_string()),
            ("Content-Transfer-Encoding", "Binary".to_string()),
            ("Content-Type", Self::CONTENT_TYPE.to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            ),
        ]
    }
}

/// Encodes canvases through a [`Codec`].
#[derive(Debug, Clone)]
pub struct Saver<C: Codec = RustCodec> {
    codec: C,
    config: SaverConfig,
}

impl Saver<RustCodec> {
    pub fn new(config: SaverConfig) -> Self {
        Self::with_codec(RustCodec::new(), config)
    }
}

impl Default for Saver<RustCodec> {
    fn default() -> Self {
        Self::new(SaverConfig::default())
    }
}

impl<C: Codec> Saver<C> {
    pub fn with_codec(codec: C, config: SaverConfig) -> Self {
        Self { codec, config }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Encode `canvas`; the shared step behind every saver.
    pub fn encode(
        &self,
        canvas: &Canvas,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<Encoded> {
        let mime = mime.unwrap_or_else(|| self.config.default_mime());
        let quality = Quality::new(quality.unwrap_or(self.config.default_quality));
        let data = self.codec.encode(canvas.pixels(), mime, quality)?;
        tracing::debug!(
            %mime,
            quality = quality.value(),
            width = canvas.width(),
            height = canvas.height(),
            bytes = data.len(),
            "encoded image"
        );
        Ok(Encoded { data, mime })
    }

    /// `data:<mime>;base64,<payload>`.
    #[instrument(skip_all)]
    pub fn to_data_uri(
        &self,
        canvas: &Canvas,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<String> {
        let encoded = self.encode(canvas, mime, quality)?;
        Ok(format!(
            "data:{};base64,{}",
            encoded.mime,
            STANDARD.encode(&encoded.data)
        ))
    }

    /// Package the encoded image as an attachment named `filename`.
    #[instrument(skip_all, fields(filename = %filename))]
    pub fn to_download(
        &self,
        canvas: &Canvas,
        filename: &str,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<Download> {
        let encoded = self.encode(canvas, mime, quality)?;
        Ok(Download {
            filename: filename.to_string(),
            data: encoded.data,
            mime: encoded.mime,
        })
    }

    /// Write the encoded image to `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn to_file(
        &self,
        canvas: &Canvas,
        path: &Path,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<Encoded> {
        let encoded = self.encode(canvas, mime, quality)?;
        fs::write(path, &encoded.data)
            .map_err(|e| ImageError::Write(format!("{}: {e}", path.display())))?;
        tracing::info!(mime = %encoded.mime, bytes = encoded.data.len(), "wrote image file");
        Ok(encoded)
    }

    /// The encoded bytes.
    pub fn to_bytes(
        &self,
        canvas: &Canvas,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<Vec<u8>> {
        Ok(self.encode(canvas, mime, quality)?.data)
    }

    /// Write a `Content-Type` header block followed by the encoded bytes.
    #[instrument(skip_all)]
    pub fn to_screen(
        &self,
        canvas: &Canvas,
        out: &mut impl Write,
        mime: Option<ImageMime>,
        quality: Option<u32>,
    ) -> Result<ImageMime> {
        let encoded = self.encode(canvas, mime, quality)?;
        write!(out, "Content-Type: {}\r\n\r\n", encoded.mime)?;
        out.write_all(&encoded.data)?;
        out.flush()?;
        Ok(encoded.mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::test_helpers::{MockCodec, RecordedOp};
    use tempfile::TempDir;

    fn mock_saver() -> Saver<MockCodec> {
        Saver::with_codec(
            MockCodec::with_image(1, 1, ImageMime::Png),
            SaverConfig::default(),
        )
    }

    fn canvas() -> Canvas {
        Canvas::filled(3, 2, Color::WHITE)
    }

    // =========================================================================
    // Format and quality resolution
    // =========================================================================

    #[test]
    fn defaults_come_from_config() {
        let saver = Saver::with_codec(
            MockCodec::with_image(1, 1, ImageMime::Png),
            SaverConfig {
                default_mime_type: "image/jpeg".into(),
                default_quality: 75,
            },
        );
        let encoded = saver.encode(&canvas(), None, None).unwrap();
        assert_eq!(encoded.mime, ImageMime::Jpeg);
        assert_eq!(encoded.data, b"image/jpeg:75");
    }

    #[test]
    fn quality_is_clamped() {
        let saver = mock_saver();
        saver.to_bytes(&canvas(), Some(ImageMime::Gif), Some(250)).unwrap();
        assert_eq!(
            saver.codec().get_operations(),
            vec![RecordedOp::Encode {
                width: 3,
                height: 2,
                mime: ImageMime::Gif,
                quality: 100,
            }]
        );
    }

    // =========================================================================
    // Outputs
    // =========================================================================

    #[test]
    fn data_uri_wraps_base64_payload() {
        let uri = mock_saver()
            .to_data_uri(&canvas(), Some(ImageMime::Png), Some(90))
            .unwrap();
        assert_eq!(
            uri,
            format!("data:image/png;base64,{}", STANDARD.encode(b"image/png:90"))
        );
    }

    #[test]
    fn download_carries_attachment_headers() {
        let download = mock_saver()
            .to_download(&canvas(), "shot.png", None, None)
            .unwrap();
        assert_eq!(download.filename, "shot.png");
        let headers = download.headers();
        assert!(headers.contains(&("Content-Type", "application/octet-stream".to_string())));
        assert!(headers.contains(&(
            "Content-Disposition",
            "attachment; filename=\"shot.png\"".to_string()
        )));
        assert!(headers.contains(&("Content-Length", download.data.len().to_string())));
    }

    #[test]
    fn to_file_writes_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        mock_saver().to_file(&canvas(), &path, None, Some(10)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"image/png:10");
    }

    #[test]
    fn to_file_into_missing_directory_is_write_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("out.png");
        let err = mock_saver().to_file(&canvas(), &path, None, None).unwrap_err();
        assert_eq!(err.code(), 11);
    }

    #[test]
    fn to_screen_prefixes_content_type() {
        let mut out = Vec::new();
        let mime = mock_saver()
            .to_screen(&canvas(), &mut out, Some(ImageMime::Jpeg), Some(50))
            .unwrap();
        assert_eq!(mime, ImageMime::Jpeg);
        assert_eq!(out, b"Content-Type: image/jpeg\r\n\r\nimage/jpeg:50");
    }

    #[test]
    fn real_codec_png_round_trips() {
        let bytes = Saver::default().to_bytes(&canvas(), None, None).unwrap();
        let decoded = RustCodec::new().decode(&bytes).unwrap();
        assert_eq!(decoded.mime, ImageMime::Png);
        assert_eq!(decoded.pixels.dimensions(), (3, 2));
    }
}
