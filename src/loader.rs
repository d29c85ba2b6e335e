//! Getting pixels in: files, data URIs, raw bytes, or a blank canvas.
//!
//! A [`Loader`] pairs a [`Codec`] with the loading half of the config. It is
//! generic over the codec so tests can drive it with a recording mock; the
//! default is [`RustCodec`].
//!
//! | Entry point | Fails with |
//! |---|---|
//! | [`Loader::from_file`] | `FileNotFound` if unreadable, codec errors if undecodable |
//! | [`Loader::from_data_uri`] | `InvalidDataUri` on a malformed prefix or payload, `UnsupportedFormat` on a non-image mime |
//! | [`Loader::from_bytes`] | codec errors |
//! | [`Loader::from_new`] | never |

use crate::canvas::{Canvas, ImageMime};
use crate::color::Color;
use crate::config::LoaderConfig;
use crate::error::{ImageError, Result};
use crate::exif::ExifData;
use crate::imaging::rust_codec::format_enabled;
use crate::imaging::{Codec, RustCodec};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs::{self, File};
use std::path::Path;
use tracing::instrument;

/// Where an image comes from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    Path(&'a Path),
    DataUri(&'a str),
    Bytes(&'a [u8]),
    /// An already-loaded canvas the caller keeps using.
    Handle(&'a Canvas),
}

impl<'a> From<&'a Path> for ImageSource<'a> {
    fn from(path: &'a Path) -> Self {
        ImageSource::Path(path)
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl<'a> From<&'a Canvas> for ImageSource<'a> {
    fn from(canvas: &'a Canvas) -> Self {
        ImageSource::Handle(canvas)
    }
}

/// Strings starting with `data:` are data URIs, anything else a path.
impl<'a> From<&'a str> for ImageSource<'a> {
    fn from(s: &'a str) -> Self {
        if s.starts_with("data:") {
            ImageSource::DataUri(s)
        } else {
            ImageSource::Path(Path::new(s))
        }
    }
}

/// A freshly loaded canvas and the EXIF data that came with it.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub canvas: Canvas,
    pub exif: Option<ExifData>,
}

/// Decodes images from any [`ImageSource`].
#[derive(Debug, Clone)]
pub struct Loader<C: Codec = RustCodec> {
    codec: C,
    config: LoaderConfig,
}

impl Loader<RustCodec> {
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_codec(RustCodec::new(), config)
    }
}

impl Default for Loader<RustCodec> {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl<C: Codec> Loader<C> {
    pub fn with_codec(codec: C, config: LoaderConfig) -> Self {
        Self { codec, config }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load from whichever source was given. A handle is copied.
    pub fn load(&self, source: ImageSource<'_>) -> Result<Loaded> {
        match source {
            ImageSource::Path(path) => self.from_file(path),
            ImageSource::DataUri(uri) => self.from_data_uri(uri),
            ImageSource::Bytes(bytes) => self.from_bytes(bytes),
            ImageSource::Handle(canvas) => Ok(Loaded {
                canvas: canvas.clone(),
                exif: None,
            }),
        }
    }

    /// Read and decode an image file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(&self, path: &Path) -> Result<Loaded> {
        let not_found = |e: std::io::Error| {
            ImageError::FileNotFound(format!("{}: {e}", path.display()))
        };
        if self.config.check_image_file {
            File::open(path).map_err(not_found)?;
        }
        let bytes = fs::read(path).map_err(not_found)?;
        let loaded = self.from_bytes(&bytes)?;
        tracing::info!(
            width = loaded.canvas.width(),
            height = loaded.canvas.height(),
            mime = %loaded.canvas.mime(),
            "loaded image file"
        );
        Ok(loaded)
    }

    /// Decode a `data:<mime>;base64,<payload>` URI.
    ///
    /// The mime type must name a readable image format exactly, e.g.
    /// `image/png`.
    #[instrument(skip_all, fields(len = uri.len()))]
    pub fn from_data_uri(&self, uri: &str) -> Result<Loaded> {
        let (mime_str, rest) = uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .ok_or_else(|| ImageError::InvalidDataUri("missing data:<mime>; prefix".into()))?;

        let mime = ImageMime::ALL
            .into_iter()
            .find(|m| m.as_str() == mime_str && format_enabled(*m))
            .ok_or_else(|| ImageError::UnsupportedFormat(mime_str.to_string()))?;

        let payload = rest
            .strip_prefix("base64,")
            .ok_or_else(|| ImageError::InvalidDataUri("payload is not base64".into()))?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageError::InvalidDataUri(format!("bad base64 payload: {e}")))?;

        let decoded = self.codec.decode(&bytes)?;
        let canvas = Canvas::from_pixels(decoded.pixels, mime);
        tracing::debug!(%mime, width = canvas.width(), height = canvas.height(), "decoded data URI");
        Ok(Loaded { canvas, exif: None })
    }

    /// Decode an in-memory encoded image.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Loaded> {
        let decoded = self.codec.decode(bytes)?;
        let exif = if self.config.use_image_exif && decoded.mime == ImageMime::Jpeg {
            ExifData::from_jpeg(bytes)
        } else {
            None
        };
        Ok(Loaded {
            canvas: Canvas::from_pixels(decoded.pixels, decoded.mime),
            exif,
        })
    }

    /// A new `width`×`height` PNG canvas flooded with `color`.
    pub fn from_new(&self, width: u32, height: u32, color: Color) -> Loaded {
        tracing::debug!(width, height, %color, "new canvas");
        Loaded {
            canvas: Canvas::filled(width, height, color),
            exif: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockCodec, RecordedOp};
    use tempfile::TempDir;

    fn mock_loader(config: LoaderConfig) -> Loader<MockCodec> {
        Loader::with_codec(MockCodec::with_image(4, 3, ImageMime::Jpeg), config)
    }

    // =========================================================================
    // from_file
    // =========================================================================

    #[test]
    fn from_file_reads_and_decodes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        fs::write(&path, b"12345").unwrap();

        let loader = mock_loader(LoaderConfig::default());
        let loaded = loader.from_file(&path).unwrap();
        assert_eq!(loaded.canvas.dimensions(), (4, 3));
        assert_eq!(loaded.canvas.mime(), ImageMime::Jpeg);
        assert_eq!(
            loader.codec().get_operations(),
            vec![RecordedOp::Decode { len: 5 }]
        );
    }

    #[test]
    fn from_file_missing_is_file_not_found() {
        for check_image_file in [false, true] {
            let loader = mock_loader(LoaderConfig {
                check_image_file,
                ..LoaderConfig::default()
            });
            let err = loader.from_file(Path::new("/nonexistent/x.png")).unwrap_err();
            assert_eq!(err.code(), 1);
            assert!(loader.codec().get_operations().is_empty());
        }
    }

    #[test]
    fn from_file_undecodable_is_invalid_image() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        fs::write(&path, b"nope").unwrap();

        let loader = Loader::with_codec(MockCodec::failing(), LoaderConfig::default());
        assert_eq!(loader.from_file(&path).unwrap_err().code(), 7);
    }

    // =========================================================================
    // from_data_uri
    // =========================================================================

    #[test]
    fn data_uri_tags_canvas_with_uri_mime() {
        let loader = mock_loader(LoaderConfig::default());
        let loaded = loader.from_data_uri("data:image/png;base64,AAEC").unwrap();
        assert_eq!(loaded.canvas.mime(), ImageMime::Png);
        assert!(loaded.exif.is_none());
        assert_eq!(
            loader.codec().get_operations(),
            vec![RecordedOp::Decode { len: 3 }]
        );
    }

    #[test]
    fn data_uri_without_prefix_is_invalid() {
        let loader = mock_loader(LoaderConfig::default());
        assert_eq!(loader.from_data_uri("image/png;base64,AAEC").unwrap_err().code(), 6);
        assert_eq!(loader.from_data_uri("data:image/png").unwrap_err().code(), 6);
    }

    #[test]
    fn data_uri_with_non_image_mime_is_unsupported() {
        let loader = mock_loader(LoaderConfig::default());
        let err = loader.from_data_uri("data:text/plain;base64,AAEC").unwrap_err();
        assert_eq!(err.code(), 9);
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn data_uri_with_bad_base64_is_invalid() {
        let loader = mock_loader(LoaderConfig::default());
        let err = loader.from_data_uri("data:image/gif;base64,@@@").unwrap_err();
        assert_eq!(err.code(), 6);
    }

    // =========================================================================
    // from_bytes / from_new / load
    // =========================================================================

    #[test]
    fn exif_read_only_for_jpeg_when_enabled() {
        let jpeg = crate::exif::fixtures::jpeg_with_orientation(3);

        let loaded = mock_loader(LoaderConfig::default()).from_bytes(&jpeg).unwrap();
        assert_eq!(loaded.exif.unwrap().orientation, Some(3));

        let disabled = mock_loader(LoaderConfig {
            use_image_exif: false,
            ..LoaderConfig::default()
        });
        assert!(disabled.from_bytes(&jpeg).unwrap().exif.is_none());

        let png = Loader::with_codec(MockCodec::with_image(1, 1, ImageMime::Png), LoaderConfig::default());
        assert!(png.from_bytes(&jpeg).unwrap().exif.is_none());
    }

    #[test]
    fn from_new_is_filled_png() {
        let loaded = Loader::default().from_new(3, 2, Color::WHITE);
        assert_eq!(loaded.canvas.dimensions(), (3, 2));
        assert_eq!(loaded.canvas.mime(), ImageMime::Png);
        assert_eq!(loaded.canvas.color_at(2, 1), Some(Color::WHITE));
    }

    #[test]
    fn source_from_str_detects_data_uris() {
        assert!(matches!(ImageSource::from("data:image/png;base64,"), ImageSource::DataUri(_)));
        assert!(matches!(ImageSource::from("photos/a.png"), ImageSource::Path(_)));
    }

    #[test]
    fn load_handle_copies_canvas() {
        let original = Canvas::filled(2, 2, Color::BLACK);
        let loaded = mock_loader(LoaderConfig::default())
            .load(ImageSource::Handle(&original))
            .unwrap();
        assert_eq!(loaded.canvas.pixels(), original.pixels());
    }
}
