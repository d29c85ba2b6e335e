//! EXIF metadata read at load time.
//!
//! Only JPEG sources are inspected. The orientation tag drives
//! [`auto_orient`](crate::imaging::orient::auto_orient); the remaining primary
//! IFD fields are kept as display strings for callers that want them.

use std::io::Cursor;

/// EXIF fields of a loaded image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    /// Orientation tag (1–8), if present.
    pub orientation: Option<u32>,
    /// `(tag name, display value)` for every primary-image field.
    pub fields: Vec<(String, String)>,
}

impl ExifData {
    /// Parse EXIF from JPEG bytes. `None` when the file carries no EXIF
    /// block or it cannot be parsed.
    pub fn from_jpeg(bytes: &[u8]) -> Option<Self> {
        let parsed = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "no usable EXIF data");
                return None;
            }
        };

        let orientation = parsed
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0));
        let fields = parsed
            .fields()
            .filter(|field| field.ifd_num == exif::In::PRIMARY)
            .map(|field| {
                (
                    field.tag.to_string(),
                    field.display_value().with_unit(&parsed).to_string(),
                )
            })
            .collect();

        tracing::debug!(?orientation, "read EXIF data");
        Some(Self {
            orientation,
            fields,
        })
    }

    /// Display value of the named tag, e.g. `"Model"`.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, value)| value.as_str())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_orientation_tag() {
        let data = ExifData::from_jpeg(&fixtures::jpeg_with_orientation(6)).unwrap();
        assert_eq!(data.orientation, Some(6));
        assert!(data.get("Orientation").is_some());
        assert_eq!(data.get("Model"), None);
    }

    #[test]
    fn non_jpeg_bytes_have_no_exif() {
        assert_eq!(ExifData::from_jpeg(b"not an image"), None);
    }
}
