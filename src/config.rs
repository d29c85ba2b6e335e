//! Toolkit configuration.
//!
//! Loader and saver behaviour that would otherwise be process-wide constants
//! lives in an explicit [`Config`] value. It is handed to a
//! [`Loader`](crate::loader::Loader) or [`Saver`](crate::saver::Saver) at
//! construction, and every [`Image`](crate::Image) carries a copy for its
//! convenience savers.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [loader]
//! check_image_file = false      # Probe the file for readability before decoding
//! use_image_exif = true         # Read EXIF orientation from JPEG sources
//!
//! [saver]
//! default_mime_type = "image/png"  # Output format when none is given
//! default_quality = 100            # Encoder quality (0-100)
//! ```
//!
//! A config file is sparse: it is merged on top of the stock defaults, so it
//! only needs the keys it wants to change. Unknown keys are rejected to catch
//! typos early.

use crate::canvas::ImageMime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Toolkit configuration loaded from a TOML file or built in code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How sources are read.
    pub loader: LoaderConfig,
    /// How output is encoded.
    pub saver: SaverConfig,
}

/// Source loading settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Open the file once before decoding so an unreadable path surfaces as
    /// `FileNotFound` instead of a decode failure.
    pub check_image_file: bool,
    /// Extract EXIF orientation from JPEG sources for `auto_orient`.
    pub use_image_exif: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            check_image_file: false,
            use_image_exif: true,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaverConfig {
    /// Mime type used when neither the caller nor the canvas names one.
    pub default_mime_type: String,
    /// Encoder quality when the caller passes none (0 = worst, 100 = best).
    pub default_quality: u32,
}

impl SaverConfig {
    /// `default_mime_type` parsed, PNG if it does not parse.
    pub fn default_mime(&self) -> ImageMime {
        ImageMime::parse(&self.default_mime_type).unwrap_or(ImageMime::Png)
    }
}

impl Default for SaverConfig {
    fn default() -> Self {
        Self {
            default_mime_type: "image/png".to_string(),
            default_quality: 100,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.saver.default_quality > 100 {
            return Err(ConfigError::Validation(
                "saver.default_quality must be 0-100".into(),
            ));
        }
        if ImageMime::parse(&self.saver.default_mime_type).is_none() {
            return Err(ConfigError::Validation(format!(
                "saver.default_mime_type '{}' is not a supported mime type",
                self.saver.default_mime_type
            )));
        }
        Ok(())
    }

    /// The configured default output format.
    ///
    /// Falls back to PNG when the configured value is unparseable; `validate`
    /// rejects such values at load time.
    pub fn default_mime(&self) -> ImageMime {
        self.saver.default_mime()
    }

    /// Parse a config from TOML text, merged on top of the stock defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let overlay: toml::Value = toml::from_str(content)?;
        resolve_config(stock_defaults_value()?, Some(overlay))
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# vimage configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Loading
# ---------------------------------------------------------------------------
[loader]
# Open the source once before decoding, so an unreadable path reports
# "file not found" rather than "invalid image".
check_image_file = false

# Read the EXIF orientation tag from JPEG sources (used by auto-orient).
use_image_exif = true

# ---------------------------------------------------------------------------
# Saving
# ---------------------------------------------------------------------------
[saver]
# Output format when neither the command nor the source names one.
# One of: image/gif, image/jpeg, image/png, image/webp
default_mime_type = "image/png"

# Encoder quality (0 = worst, 100 = best). PNG maps it to a compression level.
default_quality = 100
"##
}
