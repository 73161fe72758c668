//! Pipeline configuration.
//!
//! Loads `media-prep.toml` from a directory, merges it over stock defaults,
//! and validates the result. A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! backend = "file"            # "file" writes JPEGs, "inline" returns data URIs
//! output_dir = ".media-prep"  # where the file backend writes
//!
//! [limits]
//! max_width = 2000            # upload bounding box
//! max_height = 2000
//! capture_max_bytes = 1000000 # threshold for compress-if-needed after capture
//! upload_max_bytes = 976560   # budget for the pre-upload compression pass
//!
//! [compression]
//! quality_ceiling = 10        # first quality step, in tenths
//! quality_floor = 1           # last quality step, in tenths
//!
//! [fetch]
//! timeout_ms = 5000           # remote image download timeout
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Dimensions, Quality, QualityLadder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "media-prep.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Which [`Backend`](crate::imaging::Backend) variant to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    File,
    Inline,
}

/// Top-level configuration loaded from `media-prep.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    pub backend: BackendKind,
    /// Output directory for the file backend. Relative paths resolve against
    /// the working directory.
    pub output_dir: PathBuf,
    pub limits: LimitsConfig,
    pub compression: CompressionConfig,
    pub fetch: FetchConfig,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            output_dir: PathBuf::from(".media-prep"),
            limits: LimitsConfig::default(),
            compression: CompressionConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// Size and byte limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub capture_max_bytes: u64,
    pub upload_max_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_width: 2000,
            max_height: 2000,
            capture_max_bytes: 1_000_000,
            upload_max_bytes: 976_560,
        }
    }
}

impl LimitsConfig {
    pub fn max_dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.max_width,
            height: self.max_height,
        }
    }
}

/// Quality ladder bounds in tenths (10 = 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    pub quality_ceiling: u32,
    pub quality_floor: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            quality_ceiling: 10,
            quality_floor: 1,
        }
    }
}

impl CompressionConfig {
    pub fn ladder(&self) -> QualityLadder {
        QualityLadder::new(
            Quality::from_tenths(self.quality_ceiling),
            Quality::from_tenths(self.quality_floor),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl PrepConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_width == 0 || self.limits.max_height == 0 {
            return Err(ConfigError::Validation(
                "limits.max_width and limits.max_height must be non-zero".into(),
            ));
        }
        if self.limits.capture_max_bytes == 0 || self.limits.upload_max_bytes == 0 {
            return Err(ConfigError::Validation(
                "limits byte budgets must be non-zero".into(),
            ));
        }
        if self.limits.upload_max_bytes > self.limits.capture_max_bytes {
            return Err(ConfigError::Validation(
                "limits.upload_max_bytes must not exceed limits.capture_max_bytes".into(),
            ));
        }
        let c = &self.compression;
        let in_range = |t: u32| (1..=10).contains(&t);
        if !in_range(c.quality_ceiling) || !in_range(c.quality_floor) {
            return Err(ConfigError::Validation(
                "compression quality bounds must be 1-10".into(),
            ));
        }
        if c.quality_floor > c.quality_ceiling {
            return Err(ConfigError::Validation(
                "compression.quality_floor must not exceed quality_ceiling".into(),
            ));
        }
        if self.fetch.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PrepConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
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

/// Load `media-prep.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Load config from `media-prep.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<PrepConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: PrepConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `media-prep.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# media-prep configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Where encoded images go:
#   "file"   - JPEG files written to output_dir
#   "inline" - data:image/jpeg;base64 URIs, nothing written to disk
backend = "file"

# Output directory for the file backend.
output_dir = ".media-prep"

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Bounding box for uploaded images. Larger images are scaled down so the
# shorter of these two sides caps the planned long edge.
max_width = 2000
max_height = 2000

# Freshly captured images larger than this are re-encoded once at their own
# size (compress-if-needed).
capture_max_bytes = 1000000

# Byte budget for the pre-upload compression pass. An encode must come in
# strictly below this to be accepted.
upload_max_bytes = 976560

# ---------------------------------------------------------------------------
# Compression ladder
# ---------------------------------------------------------------------------
[compression]
# JPEG quality steps in tenths, tried from ceiling down to floor.
# 10 = quality 1.0, 1 = quality 0.1.
quality_ceiling = 10
quality_floor = 1

# ---------------------------------------------------------------------------
# Remote fetch
# ---------------------------------------------------------------------------
[fetch]
# Download timeout for remote images, in milliseconds.
timeout_ms = 5000
"##
}
