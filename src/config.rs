//! Configuration module.
//!
//! Handles loading, validating, and merging `imgfit.toml`. Stock defaults
//! are the base layer; a user file overrides just the keys it names.
//!
//! ## Where It Is Read From
//!
//! `imgfit.toml` in the working directory, or any file passed with
//! `--config`. Without either, the stock defaults apply.
//!
//! ## Keys
//!
//! ```toml
//! # Every key is optional; these are the defaults
//!
//! [resize]
//! filter = "lanczos3"       # nearest | triangle | catmull_rom | gaussian | lanczos3
//!
//! [padding]
//! fill = "#00000000"        # Border color (#rgb, #rgba, #rrggbb, #rrggbbaa)
//!
//! [output]
//! format = "png"            # png | jpeg | webp | tiff
//! quality = 90              # JPEG quality (1-100)
//! suffix = true             # photo.jpg → photo-fill.png instead of photo.png
//!
//! [limits]
//! max_pixels = 268435456    # Largest surface the backend will allocate
//!
//! [processing]
//! max_processes = 4         # Worker cap; leave out to use every core
//! ```
//!
//! A misspelled key is an error, not a silently ignored setting.

use crate::imaging::{Color, DEFAULT_MAX_PIXELS, Filter, OutputFormat, Quality, RustBackend};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "imgfit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `imgfit.toml`.
///
/// Every section defaults independently, so a user file lists only what it
/// changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Resampling settings.
    pub resize: ResizeConfig,
    /// Padding border settings.
    pub padding: PaddingConfig,
    /// Encoded output settings (format, quality, naming).
    pub output: OutputConfig,
    /// Allocation limits.
    pub limits: LimitsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Check values serde cannot rule out on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.limits.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_pixels must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Backend configured with this filter and allocation limit.
    pub fn backend(&self) -> RustBackend {
        RustBackend::new()
            .with_filter(self.resize.filter)
            .with_max_pixels(self.limits.max_pixels)
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }
}

/// Resampling settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Filter used whenever an image is drawn at a different size.
    pub filter: Filter,
}

/// Padding border settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaddingConfig {
    /// Border color. Transparent by default.
    pub fill: Color,
}

/// Encoded output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File format for written images.
    pub format: OutputFormat,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Append the operation name to output file stems.
    pub suffix: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: Quality::default().value(),
            suffix: true,
        }
    }
}

/// Allocation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest surface, in pixels, the backend will allocate.
    pub max_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

/// Worker pool sizing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Worker cap. `None` means one worker per core; larger values are
    /// clamped to the core count.
    pub max_processes: Option<usize>,
}

/// Number of rayon workers to start: the configured cap, between one and
/// the core count, or every core when no cap is set.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Loading: stock defaults, user overlay, validation
// =============================================================================

/// `Config::default()` as a TOML table, the bottom layer of every load.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Lay `overlay` over `base`. Tables merge per key at every depth; any other
/// overlay value replaces the base value outright.
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

/// Parse a config file without interpreting it. `Ok(None)` when there is
/// no file at `path`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `imgfit.toml` from the given directory, falling back to defaults
/// when the file is absent.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    resolve_config(load_raw_config(&dir.join(CONFIG_FILE_NAME))?)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    resolve_config(Some(toml::from_str(&content)?))
}

/// Commented `imgfit.toml` listing every key at its default, printed by
/// `imgfit gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# imgfit Configuration
# ====================
# Every key below is optional and set to its default.
# Delete what you don't change. Misspelled keys are rejected.

# ---------------------------------------------------------------------------
# Resampling
# ---------------------------------------------------------------------------
[resize]
# Filter used whenever an image is drawn at a different size.
# One of: nearest, triangle, catmull_rom, gaussian, lanczos3.
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Padding
# ---------------------------------------------------------------------------
[padding]
# Border color for `imgfit pad` (#rgb, #rgba, #rrggbb or #rrggbbaa).
# Fully transparent by default.
fill = "#00000000"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# File format for written images: png, jpeg, webp or tiff.
format = "png"

# JPEG encoding quality (1 = worst, 100 = best).
quality = 90

# Append the operation to output names: photo.jpg -> photo-fill.png
suffix = true

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Largest surface, in pixels, that will be allocated (16384 x 16384).
max_pixels = 268435456

# ---------------------------------------------------------------------------
# Workers
# ---------------------------------------------------------------------------
[processing]
# Cap on parallel workers. Left unset, imgfit uses one per CPU core.
# max_processes = 4
"##
}
