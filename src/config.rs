//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the site root overrides any subset of
//! them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! public_root = "public"    # Directory holding albums/ and events/
//!
//! [placeholder]
//! width = 32                # Placeholder canvas size
//! height = 24
//! base_saturation = 62      # First gradient stop
//! base_lightness = 62
//! accent_saturation = 72    # Second gradient stop
//! accent_lightness = 72
//!
//! [dimensions]
//! fallback_width = 1600     # Reported when an image header is unreadable
//! fallback_height = 1066
//!
//! [featured]
//! count = 6                 # Collections on the home page
//!
//! [contact]
//! rate_limit_max = 5        # Submissions per client per window
//! rate_limit_window_secs = 900
//! from = "studio@example.com"
//! to = ["studio@example.com"]
//! subject = "New photography inquiry"
//!
//! [processing]
//! max_processes = 4         # Max parallel readers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::Dimensions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
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

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding `albums/` and `events/`, relative to the site root.
    pub public_root: String,
    /// Inline placeholder size and colors.
    pub placeholder: PlaceholderConfig,
    /// Dimensions used when an image header cannot be read.
    pub dimensions: DimensionsConfig,
    /// Home page collection count.
    pub featured: FeaturedConfig,
    /// Contact form rate limit and email envelope.
    pub contact: ContactConfig,
    /// Parallel reading settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            public_root: "public".to_string(),
            placeholder: PlaceholderConfig::default(),
            dimensions: DimensionsConfig::default(),
            featured: FeaturedConfig::default(),
            contact: ContactConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.placeholder;
        if p.width == 0 || p.height == 0 {
            return Err(ConfigError::Validation(
                "placeholder width and height must be non-zero".into(),
            ));
        }
        for (name, value) in [
            ("base_saturation", p.base_saturation),
            ("base_lightness", p.base_lightness),
            ("accent_saturation", p.accent_saturation),
            ("accent_lightness", p.accent_lightness),
        ] {
            if value > 100 {
                return Err(ConfigError::Validation(format!(
                    "placeholder.{name} must be 0-100"
                )));
            }
        }
        if self.dimensions.fallback_width == 0 || self.dimensions.fallback_height == 0 {
            return Err(ConfigError::Validation(
                "dimensions fallback values must be non-zero".into(),
            ));
        }
        if self.contact.rate_limit_max == 0 || self.contact.rate_limit_window_secs == 0 {
            return Err(ConfigError::Validation(
                "contact rate limit values must be non-zero".into(),
            ));
        }
        if self.contact.to.is_empty() {
            return Err(ConfigError::Validation(
                "contact.to must list at least one recipient".into(),
            ));
        }
        if self.public_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "public_root must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve `public_root` against the site root directory.
    pub fn public_dir(&self, site_root: &Path) -> PathBuf {
        site_root.join(&self.public_root)
    }
}

/// Placeholder canvas size and gradient color presets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    pub width: u32,
    pub height: u32,
    pub base_saturation: u32,
    pub base_lightness: u32,
    pub accent_saturation: u32,
    pub accent_lightness: u32,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 24,
            base_saturation: 62,
            base_lightness: 62,
            accent_saturation: 72,
            accent_lightness: 72,
        }
    }
}

/// Fallback size for images whose headers cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DimensionsConfig {
    pub fallback_width: u32,
    pub fallback_height: u32,
}

impl Default for DimensionsConfig {
    fn default() -> Self {
        let fallback = crate::imaging::FALLBACK_DIMENSIONS;
        Self {
            fallback_width: fallback.width,
            fallback_height: fallback.height,
        }
    }
}

impl DimensionsConfig {
    pub fn fallback(&self) -> Dimensions {
        Dimensions {
            width: self.fallback_width,
            height: self.fallback_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeaturedConfig {
    /// Number of most recently updated collections shown on the home page.
    pub count: usize,
}

impl Default for FeaturedConfig {
    fn default() -> Self {
        Self { count: 6 }
    }
}

/// Contact endpoint limits and email envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    /// Accepted submissions per client within one window.
    pub rate_limit_max: u32,
    /// Fixed window length in seconds.
    pub rate_limit_window_secs: u64,
    /// Envelope sender for inquiry emails.
    pub from: String,
    /// Inquiry recipients.
    pub to: Vec<String>,
    /// Subject prefix; the project type is appended.
    pub subject: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            rate_limit_max: 5,
            rate_limit_window_secs: 15 * 60,
            from: "studio@example.com".to_string(),
            to: vec!["studio@example.com".to_string()],
            subject: "New photography inquiry".to_string(),
        }
    }
}

/// Parallel reading settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel file readers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
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
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the site root, over stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Darkroom Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory holding albums/ and events/, relative to this file.
public_root = "public"

# ---------------------------------------------------------------------------
# Inline placeholders
# ---------------------------------------------------------------------------
[placeholder]
# Canvas size of the gradient SVG.
width = 32
height = 24

# Color presets (percent) for the two gradient stops.
base_saturation = 62
base_lightness = 62
accent_saturation = 72
accent_lightness = 72

# ---------------------------------------------------------------------------
# Dimension probing
# ---------------------------------------------------------------------------
[dimensions]
# Reported when an image header is missing, truncated or unsupported.
fallback_width = 1600
fallback_height = 1066

# ---------------------------------------------------------------------------
# Home page
# ---------------------------------------------------------------------------
[featured]
# Most recently updated collections shown on the home page.
count = 6

# ---------------------------------------------------------------------------
# Contact form
# ---------------------------------------------------------------------------
[contact]
# Fixed-window rate limit per client address.
rate_limit_max = 5
rate_limit_window_secs = 900

# Email envelope for inquiries.
from = "studio@example.com"
to = ["studio@example.com"]
subject = "New photography inquiry"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel file readers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.public_root, "public");
        assert_eq!(config.placeholder.width, 32);
        assert_eq!(config.placeholder.height, 24);
        assert_eq!(config.dimensions.fallback(), crate::imaging::FALLBACK_DIMENSIONS);
        assert_eq!(config.featured.count, 6);
        assert_eq!(config.contact.rate_limit_max, 5);
        assert_eq!(config.contact.rate_limit_window_secs, 900);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[featured]
count = 3
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.featured.count, 3);
        assert_eq!(config.public_root, "public");
        assert_eq!(config.placeholder.base_saturation, 62);
    }

    #[test]
    fn public_dir_joins_site_root() {
        let config = SiteConfig::default();
        assert_eq!(
            config.public_dir(Path::new("/srv/site")),
            PathBuf::from("/srv/site/public")
        );
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.public_root, "public");
        assert_eq!(config.featured.count, 6);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
public_root = "static"

[contact]
to = ["a@example.com", "b@example.com"]
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.public_root, "static");
        assert_eq!(config.contact.to.len(), 2);
        // Unspecified values keep defaults
        assert_eq!(config.contact.rate_limit_max, 5);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[placeholder]
widht = 10
"#,
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[placeholder]
base_lightness = 140
"#,
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_fallback() {
        let mut config = SiteConfig::default();
        config.dimensions.fallback_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_rate_limit() {
        let mut config = SiteConfig::default();
        config.contact.rate_limit_window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_recipients() {
        let mut config = SiteConfig::default();
        config.contact.to.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("contact.to"));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[placeholder]
width = 32
height = 24
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[placeholder]
width = 16
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let placeholder = merged.get("placeholder").unwrap();
        assert_eq!(placeholder.get("width").unwrap().as_integer(), Some(16));
        assert_eq!(placeholder.get("height").unwrap().as_integer(), Some(24));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"to = ["a", "b"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"to = ["c"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("to").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.public_root, defaults.public_root);
        assert_eq!(config.placeholder, defaults.placeholder);
        assert_eq!(config.dimensions, defaults.dimensions);
        assert_eq!(config.featured, defaults.featured);
        assert_eq!(config.contact, defaults.contact);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["placeholder", "dimensions", "featured", "contact", "processing"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }
}
