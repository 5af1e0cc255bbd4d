//! Configuration file support.
//!
//! Serialises the tunable parts of the editor and viewer (zoom bounds and
//! factors, hotspot defaults, CSV export style, log level) so they can be
//! injected per consumer instead of being hardcoded.

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{CSV_DECIMAL_PLACES, DEFAULT_HOTSPOT_COLOR, HOTSPOT_HIT_RADIUS};
use crate::format::{ExportOptions, ImportOptions, QuoteStyle};
use crate::viewport::ViewportConfig;

/// Config file format version this build reads and writes.
pub const CONFIG_VERSION: u32 = 1;

/// Directory name under the user config dir.
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_DIR_NAME: &str = "hotspot-map";

/// File name of the config file.
pub const CONFIG_FILE_NAME: &str = "hotspot-map-config.json";

/// Verbosity written to the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// File format version, checked on load
    pub version: u32,
    /// Viewport tuning for the editor canvas
    #[serde(default = "ViewportConfig::editor")]
    pub editor: ViewportConfig,

    /// Viewport tuning for the public viewer
    #[serde(default = "ViewportConfig::viewer")]
    pub viewer: ViewportConfig,

    /// Defaults for new and imported hotspots
    #[serde(default)]
    pub hotspots: HotspotDefaults,

    /// CSV export style
    #[serde(default)]
    pub csv: CsvOptions,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Hotspot defaults section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotDefaults {
    /// Color for new hotspots and for imported rows without a valid one
    #[serde(default = "default_hotspot_color")]
    pub default_color: String,

    /// Marker hit radius in screen pixels
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f64,
}

fn default_hotspot_color() -> String {
    DEFAULT_HOTSPOT_COLOR.to_string()
}

fn default_hit_radius() -> f64 {
    HOTSPOT_HIT_RADIUS
}

impl Default for HotspotDefaults {
    fn default() -> Self {
        Self {
            default_color: default_hotspot_color(),
            hit_radius: default_hit_radius(),
        }
    }
}

/// CSV export section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Decimal places written for coordinates
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,

    /// Quoting policy for text fields
    #[serde(default)]
    pub quote_style: QuoteStyle,
}

fn default_decimal_places() -> usize {
    CSV_DECIMAL_PLACES
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
            quote_style: QuoteStyle::default(),
        }
    }
}

impl CsvOptions {
    /// Export options matching this section.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::new()
            .decimal_places(self.decimal_places)
            .quote_style(self.quote_style)
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            editor: ViewportConfig::editor(),
            viewer: ViewportConfig::viewer(),
            hotspots: HotspotDefaults::default(),
            csv: CsvOptions::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Import options carrying the configured default color.
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions::new().default_color(self.hotspots.default_color.clone())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a config file body. Files written by a newer build are refused.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    /// `<config dir>/hotspot-map/hotspot-map-config.json`, or under
    /// `~/.config` when the platform has no config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    #[cfg(not(target_arch = "wasm32"))]
    /// Load from `path`, or from [`AppConfig::default_path`] when `None`.
    ///
    /// An explicit path must exist. A missing file at the default location
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    log::debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let config = Self::from_json(&std::fs::read_to_string(&path)?)?;
        log::info!("Config loaded from {}", path.display());
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    /// Write to `path`, creating missing parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config version {found} is newer than supported version {supported}")]
    VersionTooNew { found: u32, supported: u32 },

    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
