//! Configuration file support for IKAT.
//!
//! Settings live in a versioned JSON file under the platform config
//! directory. Every field has a default, so partial files are accepted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color_utils::Color;
use crate::constants::{self, api};
use crate::editor::AnnotationEditor;
use crate::model::LabelSet;
use crate::render::SceneStyle;
use crate::scaling::ViewportBudget;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Annotation server
    #[serde(default)]
    pub server: ServerConfig,

    /// Window size and reserved space
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Label catalog offered before any labels are added at runtime
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    /// Point set colors
    #[serde(default)]
    pub colors: ColorConfig,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,
}

fn default_app_name() -> String {
    "IKAT".to_string()
}

fn default_labels() -> Vec<String> {
    constants::DEFAULT_LABELS
        .iter()
        .map(|l| l.to_string())
        .collect()
}

/// Server section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL, without the `/api` path
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    api::DEFAULT_BASE_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Viewport section of the config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f32,
    #[serde(default = "default_viewport_height")]
    pub height: f32,
    #[serde(default = "default_sidebar_allowance")]
    pub sidebar_allowance: f32,
    #[serde(default = "default_toolbar_allowance")]
    pub toolbar_allowance: f32,
}

fn default_viewport_width() -> f32 {
    constants::DEFAULT_VIEWPORT_WIDTH
}

fn default_viewport_height() -> f32 {
    constants::DEFAULT_VIEWPORT_HEIGHT
}

fn default_sidebar_allowance() -> f32 {
    constants::SIDEBAR_ALLOWANCE
}

fn default_toolbar_allowance() -> f32 {
    constants::TOOLBAR_ALLOWANCE
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
            sidebar_allowance: default_sidebar_allowance(),
            toolbar_allowance: default_toolbar_allowance(),
        }
    }
}

/// Color section of the config, as `#rrggbb` strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(default = "default_subject_color")]
    pub subject: String,
    #[serde(default = "default_composition_color")]
    pub composition: String,
}

fn default_subject_color() -> String {
    constants::render::SUBJECT_COLOR.to_hex()
}

fn default_composition_color() -> String {
    constants::render::COMPOSITION_COLOR.to_hex()
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            subject: default_subject_color(),
            composition: default_composition_color(),
        }
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            server: ServerConfig::default(),
            viewport: ViewportConfig::default(),
            labels: default_labels(),
            colors: ColorConfig::default(),
            preferences: UserPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Viewport budget for fitting images.
    pub fn viewport_budget(&self) -> ViewportBudget {
        ViewportBudget {
            width: self.viewport.width,
            height: self.viewport.height,
            sidebar_allowance: self.viewport.sidebar_allowance,
            toolbar_allowance: self.viewport.toolbar_allowance,
        }
    }

    /// Rendering style with the configured colors.
    ///
    /// Unparseable colors fall back to the built-in ones.
    pub fn scene_style(&self) -> SceneStyle {
        let defaults = SceneStyle::default();
        SceneStyle {
            subject_color: parse_color(&self.colors.subject, defaults.subject_color),
            composition_color: parse_color(&self.colors.composition, defaults.composition_color),
            ..defaults
        }
    }

    /// Editor configured from this file.
    pub fn build_editor(&self) -> AnnotationEditor {
        AnnotationEditor::new(self.viewport_budget(), LabelSet::new(self.labels.iter().cloned()))
            .with_style(self.scene_style())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "ikat-config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("ikat").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("ikat")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from `path`.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_color(hex: &str, fallback: Color) -> Color {
    Color::from_hex(hex).unwrap_or_else(|| {
        log::warn!("Invalid color '{}' in config, using {}", hex, fallback.to_hex());
        fallback
    })
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
