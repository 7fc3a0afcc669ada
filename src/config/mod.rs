// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_BORDER, DEFAULT_BOX_SIZE, DEFAULT_OVERLAY_PADDING, DEFAULT_QR_SIZE, MAX_QR_SIZE,
    MIN_QR_SIZE,
};
use crate::error::{QrBuilderError, Result};

pub mod server;

pub use server::ServerConfig;

/// Environment variable overriding `server.address`
pub const HOST_ENV: &str = "QR_BUILDER_HOST";

/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "QR_BUILDER_PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub artistic: ArtisticConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_size() -> u32 {
    DEFAULT_QR_SIZE
}

fn default_border() -> u32 {
    DEFAULT_BORDER
}

fn default_box_size() -> u32 {
    DEFAULT_BOX_SIZE
}

fn default_overlay_padding() -> u32 {
    DEFAULT_OVERLAY_PADDING
}

/// QR rendering knobs shared by every surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderConfig {
    /// Edge length used when a request does not specify one
    #[serde(default = "default_size")]
    pub default_size: u32,
    /// Quiet zone in modules
    #[serde(default = "default_border")]
    pub border: u32,
    /// Pixels per module before resampling
    #[serde(default = "default_box_size")]
    pub box_size: u32,
    /// Padding around logo/text overlays in pixels
    #[serde(default = "default_overlay_padding")]
    pub overlay_padding: u32,
    /// Recompress PNG output with oxipng
    #[serde(default)]
    pub optimize_png: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_size: default_size(),
            border: default_border(),
            box_size: default_box_size(),
            overlay_padding: default_overlay_padding(),
            optimize_png: false,
        }
    }
}

/// Artistic codec selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtisticConfig {
    /// amzqr-compatible executable; the built-in codec is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// debug, info, warning (or warn), error
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn compact(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::Compact,
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| QrBuilderError::Config(e.to_string()))?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });
        if let Some(var_name) = missing {
            return Err(QrBuilderError::Config(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            )));
        }

        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&substituted).map_err(|e| QrBuilderError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            QrBuilderError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `QR_BUILDER_HOST` / `QR_BUILDER_PORT` when set.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(HOST_ENV).ok(),
            std::env::var(PORT_ENV).ok(),
        )
    }

    fn apply_overrides(&mut self, host: Option<String>, port: Option<String>) -> Result<()> {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            self.server.address = host;
        }
        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            self.server.port = port.trim().parse().map_err(|_| {
                QrBuilderError::Config(format!("{} must be a port number, got '{}'", PORT_ENV, port))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.address.trim().is_empty() {
            return Err(QrBuilderError::Config("server.address cannot be empty".to_string()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(QrBuilderError::Config(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        if !(MIN_QR_SIZE..=MAX_QR_SIZE).contains(&(self.render.default_size as i64)) {
            return Err(QrBuilderError::Config(format!(
                "render.default_size must be between {} and {}",
                MIN_QR_SIZE, MAX_QR_SIZE
            )));
        }
        if self.render.box_size == 0 {
            return Err(QrBuilderError::Config(
                "render.box_size must be greater than 0".to_string(),
            ));
        }
        if let Some(command) = &self.artistic.command {
            if command.as_os_str().is_empty() {
                return Err(QrBuilderError::Config(
                    "artistic.command cannot be empty".to_string(),
                ));
            }
        }
        crate::logging::parse_level(&self.logging.level)
            .map_err(|e| QrBuilderError::Config(e.to_string()))?;
        Ok(())
    }
}
