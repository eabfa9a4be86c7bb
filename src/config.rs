//! Configuration file handling for selfie-booth.
//!
//! Loads configuration from `<config dir>/selfie-booth/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::{API_URL_ENV, DEFAULT_BASE_URL};
use crate::camera::{CameraSettings, Resolution};
use crate::media::MediaStore;
use crate::preview::{CharSet, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WIDTH};

/// Written by `selfie-booth config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# selfie-booth configuration

[api]
# Backend base URL. SELFIE_BOOTH_API_URL overrides it.
base_url = "http://127.0.0.1:8001/api"
timeout_secs = 30

[camera]
device = 0
resolution = "640x480"
fps = 30
mirror = true
loop_interval_ms = 30
# Use an animated test pattern when no camera can be opened.
simulate_fallback = false

[media]
# Defaults to ~/SelfieBooth_Media
# dir = "/path/to/media"

[preview]
# standard, blocks or minimal
charset = "standard"
invert = false
jpeg_quality = 80
max_width = 640

[booth]
require_pin = false
page_size = 10
"#;

/// Configuration file structure for selfie-booth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub booth: BoothConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub device: u32,
    pub resolution: String,
    pub fps: u32,
    pub mirror: bool,
    pub loop_interval_ms: u64,
    pub simulate_fallback: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            resolution: Resolution::VGA.to_string(),
            fps: 30,
            mirror: true,
            loop_interval_ms: 30,
            simulate_fallback: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub charset: String,
    pub invert: bool,
    pub jpeg_quality: u8,
    pub max_width: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            charset: CharSet::Standard.name().to_string(),
            invert: false,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Ask for the event PIN before starting an experience.
    pub require_pin: bool,
    pub page_size: u32,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            require_pin: false,
            page_size: 10,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            config.validate()?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Check values serde can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Resolution::parse(&self.camera.resolution).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "camera.resolution",
                value: self.camera.resolution.clone(),
            });
        }
        if CharSet::from_name(&self.preview.charset).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "preview.charset",
                value: self.preview.charset.clone(),
            });
        }
        if self.booth.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "booth.page_size",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment overrides, reading variables through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            log::debug!("Using API URL from {}", API_URL_ENV);
            self.api.base_url = url;
        }
    }

    /// Camera settings described by the `[camera]` section.
    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            device_index: self.camera.device,
            resolution: Resolution::parse(&self.camera.resolution).unwrap_or_default(),
            fps: self.camera.fps,
            mirror: self.camera.mirror,
            loop_interval_ms: self.camera.loop_interval_ms,
        }
    }

    pub fn media_dir(&self) -> PathBuf {
        self.media.dir.clone().unwrap_or_else(MediaStore::default_dir)
    }

    pub fn charset(&self) -> CharSet {
        CharSet::from_name(&self.preview.charset).unwrap_or_default()
    }

    /// Render as TOML, for `config show`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }
}

/// Write the commented default config to `path`.
pub fn write_default(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let io_error = |source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(io_error)?;
    log::info!("Wrote default config to {}", path.display());
    Ok(())
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    SerializeError(toml::ser::Error),
    InvalidValue {
        key: &'static str,
        value: String,
    },
    AlreadyExists(PathBuf),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::SerializeError(source) => write!(f, "Failed to render config: {}", source),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
            ConfigError::AlreadyExists(path) => write!(
                f,
                "Config file '{}' already exists (use --force to overwrite)",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError(source) => Some(source),
            ConfigError::InvalidValue { .. } | ConfigError::AlreadyExists(_) => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("selfie-booth")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(Some(&tmp.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.booth.page_size, 10);
    }

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\ndevice = 2\n\n[booth]\nrequire_pin = true").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.camera.device, 2);
        assert!(config.camera.mirror);
        assert!(config.booth.require_pin);
        assert_eq!(config.preview.jpeg_quality, 80);
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[camera\ndevice = ").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_resolution_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\nresolution = \"huge\"").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for camera.resolution: 'huge'");
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env(|key| (key == API_URL_ENV).then(|| "http://booth.test/api".to_string()));
        assert_eq!(config.api.base_url, "http://booth.test/api");

        let mut untouched = Config::default();
        untouched.apply_env(|_| None);
        assert_eq!(untouched.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_camera_settings_from_config() {
        let mut config = Config::default();
        config.camera.resolution = "1280x720".to_string();
        config.camera.mirror = false;
        let settings = config.camera_settings();
        assert_eq!(settings.resolution, Resolution::HD);
        assert!(!settings.mirror);
        assert_eq!(settings.loop_interval_ms, 30);
    }

    #[test]
    fn test_write_default_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        write_default(&path, false).unwrap();
        assert!(matches!(
            write_default(&path, false),
            Err(ConfigError::AlreadyExists(_))
        ));
        write_default(&path, true).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.ends_with("selfie-booth/config.toml"));
    }
}
