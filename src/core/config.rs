//! Configuration for the phone backup tool
//!
//! Settings live in a TOML file. The search order is the current directory
//! (`./phone_backup.toml`, `./config.toml` — useful for overrides) and then
//! the standard per-user config directory. A missing file means defaults,
//! and a default config has no backup folder, which triggers the first-run
//! prompt.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application name used for the config directory
const APP_NAME: &str = "phone_backup_tool";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the standard configuration directory for the application
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Get the standard configuration file path
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Create the config file in the standard location if it doesn't exist
///
/// Returns the path to the config file.
pub fn init_config() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    let config_path = config_dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        fs::write(&config_path, Config::generate_default_config())
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backup destination settings
    pub backup: BackupConfig,

    /// Device and transport settings
    pub device: DeviceConfig,

    /// Hash ledger settings
    pub ledger: LedgerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Backup destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Backup folder; empty until first-run setup
    pub folder: PathBuf,

    /// Delete files from the device after their copies are verified
    pub delete_after: bool,
}

/// Device transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Path to the adb executable ("adb" resolves via PATH)
    pub adb_path: PathBuf,

    /// Device-side directory to back up
    pub dcim_path: String,
}

/// Hash ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Ledger file name, stored inside the backup folder
    pub filename: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::new(),
            delete_after: false,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: PathBuf::from("adb"),
            dcim_path: "/sdcard/DCIM/Camera".to_string(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            filename: ".backup_ledger.txt".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

        Ok(config)
    }

    /// Load configuration from the default locations
    ///
    /// Search order: `./phone_backup.toml`, `./config.toml`, then the
    /// standard config location. No file found means defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let local_paths = [
            PathBuf::from("./phone_backup.toml"),
            PathBuf::from("./config.toml"),
        ];

        for path in &local_paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        if let Some(config_path) = get_config_path() {
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(parent.to_path_buf(), e.to_string()))?;
        }

        fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::WriteError(path.as_ref().to_path_buf(), e.to_string()))?;

        Ok(())
    }

    /// Save to the standard config location
    pub fn save_default(&self) -> Result<PathBuf, ConfigError> {
        let path = get_config_path().ok_or(ConfigError::ConfigDirNotFound)?;
        self.save(&path)?;
        Ok(path)
    }

    /// Whether first-run setup is still required
    pub fn needs_setup(&self) -> bool {
        self.backup.folder.as_os_str().is_empty()
    }

    /// Set the backup folder
    pub fn set_backup_folder(&mut self, folder: PathBuf) {
        self.backup.folder = folder;
    }

    /// Path of the ledger file inside the backup folder
    pub fn ledger_path(&self) -> PathBuf {
        self.backup.folder.join(&self.ledger.filename)
    }

    /// Generate a default config file with comments
    pub fn generate_default_config() -> String {
        include_str!("../../config.example.toml").to_string()
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file '{0}': {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file '{0}': {1}")]
    ParseError(PathBuf, String),

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(String),

    #[error("Failed to write config file '{0}': {1}")]
    WriteError(PathBuf, String),

    #[error("Could not determine configuration directory")]
    ConfigDirNotFound,
}
