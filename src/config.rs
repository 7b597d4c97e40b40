use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::sync::SyncOptions;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Sync engine settings
    pub sync: SyncConfig,
}

/// `[sync]` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Timeout applied to every remote call, in seconds
    pub command_timeout_secs: u64,
    /// Track staff lunch breaks (enables the lunch commands)
    pub lunch_tracking: bool,
    /// Clear orphaned customer assignments before deleting a staff row
    pub clear_assignments_before_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("floorsync").join("floorsync.db"),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 10,
            lunch_tracking: true,
            clear_assignments_before_delete: true,
        }
    }
}

impl SyncConfig {
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            lunch_tracking: self.lunch_tracking,
            clear_assignments_before_delete: self.clear_assignments_before_delete,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("FLOORSYNC_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(timeout) = std::env::var("FLOORSYNC_COMMAND_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.sync.command_timeout_secs = secs;
            }
        }
        if let Ok(lunch) = std::env::var("FLOORSYNC_LUNCH_TRACKING") {
            config.sync.lunch_tracking = lunch == "1" || lunch.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/floorsync/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("floorsync")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config
            .database_path
            .to_string_lossy()
            .contains("floorsync.db"));
        assert_eq!(config.sync.command_timeout_secs, 10);
        assert!(config.sync.lunch_tracking);
        assert!(config.sync.clear_assignments_before_delete);
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.sync.lunch_tracking);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/floor.db").unwrap();
        writeln!(file, "sync:").unwrap();
        writeln!(file, "  command_timeout_secs: 3").unwrap();
        writeln!(file, "  lunch_tracking: false").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/custom/path/floor.db")
        );
        assert_eq!(config.sync.command_timeout_secs, 3);
        assert!(!config.sync.lunch_tracking);
        // Unset fields keep their defaults
        assert!(config.sync.clear_assignments_before_delete);
    }

    #[test]
    fn test_sync_options_conversion() {
        let sync = SyncConfig {
            command_timeout_secs: 7,
            lunch_tracking: false,
            clear_assignments_before_delete: false,
        };
        let options = sync.options();
        assert_eq!(options.command_timeout, Duration::from_secs(7));
        assert!(!options.lunch_tracking);
        assert!(!options.clear_assignments_before_delete);
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
