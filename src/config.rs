//! Engine Configuration
//!
//! Handles parsing and management of typed-view.toml configuration files.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Name of the configuration file searched for by [`EngineConfig::find_and_load`].
pub const CONFIG_FILE_NAME: &str = "typed-view.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

static ACTIVE: Lazy<RwLock<Arc<EngineConfig>>> =
    Lazy::new(|| RwLock::new(Arc::new(EngineConfig::default())));

/// Root configuration structure matching typed-view.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    /// Storage and allocation limits
    #[serde(default)]
    pub storage: StorageConfig,

    /// Sort engine tuning
    #[serde(default)]
    pub sort: SortConfig,

    /// Logging for the command line tool
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                return Ok(Self::default());
            }
        }
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.max_byte_length == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_byte_length must be positive".to_string(),
            ));
        }
        if self.storage.inline_byte_limit > self.storage.max_byte_length {
            return Err(ConfigError::Invalid(
                "storage.inline_byte_limit exceeds storage.max_byte_length".to_string(),
            ));
        }
        if self.sort.insertion_threshold == 0 {
            return Err(ConfigError::Invalid(
                "sort.insertion_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The configuration currently used by the engine.
    pub fn current() -> Arc<EngineConfig> {
        ACTIVE.read().clone()
    }

    /// Make this configuration the active one, returning the previous one.
    pub fn install(self) -> ConfigResult<Arc<EngineConfig>> {
        self.validate()?;
        let mut active = ACTIVE.write();
        Ok(std::mem::replace(&mut *active, Arc::new(self)))
    }
}

/// Storage and allocation limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Views of at most this many bytes start with inline storage
    #[serde(default = "default_inline_byte_limit")]
    pub inline_byte_limit: usize,

    /// Largest buffer that may be allocated
    #[serde(default = "default_max_byte_length")]
    pub max_byte_length: usize,
}

fn default_inline_byte_limit() -> usize {
    96
}

fn default_max_byte_length() -> usize {
    i32::MAX as usize
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            inline_byte_limit: default_inline_byte_limit(),
            max_byte_length: default_max_byte_length(),
        }
    }
}

/// Sort engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SortConfig {
    /// Minimum length for radix sort; shorter views use quicksort
    #[serde(default = "default_radix_threshold")]
    pub radix_threshold: usize,

    /// Runs at most this long are finished with insertion sort
    #[serde(default = "default_insertion_threshold")]
    pub insertion_threshold: usize,
}

fn default_radix_threshold() -> usize {
    128
}

fn default_insertion_threshold() -> usize {
    8
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            radix_threshold: default_radix_threshold(),
            insertion_threshold: default_insertion_threshold(),
        }
    }
}

/// Logging for the command line tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.storage.inline_byte_limit, 96);
        assert_eq!(config.storage.max_byte_length, 0x7FFF_FFFF);
        assert_eq!(config.sort.radix_threshold, 128);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[storage]
inline_byte_limit = 32

[sort]
radix_threshold = 16
"#;
        let config = EngineConfig::parse(toml_str).unwrap();
        assert_eq!(config.storage.inline_byte_limit, 32);
        assert_eq!(config.storage.max_byte_length, 0x7FFF_FFFF);
        assert_eq!(config.sort.radix_threshold, 16);
        assert_eq!(config.sort.insertion_threshold, 8);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = EngineConfig::parse("[sort]\ninsertion_threshold = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EngineConfig::parse("[storage]\nmax_byte_length = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_save_and_find() {
        let dir = std::env::temp_dir().join(format!("typed-view-config-{}", std::process::id()));
        let nested = dir.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let mut config = EngineConfig::default();
        config.sort.radix_threshold = 64;
        config.save(&dir.join(CONFIG_FILE_NAME)).unwrap();

        let found = EngineConfig::find_and_load(&nested).unwrap();
        assert_eq!(found, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/typed-view.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
