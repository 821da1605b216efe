//! Rotating writer configuration
//!
//! A [`RotateConfig`] can be built in code or loaded from a file in any of:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// What the writer does with queued payloads when it is asked to stop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
    /// Append every payload still queued, then close the file.
    #[default]
    Drain,
    /// Close as soon as the stop request is picked up. Payloads that are
    /// still queued at that point are lost.
    Immediate,
}

/// Configuration for a rotating writer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RotateConfig {
    /// Size in bytes at which the live file is rotated
    pub max_size: u64,
    /// Maximum number of rotated files to keep (the live file is not counted)
    pub max_files: usize,
    /// Path of the live log file
    pub path: PathBuf,
    /// Number of payloads that may be queued before writers block
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Handling of queued payloads on close
    #[serde(default)]
    pub shutdown: ShutdownPolicy,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            max_files: DEFAULT_MAX_FILES,
            path: PathBuf::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown: ShutdownPolicy::default(),
        }
    }
}

impl RotateConfig {
    pub fn new(path: impl Into<PathBuf>, max_size: u64, max_files: usize) -> Self {
        Self {
            max_size,
            max_files,
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_shutdown(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown = policy;
        self
    }

    /// Check the values a writer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::config("path must not be empty"));
        }
        if self.path.file_name().is_none() {
            return Err(Error::config(format!(
                "path {} does not name a file",
                self.path.display()
            )));
        }
        if self.max_size == 0 {
            return Err(Error::config("max_size must be greater than zero"));
        }
        if self.queue_capacity == 0 {
            return Err(Error::config("queue_capacity must be greater than zero"));
        }
        Ok(())
    }

    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse and validate config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: RotateConfig = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Find and load the first known config file in a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("yaml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("YML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_config_new_uses_defaults() {
        let config = RotateConfig::new("/var/log/app.log", 100, 3);
        assert_eq!(config.max_size, 100);
        assert_eq!(config.max_files, 3);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.shutdown, ShutdownPolicy::Drain);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_toml() {
        let config_content = r#"
max_size = 1048576
max_files = 7
path = "logs/app.log"
shutdown = "immediate"
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = RotateConfig::load(file.path()).unwrap();
        assert_eq!(config.max_size, 1048576);
        assert_eq!(config.max_files, 7);
        assert_eq!(config.path, PathBuf::from("logs/app.log"));
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.shutdown, ShutdownPolicy::Immediate);
    }

    #[test]
    fn test_config_parse_yaml() {
        let config_content = r#"
max_size: 4096
max_files: 0
path: /tmp/service.log
queue_capacity: 16
"#;
        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = RotateConfig::load(file.path()).unwrap();
        assert_eq!(config.max_size, 4096);
        assert_eq!(config.max_files, 0);
        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.shutdown, ShutdownPolicy::Drain);
    }

    #[test]
    fn test_config_parse_json() {
        let config_content = r#"{"max_size": 100, "max_files": 10, "path": "log"}"#;
        let config = RotateConfig::parse(config_content, ConfigFormat::Json).unwrap();
        assert_eq!(config, RotateConfig::new("log", 100, 10));
    }

    #[test]
    fn test_config_parse_missing_field() {
        let result = RotateConfig::parse(r#"{"max_size": 100, "path": "log"}"#, ConfigFormat::Json);
        assert!(matches!(result, Err(Error::JsonError(_))));
    }

    #[test]
    fn test_config_parse_rejects_zero_size() {
        let content = "max_size = 0\nmax_files = 1\npath = \"log\"\n";
        let result = RotateConfig::parse(content, ConfigFormat::Toml);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_validate() {
        assert!(RotateConfig::new("", 100, 1).validate().is_err());
        assert!(RotateConfig::new("/", 100, 1).validate().is_err());
        assert!(RotateConfig::new("app.log", 100, 1)
            .with_queue_capacity(0)
            .validate()
            .is_err());
        assert!(RotateConfig::new("app.log", 1, 0).validate().is_ok());
    }

    #[test]
    fn test_config_not_found() {
        let result = RotateConfig::load(Path::new("/nonexistent/logrotate.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    }

    #[test]
    fn test_config_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".ini").unwrap();
        let result = RotateConfig::load(file.path());
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_find_and_load() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("logrotate.yaml"),
            "max_size: 10\nmax_files: 2\npath: out.log\n",
        )
        .unwrap();

        let (config, found) = RotateConfig::find_and_load(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("logrotate.yaml"));
        assert_eq!(config.max_files, 2);

        let empty = TempDir::new().unwrap();
        assert!(RotateConfig::find_and_load(empty.path()).is_err());
    }
}
