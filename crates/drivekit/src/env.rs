use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use drivekit_files::{DEFAULT_API_BASE, DEFAULT_UPLOAD_CHUNK_SIZE, DriveConfig};
use drivekit_upload::{DEFAULT_BASE_URL, RetryPolicy};
use home::home_dir;
use serde::Deserialize;

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api_base: String,
    pub upload_base: String,
    pub chunk_size: u64,
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_BASE_URL.to_string(),
            chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub base_interval_ms: u64,
    pub max_interval_ms: u64,
    pub max_attempts: Option<u32>,
    pub deadline_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            base_interval_ms: policy.base_interval.as_millis() as u64,
            max_interval_ms: policy.max_interval.as_millis() as u64,
            max_attempts: None,
            deadline_secs: None,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .base_interval(Duration::from_millis(self.base_interval_ms))
            .max_interval(Duration::from_millis(self.max_interval_ms))
            .max_attempts(self.max_attempts)
            .deadline(self.deadline_secs.map(Duration::from_secs))
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Invalid drivekit configuration")?;
        anyhow::ensure!(
            config.chunk_size > 0,
            "chunk_size must be positive; each chunk is read into memory"
        );
        Ok(config)
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).with_context(|| format!("In {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    pub fn drive_config(&self) -> DriveConfig {
        DriveConfig::default()
            .api_base(self.api_base.clone())
            .upload_base(self.upload_base.clone())
            .chunk_size(self.chunk_size)
            .retry(self.retry.policy())
    }
}

#[derive(Debug, Clone)]
pub struct DrivekitEnv {
    config_path: PathBuf,
    config: Config,
}

impl DrivekitEnv {
    /// Locate and load the configuration: `$DRIVEKIT_CONFIG`, else
    /// `~/.drivekit/config.toml`.
    pub fn new() -> Result<Self> {
        let config_path = match env::var_os("DRIVEKIT_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => home_dir()
                .context("Failed to get home directory")?
                .join(".drivekit")
                .join("config.toml"),
        };
        let config = Config::load(&config_path)?;
        tracing::debug!(path = %config_path.display(), "configuration loaded");

        Ok(Self {
            config_path,
            config,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_overrides_given_keys() {
        let config = Config::parse(
            r#"
            chunk_size = 8388608

            [retry]
            max_attempts = 5
            deadline_secs = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.chunk_size, 8_388_608);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        let policy = config.retry.policy();
        assert_eq!(policy.base_interval, Duration::from_millis(1000));
        assert_eq!(policy.max_attempts, Some(5));
        assert_eq!(policy.deadline, Some(Duration::from_secs(600)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("chunk = 1").is_err());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(Config::parse("chunk_size = 0").is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn drive_config_carries_settings() {
        let config = Config::parse("upload_base = \"https://upload.test/\"").unwrap();
        let drive = config.drive_config();
        assert_eq!(drive.upload_base, "https://upload.test/");
        assert_eq!(drive.chunk_size, DEFAULT_UPLOAD_CHUNK_SIZE);
    }
}
