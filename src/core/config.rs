//! Configuration management for Spark2Scale.
//!
//! Handles loading configuration from TOML files and environment overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::workflow::StageName;

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "SPARK2SCALE_API_URL";

/// Environment variable overriding `api.token`.
pub const ENV_API_TOKEN: &str = "SPARK2SCALE_API_TOKEN";

/// Environment variable overriding `api.timeout_secs`.
pub const ENV_TIMEOUT_SECS: &str = "SPARK2SCALE_TIMEOUT_SECS";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API settings
    pub api: ApiConfig,

    /// Workflow settings
    pub workflow: WorkflowConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Spark2Scale backend
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Workflow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Stage used when a command does not name one
    pub default_stage: StageName,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.spark2scale.toml` in current directory
    /// 2. `~/.config/spark2scale/config.toml`
    /// 3. Falls back to defaults
    ///
    /// Environment overrides are applied on top.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, then apply environment overrides.
    pub fn load_with_override(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env()?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Check values that would make every request fail.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be at least 1 second");
        }
        Ok(())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// The config file [`Config::load`] would read, if any.
    pub fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(".spark2scale.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let global_config = Self::config_dir()?.join("config.toml");
        global_config.exists().then_some(global_config)
    }

    /// Apply `SPARK2SCALE_*` environment overrides.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            self.api.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a number of seconds"))?;
            self.validate().with_context(|| format!("Invalid {ENV_TIMEOUT_SECS}"))?;
        }
        Ok(())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("spark2scale"))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8000/api".to_string(), timeout_secs: 10, token: None }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { default_stage: StageName::Evaluation }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: "text".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.timeout_secs, 10);
        assert!(config.api.token.is_none());
        assert_eq!(config.workflow.default_stage, StageName::Evaluation);
        assert_eq!(config.output.format, "text");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[workflow]"));
        assert!(toml_str.contains("default_stage = \"evaluation\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [api]
            base_url = "https://backend.spark2scale.test/api"
            timeout_secs = 3

            [workflow]
            default_stage = "market_research"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://backend.spark2scale.test/api");
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.workflow.default_stage, StageName::MarketResearch);
        assert_eq!(config.output.format, "text");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntoken = \"secret\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbroken").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var(ENV_API_URL, "http://override:9000");
        std::env::set_var(ENV_API_TOKEN, "tok");
        std::env::set_var(ENV_TIMEOUT_SECS, "25");

        let mut config = Config::default();
        let result = config.apply_env();

        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_API_TOKEN);
        std::env::remove_var(ENV_TIMEOUT_SECS);

        result.unwrap();
        assert_eq!(config.api.base_url, "http://override:9000");
        assert_eq!(config.api.token.as_deref(), Some("tok"));
        assert_eq!(config.api.timeout_secs, 25);
    }

    #[test]
    #[serial]
    fn test_zero_timeout_env_rejected() {
        std::env::set_var(ENV_TIMEOUT_SECS, "0");
        let result = Config::default().apply_env();
        std::env::remove_var(ENV_TIMEOUT_SECS);

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("timeout_secs must be at least 1"));
    }

    #[test]
    #[serial]
    fn test_zero_timeout_file_rejected() {
        std::env::remove_var(ENV_TIMEOUT_SECS);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 0\n").unwrap();

        let err = Config::load_with_override(&path).unwrap_err();
        assert!(format!("{err:#}").contains("timeout_secs must be at least 1"));
    }

    #[test]
    #[serial]
    fn test_bad_timeout_env_rejected() {
        std::env::set_var(ENV_TIMEOUT_SECS, "soon");
        let result = Config::default().apply_env();
        std::env::remove_var(ENV_TIMEOUT_SECS);

        assert!(result.is_err());
    }
}
