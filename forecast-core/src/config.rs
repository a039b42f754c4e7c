use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::RetryPolicy;

/// Forecast provider endpoint and credentials. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Forecast endpoint, e.g. `https://api.openweathermap.org/data/2.5/forecast`.
    pub base_url: String,
    pub api_key: String,
    /// Number of samples requested from the provider (`cnt`).
    pub count: u32,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("Provider base_url must not be empty");
        }
        Url::parse(&self.base_url)
            .with_context(|| format!("Provider base_url is not a valid URL: {}", self.base_url))?;
        if self.api_key.trim().is_empty() {
            bail!("Provider api_key must not be empty");
        }
        if self.count == 0 {
            bail!("Provider count must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, backoff_ms: 2000 }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_ms))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [provider]
/// base_url = "https://api.openweathermap.org/data/2.5/forecast"
/// api_key = "..."
/// count = 40
///
/// [retry]
/// max_attempts = 3
/// backoff_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub provider: Option<ProviderConfig>,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Provider settings, validated.
    pub fn provider_config(&self) -> Result<&ProviderConfig> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            anyhow!(
                "No forecast provider configured.\n\
                 Hint: run `forecast configure` and enter the endpoint, API key and sample count."
            )
        })?;

        provider.validate()?;
        Ok(provider)
    }

    pub fn set_provider(&mut self, provider: ProviderConfig) {
        self.provider = Some(provider);
    }

    pub fn is_configured(&self) -> bool {
        self.provider_config().is_ok()
    }

    /// Load config from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "city-forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ProviderConfig {
        ProviderConfig {
            base_url: "https://api.openweathermap.org/data/2.5/forecast".into(),
            api_key: "KEY".into(),
            count: 40,
        }
    }

    #[test]
    fn provider_config_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.provider_config().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No forecast provider configured"));
        assert!(msg.contains("Hint: run `forecast configure`"));
        assert!(!cfg.is_configured());
    }

    #[test]
    fn provider_config_rejects_blank_fields() {
        let mut cfg = Config::default();

        cfg.set_provider(ProviderConfig { api_key: " ".into(), ..provider() });
        assert!(cfg.provider_config().unwrap_err().to_string().contains("api_key"));

        cfg.set_provider(ProviderConfig { base_url: String::new(), ..provider() });
        assert!(cfg.provider_config().unwrap_err().to_string().contains("base_url"));

        cfg.set_provider(ProviderConfig { base_url: "not a url".into(), ..provider() });
        assert!(cfg.provider_config().unwrap_err().to_string().contains("base_url"));

        cfg.set_provider(ProviderConfig { count: 0, ..provider() });
        assert!(cfg.provider_config().unwrap_err().to_string().contains("count"));
    }

    #[test]
    fn retry_defaults_to_three_attempts_two_seconds_apart() {
        let policy = Config::default().retry.policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[test]
    fn missing_file_loads_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_provider(provider());
        cfg.retry = RetryConfig { max_attempts: 5, backoff_ms: 10 };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(loaded.is_configured());
    }

    #[test]
    fn retry_section_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[provider]\nbase_url = \"http://localhost/forecast\"\napi_key = \"k\"\ncount = 8\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.retry, RetryConfig::default());
        assert_eq!(cfg.provider_config().unwrap().count, 8);
    }

    #[test]
    fn provider_fields_have_no_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[provider]\nbase_url = \"http://localhost/forecast\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
