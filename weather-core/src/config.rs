use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{fetcher::FetchSettings, locale::Locale, transport::RetryPolicy, weatherapi};

pub const API_KEY_ENV: &str = "WEATHER_API_KEY";
pub const LANG_ENV: &str = "WEATHER_LANG";

/// Retry settings as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_factor_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, backoff_factor_ms: 500, max_backoff_ms: 10_000 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// lang = "pt"
///
/// [retry]
/// max_attempts = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WeatherAPI.com key. `WEATHER_API_KEY` takes precedence.
    pub api_key: Option<String>,
    /// Display locale code, e.g. "pt" or "en". `WEATHER_LANG` takes precedence.
    pub lang: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub icon_timeout_secs: u64,
    pub fetch_icon: bool,
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            lang: Locale::default().as_str().to_string(),
            base_url: weatherapi::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
            icon_timeout_secs: 5,
            fetch_icon: true,
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

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
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay `WEATHER_API_KEY` / `WEATHER_LANG` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(lang) = lookup(LANG_ENV).filter(|l| !l.trim().is_empty()) {
            self.lang = lang;
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.lang = locale.as_str().to_string();
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weather configure` or set {API_KEY_ENV}."
            )
        })
    }

    pub fn locale(&self) -> Result<Locale> {
        Locale::try_from(self.lang.as_str())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            backoff_factor: Duration::from_millis(self.retry.backoff_factor_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            ..RetryPolicy::default()
        }
    }

    /// Everything the fetcher needs; fails when the key or locale is unusable.
    pub fn fetch_settings(&self) -> Result<FetchSettings> {
        Ok(FetchSettings {
            api_key: self.api_key()?.to_string(),
            locale: self.locale()?,
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            icon_timeout: Duration::from_secs(self.icon_timeout_secs),
            fetch_icon: self.fetch_icon,
        })
    }
}
