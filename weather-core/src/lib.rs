//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - An HTTP transport with bounded retry on transient failures
//! - The fetch pipeline turning a location query into a [`WeatherResult`] or a
//!   classified [`FetchError`] with a message in the display locale
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod locale;
pub mod messages;
pub mod model;
pub mod transport;
pub mod weatherapi;

pub use config::Config;
pub use error::{FetchError, FetchErrorKind, TransportError};
pub use fetcher::{FetchSettings, WeatherFetcher};
pub use locale::Locale;
pub use model::{Humidity, Icon, LocationQuery, ResolvedLocation, WeatherResult};
pub use transport::{HttpTransport, RawResponse, RetryPolicy, Transport};

use std::sync::Arc;

/// Build a fetcher backed by [`HttpTransport`] from a loaded configuration.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<WeatherFetcher> {
    let settings = config.fetch_settings()?;
    let transport = HttpTransport::new(config.retry_policy())?;
    Ok(WeatherFetcher::new(Arc::new(transport), settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetcher_from_config_errors_when_missing_api_key() {
        let err = fetcher_from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn fetcher_from_config_uses_configured_settings() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_locale(Locale::En);
        cfg.fetch_icon = false;

        let fetcher = fetcher_from_config(&cfg).expect("fetcher should build");
        assert_eq!(fetcher.settings().locale, Locale::En);
        assert!(!fetcher.settings().fetch_icon);
    }
}
