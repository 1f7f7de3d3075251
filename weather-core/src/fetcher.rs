//! Fetch-and-normalize pipeline for current conditions.
//!
//! One call in, one [`WeatherResult`] or [`FetchError`] out. Transport
//! failures, HTTP errors, error objects embedded in 2xx bodies and malformed
//! payloads are all classified here and returned as values.

use std::{sync::Arc, time::Duration};

use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::{FetchError, FetchErrorKind},
    locale::Locale,
    messages::{capitalize_first, translate},
    model::{Humidity, Icon, LocationQuery, ResolvedLocation, WeatherResult},
    transport::{RawResponse, Transport},
    weatherapi::{self, WaResponse},
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ICON_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub api_key: String,
    pub locale: Locale,
    pub base_url: String,
    pub request_timeout: Duration,
    pub icon_timeout: Duration,
    pub fetch_icon: bool,
}

impl FetchSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            locale: Locale::default(),
            base_url: weatherapi::DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            icon_timeout: DEFAULT_ICON_TIMEOUT,
            fetch_icon: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    transport: Arc<dyn Transport>,
    settings: FetchSettings,
}

impl WeatherFetcher {
    pub fn new(transport: Arc<dyn Transport>, settings: FetchSettings) -> Self {
        Self { transport, settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub async fn fetch_weather(&self, raw_location: &str) -> Result<WeatherResult, FetchError> {
        let locale = self.settings.locale;

        let Some(query) = LocationQuery::parse(raw_location) else {
            debug!(input = raw_location, "rejecting short location query");
            return Err(FetchError::invalid_input(locale));
        };

        info!(query = query.as_str(), lang = %locale, "fetching current weather");

        let url = weatherapi::current_url(&self.settings.base_url);
        let params = [
            ("key", self.settings.api_key.as_str()),
            ("q", query.as_str()),
            ("lang", locale.as_str()),
        ];

        let resp = self
            .transport
            .send(&url, &params, self.settings.request_timeout)
            .await
            .map_err(|err| {
                warn!(error = %err, "weather request failed");
                FetchError::from_transport(&err, locale)
            })?;

        if resp.status >= 400 {
            let err = self.http_error(&resp);
            warn!(status = resp.status, kind = ?err.kind, "provider returned an error status");
            return Err(err);
        }

        let (mut result, icon_url) = self.normalize(&resp)?;

        if let Some(url) = icon_url.filter(|_| self.settings.fetch_icon) {
            result.icon = self.fetch_icon(&url).await;
        }

        Ok(result)
    }

    fn http_error(&self, resp: &RawResponse) -> FetchError {
        let locale = self.settings.locale;
        let body: Option<Value> = serde_json::from_slice(&resp.body).ok();

        match body.as_ref().and_then(weatherapi::http_error_message) {
            Some(msg) => FetchError::new(FetchErrorKind::ApiError, translate(msg, locale)),
            None => FetchError::server_error(resp.status, locale),
        }
    }

    /// Parse a 2xx body into a result plus the icon URL, if any.
    fn normalize(&self, resp: &RawResponse) -> Result<(WeatherResult, Option<String>), FetchError> {
        let locale = self.settings.locale;

        let body: Value = serde_json::from_slice(&resp.body).map_err(|err| {
            warn!(error = %err, "response body is not JSON");
            FetchError::malformed(locale)
        })?;

        // Checked before required fields: an error body has no `current`.
        if let Some(msg) = weatherapi::embedded_error(&body) {
            let message = match msg {
                Some(msg) => translate(msg, locale),
                None => locale.catalog().location_not_found.to_string(),
            };
            warn!(message = %message, "provider reported an error in a success response");
            return Err(FetchError::new(FetchErrorKind::ApiError, message));
        }

        let parsed: WaResponse = serde_json::from_value(body).map_err(|err| {
            warn!(error = %err, "response is missing required fields");
            FetchError::malformed(locale)
        })?;

        let current = parsed.current;
        let loc = parsed.location.unwrap_or_default();

        let humidity = match current.humidity {
            Some(h) => Humidity::Percent(h.trunc().clamp(0.0, 100.0) as u8),
            None => Humidity::Unknown,
        };

        let icon_url = current.condition.icon.as_deref().and_then(weatherapi::resolve_icon_url);

        let result = WeatherResult {
            temperature_c: current.temp_c.trunc() as i32,
            condition: capitalize_first(&current.condition.text),
            humidity,
            feels_like_c: current.feelslike_c.map(|t| t.trunc() as i32),
            icon: None,
            observed_at: current.last_updated_epoch.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            location: ResolvedLocation {
                name: loc.name.unwrap_or_default(),
                region: loc.region.unwrap_or_default(),
                country: loc.country.unwrap_or_default(),
                lat: loc.lat,
                lon: loc.lon,
            },
        };

        Ok((result, icon_url))
    }

    /// Best-effort: every failure is logged and yields `None`.
    async fn fetch_icon(&self, url: &str) -> Option<Icon> {
        let resp = match self.transport.send(url, &[], self.settings.icon_timeout).await {
            Ok(resp) if resp.is_success() => resp,
            Ok(resp) => {
                debug!(url, status = resp.status, "icon request failed");
                return None;
            }
            Err(err) => {
                debug!(url, error = %err, "icon request failed");
                return None;
            }
        };

        let Some(sniffed) = sniff_raster(&resp.body) else {
            debug!(url, bytes = resp.body.len(), "icon is not a raster image");
            return None;
        };

        let content_type = resp
            .content_type()
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or(sniffed)
            .to_string();

        Some(Icon { url: url.to_string(), content_type: Some(content_type), bytes: resp.body })
    }
}

/// MIME type of a PNG, JPEG, GIF, WebP or BMP payload, judged by its signature.
fn sniff_raster(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") && bytes.len() > 14 {
        Some("image/bmp")
    } else {
        None
    }
}
