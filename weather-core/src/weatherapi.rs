//! Wire format of the WeatherAPI.com `current.json` endpoint.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

pub fn current_url(base_url: &str) -> String {
    format!("{}/current.json", base_url.trim_end_matches('/'))
}

/// Icons come back protocol-relative (`//cdn.weatherapi.com/...`).
pub fn resolve_icon_url(icon: &str) -> Option<String> {
    let icon = icon.trim();
    if let Some(rest) = icon.strip_prefix("//") {
        (!rest.is_empty()).then(|| format!("https://{rest}"))
    } else if icon.starts_with("https://") || icon.starts_with("http://") {
        Some(icon.to_string())
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
pub struct WaResponse {
    pub current: WaCurrent,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<WaLocation>,
}

#[derive(Debug, Deserialize)]
pub struct WaCurrent {
    pub temp_c: f64,
    pub condition: WaCondition,
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub feelslike_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WaCondition {
    pub text: String,
    #[serde(default, deserialize_with = "lenient")]
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WaLocation {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub lon: Option<f64>,
}

/// Optional field: a value of the wrong type counts as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// JSON truthiness: null, false, 0, and empty strings/arrays/objects are "not set".
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn error_message(error: &Value) -> Option<&str> {
    match error {
        Value::String(s) => Some(s.as_str()),
        other => other.get("message").and_then(Value::as_str),
    }
}

/// Error object embedded in a 2xx body.
///
/// `None` when the body carries no error. `Some(None)` when it does but
/// without a usable message.
pub fn embedded_error(body: &Value) -> Option<Option<&str>> {
    body.get("error").filter(|e| is_set(e)).map(error_message)
}

/// Message carried by a non-2xx body: `error.message`, else top-level
/// `message`. Empty strings count as absent.
pub fn http_error_message(body: &Value) -> Option<&str> {
    let msg = match body.get("error").filter(|e| is_set(e)) {
        Some(error) => error_message(error),
        None => body.get("message").and_then(Value::as_str),
    };
    msg.filter(|m| !m.is_empty())
}
