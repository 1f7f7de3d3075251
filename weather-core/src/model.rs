use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Minimum trimmed length, in characters, of a location query.
pub const MIN_QUERY_CHARS: usize = 3;

/// Free-text place name, optionally with a comma-separated region.
///
/// Only the length is checked; the provider decides whether it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery(String);

impl LocationQuery {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (trimmed.chars().count() >= MIN_QUERY_CHARS).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Humidity {
    Percent(u8),
    Unknown,
}

impl fmt::Display for Humidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Humidity::Percent(p) => write!(f, "{p}%"),
            Humidity::Unknown => f.write_str("--%"),
        }
    }
}

/// Conditions glyph, downloaded best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub url: String,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Place as resolved by the provider. Missing parts are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coord = |c: Option<f64>| c.map(|v| v.to_string()).unwrap_or_default();
        write!(
            f,
            "{}, {}, {} (Lat: {}, Lon: {})",
            self.name,
            self.region,
            self.country,
            coord(self.lat),
            coord(self.lon)
        )
    }
}

/// Normalized current conditions for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResult {
    /// Whole degrees Celsius, truncated toward zero.
    pub temperature_c: i32,
    pub condition: String,
    pub humidity: Humidity,
    pub feels_like_c: Option<i32>,
    pub icon: Option<Icon>,
    pub observed_at: Option<DateTime<Utc>>,
    pub location: ResolvedLocation,
}
