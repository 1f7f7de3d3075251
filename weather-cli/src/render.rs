use std::fmt::{Display, Write as _};

use chrono::TimeZone;
use weather_core::{Locale, WeatherResult};

/// Human-readable block for a successful fetch, one fact per line.
pub fn render_result<Tz>(result: &WeatherResult, locale: Locale, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let catalog = locale.catalog();
    let mut out = String::new();

    let _ = writeln!(out, "{}°C", result.temperature_c);
    let _ = writeln!(out, "{}", result.condition);
    let _ = writeln!(out, "{}: {}", catalog.humidity_label, result.humidity);

    if let Some(feels_like) = result.feels_like_c {
        let _ = writeln!(out, "{}: {feels_like}°C", catalog.feels_like_label);
    }

    let _ = writeln!(out, "{}", result.location);

    if let Some(observed) = result.observed_at {
        let local = observed.with_timezone(tz);
        let _ = writeln!(out, "{}: {}", catalog.updated_label, local.format("%Y-%m-%d %H:%M"));
    }

    if let Some(icon) = &result.icon {
        let kind = icon.content_type.as_deref().unwrap_or("image");
        let size = icon.bytes.len();
        let _ = writeln!(out, "{}: {} ({kind}, {size} bytes)", catalog.icon_label, icon.url);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use weather_core::{Humidity, Icon, ResolvedLocation};

    fn sample() -> WeatherResult {
        WeatherResult {
            temperature_c: 25,
            condition: "Sol".into(),
            humidity: Humidity::Percent(60),
            feels_like_c: None,
            icon: None,
            observed_at: None,
            location: ResolvedLocation {
                name: "São Mateus".into(),
                region: "Espírito Santo".into(),
                country: "Brazil".into(),
                lat: Some(-18.7),
                lon: Some(-39.8),
            },
        }
    }

    #[test]
    fn renders_portuguese_block() {
        let out = render_result(&sample(), Locale::Pt, &Utc);
        assert_eq!(
            out,
            "25°C\nSol\nUmidade: 60%\nSão Mateus, Espírito Santo, Brazil (Lat: -18.7, Lon: -39.8)\n"
        );
    }

    #[test]
    fn renders_unknown_humidity_placeholder() {
        let result = WeatherResult { humidity: Humidity::Unknown, ..sample() };
        let out = render_result(&result, Locale::En, &Utc);
        assert!(out.contains("Humidity: --%"));
    }

    #[test]
    fn renders_optional_lines() {
        let result = WeatherResult {
            feels_like_c: Some(27),
            observed_at: DateTime::from_timestamp(1_700_000_000, 0),
            icon: Some(Icon {
                url: "https://x/y.png".into(),
                content_type: Some("image/png".into()),
                bytes: vec![0; 16],
            }),
            ..sample()
        };
        let out = render_result(&result, Locale::Pt, &Utc);
        assert!(out.contains("Sensação térmica: 27°C"));
        assert!(out.contains("Atualizado em: 2023-11-14 22:13"));
        assert!(out.contains("Ícone: https://x/y.png (image/png, 16 bytes)"));
    }
}
