//! Translation of raw provider error text into display-locale messages.
//!
//! Classification is an ordered rule table over the lower-cased text; the
//! first matching rule wins. Unrecognised text is never discarded: it is
//! either passed through (when it already looks like the target locale) or
//! wrapped verbatim in a generic prefix.

use crate::locale::Locale;

/// Outcome of classifying one provider message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    LocationNotFound,
    InvalidCredentials,
    MissingCredentials,
    RateLimited,
    InvalidRequest,
    /// Message was the empty string.
    Empty,
    /// Already in the display locale; shown capitalized.
    PassThrough,
    /// Unknown text, wrapped in the locale's generic prefix.
    Fallback,
}

struct Rule {
    matches: fn(&str) -> bool,
    translation: Translation,
}

const RULES: &[Rule] = &[
    Rule { matches: is_location_not_found, translation: Translation::LocationNotFound },
    Rule { matches: is_invalid_credentials, translation: Translation::InvalidCredentials },
    Rule { matches: is_missing_credentials, translation: Translation::MissingCredentials },
    Rule { matches: is_rate_limited, translation: Translation::RateLimited },
    Rule { matches: is_invalid_request, translation: Translation::InvalidRequest },
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn is_location_not_found(m: &str) -> bool {
    contains_any(m, &["no matching location", "location not found"])
}

fn is_invalid_credentials(m: &str) -> bool {
    m.contains("invalid api key") || (m.contains("api key") && m.contains("invalid"))
}

fn is_missing_credentials(m: &str) -> bool {
    m.contains("no api key") || (m.contains("key") && m.contains("missing"))
}

fn is_rate_limited(m: &str) -> bool {
    contains_any(m, &["quota", "rate limit", "exceed"])
}

fn is_invalid_request(m: &str) -> bool {
    contains_any(m, &["invalid request", "bad request"])
}

/// Classify a raw provider message for the given display locale.
pub fn classify(raw: &str, locale: Locale) -> Translation {
    if raw.is_empty() {
        return Translation::Empty;
    }

    let m = raw.trim().to_lowercase();

    if let Some(rule) = RULES.iter().find(|rule| (rule.matches)(&m)) {
        return rule.translation;
    }

    if contains_any(&m, locale.catalog().native_keywords) {
        Translation::PassThrough
    } else {
        Translation::Fallback
    }
}

/// Translate a raw provider message into a user-facing message.
pub fn translate(raw: &str, locale: Locale) -> String {
    let catalog = locale.catalog();

    match classify(raw, locale) {
        Translation::LocationNotFound => catalog.location_not_found.to_string(),
        Translation::InvalidCredentials => catalog.invalid_credentials.to_string(),
        Translation::MissingCredentials => catalog.missing_credentials.to_string(),
        Translation::RateLimited => catalog.rate_limited.to_string(),
        Translation::InvalidRequest => catalog.invalid_request.to_string(),
        Translation::Empty => catalog.empty_api_message.to_string(),
        Translation::PassThrough => capitalize_first(raw.trim()),
        Translation::Fallback => format!("{}: {}", catalog.fallback_prefix, raw),
    }
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
