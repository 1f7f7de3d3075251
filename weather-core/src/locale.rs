use std::{convert::TryFrom, fmt};

/// Display language for user-facing messages; also sent to the provider as `lang`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    Pt,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Pt => "pt",
            Locale::En => "en",
        }
    }

    pub const fn all() -> &'static [Locale] {
        &[Locale::Pt, Locale::En]
    }

    pub fn catalog(&self) -> &'static Catalog {
        match self {
            Locale::Pt => &PT,
            Locale::En => &EN,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Locale {
    type Error = anyhow::Error;

    /// Accepts bare language codes and region-qualified ones (`pt-BR`, `en_US`).
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();
        let lang = lower.split(['-', '_']).next().unwrap_or_default();

        match lang {
            "pt" => Ok(Locale::Pt),
            "en" => Ok(Locale::En),
            _ => Err(anyhow::anyhow!("Unknown locale '{value}'. Supported locales: pt, en.")),
        }
    }
}

/// Every string the core hands to the presentation layer, for one locale.
#[derive(Debug)]
pub struct Catalog {
    pub location_not_found: &'static str,
    pub invalid_credentials: &'static str,
    pub missing_credentials: &'static str,
    pub rate_limited: &'static str,
    pub invalid_request: &'static str,
    /// Used when the provider sends an error object with an empty message.
    pub empty_api_message: &'static str,
    /// Prefix for unrecognised provider text, rendered as `"{prefix}: {text}"`.
    pub fallback_prefix: &'static str,
    /// Rendered as `"{server_error}: {status}"`.
    pub server_error: &'static str,
    pub invalid_input: &'static str,
    pub timeout: &'static str,
    pub no_connection: &'static str,
    pub malformed_response: &'static str,
    pub unexpected: &'static str,
    /// Fragments suggesting a provider message is already in this locale.
    pub native_keywords: &'static [&'static str],
    pub humidity_label: &'static str,
    pub feels_like_label: &'static str,
    pub updated_label: &'static str,
    pub icon_label: &'static str,
}

static PT: Catalog = Catalog {
    location_not_found: "Cidade não encontrada.",
    invalid_credentials: "Chave de API inválida.",
    missing_credentials: "Chave de API ausente.",
    rate_limited: "Limite de requisições excedido. Tente novamente mais tarde.",
    invalid_request: "Requisição inválida.",
    empty_api_message: "Erro na API.",
    fallback_prefix: "Erro",
    server_error: "Erro no servidor",
    invalid_input: "Digite uma cidade válida (mínimo 3 caracteres).",
    timeout: "Tempo esgotado. Servidor lento ou sem resposta.",
    no_connection: "Sem conexão com a internet.",
    malformed_response: "Cidade não encontrada ou resposta inválida.",
    unexpected: "Erro inesperado. Tente novamente.",
    native_keywords: &["cidade", "chave", "limite", "requis"],
    humidity_label: "Umidade",
    feels_like_label: "Sensação térmica",
    updated_label: "Atualizado em",
    icon_label: "Ícone",
};

static EN: Catalog = Catalog {
    location_not_found: "Location not found.",
    invalid_credentials: "Invalid API key.",
    missing_credentials: "API key missing.",
    rate_limited: "Request limit exceeded. Please try again later.",
    invalid_request: "Invalid request.",
    empty_api_message: "API error.",
    fallback_prefix: "Error",
    server_error: "Server error",
    invalid_input: "Enter a valid location (at least 3 characters).",
    timeout: "Timed out. The server is slow or not responding.",
    no_connection: "No internet connection.",
    malformed_response: "Location not found or invalid response.",
    unexpected: "Unexpected error. Please try again.",
    native_keywords: &["city", "location", "limit", "request"],
    humidity_label: "Humidity",
    feels_like_label: "Feels like",
    updated_label: "Updated at",
    icon_label: "Icon",
};
