use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::locale::Locale;

/// Failure raised by a [`crate::transport::Transport`] once its retries are spent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Timeouts and connection failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FetchErrorKind {
    InvalidInput,
    Timeout,
    NoConnection,
    /// The provider reported a semantic problem; the message is translated.
    ApiError,
    /// HTTP failure with no usable message in the body.
    ServerError,
    /// 2xx body that is not JSON or lacks required fields.
    MalformedResponse,
    UnexpectedError,
}

/// Classified failure of one fetch, with a message in the display locale.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn invalid_input(locale: Locale) -> Self {
        Self::new(FetchErrorKind::InvalidInput, locale.catalog().invalid_input)
    }

    pub fn malformed(locale: Locale) -> Self {
        Self::new(FetchErrorKind::MalformedResponse, locale.catalog().malformed_response)
    }

    pub fn server_error(status: u16, locale: Locale) -> Self {
        let message = format!("{}: {status}", locale.catalog().server_error);
        Self::new(FetchErrorKind::ServerError, message)
    }

    pub fn from_transport(err: &TransportError, locale: Locale) -> Self {
        let catalog = locale.catalog();
        match err {
            TransportError::Timeout(_) => Self::new(FetchErrorKind::Timeout, catalog.timeout),
            TransportError::Connection(_) => {
                Self::new(FetchErrorKind::NoConnection, catalog.no_connection)
            }
            TransportError::Other(_) => {
                Self::new(FetchErrorKind::UnexpectedError, catalog.unexpected)
            }
        }
    }
}
