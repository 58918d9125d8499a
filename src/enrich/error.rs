//! Error types for bibliographic lookups.

use thiserror::Error;

/// Errors from a single lookup request against a [`super::DoiSource`].
#[derive(Debug, Error)]
pub enum LookupError {
    /// DNS, connection, TLS or timeout failure.
    #[error("{service} request failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("{service} returned HTTP {status}: {reason}")]
    HttpStatus {
        service: &'static str,
        status: u16,
        reason: String,
    },

    /// Response body did not match the expected JSON shape.
    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// The HTTP client or request URL could not be built.
    #[error("{service} lookup is misconfigured: {message}")]
    Config {
        service: &'static str,
        message: String,
    },
}

impl LookupError {
    /// Builds an `HttpStatus` error with a human-readable reason.
    #[must_use]
    pub fn http_status(service: &'static str, status: u16) -> Self {
        let reason = match status {
            404 => "not found".to_string(),
            429 => "rate limit exceeded".to_string(),
            s if s >= 500 => "service unavailable".to_string(),
            s => format!("unexpected status {s}"),
        };
        Self::HttpStatus {
            service,
            status,
            reason,
        }
    }

    /// Returns true when the same request may succeed later.
    ///
    /// Network failures, 429 and 5xx are transient; everything else is not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. } | Self::Config { .. } => false,
        }
    }

    /// Name of the service that produced the error.
    #[must_use]
    pub fn service(&self) -> &'static str {
        match self {
            Self::Network { service, .. }
            | Self::HttpStatus { service, .. }
            | Self::Decode { service, .. }
            | Self::Config { service, .. } => service,
        }
    }
}
