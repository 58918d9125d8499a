//! Shared HTTP client policy for lookup sources.

use std::time::Duration;

use reqwest::Client;

use super::LookupError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// User-agent sent to the bibliographic APIs. Includes the contact address
/// when one is configured, as both services ask for.
#[must_use]
pub fn lookup_user_agent(mailto: Option<&str>) -> String {
    let base = format!("cvjson/{}", env!("CARGO_PKG_VERSION"));
    match mailto {
        Some(mailto) => format!("{base} (mailto:{mailto})"),
        None => base,
    }
}

/// Builds a client with the shared timeouts and gzip support.
///
/// # Errors
///
/// Returns [`LookupError::Config`] when the client cannot be constructed.
pub fn build_lookup_client(service: &'static str, mailto: Option<&str>) -> Result<Client, LookupError> {
    if let Some(mailto) = mailto
        && mailto.chars().any(|c| c == '\n' || c == '\r' || c == '\0')
    {
        return Err(LookupError::Config {
            service,
            message: "mailto contains invalid control characters".to_string(),
        });
    }

    Client::builder()
        .user_agent(lookup_user_agent(mailto))
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(READ_TIMEOUT)
        .gzip(true)
        .build()
        .map_err(|e| LookupError::Config {
            service,
            message: format!("HTTP client construction failed: {e}"),
        })
}
