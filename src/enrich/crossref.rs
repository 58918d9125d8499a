//! Crossref bibliographic search.
//!
//! Queries `{base}/works?query.bibliographic=...&rows=N` and reads DOI, title
//! and issued year from `message.items`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::http_client::build_lookup_client;
use super::{DoiCandidate, DoiSource, LookupError};

/// Default Crossref API base URL.
const DEFAULT_BASE_URL: &str = "https://api.crossref.org";

const SERVICE: &str = "crossref";

/// Candidates requested per search.
const ROWS: &str = "3";

// ==================== Crossref API Response Types ====================

#[derive(Debug, Deserialize)]
pub(crate) struct CrossrefSearchResponse {
    pub message: CrossrefSearchMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CrossrefSearchMessage {
    #[serde(default)]
    pub items: Vec<CrossrefWork>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct CrossrefWork {
    /// The DOI field is uppercase in the Crossref response.
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    pub title: Option<Vec<String>>,
    pub issued: Option<CrossrefDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct CrossrefDate {
    pub date_parts: Option<Vec<Vec<Option<i32>>>>,
}

impl CrossrefWork {
    fn into_candidate(self) -> Option<DoiCandidate> {
        let doi = self.doi.filter(|doi| !doi.trim().is_empty())?;
        let title = self.title?.into_iter().next()?;
        let year = self
            .issued
            .and_then(|date| date.date_parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|first| first.into_iter().next().flatten())
            .and_then(|year| u16::try_from(year).ok());
        Some(DoiCandidate { doi, title, year })
    }
}

// ==================== CrossrefSource ====================

/// Title search against the Crossref REST API.
///
/// A configured `mailto` is sent as a query parameter to use Crossref's
/// polite pool.
pub struct CrossrefSource {
    client: Client,
    base_url: String,
    mailto: Option<String>,
}

impl CrossrefSource {
    /// Creates a source for the public Crossref API.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if HTTP client construction fails.
    pub fn new(mailto: Option<String>) -> Result<Self, LookupError> {
        Self::with_base_url(mailto, DEFAULT_BASE_URL)
    }

    /// Creates a source with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if HTTP client construction fails.
    pub fn with_base_url(
        mailto: Option<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LookupError> {
        let client = build_lookup_client(SERVICE, mailto.as_deref())?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            mailto,
        })
    }

    fn search_url(&self, title: &str) -> Result<Url, LookupError> {
        let mut url = Url::parse(&format!("{}/works", self.base_url.trim_end_matches('/')))
            .map_err(|e| LookupError::Config {
                service: SERVICE,
                message: format!("invalid base URL: {e}"),
            })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("query.bibliographic", title);
            query.append_pair("rows", ROWS);
            if let Some(mailto) = &self.mailto {
                query.append_pair("mailto", mailto);
            }
        }
        Ok(url)
    }
}

impl std::fmt::Debug for CrossrefSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossrefSource")
            .field("base_url", &self.base_url)
            .field("mailto", &self.mailto)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DoiSource for CrossrefSource {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[tracing::instrument(skip(self), fields(source = SERVICE))]
    async fn search(&self, title: &str) -> Result<Vec<DoiCandidate>, LookupError> {
        let url = self.search_url(title)?;
        debug!(api_url = %url, "Calling Crossref API");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| LookupError::Network {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::http_status(SERVICE, status.as_u16()));
        }

        let body: CrossrefSearchResponse =
            response.json().await.map_err(|e| LookupError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let candidates: Vec<DoiCandidate> = body
            .message
            .items
            .into_iter()
            .filter_map(CrossrefWork::into_candidate)
            .collect();
        debug!(count = candidates.len(), "Crossref candidates");
        Ok(candidates)
    }
}
