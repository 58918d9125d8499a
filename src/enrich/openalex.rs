//! OpenAlex work search, used after Crossref.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::http_client::build_lookup_client;
use super::{DoiCandidate, DoiSource, LookupError};

const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

const SERVICE: &str = "openalex";

const PER_PAGE: &str = "3";

/// OpenAlex reports DOIs as resolver URLs.
const DOI_URL_PREFIX: &str = "https://doi.org/";

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAlexSearchResponse {
    #[serde(default)]
    pub results: Vec<OpenAlexWork>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAlexWork {
    pub doi: Option<String>,
    pub title: Option<String>,
    pub display_name: Option<String>,
    pub publication_year: Option<i32>,
}

impl OpenAlexWork {
    fn into_candidate(self) -> Option<DoiCandidate> {
        let doi = self.doi?;
        let doi = doi
            .strip_prefix(DOI_URL_PREFIX)
            .unwrap_or(&doi)
            .trim()
            .to_string();
        if doi.is_empty() {
            return None;
        }
        let title = self.title.or(self.display_name)?;
        let year = self
            .publication_year
            .and_then(|year| u16::try_from(year).ok());
        Some(DoiCandidate { doi, title, year })
    }
}

/// Title search against the OpenAlex works API.
pub struct OpenAlexSource {
    client: Client,
    base_url: String,
    mailto: Option<String>,
}

impl OpenAlexSource {
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
            query.append_pair("search", title);
            query.append_pair("per-page", PER_PAGE);
            if let Some(mailto) = &self.mailto {
                query.append_pair("mailto", mailto);
            }
        }
        Ok(url)
    }
}

impl std::fmt::Debug for OpenAlexSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAlexSource")
            .field("base_url", &self.base_url)
            .field("mailto", &self.mailto)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DoiSource for OpenAlexSource {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[tracing::instrument(skip(self), fields(source = SERVICE))]
    async fn search(&self, title: &str) -> Result<Vec<DoiCandidate>, LookupError> {
        let url = self.search_url(title)?;
        debug!(api_url = %url, "Calling OpenAlex API");

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

        let body: OpenAlexSearchResponse =
            response.json().await.map_err(|e| LookupError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        Ok(body
            .results
            .into_iter()
            .filter_map(OpenAlexWork::into_candidate)
            .collect())
    }
}
