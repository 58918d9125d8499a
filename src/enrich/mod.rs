//! DOI enrichment: fills in missing DOIs by title search.
//!
//! Sources are tried in order (Crossref, then OpenAlex). Each request is
//! retried on transient failures with a linear backoff and followed by a fixed
//! delay to stay inside the services' rate limits. A candidate is accepted
//! only when its title is similar enough to the entry's and the years agree.

mod crossref;
mod error;
mod http_client;
mod openalex;
mod retry;

pub use crossref::CrossrefSource;
pub use error::LookupError;
pub use http_client::{build_lookup_client, lookup_user_agent};
pub use openalex::OpenAlexSource;
pub use retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, RetryDecision, RetryPolicy};

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::record::Entry;

/// Default minimum title similarity for accepting a DOI.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.85;

/// Default pause after every request.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1000);

/// Years further apart than this are treated as a different work.
const MAX_YEAR_DRIFT: u16 = 1;

/// One search hit from a [`DoiSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoiCandidate {
    pub doi: String,
    pub title: String,
    pub year: Option<u16>,
}

/// An accepted DOI with its title similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct DoiMatch {
    pub doi: String,
    pub title: String,
    /// Normalized Levenshtein similarity between the titles, `0.0..=1.0`.
    pub confidence: f64,
    pub source: &'static str,
}

/// A bibliographic search service.
#[async_trait]
pub trait DoiSource: Send + Sync {
    /// Short lowercase name used in logs.
    fn name(&self) -> &'static str;

    /// Searches by title and returns candidates in the service's rank order.
    async fn search(&self, title: &str) -> Result<Vec<DoiCandidate>, LookupError>;
}

/// Lookup settings, passed explicitly by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichOptions {
    /// Contact address for the services' polite pools.
    pub mailto: Option<String>,
    pub request_delay: Duration,
    pub max_attempts: u32,
    pub min_confidence: f64,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            mailto: None,
            request_delay: DEFAULT_REQUEST_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

/// Counts from one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    /// Entries that had no DOI and were looked up.
    pub looked_up: usize,
    pub found: usize,
    /// Entries skipped because they already had a DOI.
    pub skipped: usize,
}

/// Lowercase alphanumeric words joined by single spaces.
fn comparable(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two titles after case and punctuation folding.
///
/// # Example
///
/// ```
/// use cvjson_core::enrich::title_similarity;
///
/// assert!((title_similarity("Test Title.", "test title") - 1.0).abs() < f64::EPSILON);
/// assert!(title_similarity("Test Title", "Something else entirely") < 0.5);
/// ```
#[must_use]
pub fn title_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&comparable(a), &comparable(b))
}

fn years_agree(entry_year: Option<u16>, candidate_year: Option<u16>) -> bool {
    match (entry_year, candidate_year) {
        (Some(a), Some(b)) => a.abs_diff(b) <= MAX_YEAR_DRIFT,
        _ => true,
    }
}

/// Runs sources in order and accepts the first good-enough candidate.
pub struct DoiEnricher {
    sources: Vec<Box<dyn DoiSource>>,
    policy: RetryPolicy,
    request_delay: Duration,
    min_confidence: f64,
}

impl std::fmt::Debug for DoiEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("DoiEnricher")
            .field("sources", &names)
            .field("policy", &self.policy)
            .field("request_delay", &self.request_delay)
            .field("min_confidence", &self.min_confidence)
            .finish()
    }
}

impl DoiEnricher {
    /// Creates an enricher over explicit sources.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn DoiSource>>, options: &EnrichOptions) -> Self {
        Self {
            sources,
            policy: RetryPolicy::new(options.max_attempts, DEFAULT_BASE_DELAY),
            request_delay: options.request_delay,
            min_confidence: options.min_confidence,
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates an enricher over the public Crossref and OpenAlex APIs.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if an HTTP client cannot be built.
    pub fn public(options: &EnrichOptions) -> Result<Self, LookupError> {
        let sources: Vec<Box<dyn DoiSource>> = vec![
            Box::new(CrossrefSource::new(options.mailto.clone())?),
            Box::new(OpenAlexSource::new(options.mailto.clone())?),
        ];
        Ok(Self::new(sources, options))
    }

    async fn search_with_retry(
        &self,
        source: &dyn DoiSource,
        title: &str,
    ) -> Result<Vec<DoiCandidate>, LookupError> {
        let mut attempt = 1;
        loop {
            let result = source.search(title).await;
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            let error = match result {
                Ok(candidates) => return Ok(candidates),
                Err(error) => error,
            };
            match self.policy.should_retry(&error, attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    debug!(source = source.name(), error = %error, next, "Retrying lookup");
                    tokio::time::sleep(delay).await;
                    attempt = next;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(source = source.name(), %reason, "Giving up on lookup");
                    return Err(error);
                }
            }
        }
    }

    fn best_match(
        &self,
        title: &str,
        year: Option<u16>,
        source: &'static str,
        candidates: Vec<DoiCandidate>,
    ) -> Option<DoiMatch> {
        candidates
            .into_iter()
            .filter(|candidate| years_agree(year, candidate.year))
            .map(|candidate| {
                let confidence = title_similarity(title, &candidate.title);
                DoiMatch {
                    doi: candidate.doi,
                    title: candidate.title,
                    confidence,
                    source,
                }
            })
            .filter(|m| m.confidence >= self.min_confidence)
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }

    /// Looks up a DOI for one title.
    ///
    /// Lookup failures are logged and the next source is tried; `None` means
    /// no source produced an acceptable match.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, title: &str, year: Option<u16>) -> Option<DoiMatch> {
        for source in &self.sources {
            match self.search_with_retry(source.as_ref(), title).await {
                Ok(candidates) => {
                    if let Some(found) = self.best_match(title, year, source.name(), candidates) {
                        debug!(doi = %found.doi, confidence = found.confidence, source = found.source, "DOI match");
                        return Some(found);
                    }
                }
                Err(error) => {
                    warn!(source = source.name(), error = %error, "DOI lookup failed");
                }
            }
        }
        None
    }

    /// Fills `doi` on entries that lack one.
    ///
    /// `on_entry` is called once per entry after it has been handled.
    pub async fn enrich_entries(
        &self,
        entries: &mut [Entry],
        mut on_entry: impl FnMut(&Entry),
    ) -> EnrichSummary {
        let mut summary = EnrichSummary::default();

        for entry in entries.iter_mut() {
            if entry.doi.is_some() {
                summary.skipped += 1;
            } else {
                summary.looked_up += 1;
                if let Some(found) = self.lookup(&entry.title, entry.year).await {
                    entry.doi = Some(found.doi);
                    summary.found += 1;
                }
            }
            on_entry(entry);
        }

        info!(
            looked_up = summary.looked_up,
            found = summary.found,
            skipped = summary.skipped,
            "DOI enrichment complete"
        );
        summary
    }
}
