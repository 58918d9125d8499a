//! Output record types and post-extraction validation.
//!
//! [`Entry`] covers publications and talks, [`GrantRecord`] covers funding.
//! Both serialize to the JSON shapes written by [`crate::output`]; absent
//! optional fields are omitted rather than written as `null`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder author used when no author could be recovered.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Record type, derived from the subsection label only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Peer-reviewed journal article.
    Journal,
    /// Conference paper or proceedings entry.
    Conference,
    /// Chapter in an edited book.
    BookChapter,
    /// Non-peer-reviewed article or blog post.
    Article,
    /// Poster presentation.
    Poster,
    /// Talk or lecture.
    Talk,
    /// Anything the label does not classify.
    Publication,
}

impl EntryType {
    /// Classifies a subsection label by keyword containment.
    ///
    /// The entry body never takes part in this decision.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("journal") {
            Self::Journal
        } else if lower.contains("conference") || lower.contains("proceedings") {
            Self::Conference
        } else if lower.contains("book") {
            Self::BookChapter
        } else if lower.contains("article") || lower.contains("non-peer") {
            Self::Article
        } else if lower.contains("poster") {
            Self::Poster
        } else if lower.contains("talk") || lower.contains("lecture") {
            Self::Talk
        } else {
            Self::Publication
        }
    }

    /// Returns the stable snake_case label used in JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Conference => "conference",
            Self::BookChapter => "book_chapter",
            Self::Article => "article",
            Self::Poster => "poster",
            Self::Talk => "talk",
            Self::Publication => "publication",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication status, from keyword presence in the entry text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Accepted, awaiting print.
    InPress,
    /// Submitted and under review.
    UnderReview,
    /// Still being written.
    InPreparation,
    /// Default when no status keyword is present.
    Published,
}

impl Status {
    /// Scans text for status keywords; the first rule that matches wins.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("in press") {
            Self::InPress
        } else if lower.contains("under review") || lower.contains("in review") {
            Self::UnderReview
        } else if lower.contains("in prep") {
            // also covers "in preparation"
            Self::InPreparation
        } else {
            Self::Published
        }
    }

    /// Returns the stable snake_case label used in JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InPress => "in_press",
            Self::UnderReview => "under_review",
            Self::InPreparation => "in_preparation",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One publication or talk extracted from the CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Author names in source order, de-duplicated.
    pub authors: Vec<String>,
    /// Publication year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Month-precision date (`YYYY-MM`) when the entry carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Title, never empty.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award: Option<String>,
    /// Classification derived from [`Entry::subcategory`].
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Subsection label verbatim.
    pub subcategory: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entry {
    /// Creates an entry with the required fields; everything else absent.
    #[must_use]
    pub fn new(title: impl Into<String>, subcategory: impl Into<String>) -> Self {
        let subcategory = subcategory.into();
        Self {
            authors: vec![UNKNOWN_AUTHOR.to_string()],
            year: None,
            date: None,
            title: title.into(),
            venue: None,
            doi: None,
            url: None,
            location: None,
            award: None,
            entry_type: EntryType::from_label(&subcategory),
            subcategory,
            status: Status::Published,
            description: None,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "[{}] {} ({year})", self.entry_type, self.title),
            None => write!(f, "[{}] {}", self.entry_type, self.title),
        }
    }
}

/// Grant status, from the subsection label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    /// Funded.
    Awarded,
    /// Submitted, decision pending.
    InReview,
}

impl GrantStatus {
    /// `in_review` when the label contains "In Review" (case-sensitive),
    /// otherwise `awarded`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label.contains("In Review") {
            Self::InReview
        } else {
            Self::Awarded
        }
    }
}

/// One grant extracted from the CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantRecord {
    pub status: GrantStatus,
    /// Single award year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Multi-year span as `YYYY-YYYY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Collaborators, optionally suffixed with a parenthetical role.
    #[serde(default)]
    pub collaborators: Vec<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funder: Option<String>,
    /// Amount in whole currency units as a digit string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

impl fmt::Display for GrantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[grant] {}", self.title)?;
        if let Some(funder) = &self.funder {
            write!(f, " ({funder})")?;
        }
        Ok(())
    }
}

/// Contact details from the CV header section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webpage: Option<String>,
}

/// One degree line from the education section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub committee: Vec<String>,
}

/// Contact and education, emitted only on request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub contact: Contact,
    pub education: Vec<Education>,
}

/// Everything extracted from one CV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvDocument {
    pub publications: Vec<Entry>,
    pub talks: Vec<Entry>,
    pub grants: Vec<GrantRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl CvDocument {
    /// Total number of records across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.publications.len() + self.talks.len() + self.grants.len()
    }

    /// Returns true if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for CvDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} publications, {} talks, {} grants",
            self.publications.len(),
            self.talks.len(),
            self.grants.len()
        )
    }
}

/// A problem found by [`validate_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Only the placeholder author (or none) is present.
    MissingAuthors,
    /// Title is empty.
    EmptyTitle,
    /// Year is outside `1900..=2100`.
    ImplausibleYear(u16),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAuthors => write!(f, "entry must have at least one author"),
            Self::EmptyTitle => write!(f, "entry must have a title"),
            Self::ImplausibleYear(year) => write!(f, "implausible year {year}"),
        }
    }
}

/// Checks an extracted entry for values the heuristics commonly get wrong.
#[must_use]
pub fn validate_entry(entry: &Entry) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let has_real_author = entry
        .authors
        .iter()
        .any(|author| !author.trim().is_empty() && author != UNKNOWN_AUTHOR);
    if !has_real_author {
        issues.push(ValidationIssue::MissingAuthors);
    }

    if entry.title.trim().is_empty() {
        issues.push(ValidationIssue::EmptyTitle);
    }

    if let Some(year) = entry.year
        && !(1900..=2100).contains(&year)
    {
        issues.push(ValidationIssue::ImplausibleYear(year));
    }

    issues
}
