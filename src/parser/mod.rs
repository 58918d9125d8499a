//! LaTeX CV parsing: sections, entries, and per-entry field extraction.
//!
//! Data flows one way: document text → section text → subsections → entry
//! texts → records. Every stage is best-effort; a missing section or an
//! unparseable entry never aborts its siblings.
//!
//! # Example
//!
//! ```
//! use cvjson_core::parser::{ExtractOptions, parse_document};
//!
//! let doc = r"\section{\sc Publications}
//! \subsection*{Peer-Reviewed Journal Articles}
//! \item \textbf{Ion, M.}, Herbst, P. (2023). Test Publication Title. \textit{Journal of Testing}.
//! \end{document}";
//!
//! let cv = parse_document(doc, &ExtractOptions::default());
//! assert_eq!(cv.publications.len(), 1);
//! assert_eq!(cv.publications[0].title, "Test Publication Title");
//! ```

mod date;
mod entry;
mod fields;
mod grant;
mod known;
mod normalize;
mod profile;
mod publication;
mod section;

pub use date::{extract_date, extract_entry_date};
pub use entry::{marker_years, split_entries, split_grant_entries};
pub use fields::{
    AWARDS, clean_title, extract_authors, extract_award, extract_doi, extract_location,
    extract_url, extract_venue, extract_year, find_year, split_title,
};
pub use grant::parse_grant;
pub use known::{
    KNOWN_GRANTS, KNOWN_TITLES, KNOWN_VENUES, KnownGrant, KnownTitle, find_known_grant,
    find_known_title, find_known_venue,
};
pub use normalize::{normalize, strip_comments};
pub use profile::{CONTACT_SECTION, EDUCATION_SECTION, parse_contact, parse_education};
pub use publication::parse_publication;
pub use section::{Subsection, extract_section, split_subsections};

use std::collections::HashSet;

use tracing::{debug, info};

use crate::record::{CvDocument, Entry, GrantRecord, Profile};

pub const DEFAULT_PUBLICATIONS_SECTION: &str = "Publications";
pub const DEFAULT_TALKS_SECTION: &str = "Presentations";
pub const DEFAULT_GRANTS_SECTION: &str = "Grants";

/// Section headings that feed each output collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLabels {
    pub publications: String,
    pub talks: String,
    pub grants: String,
}

impl Default for SectionLabels {
    fn default() -> Self {
        Self {
            publications: DEFAULT_PUBLICATIONS_SECTION.to_string(),
            talks: DEFAULT_TALKS_SECTION.to_string(),
            grants: DEFAULT_GRANTS_SECTION.to_string(),
        }
    }
}

/// Options for [`parse_document`], passed explicitly by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub sections: SectionLabels,
    /// Also extract contact and education into [`CvDocument::profile`].
    pub include_profile: bool,
}

/// Extracts publications, talks and grants from a whole CV document.
///
/// LaTeX comments are stripped first. Titles are unique across publications
/// and talks: the first entry with a given title wins and later ones are
/// skipped. Grant titles are unique among grants.
#[tracing::instrument(skip(document, options), fields(input_len = document.len()))]
#[must_use]
pub fn parse_document(document: &str, options: &ExtractOptions) -> CvDocument {
    let document = strip_comments(document);
    let mut seen_titles = HashSet::new();

    let publications = parse_entry_section(&document, &options.sections.publications, &mut seen_titles);
    let talks = parse_entry_section(&document, &options.sections.talks, &mut seen_titles);
    let grants = parse_grant_section(&document, &options.sections.grants);

    let profile = options.include_profile.then(|| Profile {
        contact: parse_contact(&document),
        education: parse_education(&document),
    });

    let cv = CvDocument {
        publications,
        talks,
        grants,
        profile,
    };
    info!(
        publications = cv.publications.len(),
        talks = cv.talks.len(),
        grants = cv.grants.len(),
        "Extraction complete"
    );
    cv
}

fn parse_entry_section(
    document: &str,
    section_label: &str,
    seen_titles: &mut HashSet<String>,
) -> Vec<Entry> {
    let section = extract_section(document, section_label);
    let mut entries = Vec::new();
    let mut discarded = 0_usize;

    for subsection in split_subsections(&section, section_label) {
        for entry_text in split_entries(&subsection.text) {
            let Some(entry) = parse_publication(&entry_text, &subsection.label) else {
                discarded += 1;
                continue;
            };
            if !seen_titles.insert(entry.title.clone()) {
                debug!(title = %entry.title, section = section_label, "Skipping duplicate title");
                continue;
            }
            entries.push(entry);
        }
    }

    info!(
        section = section_label,
        kept = entries.len(),
        discarded,
        "Parsed section"
    );
    entries
}

fn parse_grant_section(document: &str, section_label: &str) -> Vec<GrantRecord> {
    let section = extract_section(document, section_label);
    let mut seen_titles = HashSet::new();
    let mut grants = Vec::new();

    for subsection in split_subsections(&section, section_label) {
        for entry_text in split_grant_entries(&subsection.text) {
            let Some(grant) = parse_grant(&entry_text, &subsection.label) else {
                continue;
            };
            if !seen_titles.insert(grant.title.clone()) {
                debug!(title = %grant.title, "Skipping duplicate grant");
                continue;
            }
            grants.push(grant);
        }
    }

    info!(section = section_label, kept = grants.len(), "Parsed section");
    grants
}
