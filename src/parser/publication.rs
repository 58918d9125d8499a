//! Publication and talk entry parsing.

use tracing::debug;

use super::date::extract_entry_date;
use super::fields::{
    extract_authors, extract_award, extract_doi, extract_location, extract_url, extract_venue,
    find_year, split_title, title_anchor,
};
use super::known::find_known_title;
use super::normalize::normalize;
use crate::record::{Entry, EntryType, Status};

/// Parses one publication or talk entry.
///
/// Field extraction is best-effort: each field that cannot be recovered is
/// simply left unset. The entry is discarded (`None`) only when no title can
/// be found.
///
/// # Example
///
/// ```
/// use cvjson_core::parser::parse_publication;
///
/// let entry = parse_publication(
///     r"\textbf{Ion, M.}, Herbst, P. (2023). Test Publication Title. \textit{Journal of Testing}.",
///     "Peer-Reviewed Journal Articles",
/// )
/// .unwrap();
/// assert_eq!(entry.title, "Test Publication Title");
/// assert_eq!(entry.year, Some(2023));
/// ```
#[tracing::instrument(skip(entry_text), fields(input_len = entry_text.len()))]
#[must_use]
pub fn parse_publication(entry_text: &str, subsection_label: &str) -> Option<Entry> {
    let text = normalize(entry_text);
    if text.is_empty() {
        return None;
    }

    let authors = extract_authors(&text);
    let date = extract_entry_date(&text);
    let year = find_year(&text).map(|(year, _)| year).or_else(|| {
        date.as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    });

    // Without a year or month date only a known title can name the entry.
    let anchor = title_anchor(&text);
    let after_anchor = anchor.and_then(|at| text.get(at..));

    let (title, description) = match find_known_title(&text) {
        Some(known) => (known.title.to_string(), Some(known.description.to_string())),
        None => {
            let Some((title, description)) = after_anchor.and_then(split_title) else {
                debug!(subsection_label, "Discarding entry without a title");
                return None;
            };
            (title, description)
        }
    };

    let after_anchor = after_anchor.unwrap_or(&text);
    let location = extract_location(after_anchor).or_else(|| extract_location(&text));

    Some(Entry {
        authors,
        year,
        date,
        title,
        venue: extract_venue(&text, after_anchor, entry_text),
        doi: extract_doi(&text),
        url: extract_url(entry_text),
        location,
        award: extract_award(&text),
        entry_type: EntryType::from_label(subsection_label),
        subcategory: subsection_label.to_string(),
        status: Status::detect(&text),
        description,
    })
}
