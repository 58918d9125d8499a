//! Splitting section text into per-entry substrings.

use std::sync::LazyLock;

use regex::Regex;

/// `\item[2023]`, `\item[2020--2023]`, `\item[]`, a bare `\item`, or
/// `\yearsitem{...}`.
#[allow(clippy::expect_used)]
static ITEM_DELIMITER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\item\s*\[\s*(?:\d{4}(?:\s*(?:-{1,3}|–)\s*\d{4})?)?\s*\]|\\item\b|\\yearsitem\s*\{[^{}]*\}",
    )
    .expect("item delimiter regex is valid") // Static pattern, safe to panic
});

/// Year carried by a year-item marker at the start of an entry.
#[allow(clippy::expect_used)]
static YEAR_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:\\item\s*\[\s*(\d{4})(?:\s*(?:-{1,3}|–)\s*(\d{4}))?\s*\]|\\yearsitem\s*\{\s*(\d{4})(?:\s*(?:-{1,3}|–)\s*(\d{4}))?\s*\})",
    )
    .expect("year item regex is valid") // Static pattern, safe to panic
});

fn segments(section_text: &str, keep_delimiter: bool) -> Vec<String> {
    let delimiters: Vec<_> = ITEM_DELIMITER_PATTERN.find_iter(section_text).collect();

    delimiters
        .iter()
        .enumerate()
        .filter_map(|(index, delimiter)| {
            let start = if keep_delimiter {
                delimiter.start()
            } else {
                delimiter.end()
            };
            let end = delimiters
                .get(index + 1)
                .map_or(section_text.len(), |next| next.start());
            let body = &section_text[delimiter.end()..end];
            if body.trim().is_empty() {
                return None;
            }
            Some(section_text[start..end].trim().to_string())
        })
        .collect()
}

/// Splits section text into entry texts on `\item` and `\yearsitem{...}`
/// delimiters.
///
/// Text before the first delimiter is dropped, as are empty segments. The
/// year carried by an `\item[YYYY]` or `\yearsitem{YYYY}` marker is
/// discarded here; parsers derive
/// the year from the entry body.
///
/// # Example
///
/// ```
/// use cvjson_core::parser::split_entries;
///
/// let entries = split_entries(r"\begin{itemize}\item[2023] First. \item Second. \end{itemize}");
/// assert_eq!(entries, vec!["First.", r"Second. \end{itemize}"]);
/// ```
#[must_use]
pub fn split_entries(section_text: &str) -> Vec<String> {
    segments(section_text, false)
}

/// Like [`split_entries`] but keeps each delimiter at the front of its entry,
/// so [`marker_years`] can read a year-item marker.
#[must_use]
pub fn split_grant_entries(section_text: &str) -> Vec<String> {
    segments(section_text, true)
}

/// Reads the year (or year span) of a leading `\item[YYYY]` or
/// `\yearsitem{YYYY}` marker.
///
/// Returns `(start, end)` where `end` is set only for a span.
#[must_use]
pub fn marker_years(entry_text: &str) -> Option<(u16, Option<u16>)> {
    let cap = YEAR_ITEM_PATTERN.captures(entry_text)?;
    let start = cap.get(1).or_else(|| cap.get(3))?.as_str().parse().ok()?;
    let end = cap
        .get(2)
        .or_else(|| cap.get(4))
        .and_then(|m| m.as_str().parse().ok());
    Some((start, end))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_entries_bare_items() {
        let entries = split_entries(r"\item One. \item Two.");
        assert_eq!(entries, vec!["One.", "Two."]);
    }

    #[test]
    fn test_split_entries_drops_leading_segment() {
        let entries = split_entries(r"\vspace{1mm} preamble \item One.");
        assert_eq!(entries, vec!["One."]);
    }

    #[test]
    fn test_split_entries_year_marker_discarded() {
        let entries = split_entries("\\item[2023] One.\n\\item[2019--2021] Two.");
        assert_eq!(entries, vec!["One.", "Two."]);
    }

    #[test]
    fn test_split_entries_drops_empty_segments() {
        let entries = split_entries("\\item \n\\item   \\item Real.");
        assert_eq!(entries, vec!["Real."]);
    }

    #[test]
    fn test_split_entries_ignores_itemsep() {
        let entries = split_entries(r"\setlength{\itemsep}{0pt}\item One.");
        assert_eq!(entries, vec!["One."]);
    }

    #[test]
    fn test_split_entries_empty_input() {
        assert!(split_entries("").is_empty());
        assert!(split_entries("no delimiters here").is_empty());
    }

    #[test]
    fn test_split_grant_entries_keeps_marker() {
        let entries = split_grant_entries(r"\item[2023] \textbf{PI} A. \item B.");
        assert_eq!(entries, vec![r"\item[2023] \textbf{PI} A.", r"\item B."]);
    }

    #[test]
    fn test_marker_years_single_and_span() {
        assert_eq!(marker_years(r"\item[2023] x"), Some((2023, None)));
        assert_eq!(marker_years(r"\item[2020--2024] x"), Some((2020, Some(2024))));
        assert_eq!(marker_years(r"\item[ 2020 - 2021 ] x"), Some((2020, Some(2021))));
        assert_eq!(marker_years(r"\item x 2023"), None);
        assert_eq!(marker_years(r"\item[] x"), None);
    }

    #[test]
    fn test_split_entries_yearsitem_delimiter() {
        let entries = split_entries(
            r"\yearsitem{2023} Ion, M. (2023). First Paper. Venue. \yearsitem{2022} Ion, M. (2022). Second Paper. Venue.",
        );
        assert_eq!(
            entries,
            vec![
                "Ion, M. (2023). First Paper. Venue.",
                "Ion, M. (2022). Second Paper. Venue."
            ]
        );
    }

    #[test]
    fn test_split_entries_mixed_item_and_yearsitem() {
        let entries = split_entries("\\item One.\n\\yearsitem{2021} Two.\n\\yearsitem{} Three.");
        assert_eq!(entries, vec!["One.", "Two.", "Three."]);
    }

    #[test]
    fn test_split_grant_entries_keeps_yearsitem_marker() {
        let entries = split_grant_entries(r"\yearsitem{2020--2022} \textbf{PI} A. \yearsitem{2019} B.");
        assert_eq!(
            entries,
            vec![r"\yearsitem{2020--2022} \textbf{PI} A.", r"\yearsitem{2019} B."]
        );
    }

    #[test]
    fn test_marker_years_yearsitem() {
        assert_eq!(marker_years(r"\yearsitem{2023} x"), Some((2023, None)));
        assert_eq!(marker_years(r"\yearsitem{2020--2024} x"), Some((2020, Some(2024))));
        assert_eq!(marker_years(r"\yearsitem{ 2021 - 2022 } x"), Some((2021, Some(2022))));
        assert_eq!(marker_years(r"\yearsitem{} x"), None);
    }
}
