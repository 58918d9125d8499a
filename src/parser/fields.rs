//! Best-effort field extractors for a single entry.
//!
//! Every extractor is independent and returns `None` (or an empty list) when
//! its pattern does not match. Unless noted otherwise they operate on
//! normalized text; the raw variants look at markup that normalization
//! erases (italics, link targets).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::date::find_entry_date;
use super::known::find_known_venue;
use super::normalize::normalize;
use crate::record::UNKNOWN_AUTHOR;

/// Year in parentheses with an optional disambiguating letter: `(2023a)`.
#[allow(clippy::expect_used)]
static YEAR_PAREN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((\d{4})[a-z]?\)").expect("year (paren) regex is valid") // Static pattern, safe to panic
});

/// `Last, F.` with multi-word last names and any number of initials.
#[allow(clippy::expect_used)]
static AUTHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\p{Lu}][\p{L}'`\-]+(?:\s+[\p{Lu}][\p{L}'`\-]+)*,\s*(?:[\p{Lu}]\.\s*)+)")
        .expect("author regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static AUTHOR_SEPARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+and\s+|\s*&\s*|\s*,\s*").expect("author separator regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)doi:\s*([^\s,]+)").expect("doi regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static BARE_DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^10\.\d{4,}/").expect("bare doi regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static RAW_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\url\s*\{([^{}]+)\}").expect("raw url regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static RAW_HREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\href\s*\{([^{}]+)\}\s*\{[^{}]*\}").expect("raw href regex is valid") // Static pattern, safe to panic
});

/// `City, ST` or `Multi Word City, ST`.
#[allow(clippy::expect_used)]
static LOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][a-z]+(?: [A-Z][a-z]+)*), ([A-Z]{2})\b").expect("location regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static VENUE_CLAUSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:In|Presented at)\s+([^,.]+)").expect("venue clause regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static RAW_ITALIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:textit|emph)\s*\{([^{}]+)\}|\{\\(?:it|em)\s+([^{}]+)\}")
        .expect("raw italic regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static STANDALONE_IN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bIn\s").expect("standalone In regex is valid") // Static pattern, safe to panic
});

/// Awards recognized in entry text, in canonical spelling.
pub const AWARDS: &[&str] = &[
    "Best Paper Award",
    "Outstanding Paper Award",
    "Honorable Mention",
    "Blue Ribbon Outstanding Presenter Award",
];

/// Words ending in `.` that do not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "Dr", "St", "Mr", "Ms", "Mrs", "Jr", "Sr", "Vol", "No", "Eds", "Ed", "pp", "vs", "al",
];

/// Remainders this long or longer after the title become the description.
const MIN_DESCRIPTION_CHARS: usize = 21;

/// True when the `.` at byte `dot` closes a single-capital initial like `M.`.
fn closes_initial(text: &str, dot: usize) -> bool {
    let before = &text[..dot];
    let mut chars = before.chars().rev();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => letter.is_uppercase(),
        (Some(letter), Some(prev)) => letter.is_uppercase() && !prev.is_alphanumeric(),
        _ => false,
    }
}

/// End of the author list: the first `(`, or the first `.` that does not close
/// an initial, whichever comes first at a positive index.
fn author_prefix_end(text: &str) -> usize {
    text.char_indices()
        .find(|&(index, ch)| {
            index > 0 && (ch == '(' || (ch == '.' && !closes_initial(text, index)))
        })
        .map_or(text.len(), |(index, _)| index)
}

fn dedup_first_seen(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Splits the leading author list of an entry into names.
///
/// `Last, F.` names are captured as units. When none are present the prefix
/// is split on `and`, `&` and commas instead. Order is preserved, repeats are
/// dropped, and an empty result becomes the single placeholder `"Unknown"`.
///
/// # Example
///
/// ```
/// use cvjson_core::parser::extract_authors;
///
/// assert_eq!(
///     extract_authors("Ion, M., Herbst, P. (2023). Title."),
///     vec!["Ion, M.", "Herbst, P."]
/// );
/// assert_eq!(extract_authors("(2023). Title."), vec!["Unknown"]);
/// ```
#[must_use]
pub fn extract_authors(text: &str) -> Vec<String> {
    let prefix = &text[..author_prefix_end(text)];

    let mut names: Vec<String> = AUTHOR_PATTERN
        .captures_iter(prefix)
        .filter_map(|cap| Some(cap.get(1)?.as_str().trim().to_string()))
        .collect();

    if names.is_empty() {
        names = AUTHOR_SEPARATOR_PATTERN
            .split(prefix)
            .map(|name| name.trim().trim_start_matches("and ").trim().to_string())
            .filter(|name| name.chars().any(char::is_alphabetic))
            .collect();
    }

    let names = dedup_first_seen(names);
    if names.is_empty() {
        vec![UNKNOWN_AUTHOR.to_string()]
    } else {
        names
    }
}

/// First parenthesized year and the byte offset just past its `)`.
#[must_use]
pub fn find_year(text: &str) -> Option<(u16, usize)> {
    YEAR_PAREN_PATTERN.captures_iter(text).find_map(|cap| {
        let whole = cap.get(0)?;
        let year = cap.get(1)?.as_str().parse().ok()?;
        Some((year, whole.end()))
    })
}

/// First `(YYYY)` year, ignoring a trailing disambiguating letter.
///
/// # Example
///
/// ```
/// use cvjson_core::parser::extract_year;
///
/// assert_eq!(extract_year("Ion, M. (2023a). Title."), Some(2023));
/// assert_eq!(extract_year("Ion, M. 2023. Title."), None);
/// ```
#[must_use]
pub fn extract_year(text: &str) -> Option<u16> {
    find_year(text).map(|(year, _)| year)
}

/// Where the title search starts: after the `(YYYY)` year, else after a
/// parenthesized month date. Without either there is no heuristic title.
pub(crate) fn title_anchor(text: &str) -> Option<usize> {
    find_year(text)
        .map(|(_, end)| end)
        .or_else(|| find_entry_date(text).map(|(_, end)| end))
}

/// `doi:` token, case-insensitive, without trailing punctuation.
#[must_use]
pub fn extract_doi(text: &str) -> Option<String> {
    let cap = DOI_PATTERN.captures(text)?;
    let doi = cap.get(1)?.as_str().trim_end_matches(['.', ';', ')']);
    if doi.is_empty() {
        None
    } else {
        Some(doi.to_string())
    }
}

fn looks_like_doi(value: &str) -> bool {
    value.to_lowercase().starts_with("doi:") || BARE_DOI_PATTERN.is_match(value)
}

/// Link target from `\url{...}` or `\href{...}{...}` in raw entry text.
///
/// DOI-shaped targets are not URLs and are skipped.
#[must_use]
pub fn extract_url(raw: &str) -> Option<String> {
    [&*RAW_URL_PATTERN, &*RAW_HREF_PATTERN]
        .into_iter()
        .flat_map(|pattern| pattern.captures_iter(raw))
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .find(|target| !target.is_empty() && !looks_like_doi(target))
}

/// First `City, ST` token.
#[must_use]
pub fn extract_location(text: &str) -> Option<String> {
    let cap = LOCATION_PATTERN.captures(text)?;
    Some(format!("{}, {}", cap.get(1)?.as_str(), cap.get(2)?.as_str()))
}

/// Canonical name of the first known award mentioned, case-insensitively.
#[must_use]
pub fn extract_award(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    AWARDS
        .iter()
        .find(|award| lower.contains(&award.to_lowercase()))
        .map(|award| (*award).to_string())
}

/// Venue from the known-venue table, an `In ...` / `Presented at ...` clause,
/// or the first italic span, in that order.
///
/// `text` is the normalized entry, `after_anchor` the normalized text after
/// the year, and `raw` the original markup.
#[must_use]
pub fn extract_venue(text: &str, after_anchor: &str, raw: &str) -> Option<String> {
    if let Some(venue) = find_known_venue(text) {
        return Some(venue.to_string());
    }

    let clause = VENUE_CLAUSE_PATTERN
        .captures_iter(after_anchor)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim()))
        .find(|venue| {
            let lower = venue.to_lowercase();
            !venue.is_empty()
                && !["review", "press", "prep"]
                    .iter()
                    .any(|status| lower.starts_with(status))
        });
    if let Some(venue) = clause {
        return Some(venue.to_string());
    }

    RAW_ITALIC_PATTERN
        .captures_iter(raw)
        .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
        .map(|m| normalize(m.as_str()))
        .map(|venue| venue.trim_end_matches(['.', ',']).trim().to_string())
        .find(|venue| !venue.is_empty())
}

/// True when the `.` ending `word` is part of the word, not a full stop.
fn is_abbreviation(word: &str) -> bool {
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    let mut chars = word.chars();
    let single_capital = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase());
    single_capital || word.contains('.') || ABBREVIATIONS.contains(&word)
}

/// First sentence end in `text`: `(title_end, rest_start)`.
///
/// A `?` stays in the title; a `.` does not. `!` never ends a sentence.
fn sentence_boundary(text: &str) -> Option<(usize, usize)> {
    for (index, ch) in text.char_indices() {
        if !matches!(ch, '.' | '?') {
            continue;
        }
        let after = index + ch.len_utf8();
        let at_break = text[after..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace);
        if !at_break {
            continue;
        }
        if ch != '.' {
            return Some((after, after));
        }
        let word_start = text[..index]
            .rfind(char::is_whitespace)
            .map_or(0, |ws| ws + 1);
        if index > 0 && !is_abbreviation(&text[word_start..index]) {
            return Some((index, after));
        }
    }
    None
}

/// Trims surrounding punctuation and whitespace, keeping a closing `?`/`!`.
#[must_use]
pub fn clean_title(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim_start_matches(|c: char| {
            c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '"' | '\'' | '-' | ')')
        })
        .trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '"' | '\'' | '-' | '(')
        });
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Heuristic title and optional description from the text after the anchor.
///
/// The title runs to the first sentence end. Without one, it stops at a
/// standalone `In ` clause, or takes everything.
#[must_use]
pub fn split_title(after_anchor: &str) -> Option<(String, Option<String>)> {
    let remainder = after_anchor.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, ')' | '.' | ',' | ':' | ';' | '-')
    });

    if let Some((title_end, rest_start)) = sentence_boundary(remainder) {
        let title = clean_title(&remainder[..title_end])?;
        let rest = remainder[rest_start..].trim();
        let description =
            (rest.chars().count() >= MIN_DESCRIPTION_CHARS).then(|| rest.to_string());
        return Some((title, description));
    }

    let cut = STANDALONE_IN_PATTERN
        .find(remainder)
        .map(|m| m.start())
        .filter(|&start| start > 0)
        .unwrap_or(remainder.len());
    clean_title(&remainder[..cut]).map(|title| (title, None))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_authors_initials_do_not_end_list() {
        assert_eq!(
            extract_authors("Ion, M., Herbst, P. (2023). Title."),
            vec!["Ion, M.", "Herbst, P."]
        );
    }

    #[test]
    fn test_extract_authors_multiple_initials_and_multiword_last_name() {
        assert_eq!(
            extract_authors("Van Dyke, J. K. and Ion, M. (2020). Title."),
            vec!["Van Dyke, J. K.", "Ion, M."]
        );
    }

    #[test]
    fn test_extract_authors_fallback_split() {
        assert_eq!(
            extract_authors("Mike Ion and Pat Herbst (2021). Title."),
            vec!["Mike Ion", "Pat Herbst"]
        );
        assert_eq!(
            extract_authors("Mike Ion & Pat Herbst, Jane Doe. Title"),
            vec!["Mike Ion", "Pat Herbst", "Jane Doe"]
        );
    }

    #[test]
    fn test_extract_authors_dedups_first_seen() {
        assert_eq!(
            extract_authors("Ion, M., Herbst, P., Ion, M. (2022). T."),
            vec!["Ion, M.", "Herbst, P."]
        );
    }

    #[test]
    fn test_extract_authors_placeholder() {
        assert_eq!(extract_authors("(2023). Title."), vec![UNKNOWN_AUTHOR]);
        assert_eq!(extract_authors(""), vec![UNKNOWN_AUTHOR]);
    }

    #[test]
    fn test_extract_year_disambiguator_discarded() {
        assert_eq!(extract_year("Ion, M. (2023a). Title."), Some(2023));
        assert_eq!(extract_year("(2019)"), Some(2019));
    }

    #[test]
    fn test_extract_year_requires_parentheses() {
        assert_eq!(extract_year("Ion, M. 2023. Title."), None);
        assert_eq!(extract_year("(In review)"), None);
    }

    #[test]
    fn test_title_anchor_prefers_year() {
        let text = "Ion, M. (2023). Title.";
        assert_eq!(&text[title_anchor(text).unwrap()..], ". Title.");
        let text = "Ion, M. (Oct. 2023). Title.";
        assert_eq!(&text[title_anchor(text).unwrap()..], ". Title.");
    }

    #[test]
    fn test_title_anchor_requires_year_or_date() {
        assert_eq!(title_anchor("Ion, M. (In review). Title."), None);
        assert_eq!(title_anchor("Ion, M. Some Title Without Year. Venue."), None);
    }

    #[test]
    fn test_extract_doi_trims_trailing_punctuation() {
        assert_eq!(
            extract_doi("Journal. DOI: 10.1007/s40753-023-00214-8.").as_deref(),
            Some("10.1007/s40753-023-00214-8")
        );
        assert_eq!(extract_doi("doi:10.1/x, 2020").as_deref(), Some("10.1/x"));
        assert_eq!(extract_doi("no identifier"), None);
    }

    #[test]
    fn test_extract_url_skips_doi_targets() {
        assert_eq!(
            extract_url(r"\url{https://example.org/paper}").as_deref(),
            Some("https://example.org/paper")
        );
        assert_eq!(
            extract_url(r"\href{https://example.org/slides}{slides}").as_deref(),
            Some("https://example.org/slides")
        );
        assert_eq!(extract_url(r"\url{10.1080/10508406.2023.1}"), None);
        assert_eq!(extract_url(r"\href{doi:10.1/x}{paper}"), None);
    }

    #[test]
    fn test_extract_location_city_state() {
        assert_eq!(
            extract_location("Annual Meeting. Ann Arbor, MI.").as_deref(),
            Some("Ann Arbor, MI")
        );
        assert_eq!(extract_location("Journal of Testing, 12(3)"), None);
    }

    #[test]
    fn test_extract_award_case_insensitive_canonical() {
        assert_eq!(
            extract_award("Won the best paper award at RUME").as_deref(),
            Some("Best Paper Award")
        );
        assert_eq!(extract_award("No prizes here"), None);
    }

    #[test]
    fn test_extract_venue_known_table_first() {
        let text = "Ion, M. (2023). T. In Journal of General Education, 32(1).";
        assert_eq!(
            extract_venue(text, text, text).as_deref(),
            Some("Journal of General Education")
        );
    }

    #[test]
    fn test_extract_venue_in_clause() {
        let after = ". Title. In Proceedings of the Annual Meeting, Denver, CO.";
        assert_eq!(
            extract_venue(after, after, after).as_deref(),
            Some("Proceedings of the Annual Meeting")
        );
        let after = ". Title. Presented at Data Science Day. Ann Arbor, MI.";
        assert_eq!(
            extract_venue(after, after, after).as_deref(),
            Some("Data Science Day")
        );
    }

    #[test]
    fn test_extract_venue_skips_status_clause() {
        let after = ". Title (In review). Something.";
        assert_eq!(extract_venue(after, after, after), None);
    }

    #[test]
    fn test_extract_venue_italic_fallback() {
        let raw = r"Ion, M. (2023). Title. \textit{Journal of Testing}.";
        let text = normalize(raw);
        assert_eq!(
            extract_venue(&text, ". Title. Journal of Testing.", raw).as_deref(),
            Some("Journal of Testing")
        );
        assert_eq!(
            extract_venue("x", "x", r"{\it Old Style Venue}").as_deref(),
            Some("Old Style Venue")
        );
    }

    #[test]
    fn test_split_title_first_sentence() {
        let (title, description) = split_title(". Test Publication Title. Journal of Testing.").unwrap();
        assert_eq!(title, "Test Publication Title");
        assert_eq!(description, None);
    }

    #[test]
    fn test_split_title_keeps_question_mark() {
        let (title, _) = split_title(". What are the Tensions? Venue.").unwrap();
        assert_eq!(title, "What are the Tensions?");
    }

    #[test]
    fn test_split_title_exclamation_does_not_end_sentence() {
        let (title, _) = split_title(". Eureka! Finding Patterns in Proofs. Venue.").unwrap();
        assert_eq!(title, "Eureka! Finding Patterns in Proofs");
    }

    #[test]
    fn test_split_title_keeps_trailing_exclamation() {
        let (title, _) = split_title(". Look Again!").unwrap();
        assert_eq!(title, "Look Again!");
    }

    #[test]
    fn test_split_title_skips_abbreviations() {
        let (title, _) = split_title(". A Study of U.S. Schools with Dr. Who. Venue.").unwrap();
        assert_eq!(title, "A Study of U.S. Schools with Dr. Who");
    }

    #[test]
    fn test_split_title_long_remainder_becomes_description() {
        let (title, description) =
            split_title(". Title. Journal of the Learning Sciences, 32(1), 1-20.").unwrap();
        assert_eq!(title, "Title");
        assert_eq!(
            description.as_deref(),
            Some("Journal of the Learning Sciences, 32(1), 1-20.")
        );
    }

    #[test]
    fn test_split_title_in_clause_fallback() {
        let (title, _) = split_title(": A Title In Some Venue").unwrap();
        assert_eq!(title, "A Title");
        let (title, _) = split_title("Whole remainder title").unwrap();
        assert_eq!(title, "Whole remainder title");
    }

    #[test]
    fn test_split_title_empty() {
        assert!(split_title(". ").is_none());
        assert!(split_title("").is_none());
    }
}
