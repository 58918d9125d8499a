//! Grant entry parsing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::entry::marker_years;
use super::known::{KnownGrant, find_known_grant};
use super::normalize::normalize;
use crate::record::{GrantRecord, GrantStatus};

/// Shorter normalized entries are list scaffolding, not grants.
const MIN_GRANT_CHARS: usize = 10;

/// How far past an amount to look for the word "million".
const MILLION_WINDOW_CHARS: usize = 20;

/// Words that end a generic title, earliest occurrence wins.
const TITLE_END_MARKERS: &[&str] = &[", submitted to", " (", ", "];

#[allow(clippy::expect_used)]
static YEAR_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})(?:\s*-\s*(\d{4}))?\b").expect("grant year regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static RAW_BOLD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\textbf\s*\{([^{}]*)\}|\{\\bf\s+([^{}]*)\}").expect("raw bold regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static WITH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"With ([^()]+?)(?:\(|$)").expect("with regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static PI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PI: ([^()]+?)(?:\(|$)").expect("pi regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static FUNDER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"submitted to ([^(]*)(?:\(|$)", r"\(([^)]*)\)", r"(NSF [^(]*)"]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("funder regex is valid")) // Static pattern, safe to panic
        .collect()
});

#[allow(clippy::expect_used)]
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s?([0-9][0-9,.]*)").expect("amount regex is valid") // Static pattern, safe to panic
});

/// Parses one grant entry, keeping any leading `\item[YYYY]` marker.
///
/// A known-grant fragment in the text supplies title, funder and amount.
/// Otherwise the entry needs a bold role token to anchor the title, and is
/// discarded without one.
///
/// # Example
///
/// ```
/// use cvjson_core::parser::parse_grant;
///
/// let grant = parse_grant(
///     r"\item[2024] noise Instructor-centered Holistic Modeling noise",
///     "Grants In Review",
/// )
/// .unwrap();
/// assert_eq!(grant.funder.as_deref(), Some("NSF 23-624: RITEL"));
/// assert_eq!(grant.amount.as_deref(), Some("2100000"));
/// ```
#[tracing::instrument(skip(entry_text), fields(input_len = entry_text.len()))]
#[must_use]
pub fn parse_grant(entry_text: &str, subsection_label: &str) -> Option<GrantRecord> {
    let text = normalize(entry_text);
    if text.chars().count() < MIN_GRANT_CHARS {
        return None;
    }

    let (year, years) = grant_years(entry_text, &text);
    let role = extract_role(entry_text);
    let mut collaborators = extract_collaborators(&text);
    let mut status = GrantStatus::from_label(subsection_label);

    let known = find_known_grant(entry_text).or_else(|| find_known_grant(&text));
    let (title, funder, amount) = match (known, role.as_deref()) {
        (Some(known), _) => {
            if text.contains("submitted to") {
                status = GrantStatus::InReview;
            }
            if collaborators.is_empty() {
                collaborators = default_collaborators(known);
            }
            (
                known.title.to_string(),
                Some(known.funder.to_string()),
                Some(known.amount.to_string()),
            )
        }
        (None, Some(role)) => {
            let Some(title) = title_after_role(&text, role) else {
                debug!(subsection_label, role, "Discarding grant without a title");
                return None;
            };
            (title, extract_funder(&text), extract_amount(&text))
        }
        (None, None) => {
            debug!(subsection_label, "Discarding grant with no role and no known match");
            return None;
        }
    };

    Some(GrantRecord {
        status,
        year,
        years,
        role,
        collaborators,
        title,
        funder,
        amount,
    })
}

fn default_collaborators(known: &KnownGrant) -> Vec<String> {
    known
        .default_collaborators
        .iter()
        .map(|name| (*name).to_string())
        .collect()
}

/// Marker year first, then the first `YYYY` / `YYYY-YYYY` token.
fn grant_years(raw: &str, text: &str) -> (Option<u16>, Option<String>) {
    let found = marker_years(raw).or_else(|| {
        let cap = YEAR_TOKEN_PATTERN.captures(text)?;
        let start = cap.get(1)?.as_str().parse().ok()?;
        let end = cap.get(2).and_then(|m| m.as_str().parse().ok());
        Some((start, end))
    });

    match found {
        Some((start, Some(end))) => (None, Some(format!("{start}-{end}"))),
        Some((start, None)) => (Some(start), None),
        None => (None, None),
    }
}

fn extract_role(raw: &str) -> Option<String> {
    RAW_BOLD_PATTERN
        .captures_iter(raw)
        .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
        .map(|m| normalize(m.as_str()))
        .find(|role| !role.is_empty())
}

fn trim_name(name: &str) -> &str {
    name.trim().trim_end_matches(['.', ',', ';']).trim()
}

/// `With A, B, and C` plus `PI: D`, each annotated with any parenthetical
/// that follows the name in the text.
fn extract_collaborators(text: &str) -> Vec<String> {
    let mut names = Vec::new();

    if let Some(listed) = WITH_PATTERN.captures(text).and_then(|cap| cap.get(1)) {
        let parts: Vec<&str> = listed.as_str().split(" and ").collect();
        let last = parts.len().saturating_sub(1);
        for (index, part) in parts.iter().enumerate() {
            if index < last {
                names.extend(part.split(',').map(trim_name).filter(|n| !n.is_empty()));
            } else {
                names.push(trim_name(part));
            }
        }
    }

    let mut collaborators: Vec<String> = names
        .into_iter()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(pi) = PI_PATTERN.captures(text).and_then(|cap| cap.get(1)) {
        let pi = trim_name(pi.as_str());
        if !pi.is_empty() {
            collaborators.push(format!("{pi} (PI)"));
        }
    }

    collaborators
        .into_iter()
        .map(|name| annotate_role(text, name))
        .collect()
}

fn annotate_role(text: &str, name: String) -> String {
    if name.contains('(') {
        return name;
    }
    let pattern = format!(r"{}\s*\(([^)]+)\)", regex::escape(&name));
    let role = Regex::new(&pattern)
        .ok()
        .and_then(|regex| regex.captures(text))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string());
    match role {
        Some(role) => format!("{name} ({role})"),
        None => name,
    }
}

/// Text after the role token, up to the earliest title-ending marker, or to
/// the first period when no marker is present.
fn title_after_role(text: &str, role: &str) -> Option<String> {
    let role_end = text.find(role)? + role.len();
    let remaining = text[role_end..]
        .trim_start()
        .trim_start_matches(',')
        .trim_start();

    let end = TITLE_END_MARKERS
        .iter()
        .filter_map(|marker| remaining.find(marker))
        .filter(|&pos| pos > 0)
        .min()
        .or_else(|| remaining.find('.').filter(|&pos| pos > 0))?;

    let title = remaining[..end].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn extract_funder(text: &str) -> Option<String> {
    FUNDER_PATTERNS.iter().find_map(|pattern| {
        let cap = pattern.captures(text)?;
        let funder = cap.get(1)?.as_str().trim();
        (!funder.is_empty()).then(|| funder.to_string())
    })
}

/// `$` amount as whole units; `$2.1 million` becomes `2100000`.
fn extract_amount(text: &str) -> Option<String> {
    let m = AMOUNT_PATTERN.captures(text)?.get(1)?;
    let digits = m.as_str().replace(',', "");
    let digits = digits.trim_end_matches('.');

    let window: String = text[m.end()..].chars().take(MILLION_WINDOW_CHARS).collect();
    if window.to_lowercase().contains("million") {
        let value: f64 = digits.parse().ok()?;
        return Some(format!("{:.0}", value * 1_000_000.0));
    }

    (!digits.is_empty()).then(|| digits.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grant_known_entry_overrides_noise() {
        let grant = parse_grant(
            r"\item[2024] \textbf{Co-PI} garbled text; Instructor-centered Holistic Modeling ??? (\$9 trillion)",
            "Grants",
        )
        .unwrap();
        assert_eq!(
            grant.title,
            "Instructor-centered Holistic Modeling of Student Engagement and Progress in Data Science"
        );
        assert_eq!(grant.funder.as_deref(), Some("NSF 23-624: RITEL"));
        assert_eq!(grant.amount.as_deref(), Some("2100000"));
        assert_eq!(grant.year, Some(2024));
        assert_eq!(grant.role.as_deref(), Some("Co-PI"));
        assert_eq!(grant.collaborators.len(), 3);
    }

    #[test]
    fn test_parse_grant_known_entry_submitted_is_in_review() {
        let grant = parse_grant(
            "Test Beds for Higher Education, submitted to NSF. With K. Collins-Thompson (PI).",
            "Grants",
        )
        .unwrap();
        assert_eq!(grant.status, GrantStatus::InReview);
        assert_eq!(grant.collaborators, vec!["K. Collins-Thompson (PI)"]);
    }

    #[test]
    fn test_parse_grant_generic_fields() {
        let grant = parse_grant(
            r"\item[2021] \textbf{PI}, Writing Study, submitted to Spencer Foundation (\$50,000). With P. Herbst, J. Doe, and A. Roe.",
            "Awarded Grants",
        )
        .unwrap();
        assert_eq!(grant.status, GrantStatus::Awarded);
        assert_eq!(grant.year, Some(2021));
        assert_eq!(grant.role.as_deref(), Some("PI"));
        assert_eq!(grant.title, "Writing Study");
        assert_eq!(grant.funder.as_deref(), Some("Spencer Foundation"));
        assert_eq!(grant.amount.as_deref(), Some("50000"));
        assert_eq!(grant.collaborators, vec!["P. Herbst", "J. Doe", "A. Roe"]);
    }

    #[test]
    fn test_parse_grant_yearsitem_marker_years() {
        let grant = parse_grant(
            r"\yearsitem{2020--2022} \textbf{PI}, Small Study, Spencer Foundation (\$50,000).",
            "Awarded Grants",
        )
        .unwrap();
        assert_eq!(grant.years.as_deref(), Some("2020-2022"));
        assert_eq!(grant.role.as_deref(), Some("PI"));
        assert_eq!(grant.title, "Small Study");
    }

    #[test]
    fn test_parse_grant_lowercase_in_review_label_is_awarded() {
        let grant = parse_grant(r"\item[2021] \textbf{PI}, Small Study.", "Grants in review").unwrap();
        assert_eq!(grant.status, GrantStatus::Awarded);
    }

    #[test]
    fn test_parse_grant_million_amount_and_year_span() {
        let grant = parse_grant(
            r"\item[2019--2023] {\bf Senior Personnel} Geometry Study (NSF DUE), \$1.5 million.",
            "Grants In Review",
        )
        .unwrap();
        assert_eq!(grant.status, GrantStatus::InReview);
        assert_eq!(grant.year, None);
        assert_eq!(grant.years.as_deref(), Some("2019-2023"));
        assert_eq!(grant.title, "Geometry Study");
        assert_eq!(grant.funder.as_deref(), Some("NSF DUE"));
        assert_eq!(grant.amount.as_deref(), Some("1500000"));
    }

    #[test]
    fn test_parse_grant_pi_annotation_and_trailing_roles() {
        let grant = parse_grant(
            r"\textbf{Co-I}, Tutoring Dialogues, 2022-2024. With C. Brooks (co-PI) and S. Oney. PI: K. Collins-Thompson",
            "Grants",
        )
        .unwrap();
        assert_eq!(grant.years.as_deref(), Some("2022-2024"));
        assert_eq!(
            grant.collaborators,
            vec!["C. Brooks (co-PI)", "K. Collins-Thompson (PI)"]
        );
    }

    #[test]
    fn test_parse_grant_discards_without_role_or_match() {
        assert!(parse_grant(r"\item[2020] Some unrecognized grant text", "Grants").is_none());
        assert!(parse_grant(r"\item[2020] x", "Grants").is_none());
    }

    #[test]
    fn test_parse_grant_discards_without_title() {
        assert!(parse_grant(r"\textbf{PI} no title markers at all", "Grants").is_none());
    }

    #[test]
    fn test_extract_amount_variants() {
        assert_eq!(extract_amount("for $2.1 million total").as_deref(), Some("2100000"));
        assert_eq!(extract_amount("$12,435.").as_deref(), Some("12435"));
        assert_eq!(extract_amount("no money"), None);
    }
}
