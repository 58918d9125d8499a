//! Contact and education blocks from the CV header sections.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::normalize::normalize;
use super::section::extract_section;
use crate::record::{Contact, Education};

pub const CONTACT_SECTION: &str = "Contact Information";
pub const EDUCATION_SECTION: &str = "Education";

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\be-?mail:\s*(\S+)").expect("email regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static GITHUB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bgithub:\s*(\S+)").expect("github regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static WEBPAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:webpage|website|homepage):\s*(\S+)").expect("webpage regex is valid") // Static pattern, safe to panic
});

/// Institution heading: `{\bf Name}` or `\textbf{Name}`.
#[allow(clippy::expect_used)]
static INSTITUTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\\bf\s+([^{}]*)\}|\\textbf\s*\{([^{}]*)\}").expect("institution regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static DEGREE_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\item\s*\[\s*\]").expect("degree item regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static DEGREE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?) in (.+?),\s*(.+)$").expect("degree regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static ADVISOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Advisors?:\s*([^,;]+)").expect("advisor regex is valid") // Static pattern, safe to panic
});

/// Also accepts the common misspelling "Commitee".
#[allow(clippy::expect_used)]
static COMMITTEE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Commit+ee:\s*(.+)$").expect("committee regex is valid") // Static pattern, safe to panic
});

fn capture_token(pattern: &Regex, text: &str) -> Option<String> {
    let token = pattern.captures(text)?.get(1)?.as_str();
    let token = token.trim_end_matches([',', ';', '.']);
    (!token.is_empty()).then(|| token.to_string())
}

/// Email, GitHub and webpage from the contact section.
///
/// Missing values stay `None`; a missing section yields an empty contact.
#[must_use]
pub fn parse_contact(document: &str) -> Contact {
    let text = normalize(&extract_section(document, CONTACT_SECTION));
    Contact {
        email: capture_token(&EMAIL_PATTERN, &text),
        github: capture_token(&GITHUB_PATTERN, &text),
        webpage: capture_token(&WEBPAGE_PATTERN, &text),
    }
}

/// One [`Education`] per `\item[]` degree line, grouped under the bold
/// institution heading that precedes it.
#[tracing::instrument(skip(document), fields(input_len = document.len()))]
#[must_use]
pub fn parse_education(document: &str) -> Vec<Education> {
    let section = extract_section(document, EDUCATION_SECTION);

    let headings: Vec<(usize, usize, String)> = INSTITUTION_PATTERN
        .captures_iter(&section)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let name = cap.get(1).or_else(|| cap.get(2))?;
            Some((whole.start(), whole.end(), normalize(name.as_str())))
        })
        .collect();

    let mut education = Vec::new();
    for (index, (_, body_start, institution)) in headings.iter().enumerate() {
        let body_end = headings
            .get(index + 1)
            .map_or(section.len(), |next| next.0);
        let body = &section[*body_start..body_end];

        for item in DEGREE_ITEM_PATTERN.find_iter(body) {
            let rest = &body[item.end()..];
            let line_end = [rest.find('\n'), rest.find(r"\item")]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(rest.len());
            match parse_degree_line(institution, &normalize(&rest[..line_end])) {
                Some(entry) => education.push(entry),
                None => debug!(institution = %institution, "Skipping unrecognized degree line"),
            }
        }
    }

    education
}

fn parse_degree_line(institution: &str, line: &str) -> Option<Education> {
    let advisor = capture_token(&ADVISOR_PATTERN, line).map(|a| a.trim().to_string());
    let committee = COMMITTEE_PATTERN
        .captures(line)
        .and_then(|cap| cap.get(1))
        .map(|members| {
            members
                .as_str()
                .split(',')
                .map(|member| member.trim().trim_end_matches('.').trim().to_string())
                .filter(|member| !member.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let head_end = ["Advisor", "Commit"]
        .iter()
        .filter_map(|marker| line.find(marker))
        .min()
        .unwrap_or(line.len());
    let head = line[..head_end].trim().trim_end_matches([',', ';', '.']);

    let cap = DEGREE_PATTERN.captures(head)?;
    Some(Education {
        institution: institution.to_string(),
        degree: cap.get(1)?.as_str().trim().to_string(),
        field: cap.get(2)?.as_str().trim().to_string(),
        date: cap.get(3)?.as_str().trim().to_string(),
        advisor,
        committee,
    })
}
