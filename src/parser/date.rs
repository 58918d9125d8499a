//! Month-precision dates such as `Oct. 2023` or `October 2023`.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static MONTH_YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{3,9})\.?\s+(\d{4})\b").expect("month-year regex is valid") // Static pattern, safe to panic
});

/// Parenthesized month date inside an entry, e.g. `(Oct. 2023)`.
#[allow(clippy::expect_used)]
static PAREN_MONTH_YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*([A-Za-z]{3,9}\.?\s+\d{4})\s*\)").expect("paren month-year regex is valid") // Static pattern, safe to panic
});

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn month_number(word: &str) -> Option<usize> {
    let lower = word.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    // "Sept" is a common CV spelling alongside "Sep."
    let lower = if lower == "sept" { "sep".to_string() } else { lower };
    MONTHS
        .iter()
        .position(|month| month.starts_with(lower.as_str()))
        .map(|index| index + 1)
}

/// Converts `Oct. 2023` / `October 2023` into `2023-10`.
///
/// Returns `None` when no month name followed by a year is found.
///
/// # Example
///
/// ```
/// use cvjson_core::parser::extract_date;
///
/// assert_eq!(extract_date("Oct. 2023").as_deref(), Some("2023-10"));
/// assert_eq!(extract_date("Invalid date"), None);
/// ```
#[must_use]
pub fn extract_date(text: &str) -> Option<String> {
    MONTH_YEAR_PATTERN.captures_iter(text).find_map(|cap| {
        let month = month_number(cap.get(1)?.as_str())?;
        let year = cap.get(2)?.as_str();
        Some(format!("{year}-{month:02}"))
    })
}

/// Finds a parenthesized month date in entry text and converts it.
#[must_use]
pub fn extract_entry_date(text: &str) -> Option<String> {
    find_entry_date(text).map(|(date, _)| date)
}

/// Converted date plus the byte offset just past its closing parenthesis.
pub(crate) fn find_entry_date(text: &str) -> Option<(String, usize)> {
    PAREN_MONTH_YEAR_PATTERN.captures_iter(text).find_map(|cap| {
        let date = extract_date(cap.get(1)?.as_str())?;
        Some((date, cap.get(0)?.end()))
    })
}
