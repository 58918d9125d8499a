//! Section and subsection boundary extraction.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

/// Subsection heading in either spelling, capturing the label.
#[allow(clippy::expect_used)]
static SUBSECTION_HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\subsection\*?\s*\{\s*(?:\\sc\s+)?([^{}]*?)\s*\}")
        .expect("subsection heading regex is valid") // Static pattern, safe to panic
});

/// A labelled block of entries inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subsection {
    /// Heading label verbatim, without the small-caps marker.
    pub label: String,
    /// Raw text between this heading and the next.
    pub text: String,
}

fn section_pattern(label: &str, small_caps: bool) -> Option<Regex> {
    let marker = if small_caps { r"\\sc\s+" } else { "" };
    let pattern = format!(
        r"(?s)\\section\*?\s*\{{\s*{marker}(?i:{})[^{{}}]*\}}(.*?)(?:\\section\*?\s*\{{|\\end\{{document\}}|\z)",
        regex::escape(label)
    );
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(label, error = %e, "Could not build section pattern");
            None
        }
    }
}

/// Returns the raw text of the section headed `label`.
///
/// The small-caps spelling `\section{\sc Label}` is tried first, then the
/// plain `\section{Label}`. A heading matches when it starts with `label`,
/// ignoring case, so `Invited Talks and Guest Lectures` is found under
/// `Invited Talks`. The captured text runs to the next `\section`,
/// `\end{document}`, or the end of the input. A missing section is logged and
/// yields an empty string.
///
/// # Example
///
/// ```
/// use cvjson_core::parser::extract_section;
///
/// let doc = r"\section{\sc Grants}\item one\section{\sc Service}\item two";
/// assert_eq!(extract_section(doc, "Grants"), r"\item one");
/// assert_eq!(extract_section(doc, "Teaching"), "");
/// ```
#[tracing::instrument(skip(document), fields(input_len = document.len()))]
#[must_use]
pub fn extract_section(document: &str, label: &str) -> String {
    for small_caps in [true, false] {
        let Some(pattern) = section_pattern(label, small_caps) else {
            continue;
        };
        if let Some(inner) = pattern.captures(document).and_then(|cap| cap.get(1)) {
            let text = inner.as_str().trim();
            debug!(label, small_caps, chars = text.len(), "Found section");
            return text.to_string();
        }
    }

    warn!(label, "Section not found");
    String::new()
}

/// Splits section text into subsections by `\subsection` headings.
///
/// Text before the first heading is kept under `section_label` when it holds
/// any `\item`; otherwise it is heading noise and dropped. A section with no
/// subsection headings becomes a single subsection labelled `section_label`.
#[must_use]
pub fn split_subsections(section_text: &str, section_label: &str) -> Vec<Subsection> {
    let headings: Vec<_> = SUBSECTION_HEADING_PATTERN
        .captures_iter(section_text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let label = cap.get(1)?;
            Some((whole.start(), whole.end(), label.as_str().trim().to_string()))
        })
        .collect();

    let mut subsections = Vec::new();
    let preamble_end = headings.first().map_or(section_text.len(), |h| h.0);
    let preamble = &section_text[..preamble_end];
    if preamble.contains(r"\item") {
        subsections.push(Subsection {
            label: section_label.to_string(),
            text: preamble.trim().to_string(),
        });
    }

    for (index, (_, body_start, label)) in headings.iter().enumerate() {
        let body_end = headings
            .get(index + 1)
            .map_or(section_text.len(), |next| next.0);
        subsections.push(Subsection {
            label: label.clone(),
            text: section_text[*body_start..body_end].trim().to_string(),
        });
    }

    if subsections.is_empty() && !section_text.trim().is_empty() {
        debug!(section_label, "Section has no entries or headings");
    }

    subsections
}
