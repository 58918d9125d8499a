//! LaTeX markup to plain text.

use std::sync::LazyLock;

use regex::Regex;

/// `\textbf{x}` and friends, innermost first (no nested braces inside).
#[allow(clippy::expect_used)]
static FORMAT_COMMAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:textbf|textit|emph|underline|texttt|textsc|textrm|textsf|textup|mbox|uline)\s*\{([^{}]*)\}",
    )
    .expect("format command regex is valid") // Static pattern, safe to panic
});

/// Old-style declarations: `{\bf x}`, `{\it x}`, `{\em x}`, `{\sc x}`.
#[allow(clippy::expect_used)]
static FORMAT_DECLARATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\\(?:bf|it|em|sc|sl|tt|bfseries|itshape|scshape)\s+([^{}]*)\}")
        .expect("format declaration regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static HREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\href\s*\{[^{}]*\}\s*\{([^{}]*)\}").expect("href regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\url\s*\{([^{}]*)\}").expect("url regex is valid") // Static pattern, safe to panic
});

/// `\begin{itemize}`, `\end{list3}`, `\item[2023]`, `\yearsitem{2023}`,
/// `\vspace{2mm}` and similar.
#[allow(clippy::expect_used)]
static STRUCTURAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:begin|end|vspace|hspace|label|yearsitem)\*?\s*\{[^{}]*\}|\\item\s*\[[^\]]*\]",
    )
    .expect("structural regex is valid") // Static pattern, safe to panic
});

/// Any other control word, with an optional star and optional `[...]` argument.
#[allow(clippy::expect_used)]
static COMMAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\[A-Za-z]+\*?(?:\[[^\]]*\])?").expect("command regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static DASH_RUN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("dash run regex is valid")); // Static pattern, safe to panic

#[allow(clippy::expect_used)]
static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid")); // Static pattern, safe to panic

/// Escaped characters and their visible form. `\\` (line break) becomes a space.
const ESCAPES: &[(&str, &str)] = &[
    (r"\\", " "),
    (r"\&", "&"),
    (r"\%", "%"),
    (r"\$", "$"),
    (r"\#", "#"),
    (r"\_", "_"),
    (r"\{", ""),
    (r"\}", ""),
    (r"\,", " "),
    (r"\ ", " "),
    ("~", " "),
];

/// Resolves LaTeX markup to its visible text.
///
/// Formatting wrappers are unwrapped to their content, hyperlinks to their
/// label, structural commands and leftover braces are dropped, and whitespace
/// is collapsed. The output contains no backslashes or braces, so applying the
/// function again returns it unchanged.
///
/// # Example
///
/// ```
/// use cvjson_core::parser::normalize;
///
/// assert_eq!(
///     normalize(r"\textbf{Ion, M.}, Herbst, P. \textit{Journal}"),
///     "Ion, M., Herbst, P. Journal"
/// );
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut current = HREF_PATTERN.replace_all(text, "$1").into_owned();
    current = URL_PATTERN.replace_all(&current, "$1").into_owned();

    // Unwrap until stable so nested wrappers resolve from the inside out.
    loop {
        let unwrapped = FORMAT_COMMAND_PATTERN
            .replace_all(&current, "$1")
            .into_owned();
        let unwrapped = FORMAT_DECLARATION_PATTERN
            .replace_all(&unwrapped, "$1")
            .into_owned();
        if unwrapped == current {
            break;
        }
        current = unwrapped;
    }

    current = STRUCTURAL_PATTERN.replace_all(&current, " ").into_owned();

    for (escaped, visible) in ESCAPES {
        current = current.replace(escaped, visible);
    }

    current = COMMAND_PATTERN.replace_all(&current, " ").into_owned();
    current.retain(|c| c != '{' && c != '}' && c != '\\');
    current = DASH_RUN_PATTERN.replace_all(&current, "-").into_owned();

    WHITESPACE_PATTERN
        .replace_all(&current, " ")
        .trim()
        .to_string()
}

/// Removes LaTeX comments (`%` to end of line) while keeping escaped `\%`.
///
/// Applied once to the whole document before any section lookup.
#[must_use]
pub fn strip_comments(document: &str) -> String {
    let mut out = String::with_capacity(document.len());
    for line in document.lines() {
        let mut escaped = false;
        let mut cut = line.len();
        for (index, ch) in line.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '%' => {
                    cut = index;
                    break;
                }
                _ => {}
            }
        }
        out.push_str(&line[..cut]);
        out.push('\n');
    }
    out
}
