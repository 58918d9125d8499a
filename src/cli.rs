//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Extract publications, talks and grants from a LaTeX CV into JSON.
///
/// Reads the CV source, splits it into sections and entries, and writes one
/// JSON document with `publications`, `talks` and `grants` arrays.
#[derive(Parser, Debug)]
#[command(name = "cv-to-json")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the LaTeX CV source
    #[arg(default_value = "cv/CV.tex")]
    pub input: PathBuf,

    /// Path of the JSON file to write
    #[arg(short, long, default_value = "data/cv.json")]
    pub output: PathBuf,

    /// Print per-entry progress (-v), raise log level (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Look up missing publication DOIs on Crossref and OpenAlex
    #[arg(long)]
    pub enrich_dois: bool,

    /// Contact email sent to the DOI services (polite pool)
    #[arg(long, value_name = "EMAIL")]
    pub mailto: Option<String>,

    /// Also extract contact details and education
    #[arg(long)]
    pub profile: bool,

    /// Exit with an error if any extracted entry fails validation
    #[arg(long)]
    pub strict: bool,

    /// Heading of the publications section
    #[arg(long, value_name = "LABEL")]
    pub publications_section: Option<String>,

    /// Heading of the talks section
    #[arg(long, value_name = "LABEL")]
    pub talks_section: Option<String>,

    /// Heading of the grants section
    #[arg(long, value_name = "LABEL")]
    pub grants_section: Option<String>,

    /// Pause after each DOI request in milliseconds (max 60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub request_delay_ms: Option<u64>,

    /// Attempts per DOI request, including the first (1-10)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: Option<u32>,

    /// Minimum title similarity for accepting a DOI (0.0-1.0)
    #[arg(long, value_parser = parse_confidence)]
    pub min_confidence: Option<f64>,

    /// Read settings from this file instead of the default config path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn parse_confidence(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0.0..=1.0"))
    }
}
