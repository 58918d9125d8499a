//! cvjson Core Library
//!
//! Extracts publications, talks and grants from a LaTeX CV into structured
//! records and writes them as JSON.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Section, entry and field extraction from LaTeX source
//! - [`record`] - Output data model and post-extraction validation
//! - [`output`] - Reading the CV and writing the JSON document
//! - [`enrich`] - Optional DOI lookup against Crossref and OpenAlex

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod enrich;
pub mod output;
pub mod parser;
pub mod record;

// Re-export commonly used types
pub use enrich::{DoiEnricher, DoiSource, EnrichOptions, EnrichSummary, LookupError};
pub use output::{CvError, read_document, to_json, write_document};
pub use parser::{ExtractOptions, SectionLabels, parse_document, parse_grant, parse_publication};
pub use record::{
    CvDocument, Entry, EntryType, GrantRecord, GrantStatus, Status, ValidationIssue,
    validate_entry,
};
