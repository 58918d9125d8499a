//! CLI entry point for the CV extractor.

use anyhow::{Context, Result, bail};
use clap::Parser;
use cvjson_core::enrich::DoiEnricher;
use cvjson_core::output::{read_document, write_document};
use cvjson_core::parser::parse_document;
use cvjson_core::record::{CvDocument, validate_entry};
use tracing::{debug, info, warn};

mod cli;
mod config;
mod progress;

use cli::Args;
use config::{Settings, load_config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let loaded = load_config(args.config.as_deref())?;
    if let (Some(path), Some(_)) = (&loaded.path, &loaded.config) {
        debug!(path = %path.display(), "Loaded config file");
    }
    let settings = Settings::resolve(&args, loaded.config.as_ref());

    let source = read_document(&args.input)?;
    info!(path = %args.input.display(), "Extracting CV");

    let mut cv = parse_document(&source, &settings.extract);

    if args.verbose > 0 {
        print_entries(&cv);
    }

    let issues = report_validation(&cv);
    if args.strict && issues > 0 {
        bail!("{issues} validation issue(s) found; not writing output in strict mode");
    }

    if args.enrich_dois {
        enrich_publications(&mut cv, &settings, &args).await?;
    }

    write_document(&cv, &args.output)?;
    info!(
        path = %args.output.display(),
        records = cv.len(),
        "Output written"
    );

    if !args.quiet {
        println!(
            "Wrote {} publications, {} talks, {} grants to {}",
            cv.publications.len(),
            cv.talks.len(),
            cv.grants.len(),
            args.output.display()
        );
    }

    Ok(())
}

fn print_entries(cv: &CvDocument) {
    for entry in cv.publications.iter().chain(&cv.talks) {
        println!("  Added {entry}");
    }
    for grant in &cv.grants {
        println!("  Added {grant}");
    }
}

/// Logs every validation issue and returns how many were found.
fn report_validation(cv: &CvDocument) -> usize {
    let mut count = 0;
    for entry in cv.publications.iter().chain(&cv.talks) {
        for issue in validate_entry(entry) {
            warn!(title = %entry.title, %issue, "Validation issue");
            count += 1;
        }
    }
    count
}

async fn enrich_publications(cv: &mut CvDocument, settings: &Settings, args: &Args) -> Result<()> {
    let enricher =
        DoiEnricher::public(&settings.enrich).context("Failed to set up DOI lookup clients")?;

    let missing = cv.publications.iter().filter(|p| p.doi.is_none()).count();
    info!(missing, "Looking up missing DOIs");

    let bar = progress::lookup_progress(
        progress::should_show_progress(args.quiet),
        cv.publications.len(),
    );
    let verbose = args.verbose > 0;

    let summary = enricher
        .enrich_entries(&mut cv.publications, |entry| {
            if verbose && let Some(doi) = &entry.doi {
                bar.suspend(|| println!("  DOI {doi} for {}", entry.title));
            }
            bar.inc(1);
        })
        .await;
    bar.finish_and_clear();

    if !args.quiet {
        println!(
            "Found {} of {} missing DOIs",
            summary.found, summary.looked_up
        );
    }
    Ok(())
}
