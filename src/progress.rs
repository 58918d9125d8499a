//! Progress bar for the DOI lookup pass.

use std::io::{self, IsTerminal};

use indicatif::{ProgressBar, ProgressStyle};

/// Builds the lookup progress bar, hidden unless `visible`.
///
/// A hidden bar accepts the same calls and draws nothing, so callers never
/// branch on visibility.
pub(crate) fn lookup_progress(visible: bool, total: usize) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{pos}/{len}] Looking up DOIs {wide_bar} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// The bar is drawn only for interactive, non-quiet runs.
pub(crate) fn should_show_progress(quiet: bool) -> bool {
    !quiet && io::stderr().is_terminal()
}
