//! Progress reporting

use indicatif::{ProgressBar, ProgressStyle};

/// Returns a progress bar with `len` steps, or a hidden one if `quiet`.
///
/// * `len`   - Number of steps.
/// * `quiet` - Suppress output.
pub fn create_progress_reporter(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(len);
    match ProgressStyle::default_bar().template("{msg} [{elapsed_precise}] {bar:40} {pos}/{len} ETA: {eta}") {
        Ok(style) => progress.set_style(style),
        Err(err) => warn!("Invalid progress bar template: {err}"),
    }
    progress
}
