//! End-to-end merge pipeline: CSV + existing collection → merged collection.

use std::path::Path;
use std::time::Instant;

use tracing::{info, instrument};

use qamerge_shared::{MergeConfig, QaMergeError, Result};

use crate::collection;
use crate::merge::{self, MatchOptions};
use crate::summary::MergeSummary;
use crate::tabular::{self, TabularOptions};

/// Result of [`run_merge`].
#[derive(Debug)]
pub struct MergeReport {
    /// Counts and breakdowns for the run.
    pub summary: MergeSummary,
    /// Whether the existing collection was present on disk.
    pub base_found: bool,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &MergeReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &MergeReport) {}
}

/// Run the merge.
///
/// 1. Read the tabular input
/// 2. Load the existing collection, if any
/// 3. Merge, manual rows winning
/// 4. Write the output atomically (skipped on dry run)
///
/// Every failure happens before the output is touched, except a failed
/// write, which leaves the previous output in place.
#[instrument(skip_all, fields(input = %config.input.display(), output = %config.output.display()))]
pub fn run_merge(config: &MergeConfig, progress: &dyn ProgressReporter) -> Result<MergeReport> {
    let start = Instant::now();

    check_output_distinct(config)?;

    progress.phase("Reading manual Q&A rows");
    let manual = tabular::read_tabular(
        &config.input,
        &TabularOptions {
            delimiter: config.delimiter,
        },
    )?;
    let manual_rows = manual.len();

    progress.phase("Loading existing collection");
    let base = collection::load_collection(&config.collection)?;
    let base_found = base.is_some();

    progress.phase("Merging");
    let options = MatchOptions {
        collapse_whitespace: config.collapse_whitespace,
    };
    let outcome = merge::merge(base.unwrap_or_default(), manual, &options);

    let sha256 = if config.dry_run {
        info!("dry run, output not written");
        None
    } else {
        progress.phase("Writing merged collection");
        Some(collection::write_collection(&config.output, &outcome.records)?)
    };

    let summary = MergeSummary::from_outcome(&outcome, manual_rows, config.output.clone(), sha256);
    let report = MergeReport {
        summary,
        base_found,
        elapsed: start.elapsed(),
    };

    info!(
        before = report.summary.before,
        after = report.summary.after,
        replaced = report.summary.replaced,
        added = report.summary.added,
        superseded = report.summary.superseded,
        elapsed_ms = report.elapsed.as_millis(),
        "merge complete"
    );

    progress.done(&report);
    Ok(report)
}

/// Refuse to overwrite either input.
fn check_output_distinct(config: &MergeConfig) -> Result<()> {
    for (label, input) in [("tabular input", &config.input), ("collection", &config.collection)] {
        if same_file(&config.output, input) {
            return Err(QaMergeError::config(format!(
                "output path {} is the same as the {label}; inputs are never modified",
                config.output.display()
            )));
        }
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
