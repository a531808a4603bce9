use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{FormatErrorPolicy, ScanOptions};
use crate::error::{FormatError, Result, ScanError};
use crate::sender::SenderRecord;
use crate::stats::ScanResult;
use crate::{emlx, locator, sender};

/// What one message file contributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Sender(SenderRecord),
    Deleted,
    NoSender,
}

/// Parses one file and extracts its sender.
pub fn process_file(path: &Path) -> std::result::Result<FileOutcome, FormatError> {
    debug!(action = "process", component = "scan", file_path = ?path, "Processing message file");
    let parsed = emlx::parse(path)?;

    Ok(match sender::extract(&parsed) {
        Some(record) => FileOutcome::Sender(record),
        None if parsed.header("From").is_some() => FileOutcome::Deleted,
        None => FileOutcome::NoSender,
    })
}

/// Walks `options.root` and counts the senders of every non-deleted message.
///
/// Files are folded into the stats in walk order whether or not they were
/// parsed in parallel, so the result does not depend on the worker count.
pub fn scan(options: &ScanOptions) -> Result<ScanResult> {
    let start_time = Instant::now();
    info!(action = "start", component = "scan", root = ?options.root, "Starting mail folder scan");

    let files = locator::locate(&options.root)?;
    let mut result = ScanResult::default();

    match options.worker_threads() {
        Some(workers) => {
            let paths: Vec<PathBuf> = files.collect();
            info!(action = "configure", component = "scan", worker_count = workers, file_count = paths.len(), "Using workers for parsing");

            let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;
            let outcomes: Vec<_> =
                pool.install(|| paths.par_iter().map(|path| process_file(path)).collect());

            for (path, outcome) in paths.iter().zip(outcomes) {
                fold_outcome(&mut result, path, outcome, options)?;
            }
        }
        None => {
            for path in files {
                let outcome = process_file(&path);
                fold_outcome(&mut result, &path, outcome, options)?;
            }
        }
    }

    let summary = &result.summary;
    info!(
        action = "complete",
        component = "scan",
        files_seen = summary.files_seen,
        messages_counted = summary.messages_counted,
        deleted = summary.deleted,
        without_sender = summary.without_sender,
        unparsed_senders = summary.unparsed_senders,
        malformed_skipped = summary.malformed_skipped,
        unique_addresses = result.stats.addresses.len(),
        unique_domains = result.stats.domains.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Scan completed"
    );

    Ok(result)
}

fn fold_outcome(
    result: &mut ScanResult,
    path: &Path,
    outcome: std::result::Result<FileOutcome, FormatError>,
    options: &ScanOptions,
) -> Result<()> {
    let summary = &mut result.summary;
    summary.files_seen += 1;

    match outcome {
        Ok(FileOutcome::Sender(record)) => {
            if record.address.is_empty() {
                debug!(action = "parse", component = "sender", file_path = ?path, "Sender address not recognized");
                summary.unparsed_senders += 1;
            }
            summary.messages_counted += 1;
            result.stats.add(&record, options.empty_domains);
        }
        Ok(FileOutcome::Deleted) => summary.deleted += 1,
        Ok(FileOutcome::NoSender) => summary.without_sender += 1,
        Err(source) => match options.on_format_error {
            FormatErrorPolicy::Abort => {
                return Err(ScanError::Format {
                    path: path.to_path_buf(),
                    source,
                });
            }
            FormatErrorPolicy::Skip => {
                warn!(action = "skip", component = "scan", file_path = ?path, error = %source, "Skipping malformed message file");
                summary.malformed_skipped += 1;
            }
        },
    }

    Ok(())
}
