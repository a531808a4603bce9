//! Scan configuration

use crate::args::Args;
use std::path::PathBuf;

/// What to do with a message file that cannot be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatErrorPolicy {
    /// Log the file, count it as skipped and carry on
    #[default]
    Skip,
    /// Stop the whole scan with an error
    Abort,
}

/// Whether an empty domain (from a sender whose address could not be
/// parsed) gets its own row in the domain counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyDomainPolicy {
    #[default]
    Skip,
    Count,
}

/// Options for one scan of a mail folder tree
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Root folder to walk
    pub root: PathBuf,

    /// Parse files on this many threads; sequential when `None`, one per
    /// CPU (up to 8) when `Some(0)`
    pub workers: Option<usize>,

    pub on_format_error: FormatErrorPolicy,

    pub empty_domains: EmptyDomainPolicy,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Worker thread count for parallel parsing, `None` to stay sequential.
    pub fn worker_threads(&self) -> Option<usize> {
        match self.workers? {
            0 => Some(std::cmp::min(num_cpus::get(), 8)),
            1 => None,
            n => Some(n),
        }
    }
}

impl From<&Args> for ScanOptions {
    fn from(args: &Args) -> Self {
        Self {
            root: args.path.clone(),
            workers: args.workers,
            on_format_error: if args.strict {
                FormatErrorPolicy::Abort
            } else {
                FormatErrorPolicy::Skip
            },
            empty_domains: if args.count_unparsed_domains {
                EmptyDomainPolicy::Count
            } else {
                EmptyDomainPolicy::Skip
            },
        }
    }
}
