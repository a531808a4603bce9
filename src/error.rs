//! Error types for scanning a mail archive

use std::path::PathBuf;
use thiserror::Error;

/// Failure to decode a single `.emlx` file into headers and metadata
#[derive(Error, Debug)]
pub enum FormatError {
    /// The file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No newline-terminated length line at the start of the file
    #[error("missing byte-length line")]
    MissingLength,

    /// The length line is not a decimal integer
    #[error("invalid byte-length line: {0:?}")]
    InvalidLength(String),

    /// Fewer message bytes follow the length line than it declares
    #[error("message truncated: declared {declared} bytes, found {available}")]
    Truncated { declared: usize, available: usize },

    /// The message header block could not be parsed
    #[error("header error: {0}")]
    Headers(#[from] mailparse::MailParseError),

    /// The trailing property list could not be decoded
    #[error("metadata error: {0}")]
    Metadata(#[from] plist::Error),
}

/// Errors that stop a scan
#[derive(Error, Debug)]
pub enum ScanError {
    /// Root folder missing or unreadable
    #[error("cannot read {}: {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A message file was malformed and the scan runs in strict mode
    #[error("malformed message file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// The worker pool could not be started
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;
