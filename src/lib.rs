pub mod args;
pub mod config;
pub mod domain;
pub mod emlx;
pub mod error;
pub mod locator;
pub mod report;
pub mod scan;
pub mod sender;
pub mod stats;
pub mod utils;

pub use args::Args;
pub use config::{EmptyDomainPolicy, FormatErrorPolicy, ScanOptions};
pub use error::{FormatError, ScanError};
pub use report::{render_sections, Report};
pub use scan::scan;
pub use stats::{AddressStats, DomainStats, ScanResult, ScanSummary, SenderStats};
