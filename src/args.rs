use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "emlx-senders",
    about = "Extract \"From\" addresses from emails in a folder of .emlx files",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to the folder containing .emlx files
    pub path: PathBuf,

    /// Only show addresses that appear at least this many times
    #[arg(short, long, default_value_t = 2)]
    pub threshold: u32,

    /// Be verbose
    #[arg(short, long)]
    pub verbose: bool,

    /// Parse files on this many threads (0 or no value: one per CPU, up to 8)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "0")]
    pub workers: Option<usize>,

    /// Abort on the first message file that cannot be decoded
    #[arg(long)]
    pub strict: bool,

    /// Count senders with an unparseable address under an empty domain
    #[arg(long)]
    pub count_unparsed_domains: bool,
}
