use anyhow::Result;
use clap::Parser;
use tracing::error;

use emlx_senders::utils::setup_logging;
use emlx_senders::{render_sections, scan, Args, ScanOptions};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let options = ScanOptions::from(&args);
    match scan(&options) {
        Ok(result) => {
            print!("{}", render_sections(&result.stats, args.threshold));
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Scan failed");
            std::process::exit(1);
        }
    }
}
