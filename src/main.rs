//! Syncscan CLI: collect a report, compare two reports, copy the differences.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use syncscan::engine::arg_parser::Cli;
use syncscan::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
