use anyhow::{Context, Result};
use clap::Parser;
use rabbit::presentation::cli::{Cli, init_logging, run};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::Relaxed) {
            // second Ctrl-C: give up immediately
            std::process::exit(130);
        }
        eprintln!("\nInterrupted; finishing the current file...");
    })
    .context("Failed to install Ctrl-C handler")?;

    run(cli, cancel)
}
