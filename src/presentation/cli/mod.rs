//! CLI module

mod commands;
mod logging;
mod progress;
mod runner;

pub use commands::{Cli, Commands, ScanArgs, parse_size};
pub use logging::init_logging;
pub use progress::ProgressReporter;
pub use runner::run;
