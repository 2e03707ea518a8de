//! Data Transfer Objects

mod carve_options;
mod carve_report;

pub use carve_options::CarveOptions;
pub use carve_report::{CarveReport, FormatSummary, SinkFailure};
