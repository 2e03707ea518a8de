//! Extraction sink implementations

mod job_listing_sink;
mod local_file_sink;

pub use job_listing_sink::JobListingSink;
pub use local_file_sink::{LocalFileSink, Manifest};
