//! Domain entities
//!
//! Core objects of the carving domain: signatures, the occurrences the
//! scanner finds, and the carve jobs the pair matcher resolves.

mod carve_job;
mod match_stats;
mod occurrence;
mod signature;

pub use carve_job::{CarveJob, Closure};
pub use match_stats::{FormatStats, MatchStats, ScanProgress};
pub use occurrence::{Occurrence, Role};
pub use signature::{FormatId, Signature, SignatureError};
