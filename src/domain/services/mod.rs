//! Domain services
//!
//! The carving core: the shared pattern index, the streaming scanner, the
//! pair matcher, and the pipeline that joins them.

mod carve_jobs;
mod pair_matcher;
mod pattern_index;
mod region_scan;
mod scanner;

pub use carve_jobs::{CarveJobs, carve_jobs};
pub use pair_matcher::PairMatcher;
pub use pattern_index::PatternIndex;
pub use region_scan::{MergedOccurrences, plan_regions, scan_parallel, scan_parallel_with};
pub use scanner::{ChunkHook, OccurrenceStream, Scanner, scan};
