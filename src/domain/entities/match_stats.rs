//! Matching statistics and scan progress
//!
//! Discards are structurally expected outcomes of sparse or damaged images.
//! They are counted here so the pairing policy can be checked from the
//! numbers instead of from silence.

use super::occurrence::Role;
use super::signature::FormatId;
use serde::Serialize;
use std::ops::AddAssign;

/// Counters for one format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormatStats {
    pub headers_seen: u64,
    pub footers_seen: u64,
    pub jobs_emitted: u64,
    /// Pairs whose length fell outside `min_len`/`max_len`
    pub bounds_discarded: u64,
    /// Footers with no pending header of their format
    pub orphan_footers: u64,
    /// Headers still pending at end of stream
    pub unterminated_headers: u64,
}

impl FormatStats {
    pub fn discarded(&self) -> u64 {
        self.bounds_discarded + self.orphan_footers + self.unterminated_headers
    }
}

impl AddAssign for FormatStats {
    fn add_assign(&mut self, rhs: Self) {
        self.headers_seen += rhs.headers_seen;
        self.footers_seen += rhs.footers_seen;
        self.jobs_emitted += rhs.jobs_emitted;
        self.bounds_discarded += rhs.bounds_discarded;
        self.orphan_footers += rhs.orphan_footers;
        self.unterminated_headers += rhs.unterminated_headers;
    }
}

/// Per-format counters, indexed by [`FormatId`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    formats: Vec<FormatStats>,
}

impl MatchStats {
    pub fn new(format_count: usize) -> Self {
        Self {
            formats: vec![FormatStats::default(); format_count],
        }
    }

    pub(crate) fn entry(&mut self, format: FormatId) -> &mut FormatStats {
        &mut self.formats[format.index()]
    }

    pub(crate) fn record_seen(&mut self, format: FormatId, role: Role) {
        let entry = self.entry(format);
        match role {
            Role::Header => entry.headers_seen += 1,
            Role::Footer => entry.footers_seen += 1,
        }
    }

    /// Counters for a single format
    pub fn format(&self, format: FormatId) -> FormatStats {
        self.formats.get(format.index()).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormatId, &FormatStats)> {
        self.formats
            .iter()
            .enumerate()
            .map(|(idx, stats)| (FormatId(idx), stats))
    }

    /// Sum over every format
    pub fn total(&self) -> FormatStats {
        let mut total = FormatStats::default();
        for stats in &self.formats {
            total += *stats;
        }
        total
    }

    pub fn format_count(&self) -> usize {
        self.formats.len()
    }
}

/// Progress information during a carve run
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    /// Total bytes to scan, when the source knows its length
    pub total_bytes: Option<u64>,
    pub scanned_bytes: u64,
    pub jobs_found: u64,
}

impl ScanProgress {
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            total_bytes,
            ..Default::default()
        }
    }

    /// Returns the progress percentage (0.0 - 100.0), if the total is known
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.scanned_bytes as f64 / total as f64) * 100.0
            }
        })
    }

    pub fn update(&mut self, scanned_bytes: u64, jobs_found: u64) {
        self.scanned_bytes = scanned_bytes;
        self.jobs_found = jobs_found;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_sums_formats() {
        let mut stats = MatchStats::new(2);
        stats.record_seen(FormatId(0), Role::Header);
        stats.record_seen(FormatId(1), Role::Header);
        stats.record_seen(FormatId(1), Role::Footer);
        stats.entry(FormatId(1)).orphan_footers += 1;

        let total = stats.total();
        assert_eq!(total.headers_seen, 2);
        assert_eq!(total.footers_seen, 1);
        assert_eq!(total.discarded(), 1);
    }

    #[test]
    fn test_progress_percentage() {
        let mut progress = ScanProgress::new(Some(200));
        progress.update(50, 1);
        assert_eq!(progress.percentage(), Some(25.0));
        assert_eq!(ScanProgress::new(None).percentage(), None);
    }
}
