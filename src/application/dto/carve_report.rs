//! Carve report DTO

use crate::domain::entities::{FormatStats, MatchStats, Signature};
use crate::domain::repositories::StoredFile;
use humansize::{BINARY, format_size};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

/// A job the sink could not store
#[derive(Debug, Clone, Serialize)]
pub struct SinkFailure {
    pub start: u64,
    pub end: u64,
    pub extension: String,
    pub error: String,
}

/// Counters for one catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct FormatSummary {
    pub extension: String,
    pub header: String,
    #[serde(flatten)]
    pub stats: FormatStats,
}

/// Result of a carving run
#[derive(Debug, Clone, Serialize)]
pub struct CarveReport {
    /// Source description (usually its path)
    pub image: String,
    pub total_bytes: Option<u64>,
    pub bytes_scanned: u64,
    pub formats: Vec<FormatSummary>,
    pub jobs_found: u64,
    pub stored: Vec<StoredFile>,
    pub bytes_stored: u64,
    pub failures: Vec<SinkFailure>,
    /// Stopped through the cancel flag
    pub cancelled: bool,
    /// Stopped at the job limit
    pub limit_reached: bool,
    #[serde(serialize_with = "as_secs")]
    pub duration: Duration,
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl CarveReport {
    pub fn new(image: String, total_bytes: Option<u64>) -> Self {
        Self {
            image,
            total_bytes,
            bytes_scanned: 0,
            formats: Vec::new(),
            jobs_found: 0,
            stored: Vec::new(),
            bytes_stored: 0,
            failures: Vec::new(),
            cancelled: false,
            limit_reached: false,
            duration: Duration::ZERO,
        }
    }

    pub fn add_stored(&mut self, file: StoredFile) {
        self.bytes_stored += file.size();
        self.stored.push(file);
    }

    pub fn add_failure(&mut self, start: u64, end: u64, extension: &str, error: String) {
        self.failures.push(SinkFailure {
            start,
            end,
            extension: extension.to_string(),
            error,
        });
    }

    /// Attaches the matcher counters, labelled by signature
    pub fn set_stats(&mut self, signatures: &[Signature], stats: &MatchStats) {
        self.formats = stats
            .iter()
            .map(|(id, counters)| FormatSummary {
                extension: signatures[id.index()].extension().to_string(),
                header: hex::encode(signatures[id.index()].header()),
                stats: *counters,
            })
            .collect();
    }

    pub fn totals(&self) -> FormatStats {
        let mut total = FormatStats::default();
        for format in &self.formats {
            total += format.stats;
        }
        total
    }

    pub fn files_stored(&self) -> usize {
        self.stored.len()
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && !self.limit_reached
    }

    /// Returns a summary string
    pub fn summary(&self) -> String {
        let totals = self.totals();
        let mut summary = String::new();

        let _ = writeln!(
            summary,
            "Carving {}: {} files stored ({})",
            if self.is_complete() { "complete" } else { "stopped early" },
            self.files_stored(),
            format_size(self.bytes_stored, BINARY)
        );
        let _ = writeln!(
            summary,
            "Scanned {} of {} in {:.2}s across {} formats",
            format_size(self.bytes_scanned, BINARY),
            self.image,
            self.duration.as_secs_f64(),
            self.formats.len()
        );
        let _ = writeln!(
            summary,
            "Pairs resolved: {}, discarded: {} (bounds {}, orphan footers {}, unterminated headers {})",
            totals.jobs_emitted,
            totals.discarded(),
            totals.bounds_discarded,
            totals.orphan_footers,
            totals.unterminated_headers
        );

        for format in self.formats.iter().filter(|f| f.stats.headers_seen > 0) {
            let _ = writeln!(
                summary,
                "  - {} ({}): {} jobs, {} headers, {} footers",
                format.extension,
                format.header,
                format.stats.jobs_emitted,
                format.stats.headers_seen,
                format.stats.footers_seen
            );
        }

        if !self.failures.is_empty() {
            let _ = writeln!(summary, "\n{} files could not be stored", self.failures.len());
        }
        if self.cancelled {
            let _ = writeln!(summary, "Run was cancelled");
        }
        if self.limit_reached {
            let _ = writeln!(summary, "Job limit reached");
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FormatId;
    use std::path::PathBuf;

    #[test]
    fn test_summary_mentions_discards() {
        let sig = Signature::new("jpg", vec![0xFF, 0xD8], vec![0xFF, 0xD9]).unwrap();
        let mut stats = MatchStats::new(1);
        stats.entry(FormatId(0)).headers_seen = 3;
        stats.entry(FormatId(0)).jobs_emitted = 1;
        stats.entry(FormatId(0)).orphan_footers = 2;

        let mut report = CarveReport::new("disk.img".into(), Some(4096));
        report.bytes_scanned = 4096;
        report.set_stats(&[sig], &stats);
        report.add_stored(StoredFile {
            id: 1,
            location: PathBuf::from("out/00000001.jpg"),
            start: 0,
            end: 2048,
            extension: "jpg".into(),
            sha256: None,
        });

        let summary = report.summary();
        assert!(summary.contains("1 files stored (2 KiB)"));
        assert!(summary.contains("orphan footers 2"));
        assert!(summary.contains("jpg (ffd8)"));
        assert_eq!(report.totals().discarded(), 2);
    }
}
