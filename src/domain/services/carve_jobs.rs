//! Lazy carve pipeline: occurrences in, carve jobs out

use crate::core::error::Result;
use crate::domain::entities::{CarveJob, MatchStats};
use crate::domain::repositories::ByteSource;
use crate::domain::services::{OccurrenceStream, PairMatcher, PatternIndex, Scanner};

/// Pull-based sequence of resolved carve jobs
///
/// Dropping it at any point is a clean cancellation: jobs are only produced
/// for fully closed pairs, so nothing is left half-done.
pub struct CarveJobs<'a, T: OccurrenceStream> {
    stream: T,
    matcher: PairMatcher<'a>,
    exhausted: bool,
    failed: bool,
}

impl<'a, T: OccurrenceStream> CarveJobs<'a, T> {
    pub fn new(stream: T, index: &'a PatternIndex) -> Self {
        Self {
            stream,
            matcher: PairMatcher::new(index.signatures()),
            exhausted: false,
            failed: false,
        }
    }

    /// Lower bound on the offset of anything not yet scanned
    pub fn position(&self) -> u64 {
        self.stream.frontier()
    }

    pub fn stats(&self) -> &MatchStats {
        self.matcher.stats()
    }

    pub fn into_stats(self) -> MatchStats {
        self.matcher.into_stats()
    }

    /// True when the underlying scan was stopped early
    pub fn is_truncated(&self) -> bool {
        self.stream.is_truncated()
    }
}

impl<'a, S: ByteSource> CarveJobs<'a, Scanner<'a, S>> {
    /// Scans `source` from the start and pairs what it finds
    pub fn from_source(source: S, index: &'a PatternIndex, chunk_size: usize) -> Result<Self> {
        Ok(Self::new(Scanner::new(source, index, chunk_size)?, index))
    }
}

impl<T: OccurrenceStream> Iterator for CarveJobs<'_, T> {
    type Item = Result<CarveJob>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(job) = self.matcher.pop_ready(self.stream.frontier()) {
                return Some(Ok(job));
            }
            if self.exhausted {
                return None;
            }

            match self.stream.next() {
                Some(Ok(occurrence)) => self.matcher.push(occurrence),
                Some(Err(err)) => {
                    self.failed = true;
                    return Some(Err(err));
                }
                None => {
                    self.exhausted = true;
                    if self.stream.is_truncated() {
                        // stopped mid-image: nothing past this point is final
                        return None;
                    }
                    self.matcher.finish(self.stream.frontier());
                }
            }
        }
    }
}

/// Streams the carve jobs found in `source`
pub fn carve_jobs<S: ByteSource>(
    source: S,
    index: &PatternIndex,
    chunk_size: usize,
) -> Result<CarveJobs<'_, Scanner<'_, S>>> {
    CarveJobs::from_source(source, index, chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Signature;
    use crate::infrastructure::byte_source::MemoryByteSource;

    fn jobs(data: &[u8], sigs: Vec<Signature>, chunk: usize) -> Vec<(String, u64, u64)> {
        let index = PatternIndex::new(sigs).unwrap();
        carve_jobs(MemoryByteSource::new(data.to_vec()), &index, chunk)
            .unwrap()
            .map(|j| j.map(|j| (j.extension().to_string(), j.start(), j.end())))
            .collect::<Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_exact_pair_across_chunks() {
        let sig = Signature::new("txt", b"HEADER".to_vec(), b"footer".to_vec()).unwrap();
        let mut data = vec![0u8; 100];
        data[7..13].copy_from_slice(b"HEADER");
        data[60..66].copy_from_slice(b"footer");
        assert_eq!(jobs(&data, vec![sig], 10), vec![("txt".to_string(), 7, 66)]);
    }

    #[test]
    fn test_empty_catalog_yields_nothing() {
        assert!(jobs(b"whatever", vec![], 4).is_empty());
    }

    #[test]
    fn test_footerless_clamped_at_end_of_image() {
        let sig = Signature::footerless("bmp", b"BM".to_vec(), 1000).unwrap();
        let data = b"....BM......".to_vec();
        assert_eq!(jobs(&data, vec![sig], 5), vec![("bmp".to_string(), 4, 12)]);
    }

    #[test]
    fn test_stats_available_after_run() {
        let sig = Signature::new("x", b"<".to_vec(), b">".to_vec()).unwrap();
        let index = PatternIndex::new(vec![sig]).unwrap();
        let mut pipeline = carve_jobs(MemoryByteSource::new(b"> <> <".to_vec()), &index, 2).unwrap();
        let found: Vec<_> = pipeline.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(found.len(), 1);

        let total = pipeline.stats().total();
        assert_eq!(total.orphan_footers, 1);
        assert_eq!(total.unterminated_headers, 1);
        assert_eq!(total.jobs_emitted, 1);
    }
}
