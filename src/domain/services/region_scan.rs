//! Region-parallel scanning
//!
//! Splits an image of known length into contiguous regions, scans each with
//! its own source handle on the rayon pool, and concatenates the results.
//! Every region reads `longest_pattern - 1` bytes past its end but only
//! reports occurrences starting inside itself, so the merged sequence is
//! ascending and free of duplicates.
//!
//! Workers report their progress through a shared observer after every
//! chunk. When the observer returns `Break`, every region stops at its next
//! chunk and the merge ends at the first region that did not finish.

use crate::core::error::{CarveError, Result};
use crate::domain::entities::Occurrence;
use crate::domain::repositories::ByteSource;
use crate::domain::services::{ChunkHook, OccurrenceStream, PatternIndex, Scanner};
use rayon::prelude::*;
use std::ops::{ControlFlow, Range};
use std::vec;

/// Occurrences of a finished parallel scan, in offset order
#[derive(Debug)]
pub struct MergedOccurrences {
    events: vec::IntoIter<Occurrence>,
    stream_end: u64,
    truncated: bool,
}

impl MergedOccurrences {
    pub fn new(events: Vec<Occurrence>, stream_end: u64) -> Self {
        Self {
            events: events.into_iter(),
            stream_end,
            truncated: false,
        }
    }

    /// Occurrences of a scan stopped early; everything before `reached` was seen
    pub fn stopped_at(events: Vec<Occurrence>, reached: u64) -> Self {
        Self {
            truncated: true,
            ..Self::new(events, reached)
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl Iterator for MergedOccurrences {
    type Item = Result<Occurrence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.next().map(Ok)
    }
}

impl OccurrenceStream for MergedOccurrences {
    fn frontier(&self) -> u64 {
        self.events
            .as_slice()
            .first()
            .map_or(self.stream_end, |next| next.offset)
    }

    fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// What one region worker saw
struct RegionScan {
    events: Vec<Occurrence>,
    /// Offset up to which the region was fully scanned
    reached: u64,
    truncated: bool,
}

/// Owned regions covering `[0, total)` in at most `workers` pieces
pub fn plan_regions(total: u64, workers: usize) -> Vec<Range<u64>> {
    if total == 0 {
        return Vec::new();
    }
    let workers = workers.max(1) as u64;
    let region_len = total.div_ceil(workers).max(1);

    (0..total)
        .step_by(region_len as usize)
        .map(|start| start..(start + region_len).min(total))
        .collect()
}

/// Scans `source` with one worker per region
///
/// `source` must know its total length. Each worker gets its own handle
/// from [`ByteSource::try_clone`].
pub fn scan_parallel<S: ByteSource>(
    source: &S,
    index: &PatternIndex,
    chunk_size: usize,
    workers: usize,
) -> Result<MergedOccurrences> {
    scan_parallel_with(source, index, chunk_size, workers, &|_: u64| ControlFlow::Continue(()))
}

/// Like [`scan_parallel`], calling `observe` after every chunk of every region
///
/// `observe` receives the number of bytes of the image newly scanned by that
/// chunk. Returning `Break` stops the scan.
pub fn scan_parallel_with<S, F>(
    source: &S,
    index: &PatternIndex,
    chunk_size: usize,
    workers: usize,
    observe: &F,
) -> Result<MergedOccurrences>
where
    S: ByteSource,
    F: Fn(u64) -> ControlFlow<()> + Sync,
{
    let total = source.total_length().ok_or_else(|| {
        CarveError::InvalidConfig(format!(
            "parallel scan needs a source of known length: {}",
            source.describe()
        ))
    })?;
    if chunk_size == 0 {
        return Err(CarveError::InvalidConfig(
            "chunk size must be greater than zero".to_string(),
        ));
    }

    let overlap = index.carry_len() as u64;
    let regions = plan_regions(total, workers);
    let mut jobs = Vec::with_capacity(regions.len());
    for region in regions {
        let handle = source
            .try_clone()
            .map_err(|source| CarveError::SourceRead {
                offset: region.start,
                source,
            })?;
        jobs.push((region, handle));
    }

    tracing::info!(
        regions = jobs.len(),
        total,
        overlap,
        "starting region-parallel scan"
    );

    let results: Vec<Result<RegionScan>> = jobs
        .into_par_iter()
        .map(|(region, handle)| scan_region(handle, index, chunk_size, region, total, observe))
        .collect();

    let mut events = Vec::new();
    for result in results {
        let region = result?;
        events.extend(region.events);
        if region.truncated {
            tracing::debug!(reached = region.reached, "parallel scan stopped by caller");
            return Ok(MergedOccurrences::stopped_at(events, region.reached));
        }
    }
    Ok(MergedOccurrences::new(events, total))
}

fn scan_region<S, F>(
    handle: S,
    index: &PatternIndex,
    chunk_size: usize,
    region: Range<u64>,
    total: u64,
    observe: &F,
) -> Result<RegionScan>
where
    S: ByteSource,
    F: Fn(u64) -> ControlFlow<()> + Sync,
{
    let read = region.start..(region.end + index.carry_len() as u64).min(total);
    let owned_end = region.end;
    let mut reported = region.start;
    let hook: ChunkHook<'_> = Box::new(move |position| {
        // bytes read past the region belong to its neighbour
        let owned = position.min(owned_end);
        let delta = owned.saturating_sub(reported);
        reported = owned;
        observe(delta)
    });

    let mut scanner = Scanner::with_range(handle, index, chunk_size, read, owned_end)?.with_hook(hook);
    let events = scanner.by_ref().collect::<Result<Vec<_>>>()?;
    Ok(RegionScan {
        events,
        reached: scanner.frontier().min(owned_end),
        truncated: scanner.is_truncated(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{FormatId, Role, Signature};
    use crate::infrastructure::byte_source::MemoryByteSource;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_plan_regions_covers_everything() {
        assert_eq!(plan_regions(10, 3), vec![0..4, 4..8, 8..10]);
        assert_eq!(plan_regions(2, 8), vec![0..1, 1..2]);
        assert!(plan_regions(0, 4).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sig = Signature::new("x", b"HEAD".to_vec(), b"TAIL".to_vec()).unwrap();
        let index = PatternIndex::new(vec![sig]).unwrap();

        let mut data = vec![b'.'; 97];
        for at in [0usize, 20, 24, 48, 53, 72, 93] {
            let pattern: &[u8] = if at % 2 == 0 { b"HEAD" } else { b"TAIL" };
            data[at..at + 4].copy_from_slice(pattern);
        }
        let source = MemoryByteSource::new(data);

        let sequential: Vec<Occurrence> = Scanner::new(source.clone(), &index, 7)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let parallel: Vec<Occurrence> = scan_parallel(&source, &index, 7, 4)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(sequential.len(), 7);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_observer_sees_every_byte_once() {
        let sig = Signature::new("x", b"HEAD".to_vec(), b"TAIL".to_vec()).unwrap();
        let index = PatternIndex::new(vec![sig]).unwrap();
        let source = MemoryByteSource::new(vec![0u8; 1000]);

        let seen = AtomicU64::new(0);
        let merged = scan_parallel_with(&source, &index, 64, 3, &|bytes: u64| {
            seen.fetch_add(bytes, Ordering::Relaxed);
            ControlFlow::Continue(())
        })
        .unwrap();

        assert!(!merged.is_truncated());
        assert_eq!(seen.load(Ordering::Relaxed), 1000);
    }

    #[test]
    fn test_break_stops_every_region() {
        let sig = Signature::new("x", b"HEAD".to_vec(), b"TAIL".to_vec()).unwrap();
        let index = PatternIndex::new(vec![sig]).unwrap();
        let mut data = vec![b'.'; 4096];
        data[0..4].copy_from_slice(b"HEAD");
        data[4000..4004].copy_from_slice(b"TAIL");
        let source = MemoryByteSource::new(data);

        let calls = AtomicU64::new(0);
        let mut merged = scan_parallel_with(&source, &index, 16, 4, &|_: u64| {
            calls.fetch_add(1, Ordering::Relaxed);
            ControlFlow::Break(())
        })
        .unwrap();

        // one chunk per region, then every worker gives up
        assert_eq!(calls.load(Ordering::Relaxed), 4);
        assert!(merged.is_truncated());
        assert_eq!(merged.frontier(), 0);
        assert_eq!(merged.next().unwrap().unwrap().offset, 0);
        assert!(merged.next().is_none());
        assert_eq!(merged.frontier(), 13);
    }

    #[test]
    fn test_frontier_tracks_next_event() {
        let mut merged =
            MergedOccurrences::new(vec![Occurrence::new(FormatId(0), Role::Header, 42, 2)], 100);
        assert_eq!(merged.frontier(), 42);
        merged.next();
        assert_eq!(merged.frontier(), 100);
    }
}
