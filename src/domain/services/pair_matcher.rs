//! Header/footer pair matcher
//!
//! Pairs each footer with the most recent unmatched header of the same
//! format (LIFO), the closest-enclosing-region rule that also handles one
//! file nested inside another of the same type.

use crate::domain::entities::{
    CarveJob, Closure, FormatId, MatchStats, Occurrence, Role, Signature,
};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A job waiting for the stream to pass its end offset
#[derive(Debug)]
struct Scheduled {
    end: u64,
    seq: u64,
    job: CarveJob,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.end, self.seq).cmp(&(other.end, other.seq))
    }
}

/// Per-format pairing state machine
///
/// Jobs are released in non-decreasing `end` order: a resolved job waits
/// until the caller reports (through the `frontier` of [`pop_ready`]) that
/// no occurrence before its end is still to come.
///
/// [`pop_ready`]: PairMatcher::pop_ready
#[derive(Debug)]
pub struct PairMatcher<'a> {
    signatures: &'a [Signature],
    pending_headers: Vec<Vec<Occurrence>>,
    scheduled: BinaryHeap<Reverse<Scheduled>>,
    seq: u64,
    stats: MatchStats,
    finished: bool,
}

impl<'a> PairMatcher<'a> {
    pub fn new(signatures: &'a [Signature]) -> Self {
        Self {
            signatures,
            pending_headers: vec![Vec::new(); signatures.len()],
            scheduled: BinaryHeap::new(),
            seq: 0,
            stats: MatchStats::new(signatures.len()),
            finished: false,
        }
    }

    /// Applies one occurrence; occurrences must arrive in offset order
    pub fn push(&mut self, event: Occurrence) {
        debug_assert!(!self.finished, "push after finish");
        self.stats.record_seen(event.format, event.role);
        let signatures = self.signatures;
        let sig = &signatures[event.format.index()];

        match event.role {
            Role::Header => match (sig.footer(), sig.max_len()) {
                (None, Some(max_len)) => {
                    self.schedule(
                        event.format,
                        event.offset,
                        event.offset.saturating_add(max_len),
                        Closure::MaxLength,
                    );
                }
                _ => self.pending_headers[event.format.index()].push(event),
            },
            Role::Footer => {
                let Some(header) = self.pending_headers[event.format.index()].pop() else {
                    self.stats.entry(event.format).orphan_footers += 1;
                    tracing::debug!(
                        extension = sig.extension(),
                        offset = event.offset,
                        reason = "orphan_footer",
                        "discarded"
                    );
                    return;
                };

                let (start, end) = (header.offset, event.end());
                if sig.accepts_len(end - start) {
                    self.schedule(event.format, start, end, Closure::Footer);
                } else {
                    self.stats.entry(event.format).bounds_discarded += 1;
                    tracing::debug!(
                        extension = sig.extension(),
                        start,
                        end,
                        reason = "bounds",
                        "discarded"
                    );
                }
            }
        }
    }

    fn schedule(&mut self, format: FormatId, start: u64, end: u64, closure: Closure) {
        let extension = self.signatures[format.index()].extension();
        self.scheduled.push(Reverse(Scheduled {
            end,
            seq: self.seq,
            job: CarveJob::new(format, extension, start, end, closure),
        }));
        self.seq += 1;
    }

    /// Releases the next job ending at or before `frontier`
    ///
    /// `frontier` must be a lower bound on the offset of every occurrence
    /// not yet pushed. Once [`finish`](Self::finish) has run every job is
    /// released.
    pub fn pop_ready(&mut self, frontier: u64) -> Option<CarveJob> {
        let ready = match self.scheduled.peek() {
            Some(Reverse(next)) => self.finished || next.end <= frontier,
            None => false,
        };
        if !ready {
            return None;
        }

        let Reverse(next) = self.scheduled.pop()?;
        self.stats.entry(next.job.format()).jobs_emitted += 1;
        tracing::debug!(
            extension = next.job.extension(),
            start = next.job.start(),
            end = next.job.end(),
            "carve job resolved"
        );
        Some(next.job)
    }

    /// Ends the stream at `stream_end`
    ///
    /// Pending headers are unterminated and dropped. Footerless jobs running
    /// past the end of the data are cut at `stream_end` and re-checked
    /// against their format's bounds.
    pub fn finish(&mut self, stream_end: u64) {
        if self.finished {
            return;
        }
        self.finished = true;
        let signatures = self.signatures;

        for (idx, pending) in self.pending_headers.iter_mut().enumerate() {
            if pending.is_empty() {
                continue;
            }
            let extension = signatures[idx].extension();
            self.stats.entry(FormatId(idx)).unterminated_headers += pending.len() as u64;
            for header in pending.drain(..) {
                tracing::debug!(
                    extension,
                    offset = header.offset,
                    reason = "unterminated_header",
                    "discarded"
                );
            }
        }

        let scheduled = std::mem::take(&mut self.scheduled);
        for Reverse(mut item) in scheduled.into_vec() {
            if item.end > stream_end {
                let sig = &signatures[item.job.format().index()];
                let start = item.job.start();
                if stream_end <= start || !sig.accepts_len(stream_end - start) {
                    self.stats.entry(item.job.format()).bounds_discarded += 1;
                    tracing::debug!(
                        extension = sig.extension(),
                        start,
                        end = stream_end,
                        reason = "bounds",
                        "discarded"
                    );
                    continue;
                }
                item.end = stream_end;
                item.job = CarveJob::new(
                    item.job.format(),
                    sig.extension(),
                    start,
                    stream_end,
                    item.job.closure(),
                );
            }
            self.scheduled.push(Reverse(item));
        }
    }

    /// Number of headers currently waiting for a footer
    pub fn pending_headers(&self, format: FormatId) -> usize {
        self.pending_headers
            .get(format.index())
            .map_or(0, Vec::len)
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn into_stats(self) -> MatchStats {
        self.stats
    }
}
