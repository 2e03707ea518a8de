//! Streaming signature scanner
//!
//! Reads a byte source once, front to back, in fixed-size chunks and yields
//! every header/footer occurrence in offset order. The last
//! `longest_pattern - 1` bytes of each buffer are carried into the next one,
//! so a pattern split by a chunk boundary is still seen whole.

use crate::core::error::{CarveError, Result};
use crate::domain::entities::Occurrence;
use crate::domain::repositories::ByteSource;
use crate::domain::services::PatternIndex;
use std::collections::VecDeque;
use std::ops::{ControlFlow, Range};

/// Called after every chunk with the absolute position reached so far
pub type ChunkHook<'a> = Box<dyn FnMut(u64) -> ControlFlow<()> + Send + 'a>;

/// A finite, ordered stream of occurrences
pub trait OccurrenceStream: Iterator<Item = Result<Occurrence>> {
    /// Lower bound on the offset of every occurrence not yet yielded
    ///
    /// Once the stream is exhausted this is the end of the scanned data.
    fn frontier(&self) -> u64;

    /// True when the stream ended before reaching the end of its data
    fn is_truncated(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Reading,
    Draining,
    Done,
}

/// Single-pass occurrence iterator over a [`ByteSource`]
///
/// # Example
///
/// ```
/// use rabbit::domain::entities::{Role, Signature};
/// use rabbit::domain::services::{PatternIndex, Scanner};
/// use rabbit::infrastructure::byte_source::MemoryByteSource;
///
/// let sig = Signature::new("txt", b"<<".to_vec(), b">>".to_vec()).unwrap();
/// let index = PatternIndex::new(vec![sig]).unwrap();
/// let source = MemoryByteSource::new(b"..<<hello>>..".to_vec());
///
/// let found: Vec<_> = Scanner::new(source, &index, 4)
///     .unwrap()
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(found[0].offset, 2);
/// assert_eq!(found[1].role, Role::Footer);
/// ```
pub struct Scanner<'a, S: ByteSource> {
    source: S,
    index: &'a PatternIndex,
    chunk_size: usize,
    /// Carry bytes followed by the most recent chunk
    buffer: Vec<u8>,
    carry_len: usize,
    /// Absolute offset of the next byte to read
    position: u64,
    read_end: Option<u64>,
    owned_end: Option<u64>,
    queue: VecDeque<Occurrence>,
    scratch: Vec<Occurrence>,
    state: State,
    truncated: bool,
    hook: Option<ChunkHook<'a>>,
}

impl<'a, S: ByteSource> Scanner<'a, S> {
    /// Scans the whole source from offset 0
    pub fn new(source: S, index: &'a PatternIndex, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(CarveError::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        let state = if index.is_empty() {
            State::Done
        } else {
            State::Reading
        };

        Ok(Self {
            source,
            index,
            chunk_size,
            buffer: vec![0u8; index.carry_len() + chunk_size],
            carry_len: 0,
            position: 0,
            read_end: None,
            owned_end: None,
            queue: VecDeque::new(),
            scratch: Vec::new(),
            state,
            truncated: false,
            hook: None,
        })
    }

    /// Scans only `read` and reports only occurrences starting before `owned_end`
    ///
    /// Used by region-parallel scans: each region reads a little past its end
    /// so that patterns starting inside it are seen whole.
    pub fn with_range(
        source: S,
        index: &'a PatternIndex,
        chunk_size: usize,
        read: Range<u64>,
        owned_end: u64,
    ) -> Result<Self> {
        let mut scanner = Self::new(source, index, chunk_size)?;
        scanner.position = read.start;
        scanner.read_end = Some(read.end);
        scanner.owned_end = Some(owned_end);
        Ok(scanner)
    }

    /// Installs a callback run after each chunk; `Break` stops the scan
    pub fn with_hook(mut self, hook: ChunkHook<'a>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Absolute offset of the next byte to be read
    pub fn position(&self) -> u64 {
        self.position
    }

    fn fill(&mut self) -> Result<()> {
        let want = match self.read_end {
            Some(end) => self.chunk_size.min(end.saturating_sub(self.position) as usize),
            None => self.chunk_size,
        };
        if want == 0 {
            self.state = State::Draining;
            return Ok(());
        }

        let carry = self.carry_len;
        let read = self
            .source
            .read_chunk(self.position, &mut self.buffer[carry..carry + want])
            .map_err(|source| CarveError::SourceRead {
                // the carried tail has not been searched yet
                offset: self.position - carry as u64,
                source,
            })?;
        if read == 0 {
            self.state = State::Draining;
            return Ok(());
        }

        let filled = carry + read;
        let base = self.position - carry as u64;
        let keep = self.index.carry_len().min(filled);
        self.collect(filled, filled - keep, base);

        self.position += read as u64;
        self.buffer.copy_within(filled - keep..filled, 0);
        self.carry_len = keep;

        if let Some(hook) = self.hook.as_mut() {
            if hook(self.position).is_break() {
                // queued occurrences lie wholly inside data already read
                tracing::debug!(position = self.position, "scan stopped by caller");
                self.truncated = true;
                self.state = State::Done;
            }
        }
        Ok(())
    }

    /// Scans `buffer[..filled]`, queueing occurrences that start before `owned`
    fn collect(&mut self, filled: usize, owned: usize, base: u64) {
        self.scratch.clear();
        self.index
            .find_into(&self.buffer[..filled], owned, base, &mut self.scratch);

        let owned_end = self.owned_end.unwrap_or(u64::MAX);
        for occurrence in self.scratch.drain(..) {
            if occurrence.offset < owned_end {
                tracing::trace!(
                    format = %occurrence.format,
                    role = %occurrence.role,
                    offset = occurrence.offset,
                    "occurrence"
                );
                self.queue.push_back(occurrence);
            }
        }
    }
}

impl<S: ByteSource> Iterator for Scanner<'_, S> {
    type Item = Result<Occurrence>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(occurrence) = self.queue.pop_front() {
                return Some(Ok(occurrence));
            }

            match self.state {
                State::Done => return None,
                State::Draining => {
                    // the retained tail has never been reported
                    let carry = self.carry_len;
                    self.collect(carry, carry, self.position - carry as u64);
                    self.carry_len = 0;
                    self.state = State::Done;
                }
                State::Reading => {
                    if let Err(err) = self.fill() {
                        self.queue.clear();
                        self.state = State::Done;
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}

impl<S: ByteSource> OccurrenceStream for Scanner<'_, S> {
    fn frontier(&self) -> u64 {
        match self.queue.front() {
            Some(next) => next.offset,
            None => self.position - self.carry_len as u64,
        }
    }

    fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Streams every occurrence of `index`'s patterns in `source`
pub fn scan<S: ByteSource>(
    source: S,
    index: &PatternIndex,
    chunk_size: usize,
) -> Result<Scanner<'_, S>> {
    Scanner::new(source, index, chunk_size)
}
