//! Pattern index service
//!
//! Builds one Aho-Corasick automaton over every header and footer of the
//! loaded signatures, so a chunk is scanned once no matter how many formats
//! the catalog holds (O(n + m + z) per buffer).

use crate::core::error::Result;
use crate::domain::entities::{FormatId, Occurrence, Role, Signature};
use crate::domain::repositories::SignatureCatalog;
use aho_corasick::AhoCorasick;
use std::collections::HashMap;

/// Multi-pattern index over a fixed set of signatures
///
/// Identical byte patterns (e.g. two formats sharing a footer) are stored
/// once and tagged with every `(format, role)` that uses them.
///
/// # Example
///
/// ```
/// use rabbit::domain::entities::Signature;
/// use rabbit::domain::services::PatternIndex;
///
/// let sig = Signature::new("jpg", vec![0xFF, 0xD8, 0xFF], vec![0xFF, 0xD9]).unwrap();
/// let index = PatternIndex::new(vec![sig]).unwrap();
/// assert_eq!(index.longest_pattern(), 3);
/// assert_eq!(index.carry_len(), 2);
/// ```
#[derive(Debug)]
pub struct PatternIndex {
    signatures: Vec<Signature>,
    /// `None` when there is nothing to look for
    matcher: Option<AhoCorasick>,
    /// Pattern id -> every (format, role) using that pattern
    tags: Vec<Vec<(FormatId, Role)>>,
    /// Pattern id -> pattern length
    lengths: Vec<usize>,
    longest: usize,
}

impl PatternIndex {
    /// Builds the index; the order of `signatures` defines each [`FormatId`]
    pub fn new(signatures: Vec<Signature>) -> Result<Self> {
        let mut patterns: Vec<Vec<u8>> = Vec::new();
        let mut tags: Vec<Vec<(FormatId, Role)>> = Vec::new();
        let mut by_content: HashMap<Vec<u8>, usize> = HashMap::new();

        for (idx, sig) in signatures.iter().enumerate() {
            let format = FormatId(idx);
            let roles = std::iter::once((sig.header(), Role::Header))
                .chain(sig.footer().map(|f| (f, Role::Footer)));

            for (bytes, role) in roles {
                let pattern_id = *by_content.entry(bytes.to_vec()).or_insert_with(|| {
                    patterns.push(bytes.to_vec());
                    tags.push(Vec::new());
                    patterns.len() - 1
                });
                tags[pattern_id].push((format, role));
            }
        }

        let lengths: Vec<usize> = patterns.iter().map(Vec::len).collect();
        let longest = lengths.iter().copied().max().unwrap_or(0);
        let matcher = if patterns.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&patterns)?)
        };

        Ok(Self {
            signatures,
            matcher,
            tags,
            lengths,
            longest,
        })
    }

    /// Builds the index from the signatures a catalog scans by default
    pub fn from_catalog(catalog: &dyn SignatureCatalog) -> Result<Self> {
        Self::new(catalog.select(&[])?)
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn signature(&self, format: FormatId) -> &Signature {
        &self.signatures[format.index()]
    }

    pub fn format_count(&self) -> usize {
        self.signatures.len()
    }

    /// Number of distinct byte patterns in the automaton
    pub fn pattern_count(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_none()
    }

    pub fn longest_pattern(&self) -> usize {
        self.longest
    }

    /// Bytes a chunked scan must carry from one buffer into the next
    pub fn carry_len(&self) -> usize {
        self.longest.saturating_sub(1)
    }

    /// Finds every pattern occurrence in `buffer` starting before `owned`
    ///
    /// `base` is the absolute offset of `buffer[0]`. Matches starting at or
    /// after `owned` are left for the next buffer, which rescans that tail.
    /// Found occurrences are appended to `out` sorted by offset, then role
    /// (footers first), then format.
    pub fn find_into(&self, buffer: &[u8], owned: usize, base: u64, out: &mut Vec<Occurrence>) {
        let Some(matcher) = &self.matcher else {
            return;
        };

        let first = out.len();
        for mat in matcher.find_overlapping_iter(buffer) {
            if mat.start() >= owned {
                continue;
            }
            let pattern_id = mat.pattern().as_usize();
            let offset = base + mat.start() as u64;
            for &(format, role) in &self.tags[pattern_id] {
                out.push(Occurrence::new(
                    format,
                    role,
                    offset,
                    self.lengths[pattern_id],
                ));
            }
        }
        out[first..].sort_unstable_by_key(Occurrence::sort_key);
    }
}
