//! Occurrence events produced by the scanner

use super::signature::FormatId;
use serde::Serialize;
use std::fmt;

/// Which end of a file a pattern marks
///
/// `Footer` orders before `Header` so that, at a shared offset, a closing
/// pattern is seen before an opening one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Footer,
    Header,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Header => write!(f, "header"),
            Role::Footer => write!(f, "footer"),
        }
    }
}

/// A single detected instance of a signature pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub format: FormatId,
    pub role: Role,
    /// Absolute byte position in the image
    pub offset: u64,
    pub pattern_len: usize,
}

impl Occurrence {
    pub fn new(format: FormatId, role: Role, offset: u64, pattern_len: usize) -> Self {
        Self {
            format,
            role,
            offset,
            pattern_len,
        }
    }

    /// Offset one past the last byte of the matched pattern
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.pattern_len as u64
    }

    /// Total order used for yielding: offset, then role, then format
    #[inline]
    pub(crate) fn sort_key(&self) -> (u64, Role, FormatId) {
        (self.offset, self.role, self.format)
    }
}
