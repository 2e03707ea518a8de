//! Carve job entity
//!
//! A resolved byte range to extract, tied to one format.

use super::signature::FormatId;
use serde::Serialize;

/// How the end of a carve job was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Closure {
    /// Paired with a footer occurrence
    Footer,
    /// Footerless format, cut at `max_len` (or at the end of the image)
    MaxLength,
}

/// A resolved `[start, end)` range of the image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CarveJob {
    #[serde(skip)]
    format: FormatId,
    extension: String,
    start: u64,
    end: u64,
    closure: Closure,
}

impl CarveJob {
    pub(crate) fn new(
        format: FormatId,
        extension: &str,
        start: u64,
        end: u64,
        closure: Closure,
    ) -> Self {
        debug_assert!(start < end, "carve job must be non-empty");
        Self {
            format,
            extension: extension.to_string(),
            start,
            end,
            closure,
        }
    }

    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Inclusive start offset
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Exclusive end offset
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn closure(&self) -> Closure {
        self.closure
    }
}
