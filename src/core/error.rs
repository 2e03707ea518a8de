use crate::domain::repositories::{ByteSourceError, CatalogError, SinkError};
use thiserror::Error;

/// Errors that abort or fail part of a carve run
#[derive(Error, Debug)]
pub enum CarveError {
    /// The byte source failed; `offset` is the last successfully processed
    /// absolute offset, from which a later run could resume.
    #[error("Read failed after offset {offset}: {source}")]
    SourceRead {
        offset: u64,
        #[source]
        source: ByteSourceError,
    },

    #[error("Failed to store range {start}..{end}: {source}")]
    SinkWrite {
        start: u64,
        end: u64,
        #[source]
        source: SinkError,
    },

    #[error("Failed to finalize output: {0}")]
    SinkFinish(#[source] SinkError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pattern index error: {0}")]
    PatternIndex(#[from] aho_corasick::BuildError),
}

pub type Result<T> = std::result::Result<T, CarveError>;
