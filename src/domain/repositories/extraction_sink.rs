//! Extraction sink trait
//!
//! Defines the interface for persisting a resolved byte range.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when storing a carved range
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Short read: expected {expected} bytes from the image, got {actual}")]
    ShortRead { expected: u64, actual: u64 },

    #[error("Invalid range {start}..{end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("Sink error: {0}")]
    Other(String),
}

/// Receipt for one stored carve job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    /// Identifier assigned by the sink, unique within a run
    pub id: u64,
    /// Where the sink placed the data
    pub location: PathBuf,
    pub start: u64,
    pub end: u64,
    pub extension: String,
    /// Hex-encoded SHA-256 of the stored bytes, when the sink computes one
    pub sha256: Option<String>,
}

impl StoredFile {
    pub fn size(&self) -> u64 {
        self.end - self.start
    }
}

/// Trait for persisting carve jobs
///
/// Implementations serialize their own naming counter, so `store` takes
/// `&self` and may be called from several producers.
///
/// # Example
///
/// ```ignore
/// let sink = LocalFileSink::new(Path::new("recovered"), Path::new("disk.img"))?;
/// let stored = sink.store(1024, 4096, "jpg")?;
/// println!("Saved to: {}", stored.location.display());
/// ```
pub trait ExtractionSink: Send + Sync {
    /// Stores image bytes `[start, end)` as a new file of type `extension`
    fn store(&self, start: u64, end: u64, extension: &str) -> Result<StoredFile, SinkError>;

    /// Called once after the last job of a run
    fn finish(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Returns the number of files stored so far
    fn files_stored(&self) -> u64;

    /// Returns the total bytes stored so far
    fn bytes_stored(&self) -> u64;
}
