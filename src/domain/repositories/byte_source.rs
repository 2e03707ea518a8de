//! Byte source trait
//!
//! Defines the interface for reading raw bytes from an image. The scanner
//! only needs a sequential, seekable supplier of chunks; this abstraction
//! lets it run over files, memory maps or plain buffers alike.

use std::io;
use thiserror::Error;

/// Errors that can occur when reading from a byte source
#[derive(Error, Debug)]
pub enum ByteSourceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid offset: {offset} exceeds source size {source_size}")]
    InvalidOffset { offset: u64, source_size: u64 },

    #[error("Source error: {0}")]
    Other(String),
}

/// Trait for reading raw data from an image
///
/// Callers read with strictly increasing offsets, each equal to the previous
/// offset plus the previous chunk's length. A return value of `0` signals
/// end of stream.
///
/// # Example
///
/// ```ignore
/// let mut source = FileByteSource::open("disk.img")?;
/// let mut buf = vec![0u8; 4096];
/// let n = source.read_chunk(0, &mut buf)?;
/// ```
pub trait ByteSource: Send {
    /// Reads up to `buf.len()` bytes starting at `offset`
    ///
    /// Returns the number of bytes placed at the front of `buf`. Short reads
    /// are only allowed at the end of the source.
    fn read_chunk(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, ByteSourceError>;

    /// Total length in bytes, when known
    fn total_length(&self) -> Option<u64>;

    /// Opens an independent handle over the same image
    ///
    /// Parallel scanning gives each worker its own handle; handles are never
    /// shared for concurrent reads.
    fn try_clone(&self) -> Result<Self, ByteSourceError>
    where
        Self: Sized;

    /// Human-readable description of the source (usually a path)
    fn describe(&self) -> &str;
}
