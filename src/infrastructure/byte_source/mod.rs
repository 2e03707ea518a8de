//! Byte source implementations

mod file_byte_source;
mod memory_byte_source;
mod mmap_byte_source;

pub use file_byte_source::FileByteSource;
pub use memory_byte_source::MemoryByteSource;
pub use mmap_byte_source::MmapByteSource;

use crate::domain::repositories::ByteSourceError;
use std::io;
use std::path::Path;

/// Maps an open failure onto the matching source error
pub(crate) fn open_error(path: &Path, err: io::Error) -> ByteSourceError {
    match err.kind() {
        io::ErrorKind::NotFound => ByteSourceError::NotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => {
            ByteSourceError::PermissionDenied(format!("{} - try running with sudo", path.display()))
        }
        _ => ByteSourceError::IoError(err),
    }
}
