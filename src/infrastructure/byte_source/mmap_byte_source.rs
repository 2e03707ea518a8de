//! Memory-mapped byte source
//!
//! Maps the whole image once; clones share the mapping, so region workers
//! read the same pages without reopening the file.

use super::open_error;
use crate::domain::repositories::{ByteSource, ByteSourceError};
use memmap2::Mmap;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

/// Byte source backed by a read-only memory map
///
/// # Example
///
/// ```ignore
/// let mut source = MmapByteSource::open("disk.img")?;
/// let mut buf = vec![0u8; 512];
/// source.read_chunk(0, &mut buf)?;
/// ```
#[derive(Debug, Clone)]
pub struct MmapByteSource {
    mmap: Arc<Mmap>,
    label: Arc<str>,
}

impl MmapByteSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ByteSourceError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| open_error(path, e))?;

        if file.metadata()?.len() == 0 {
            return Err(ByteSourceError::Other(format!(
                "{} has zero size and cannot be memory-mapped",
                path.display()
            )));
        }

        // SAFETY: the map is read-only; concurrent truncation of the image
        // by another process is outside what a carving run supports.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| {
            ByteSourceError::Other(format!("failed to memory-map {}: {}", path.display(), e))
        })?;

        Ok(Self {
            mmap: Arc::new(mmap),
            label: Arc::from(path.display().to_string()),
        })
    }

    /// The mapped image
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }
}

impl ByteSource for MmapByteSource {
    fn read_chunk(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, ByteSourceError> {
        let size = self.mmap.len() as u64;
        if offset > size {
            return Err(ByteSourceError::InvalidOffset {
                offset,
                source_size: size,
            });
        }
        let start = offset as usize;
        let n = buf.len().min(self.mmap.len() - start);
        buf[..n].copy_from_slice(&self.mmap[start..start + n]);
        Ok(n)
    }

    fn total_length(&self) -> Option<u64> {
        Some(self.mmap.len() as u64)
    }

    fn try_clone(&self) -> Result<Self, ByteSourceError> {
        Ok(self.clone())
    }

    fn describe(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_mmap_open_nonexistent() {
        assert!(MmapByteSource::open("/nonexistent/file").is_err());
    }

    #[test]
    fn test_mmap_rejects_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let err = MmapByteSource::open(file.path()).unwrap_err();
        assert!(matches!(err, ByteSourceError::Other(_)));
    }

    #[test]
    fn test_mmap_read_chunk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Hello, memory-mapped world!").unwrap();
        file.flush().unwrap();

        let mut source = MmapByteSource::open(file.path()).unwrap();
        let mut buf = [0u8; 5];
        assert_eq!(source.read_chunk(0, &mut buf).unwrap(), 5);
        assert_eq!(&buf, b"Hello");

        let mut tail = [0u8; 16];
        assert_eq!(source.read_chunk(21, &mut tail).unwrap(), 6);
        assert_eq!(&tail[..6], b"world!");
    }
}
