//! File-backed byte source
//!
//! Reads an image file or a block device with positioned reads. Block
//! devices report a zero metadata length, so the size falls back to seeking
//! to the end.

use super::open_error;
use crate::domain::repositories::{ByteSource, ByteSourceError};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Byte source over a regular file or device node
#[derive(Debug)]
pub struct FileByteSource {
    file: File,
    path: PathBuf,
    label: String,
    size: u64,
    cursor: u64,
}

impl FileByteSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ByteSourceError> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| open_error(path, e))?;

        let mut size = file.metadata()?.len();
        if size == 0 {
            size = file.seek(SeekFrom::End(0))?;
            file.seek(SeekFrom::Start(0))?;
        }

        tracing::debug!(path = %path.display(), size, "opened image file");

        Ok(Self {
            file,
            path: path.to_path_buf(),
            label: path.display().to_string(),
            size,
            cursor: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl ByteSource for FileByteSource {
    fn read_chunk(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, ByteSourceError> {
        if offset > self.size {
            return Err(ByteSourceError::InvalidOffset {
                offset,
                source_size: self.size,
            });
        }
        if offset != self.cursor {
            self.file.seek(SeekFrom::Start(offset))?;
            self.cursor = offset;
        }

        // Fill the buffer completely unless the file ends first
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // position is unknown after a failed read
                    self.cursor = u64::MAX;
                    return Err(e.into());
                }
            }
        }
        self.cursor = offset + filled as u64;
        Ok(filled)
    }

    fn total_length(&self) -> Option<u64> {
        Some(self.size)
    }

    fn try_clone(&self) -> Result<Self, ByteSourceError> {
        Self::open(&self.path)
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

    fn image(data: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_open_nonexistent() {
        let err = FileByteSource::open("/nonexistent/image.dd").unwrap_err();
        assert!(matches!(err, ByteSourceError::NotFound(_)));
    }

    #[test]
    fn test_sequential_reads_short_at_end() {
        let file = image(b"0123456789");
        let mut source = FileByteSource::open(file.path()).unwrap();
        assert_eq!(source.total_length(), Some(10));

        let mut buf = [0u8; 4];
        assert_eq!(source.read_chunk(0, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(source.read_chunk(4, &mut buf).unwrap(), 4);
        assert_eq!(source.read_chunk(8, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"89");
        assert_eq!(source.read_chunk(10, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_clone_reads_independently() {
        let file = image(b"abcdef");
        let mut first = FileByteSource::open(file.path()).unwrap();
        let mut second = first.try_clone().unwrap();

        let mut a = [0u8; 3];
        let mut b = [0u8; 3];
        first.read_chunk(3, &mut a).unwrap();
        second.read_chunk(0, &mut b).unwrap();
        assert_eq!(&a, b"def");
        assert_eq!(&b, b"abc");
    }
}
