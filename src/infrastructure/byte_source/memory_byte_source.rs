//! In-memory byte source

use crate::domain::repositories::{ByteSource, ByteSourceError};
use std::sync::Arc;

/// Byte source over an owned buffer; clones share the buffer
#[derive(Debug, Clone)]
pub struct MemoryByteSource {
    data: Arc<[u8]>,
}

impl MemoryByteSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Arc::from(data.into()),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for MemoryByteSource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteSource for MemoryByteSource {
    fn read_chunk(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, ByteSourceError> {
        let size = self.data.len() as u64;
        if offset > size {
            return Err(ByteSourceError::InvalidOffset {
                offset,
                source_size: size,
            });
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn total_length(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn try_clone(&self) -> Result<Self, ByteSourceError> {
        Ok(self.clone())
    }

    fn describe(&self) -> &str {
        "<memory>"
    }
}
