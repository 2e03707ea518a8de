//! Carve options DTO

use crate::core::error::{CarveError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options for a carving run
#[derive(Debug, Clone)]
pub struct CarveOptions {
    /// Bytes read from the source per chunk
    pub chunk_size: usize,
    /// Worker count; 1 scans sequentially
    pub threads: usize,
    /// Extensions to carve (empty = every catalog format)
    pub extensions: Vec<String>,
    /// Stop after this many jobs
    pub max_jobs: Option<u64>,
    /// Abort on the first sink failure instead of recording it
    pub fail_fast: bool,
    /// Set from another thread to stop the run
    pub cancel: Arc<AtomicBool>,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            chunk_size: 4 * 1024 * 1024, // 4MB chunks
            threads: 1,
            extensions: Vec::new(),
            max_jobs: None,
            fail_fast: false,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CarveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_max_jobs(mut self, max_jobs: u64) -> Self {
        self.max_jobs = Some(max_jobs);
        self
    }

    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Shares an externally owned cancel flag
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(CarveError::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(CarveError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = CarveOptions::default();
        assert_eq!(options.chunk_size, 4 * 1024 * 1024);
        assert_eq!(options.threads, 1);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(CarveOptions::new().with_chunk_size(0).validate().is_err());
        assert!(CarveOptions::new().with_threads(0).validate().is_err());
    }
}
