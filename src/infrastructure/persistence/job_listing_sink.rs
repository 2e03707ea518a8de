//! JSON-lines job listing
//!
//! A sink that records where each file would be carved from without copying
//! any bytes. Used by `rabbit scan`.

use crate::domain::repositories::{ExtractionSink, SinkError, StoredFile};
use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Serialize)]
struct JobLine<'a> {
    id: u64,
    extension: &'a str,
    start: u64,
    end: u64,
    length: u64,
}

/// Writes one JSON object per job to `W`
pub struct JobListingSink<W: Write + Send> {
    out: Mutex<W>,
    counter: AtomicU64,
    bytes: AtomicU64,
}

impl<W: Write + Send> JobListingSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            counter: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> ExtractionSink for JobListingSink<W> {
    fn store(&self, start: u64, end: u64, extension: &str) -> Result<StoredFile, SinkError> {
        if end <= start {
            return Err(SinkError::InvalidRange { start, end });
        }
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let line = JobLine {
            id,
            extension,
            start,
            end,
            length: end - start,
        };

        {
            let mut out = self.out.lock();
            serde_json::to_writer(&mut *out, &line)
                .map_err(|e| SinkError::Other(e.to_string()))?;
            out.write_all(b"\n")?;
        }
        self.bytes.fetch_add(end - start, Ordering::Relaxed);

        Ok(StoredFile {
            id,
            location: PathBuf::from(format!("{:08}.{}", id, extension)),
            start,
            end,
            extension: extension.to_string(),
            sha256: None,
        })
    }

    fn finish(&self) -> Result<(), SinkError> {
        self.out.lock().flush()?;
        Ok(())
    }

    fn files_stored(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    fn bytes_stored(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_one_line_per_job() {
        let sink = JobListingSink::new(Vec::new());
        sink.store(10, 20, "jpg").unwrap();
        sink.store(30, 31, "png").unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.files_stored(), 2);
        assert_eq!(sink.bytes_stored(), 11);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            r#"{"id":1,"extension":"jpg","start":10,"end":20,"length":10}"#
        );
        assert_eq!(lines.len(), 2);
    }
}
