//! Local file sink
//!
//! Copies each carved range out of the image into a numbered file and keeps
//! a manifest of everything written.

use crate::domain::repositories::{ExtractionSink, SinkError, StoredFile};
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const COPY_BUFFER: usize = 64 * 1024;
pub const MANIFEST_NAME: &str = "manifest.json";

/// Contents of `manifest.json`
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub image: String,
    pub files: Vec<StoredFile>,
}

/// Writes carved files to a local directory
///
/// Files are named `<counter:08>.<ext>` with the counter starting at 1. The
/// counter only advances for files that were written completely, so the
/// numbering has no gaps.
pub struct LocalFileSink {
    output_dir: PathBuf,
    image_path: PathBuf,
    image: Mutex<File>,
    /// Id of the last file written; held for the whole of a store
    last_id: Mutex<u64>,
    files_stored: AtomicU64,
    bytes_stored: AtomicU64,
    stored: Mutex<Vec<StoredFile>>,
}

impl LocalFileSink {
    /// Creates the output directory if needed and opens the image for reading
    pub fn new(output_dir: &Path, image_path: &Path) -> Result<Self, SinkError> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|e| {
                if e.kind() == io::ErrorKind::PermissionDenied {
                    SinkError::PermissionDenied(output_dir.display().to_string())
                } else {
                    SinkError::IoError(e)
                }
            })?;
        }
        let image = File::open(image_path)?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            image_path: image_path.to_path_buf(),
            image: Mutex::new(image),
            last_id: Mutex::new(0),
            files_stored: AtomicU64::new(0),
            bytes_stored: AtomicU64::new(0),
            stored: Mutex::new(Vec::new()),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Files stored so far, in store order
    pub fn stored(&self) -> Vec<StoredFile> {
        self.stored.lock().clone()
    }

    fn output_path(&self, id: u64, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{:08}.{}", id, extension))
    }

    /// Copies `len` image bytes from `start` into `out`, hashing as it goes
    fn copy_range(&self, start: u64, len: u64, out: &mut impl Write) -> Result<String, SinkError> {
        let mut image = self.image.lock();
        image.seek(SeekFrom::Start(start))?;
        let mut reader = (&mut *image).take(len);

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; COPY_BUFFER.min(len as usize).max(1)];
        let mut copied = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            hasher.update(&buf[..n]);
            out.write_all(&buf[..n])?;
            copied += n as u64;
        }

        if copied != len {
            return Err(SinkError::ShortRead {
                expected: len,
                actual: copied,
            });
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

impl ExtractionSink for LocalFileSink {
    fn store(&self, start: u64, end: u64, extension: &str) -> Result<StoredFile, SinkError> {
        if end <= start {
            return Err(SinkError::InvalidRange { start, end });
        }

        let mut last_id = self.last_id.lock();
        let id = *last_id + 1;
        let location = self.output_path(id, extension);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&location)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    SinkError::FileExists(location.display().to_string())
                }
                io::ErrorKind::PermissionDenied => {
                    SinkError::PermissionDenied(location.display().to_string())
                }
                _ => SinkError::IoError(e),
            })?;

        let mut writer = BufWriter::new(file);
        let digest = match self
            .copy_range(start, end - start, &mut writer)
            .and_then(|digest| {
                writer.flush()?;
                Ok(digest)
            }) {
            Ok(digest) => digest,
            Err(e) => {
                drop(writer);
                // a partial file is worse than none
                let _ = fs::remove_file(&location);
                return Err(e);
            }
        };

        *last_id = id;
        drop(last_id);

        let stored = StoredFile {
            id,
            location,
            start,
            end,
            extension: extension.to_string(),
            sha256: Some(digest),
        };

        self.files_stored.fetch_add(1, Ordering::Relaxed);
        self.bytes_stored.fetch_add(stored.size(), Ordering::Relaxed);
        self.stored.lock().push(stored.clone());

        tracing::debug!(
            id,
            start,
            end,
            path = %stored.location.display(),
            "stored carved file"
        );
        Ok(stored)
    }

    fn finish(&self) -> Result<(), SinkError> {
        let manifest = Manifest {
            image: self.image_path.display().to_string(),
            files: self.stored(),
        };
        let path = self.output_dir.join(MANIFEST_NAME);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &manifest)
            .map_err(|e| SinkError::Other(format!("failed to write manifest: {}", e)))?;
        writer.flush()?;
        tracing::info!(path = %path.display(), files = manifest.files.len(), "wrote manifest");
        Ok(())
    }

    fn files_stored(&self) -> u64 {
        self.files_stored.load(Ordering::Relaxed)
    }

    fn bytes_stored(&self) -> u64 {
        self.bytes_stored.load(Ordering::Relaxed)
    }
}
