//! Carve image use case
//!
//! Scans an image for signature pairs and hands every resolved job to an
//! extraction sink as soon as it is final.

use crate::application::dto::{CarveOptions, CarveReport};
use crate::core::error::{CarveError, Result};
use crate::domain::entities::ScanProgress;
use crate::domain::repositories::{ByteSource, ExtractionSink, SignatureCatalog};
use crate::domain::services::{
    CarveJobs, ChunkHook, OccurrenceStream, PatternIndex, Scanner, scan_parallel_with,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(&ScanProgress) + Send + Sync>;

/// Carve image use case
pub struct CarveImageUseCase {
    catalog: Arc<dyn SignatureCatalog>,
}

impl CarveImageUseCase {
    pub fn new(catalog: Arc<dyn SignatureCatalog>) -> Self {
        Self { catalog }
    }

    /// Executes the carve
    ///
    /// Sink failures are recorded in the report unless `options.fail_fast`
    /// is set. A read failure aborts the run. The sink is finished either
    /// way, so whatever was stored before an error stays accounted for.
    pub fn execute<S, K>(
        &self,
        source: S,
        sink: &K,
        options: &CarveOptions,
        progress: Option<ProgressCallback>,
    ) -> Result<CarveReport>
    where
        S: ByteSource,
        K: ExtractionSink + ?Sized,
    {
        options.validate()?;
        let started = Instant::now();

        let index = PatternIndex::new(self.catalog.select(&options.extensions)?)?;
        let mut report = CarveReport::new(source.describe().to_string(), source.total_length());

        tracing::info!(
            image = %report.image,
            size = ?report.total_bytes,
            formats = index.format_count(),
            patterns = index.pattern_count(),
            chunk_size = options.chunk_size,
            threads = options.threads,
            "starting carve"
        );

        let outcome = self.scan_into(source, &index, sink, options, progress, &mut report);

        // finish on every path; the scan error wins
        let finished = sink.finish();
        if let Err(err) = outcome {
            if let Err(finish_err) = finished {
                tracing::warn!(error = %finish_err, "failed to finalize output after aborted run");
            }
            return Err(err);
        }
        finished.map_err(CarveError::SinkFinish)?;

        report.cancelled = options.is_cancelled();
        report.duration = started.elapsed();

        let totals = report.totals();
        tracing::info!(
            jobs = report.jobs_found,
            stored = report.files_stored(),
            failed = report.failures.len(),
            discarded = totals.discarded(),
            elapsed = ?report.duration,
            "carve finished"
        );

        Ok(report)
    }

    fn scan_into<S, K>(
        &self,
        source: S,
        index: &PatternIndex,
        sink: &K,
        options: &CarveOptions,
        progress: Option<ProgressCallback>,
        report: &mut CarveReport,
    ) -> Result<()>
    where
        S: ByteSource,
        K: ExtractionSink + ?Sized,
    {
        let jobs_found = AtomicU64::new(0);
        let parallel = options.threads > 1 && source.total_length().is_some();
        if options.threads > 1 && !parallel {
            tracing::warn!("image length unknown; falling back to a sequential scan");
        }

        if parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.threads)
                .build()
                .map_err(|e| CarveError::InvalidConfig(format!("thread pool: {}", e)))?;

            let total = report.total_bytes;
            let scanned = AtomicU64::new(0);
            let observe = |bytes: u64| {
                let at = scanned.fetch_add(bytes, Ordering::Relaxed) + bytes;
                if let Some(callback) = progress.as_ref() {
                    let mut snapshot = ScanProgress::new(total);
                    snapshot.update(at, 0);
                    callback(&snapshot);
                }
                keep_going(options)
            };
            let (chunk_size, threads) = (options.chunk_size, options.threads);
            let merged = pool.install(move || {
                scan_parallel_with(&source, index, chunk_size, threads, &observe)
            })?;

            let jobs = CarveJobs::new(merged, index);
            self.drain(jobs, index, sink, options, &jobs_found, report)
        } else {
            let hook = progress_hook(
                source.total_length(),
                options,
                &jobs_found,
                progress.as_ref(),
            );
            let scanner = Scanner::new(source, index, options.chunk_size)?.with_hook(hook);
            let jobs = CarveJobs::new(scanner, index);
            self.drain(jobs, index, sink, options, &jobs_found, report)
        }
    }

    /// Pulls jobs into the sink until the stream ends or the run is stopped
    fn drain<T, K>(
        &self,
        mut jobs: CarveJobs<'_, T>,
        index: &PatternIndex,
        sink: &K,
        options: &CarveOptions,
        jobs_found: &AtomicU64,
        report: &mut CarveReport,
    ) -> Result<()>
    where
        T: OccurrenceStream,
        K: ExtractionSink + ?Sized,
    {
        loop {
            if options.is_cancelled() {
                break;
            }
            if options.max_jobs.is_some_and(|max| report.jobs_found >= max) {
                tracing::info!(limit = report.jobs_found, "job limit reached");
                report.limit_reached = true;
                break;
            }

            let Some(job) = jobs.next().transpose()? else {
                break;
            };
            report.jobs_found += 1;
            jobs_found.store(report.jobs_found, Ordering::Relaxed);

            match sink.store(job.start(), job.end(), job.extension()) {
                Ok(stored) => report.add_stored(stored),
                Err(source) if options.fail_fast => {
                    return Err(CarveError::SinkWrite {
                        start: job.start(),
                        end: job.end(),
                        source,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        start = job.start(),
                        end = job.end(),
                        extension = job.extension(),
                        error = %err,
                        "failed to store carved file"
                    );
                    report.add_failure(job.start(), job.end(), job.extension(), err.to_string());
                }
            }
        }

        report.bytes_scanned = match report.total_bytes {
            Some(total) if report.is_complete() && !jobs.is_truncated() => total,
            _ => jobs.position(),
        };
        report.set_stats(index.signatures(), jobs.stats());
        Ok(())
    }
}

/// Reports progress after each chunk and stops the scan once cancelled
fn progress_hook<'a>(
    total: Option<u64>,
    options: &'a CarveOptions,
    jobs_found: &'a AtomicU64,
    callback: Option<&'a ProgressCallback>,
) -> ChunkHook<'a> {
    let mut snapshot = ScanProgress::new(total);
    Box::new(move |position| {
        if let Some(callback) = callback {
            snapshot.update(position, jobs_found.load(Ordering::Relaxed));
            callback(&snapshot);
        }
        keep_going(options)
    })
}

fn keep_going(options: &CarveOptions) -> ControlFlow<()> {
    if options.is_cancelled() {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}
