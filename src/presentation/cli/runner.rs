//! Command handlers

use super::commands::{Cli, Commands, ScanArgs};
use super::progress::ProgressReporter;
use crate::application::dto::{CarveOptions, CarveReport};
use crate::application::{CarveImageUseCase, ProgressCallback};
use crate::domain::repositories::{ByteSource, ExtractionSink, SignatureCatalog};
use crate::infrastructure::byte_source::{FileByteSource, MmapByteSource};
use crate::infrastructure::catalog::{BuiltinCatalog, JsonCatalog, SignatureRecord};
use crate::infrastructure::persistence::{JobListingSink, LocalFileSink};
use anyhow::{Context, Result};
use humansize::{BINARY, format_size};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Runs the parsed command; `cancel` is raised by the Ctrl-C handler
pub fn run(cli: Cli, cancel: Arc<AtomicBool>) -> Result<()> {
    match cli.command {
        Commands::Carve {
            scan,
            output,
            fail_fast,
        } => {
            let sink = LocalFileSink::new(&output, &scan.input).with_context(|| {
                format!("Failed to prepare output directory {}", output.display())
            })?;
            let options = carve_options(&scan, cancel).fail_fast(fail_fast);
            let report = carve(&scan, &sink, &options)?;

            print!("{}", report.summary());
            println!("Output: {}", output.display());
            Ok(())
        }
        Commands::Scan { scan } => {
            let sink = JobListingSink::new(BufWriter::new(io::stdout()));
            let options = carve_options(&scan, cancel);
            let report = carve(&scan, &sink, &options)?;
            sink.into_inner()
                .flush()
                .context("Failed to write job listing")?;

            eprint!("{}", report.summary());
            Ok(())
        }
        Commands::Signatures { catalog, json } => list_signatures(catalog.as_deref(), json),
    }
}

fn carve_options(scan: &ScanArgs, cancel: Arc<AtomicBool>) -> CarveOptions {
    let mut options = CarveOptions::new()
        .with_chunk_size(scan.chunk_size)
        .with_threads(scan.threads)
        .with_extensions(scan.types.clone())
        .with_cancel_flag(cancel);
    if let Some(limit) = scan.limit {
        options = options.with_max_jobs(limit);
    }
    options
}

fn load_catalog(path: Option<&Path>) -> Result<Arc<dyn SignatureCatalog>> {
    Ok(match path {
        Some(path) => Arc::new(
            JsonCatalog::load(path)
                .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        ),
        None => Arc::new(BuiltinCatalog::new().context("Built-in catalog is invalid")?),
    })
}

fn carve<K: ExtractionSink>(
    scan: &ScanArgs,
    sink: &K,
    options: &CarveOptions,
) -> Result<CarveReport> {
    let use_case = CarveImageUseCase::new(load_catalog(scan.catalog.as_deref())?);
    let input = &scan.input;

    if scan.mmap {
        let source = MmapByteSource::open(input)
            .with_context(|| format!("Failed to map {}", input.display()))?;
        run_use_case(&use_case, source, sink, options, scan.no_progress)
    } else {
        let source = FileByteSource::open(input)
            .with_context(|| format!("Failed to open {}", input.display()))?;
        run_use_case(&use_case, source, sink, options, scan.no_progress)
    }
}

fn run_use_case<S: ByteSource, K: ExtractionSink>(
    use_case: &CarveImageUseCase,
    source: S,
    sink: &K,
    options: &CarveOptions,
    no_progress: bool,
) -> Result<CarveReport> {
    let reporter = if no_progress {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::for_scan(source.total_length())
    };
    let callback: ProgressCallback = reporter.scan_callback();
    let image = source.describe().to_string();

    let result = use_case.execute(source, sink, options, Some(callback));
    reporter.clear();

    let report = result.with_context(|| format!("Carving {} failed", image))?;
    tracing::info!(
        stored = %format_size(report.bytes_stored, BINARY),
        "run complete"
    );
    Ok(report)
}

fn list_signatures(path: Option<&Path>, json: bool) -> Result<()> {
    let catalog = load_catalog(path)?;
    let mut out = io::stdout().lock();

    if json {
        let records: Vec<SignatureRecord> =
            catalog.list().iter().map(SignatureRecord::from).collect();
        serde_json::to_writer_pretty(&mut out, &serde_json::json!({ "signatures": records }))?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<4} {:<6} {:<18} {:<18} {:>10} {:>10}",
        "ID", "EXT", "HEADER", "FOOTER", "MIN", "MAX"
    )?;
    writeln!(out, "{}", "-".repeat(71))?;
    for (id, sig) in catalog.list().iter().enumerate() {
        let bound = |len: Option<u64>| len.map_or_else(|| "-".to_string(), |l| format_size(l, BINARY));
        writeln!(
            out,
            "{:<4} {:<6} {:<18} {:<18} {:>10} {:>10}",
            id,
            if catalog.selected_by_default(sig) {
                sig.extension().to_string()
            } else {
                format!("{}*", sig.extension())
            },
            hex::encode(sig.header()),
            sig.footer().map_or_else(|| "-".to_string(), hex::encode),
            bound(sig.min_len()),
            bound(sig.max_len()),
        )?;
    }
    if catalog.list().iter().any(|sig| !catalog.selected_by_default(sig)) {
        writeln!(out, "\n* scanned only when named with --types")?;
    }
    Ok(())
}
