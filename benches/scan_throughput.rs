use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rabbit::domain::services::{PatternIndex, carve_jobs, scan_parallel};
use rabbit::infrastructure::byte_source::MemoryByteSource;
use rabbit::infrastructure::catalog::BuiltinCatalog;
use std::hint::black_box;

const IMAGE_LEN: usize = 32 * 1024 * 1024;

/// Pseudo-random bytes with a JPEG pair every 256KB
fn synthetic_image() -> Vec<u8> {
    let mut data: Vec<u8> = (0..IMAGE_LEN)
        .map(|i| (i.wrapping_mul(131).wrapping_add(17) % 251) as u8)
        .collect();
    for at in (0..IMAGE_LEN - 8192).step_by(256 * 1024) {
        data[at..at + 3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        data[at + 8000..at + 8002].copy_from_slice(&[0xFF, 0xD9]);
    }
    data
}

fn bench_scan(c: &mut Criterion) {
    let catalog = BuiltinCatalog::new().unwrap();
    let index = PatternIndex::from_catalog(&catalog).unwrap();
    let source = MemoryByteSource::new(synthetic_image());

    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Bytes(IMAGE_LEN as u64));
    group.sample_size(10);

    for chunk in [64 * 1024, 1024 * 1024, 4 * 1024 * 1024] {
        group.bench_with_input(BenchmarkId::new("sequential", chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                let jobs = carve_jobs(source.clone(), &index, chunk)
                    .unwrap()
                    .filter_map(Result::ok)
                    .count();
                black_box(jobs)
            })
        });
    }

    for workers in [2, 4] {
        group.bench_with_input(BenchmarkId::new("parallel", workers), &workers, |b, &workers| {
            b.iter(|| {
                let merged = scan_parallel(&source, &index, 1024 * 1024, workers).unwrap();
                black_box(merged.remaining())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
