//! Property tests
//!
//! Chunking must never change what is found.

use proptest::prelude::*;
use rabbit::domain::entities::{CarveJob, FormatId, Occurrence, Role, Signature};
use rabbit::domain::services::{CarveJobs, PatternIndex, carve_jobs, scan, scan_parallel};
use rabbit::infrastructure::byte_source::MemoryByteSource;

/// Small alphabet so that patterns show up often
fn image_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"<>ab/.".to_vec()), 0..400)
}

fn index() -> PatternIndex {
    PatternIndex::new(vec![
        Signature::new("a", b"<a>".to_vec(), b"</a>".to_vec()).unwrap(),
        Signature::new("b", b"<b".to_vec(), b"b>".to_vec()).unwrap(),
        // shares its footer with "a"
        Signature::new("c", b"<ab".to_vec(), b"</a>".to_vec()).unwrap(),
        // no footer: runs to max_len or the end of the image
        Signature::footerless("d", b"/.".to_vec(), 24).unwrap(),
    ])
    .unwrap()
}

/// Every pattern start found by brute force, in yield order
fn brute_force(data: &[u8], index: &PatternIndex) -> Vec<Occurrence> {
    let mut found = Vec::new();
    for offset in 0..data.len() {
        for (id, sig) in index.signatures().iter().enumerate() {
            let mut check = |pattern: &[u8], role| {
                if data[offset..].starts_with(pattern) {
                    found.push(Occurrence::new(FormatId(id), role, offset as u64, pattern.len()));
                }
            };
            check(sig.header(), Role::Header);
            if let Some(footer) = sig.footer() {
                check(footer, Role::Footer);
            }
        }
    }
    found.sort_by_key(|o| (o.offset, o.role, o.format));
    found
}

fn job_ranges(jobs: impl Iterator<Item = rabbit::Result<CarveJob>>) -> Vec<(u64, u64, String)> {
    jobs.map(|j| j.map(|j| (j.start(), j.end(), j.extension().to_string())))
        .collect::<Result<_, _>>()
        .unwrap()
}

proptest! {
    #[test]
    fn chunked_scan_matches_brute_force(data in image_strategy(), chunk in 1usize..64) {
        let index = index();
        let scanned: Vec<Occurrence> = scan(MemoryByteSource::new(data.clone()), &index, chunk)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(scanned, brute_force(&data, &index));
    }

    #[test]
    fn jobs_independent_of_chunk_size(data in image_strategy(), chunk in 1usize..64) {
        let index = index();
        let run = |chunk: usize| {
            let mut jobs = carve_jobs(MemoryByteSource::new(data.clone()), &index, chunk).unwrap();
            let found: Vec<(u64, u64, String)> = jobs
                .by_ref()
                .map(|j| j.map(|j| (j.start(), j.end(), j.extension().to_string())))
                .collect::<Result<_, _>>()
                .unwrap();
            (found, jobs.into_stats())
        };

        let whole = run(data.len().max(1));
        let (jobs, _) = &whole;
        prop_assert!(jobs.windows(2).all(|w| w[0].1 <= w[1].1));
        prop_assert_eq!(run(chunk), whole);
    }

    #[test]
    fn parallel_scan_matches_sequential(
        data in image_strategy(),
        chunk in 1usize..32,
        workers in 1usize..9,
    ) {
        let index = index();
        let source = MemoryByteSource::new(data);
        let sequential: Vec<Occurrence> = scan(source.clone(), &index, chunk)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let parallel: Vec<Occurrence> = scan_parallel(&source, &index, chunk, workers)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(parallel, sequential);

        let mut sequential_jobs = carve_jobs(source.clone(), &index, chunk).unwrap();
        let mut parallel_jobs =
            CarveJobs::new(scan_parallel(&source, &index, chunk, workers).unwrap(), &index);
        prop_assert_eq!(
            job_ranges(parallel_jobs.by_ref()),
            job_ranges(sequential_jobs.by_ref())
        );
        prop_assert_eq!(parallel_jobs.into_stats(), sequential_jobs.into_stats());
    }
}
