#![no_main]

use libfuzzer_sys::fuzz_target;
use rabbit::domain::entities::Signature;
use rabbit::domain::services::{PatternIndex, carve_jobs};
use rabbit::infrastructure::byte_source::MemoryByteSource;

// First byte picks the chunk size; the rest is the image.
fuzz_target!(|data: &[u8]| {
    let Some((&chunk, image)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);

    let index = PatternIndex::new(vec![
        Signature::new("jpg", vec![0xFF, 0xD8, 0xFF], vec![0xFF, 0xD9]).unwrap(),
        Signature::new("gif", b"GIF8".to_vec(), vec![0x00, 0x3B]).unwrap(),
        Signature::footerless("bmp", b"BM".to_vec(), 64).unwrap(),
    ])
    .unwrap();

    let run = |chunk: usize| {
        carve_jobs(MemoryByteSource::new(image.to_vec()), &index, chunk)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    };

    let chunked = run(chunk);
    let whole = run(image.len().max(1));
    assert_eq!(chunked, whole);
    for job in &chunked {
        assert!(job.start() < job.end() && job.end() <= image.len() as u64);
    }
    assert!(chunked.windows(2).all(|w| w[0].end() <= w[1].end()));
});
