//! rabbit: signature-based file carving
//!
//! Streams a raw image once, finds every header and footer signature of the
//! loaded catalog with a single multi-pattern automaton, pairs them per
//! format with a last-in-first-out policy, and hands the resolved byte
//! ranges to an extraction sink.
//!
//! ```
//! use rabbit::domain::entities::Signature;
//! use rabbit::domain::services::{PatternIndex, carve_jobs};
//! use rabbit::infrastructure::byte_source::MemoryByteSource;
//!
//! let sig = Signature::new("txt", b"<<".to_vec(), b">>".to_vec()).unwrap();
//! let index = PatternIndex::new(vec![sig]).unwrap();
//! let source = MemoryByteSource::new(b"..<<hi>>..".to_vec());
//!
//! let jobs = carve_jobs(source, &index, 4)
//!     .unwrap()
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! assert_eq!((jobs[0].start(), jobs[0].end()), (2, 8));
//! ```

pub mod application;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use crate::core::error::{CarveError, Result};
