//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: byte sources over
//! files, memory maps and buffers, signature catalogs, and extraction sinks.

pub mod byte_source;
pub mod catalog;
pub mod persistence;
