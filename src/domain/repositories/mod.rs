//! Repository traits (interfaces)
//!
//! Contracts for the collaborators the carving core depends on: where bytes
//! come from, which signatures to look for, and where carved ranges go.

mod byte_source;
mod extraction_sink;
mod signature_catalog;

pub use byte_source::{ByteSource, ByteSourceError};
pub use extraction_sink::{ExtractionSink, SinkError, StoredFile};
pub use signature_catalog::{CatalogError, SignatureCatalog};
