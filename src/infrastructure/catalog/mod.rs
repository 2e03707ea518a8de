//! Signature catalog implementations

mod builtin;
mod json_catalog;

pub use builtin::BuiltinCatalog;
pub use json_catalog::{JsonCatalog, SignatureRecord};
