//! Core types shared across layers

pub mod error;

pub use error::{CarveError, Result};
