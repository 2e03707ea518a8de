//! Application layer
//!
//! Use cases that orchestrate the carving core, a byte source and a sink.

pub mod dto;
mod carve_image;

pub use carve_image::{CarveImageUseCase, ProgressCallback};
