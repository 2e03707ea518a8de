//! Domain layer - Core carving logic
//!
//! This module contains the carving entities, the repository traits the
//! core depends on, and the scanning and pairing services. It performs no
//! I/O of its own beyond what a [`repositories::ByteSource`] provides.

pub mod entities;
pub mod repositories;
pub mod services;
