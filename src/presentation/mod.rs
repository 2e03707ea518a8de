//! Presentation layer
//!
//! The `rabbit` command line interface.

pub mod cli;
