//! HTTP Stream Dumper Library
//!
//! This library copies a live HTTP response body into a local file while
//! staying promptly cancellable, and reports how the copy ended.
//!
//! # Architecture
//!
//! - [`dump`] - the stream dumper lifecycle, its cancellable reader, outlets,
//!   HTTP client and error types
//!
//! Argument parsing, signal wiring and user-facing messages live in the
//! `http-stream-dumper` binary, which only calls the public entry points.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dump;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use dump::{
    CancellableReader, CompletionOutlet, DumpError, DumperConfig, DumperState, ErrorOutlet,
    StreamDumper, is_cancelled,
};
