//! Cancellable dumping of a live HTTP stream into a file.
//!
//! This module provides the [`StreamDumper`] lifecycle and the
//! [`CancellableReader`] it puts in front of the response body.
//!
//! # Features
//!
//! - One GET per dump; the body is copied verbatim whatever the status code
//! - Cooperative cancellation through a [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   checked before every read
//! - Outcome reporting through two outlets: a bounded error queue and a
//!   single-slot completion signal
//! - Deterministic shutdown: body and file are released exactly once, and every
//!   release failure is reported
//!
//! # Example
//!
//! ```no_run
//! use stream_dumper::dump::{DumperConfig, StreamDumper};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DumperConfig::default().with_connect_timeout_secs(10);
//! let mut dumper = StreamDumper::with_config("http://127.0.0.1:8000/live", "live.bin", config);
//! dumper.start().await?;
//! dumper.stream_has_finished().finished().await;
//! dumper.stop().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
pub mod constants;
mod dumper;
mod error;
mod outlet;
mod reader;

pub use client::{BodyReader, HttpClient, body_reader, validate_url};
pub use config::DumperConfig;
pub use dumper::{DumperState, StreamDumper};
pub use error::DumpError;
pub use outlet::{CompletionOutlet, ErrorOutlet};
pub use reader::{CancellableReader, Cancelled, is_cancelled};

// Note: no module-local Result alias; use `Result<T, DumpError>` explicitly.
