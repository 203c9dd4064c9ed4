//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use stream_dumper::dump::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Dump a live HTTP stream into a file.
///
/// Copies the response body of a single GET request into the output file
/// until the stream ends, fails, or the process receives SIGINT/SIGTERM.
#[derive(Parser, Debug)]
#[command(name = "http-stream-dumper")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the HTTP stream to dump
    #[arg(value_name = "HTTP_STREAM_URL")]
    pub url: String,

    /// File to write the stream into (created or truncated)
    #[arg(value_name = "OUTPUT_FILE")]
    pub output: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Seconds allowed to establish the connection (1-300)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub connect_timeout: u64,

    /// Give up when the stream sends nothing for this many seconds (0 waits forever)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS)]
    pub read_timeout: u64,
}
