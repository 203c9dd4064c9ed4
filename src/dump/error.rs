//! Error types for the dump module.
//!
//! Setup failures come back from [`StreamDumper::start`](super::StreamDumper::start),
//! copy failures arrive through the error outlet, and release failures are
//! folded together by [`StreamDumper::stop`](super::StreamDumper::stop).

use std::path::PathBuf;

use thiserror::Error;
use tokio::task::JoinError;

/// Errors that can occur while dumping a stream.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The output file could not be created or truncated.
    #[error("cannot create output file {path}: {source}")]
    CreateFile {
        /// The output file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request could not be issued (DNS, connection refused, TLS...).
    #[error("request to {url} failed: {source}")]
    Request {
        /// The stream URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The provided URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Reading the response body failed mid-stream.
    #[error("reading stream {url} failed: {source}")]
    Read {
        /// The stream URL.
        url: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Writing to or closing the output file failed.
    #[error("IO error writing to {path}: {source}")]
    Write {
        /// The output file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The copy task did not exit normally.
    #[error("copy task failed: {source}")]
    TaskFailed {
        /// The join failure reported by the runtime.
        #[source]
        source: JoinError,
    },

    /// One or more resources failed to release during stop.
    #[error("releasing resources failed: {}", join_errors(.errors))]
    Release {
        /// Every failure, in the order it happened.
        errors: Vec<DumpError>,
    },

    /// A lifecycle method was called in the wrong state.
    #[error("cannot {operation} a dumper that is {state}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// The state the dumper was in.
        state: &'static str,
    },

    /// The HTTP client could not be built from the configuration.
    #[error("cannot build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

fn join_errors(errors: &[DumpError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DumpError {
    /// Creates an output-file creation error.
    pub fn create_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a request error from a reqwest error.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a mid-stream read error.
    pub fn read(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            url: url.into(),
            source,
        }
    }

    /// Creates an output write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a lifecycle misuse error.
    #[must_use]
    pub fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Folds `next` into an accumulated release error.
    ///
    /// The result is always a [`DumpError::Release`] so callers can report
    /// every failure, not just the first one.
    #[must_use]
    pub fn combine(acc: Option<DumpError>, next: DumpError) -> DumpError {
        let mut errors = match acc {
            None => Vec::with_capacity(1),
            Some(DumpError::Release { errors }) => errors,
            Some(other) => vec![other],
        };
        match next {
            DumpError::Release { errors: more } => errors.extend(more),
            other => errors.push(other),
        }
        DumpError::Release { errors }
    }

    /// Number of underlying failures this error stands for.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Release { errors } => errors.len(),
            _ => 1,
        }
    }
}

// No From<std::io::Error> or From<reqwest::Error>: every variant needs the url
// or path for context, so the constructor helpers above are used instead.
