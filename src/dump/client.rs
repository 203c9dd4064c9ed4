//! HTTP client wrapper for opening a stream.
//!
//! This module provides the `HttpClient` struct which issues the single GET a
//! dump needs and turns the response body into an `AsyncRead`.

use std::io;

use futures_util::TryStreamExt;
use reqwest::{Client, Response};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::{debug, instrument};
use url::Url;

use super::config::DumperConfig;
use super::error::DumpError;

/// Response body as a byte source the copy task can read from.
pub type BodyReader = Box<dyn AsyncRead + Send + Unpin>;

/// HTTP client used to open streams.
///
/// Built once per dumper from its [`DumperConfig`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::ClientBuild`] if reqwest rejects the configuration
    /// (for example when no TLS backend can be initialised).
    pub fn new(config: &DumperConfig) -> Result<Self, DumpError> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone());
        if let Some(read_timeout) = config.read_timeout {
            builder = builder.read_timeout(read_timeout);
        }
        let client = builder
            .build()
            .map_err(|source| DumpError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Sends a GET to `url` and returns the response once headers arrived.
    ///
    /// The status code is not checked: an error page is a body like any other
    /// and gets dumped verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::InvalidUrl`] if `url` does not parse, or
    /// [`DumpError::Request`] if the request cannot be sent.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn open(&self, url: &str) -> Result<Response, DumpError> {
        let parsed = validate_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DumpError::request(url, e))?;

        debug!(
            status = response.status().as_u16(),
            content_length = ?response.content_length(),
            "stream response received"
        );
        Ok(response)
    }
}

/// Adapts a response body into a [`BodyReader`].
#[must_use]
pub fn body_reader(response: Response) -> BodyReader {
    let chunks = response.bytes_stream().map_err(io::Error::other);
    Box::new(StreamReader::new(Box::pin(chunks)))
}

/// Checks that `url` can be requested, without sending anything.
///
/// # Errors
///
/// Returns [`DumpError::InvalidUrl`] if `url` does not parse or is not
/// `http`/`https`.
pub fn validate_url(url: &str) -> Result<Url, DumpError> {
    let parsed = Url::parse(url).map_err(|_| DumpError::invalid_url(url))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(DumpError::invalid_url(url)),
    }
}
