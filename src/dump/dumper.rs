//! The stream dumper: one GET, one output file, one background copy task.
//!
//! Lifecycle is `Created -> Running -> Stopped`. [`StreamDumper::start`] opens
//! the file, sends the request and spawns the copy task.
//! [`StreamDumper::stop`] cancels the token, waits for the task to hand the
//! body and file back, closes both and only then closes the error outlet.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::client::{BodyReader, HttpClient, body_reader, validate_url};
use super::config::DumperConfig;
use super::error::DumpError;
use super::outlet::{CompletionOutlet, ErrorOutlet};
use super::reader::{CancellableReader, is_cancelled};

/// Where a dumper is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumperState {
    /// Constructed, nothing opened yet.
    Created,
    /// Copy task launched.
    Running,
    /// Stopped; terminal.
    Stopped,
}

impl DumperState {
    /// Lowercase name used in messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for DumperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copies a live HTTP response body into a file until it ends or is stopped.
///
/// # Example
///
/// ```no_run
/// use stream_dumper::StreamDumper;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut dumper = StreamDumper::new("http://127.0.0.1:8000/live.mp3", "live.mp3");
/// dumper.start().await?;
///
/// let errors = dumper.errors();
/// let finished = dumper.stream_has_finished();
/// tokio::select! {
///     _ = tokio::signal::ctrl_c() => println!("Closing application ..."),
///     Some(err) = errors.recv() => println!("Dumping error: {err}"),
///     () = finished.finished() => println!("Stream has reached its end."),
/// }
///
/// dumper.stop().await?;
/// for err in errors.drain().await {
///     eprintln!("{err}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct StreamDumper {
    url: String,
    output_path: PathBuf,
    config: DumperConfig,
    state: DumperState,
    token: CancellationToken,
    errors_tx: Option<mpsc::Sender<DumpError>>,
    errors: ErrorOutlet,
    finished_tx: Option<watch::Sender<bool>>,
    finished: CompletionOutlet,
    task: Option<JoinHandle<CopyResources>>,
}

impl fmt::Debug for StreamDumper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamDumper")
            .field("url", &self.url)
            .field("output_path", &self.output_path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl StreamDumper {
    /// Creates a dumper for `url` writing to `output_path`, with defaults.
    pub fn new(url: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self::with_config(url, output_path, DumperConfig::default())
    }

    /// Creates a dumper with an explicit configuration.
    pub fn with_config(
        url: impl Into<String>,
        output_path: impl Into<PathBuf>,
        config: DumperConfig,
    ) -> Self {
        let (errors_tx, errors) = ErrorOutlet::channel(config.error_capacity);
        let (finished_tx, finished) = CompletionOutlet::channel();
        Self {
            url: url.into(),
            output_path: output_path.into(),
            config,
            state: DumperState::Created,
            token: CancellationToken::new(),
            errors_tx: Some(errors_tx),
            errors,
            finished_tx: Some(finished_tx),
            finished,
            task: None,
        }
    }

    /// The stream URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The output file path.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DumperState {
        self.state
    }

    /// Opens the output file, requests the stream and starts copying.
    ///
    /// Returns as soon as the response headers arrived and the copy task is
    /// running. The status code is not checked.
    ///
    /// # Errors
    ///
    /// - [`DumpError::InvalidState`] unless the dumper is freshly created
    /// - [`DumpError::InvalidUrl`] before anything is touched on disk
    /// - [`DumpError::ClientBuild`] if the HTTP client cannot be configured
    /// - [`DumpError::CreateFile`] if the output file cannot be created
    /// - [`DumpError::Request`] if the GET cannot be sent
    ///
    /// On error no copy task is launched and the dumper stays `Created`.
    #[instrument(skip(self), fields(url = %self.url, path = %self.output_path.display()))]
    pub async fn start(&mut self) -> Result<(), DumpError> {
        if self.state != DumperState::Created {
            return Err(DumpError::invalid_state("start", self.state.as_str()));
        }
        validate_url(&self.url)?;
        let client = HttpClient::new(&self.config)?;

        let file = File::create(&self.output_path)
            .await
            .map_err(|e| DumpError::create_file(&self.output_path, e))?;
        debug!("output file created");

        let response = client.open(&self.url).await?;
        let reader = CancellableReader::new(body_reader(response), self.token.clone());

        let (Some(errors), Some(finished)) = (self.errors_tx.clone(), self.finished_tx.take())
        else {
            return Err(DumpError::invalid_state("start", self.state.as_str()));
        };

        info!(url = %self.url, "dumping has started");
        let job = CopyJob {
            url: self.url.clone(),
            path: self.output_path.clone(),
            reader,
            writer: BufWriter::new(file),
            buffer_size: self.config.buffer_size,
            errors,
            finished,
        };
        self.task = Some(tokio::spawn(job.run()));
        self.state = DumperState::Running;
        Ok(())
    }

    /// Returns the error outlet.
    ///
    /// Readable while the copy task runs; closed once [`stop`](Self::stop)
    /// has returned, so draining it afterwards never blocks.
    #[must_use]
    pub fn errors(&self) -> ErrorOutlet {
        self.errors.clone()
    }

    /// Returns the completion outlet, signalled only on a clean end of stream.
    #[must_use]
    pub fn stream_has_finished(&self) -> CompletionOutlet {
        self.finished.clone()
    }

    /// Cancels the copy, waits for it to exit and releases every resource.
    ///
    /// There is no timeout: a read parked on the network is abandoned as soon
    /// as the token fires, so the copy task exits promptly.
    ///
    /// # Errors
    ///
    /// - [`DumpError::InvalidState`] unless the dumper is running
    /// - [`DumpError::Release`] listing every failure hit while releasing
    ///   (a panicked copy task, an output file that fails to flush or close)
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn stop(&mut self) -> Result<(), DumpError> {
        if self.state != DumperState::Running {
            return Err(DumpError::invalid_state("stop", self.state.as_str()));
        }
        info!("stopping ...");
        self.token.cancel();
        self.state = DumperState::Stopped;

        let mut steps = Vec::with_capacity(2);
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(resources) => steps.push(resources.close(&self.output_path).await),
                Err(source) => steps.push(Err(DumpError::TaskFailed { source })),
            }
        }

        // The copy task has exited, so nothing can write to the outlet any more.
        self.errors_tx = None;

        info!("stopped");
        release(steps)
    }
}

impl Drop for StreamDumper {
    fn drop(&mut self) {
        if self.state == DumperState::Running {
            warn!(url = %self.url, "dumper dropped while running; cancelling copy task");
            self.token.cancel();
        }
    }
}

/// Folds the outcome of every release step into one result.
fn release(steps: impl IntoIterator<Item = Result<(), DumpError>>) -> Result<(), DumpError> {
    let failure = steps
        .into_iter()
        .filter_map(Result::err)
        .fold(None, |acc, error| Some(DumpError::combine(acc, error)));
    match failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Everything the copy task owns while it runs.
struct CopyJob {
    url: String,
    path: PathBuf,
    reader: CancellableReader<BodyReader>,
    writer: BufWriter<File>,
    buffer_size: usize,
    errors: mpsc::Sender<DumpError>,
    finished: watch::Sender<bool>,
}

/// Handles the copy task gives back to `stop` when it exits.
struct CopyResources {
    reader: CancellableReader<BodyReader>,
    writer: BufWriter<File>,
}

impl CopyResources {
    /// Closes the response body, then flushes and closes the output file.
    async fn close(self, path: &Path) -> Result<(), DumpError> {
        let Self { reader, mut writer } = self;

        // Dropping the body releases the connection.
        drop(reader.into_inner());
        debug!("response body closed");

        let flushed = writer.shutdown().await;
        drop(writer);
        debug!(ok = flushed.is_ok(), "output file closed");
        flushed.map_err(|e| DumpError::write(path, e))
    }
}

enum CopyOutcome {
    Finished,
    Cancelled,
    Failed(DumpError),
}

impl CopyJob {
    async fn run(self) -> CopyResources {
        let Self {
            url,
            path,
            mut reader,
            mut writer,
            buffer_size,
            errors,
            finished,
        } = self;

        let mut buf = vec![0u8; buffer_size.max(1)];
        let mut bytes: u64 = 0;
        let outcome = loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => {
                    break match writer.flush().await {
                        Ok(()) => CopyOutcome::Finished,
                        Err(e) => CopyOutcome::Failed(DumpError::write(&path, e)),
                    };
                }
                Ok(n) => n,
                Err(e) if is_cancelled(&e) => break CopyOutcome::Cancelled,
                Err(e) => break CopyOutcome::Failed(DumpError::read(&url, e)),
            };
            if let Err(e) = writer.write_all(&buf[..n]).await {
                break CopyOutcome::Failed(DumpError::write(&path, e));
            }
            bytes += n as u64;
        };

        match outcome {
            CopyOutcome::Finished => {
                info!(bytes, "stream has reached its end");
                finished.send_replace(true);
            }
            CopyOutcome::Cancelled => debug!(bytes, "copy cancelled"),
            CopyOutcome::Failed(error) => {
                warn!(error = %error, bytes, "dumping failed");
                if errors.send(error).await.is_err() {
                    debug!("error outlet already closed");
                }
            }
        }

        info!(url = %url, bytes, "dumping has stopped");
        CopyResources { reader, writer }
    }
}
