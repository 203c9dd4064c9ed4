use std::future::Future;

use anyhow::{Context, Result};
use stream_dumper::{CompletionOutlet, DumpError, DumperConfig, ErrorOutlet, StreamDumper};
use tracing::{debug, warn};

use crate::ProcessExit;
use crate::app::exit_handler::{self, RunOutcome};
use crate::app::messages::{self, Messages};
use crate::app::signals;
use crate::cli::Args;

pub(crate) async fn run_dumper(args: Args) -> Result<ProcessExit> {
    let messages = Messages::default();
    println!("{}", messages::intro_text());
    println!();

    let config = DumperConfig::default()
        .with_connect_timeout_secs(args.connect_timeout)
        .with_read_timeout_secs(args.read_timeout);
    let mut dumper = StreamDumper::with_config(args.url, args.output, config);

    dumper.start().await.context("cannot start dumping")?;

    let stop_requested = signals::install_stop_listener(&messages)?;
    let outcome = supervise(&mut dumper, stop_requested.cancelled(), &messages).await?;
    debug!(?outcome, "dump supervised to the end");

    Ok(exit_handler::determine_exit_outcome(&outcome))
}

/// What `supervise` needs from a running dump.
pub(crate) trait Supervised {
    fn errors(&self) -> ErrorOutlet;
    fn stream_has_finished(&self) -> CompletionOutlet;
    async fn stop(&mut self) -> Result<(), DumpError>;
}

impl Supervised for StreamDumper {
    fn errors(&self) -> ErrorOutlet {
        StreamDumper::errors(self)
    }

    fn stream_has_finished(&self) -> CompletionOutlet {
        StreamDumper::stream_has_finished(self)
    }

    async fn stop(&mut self) -> Result<(), DumpError> {
        StreamDumper::stop(self).await
    }
}

/// Waits for the first of {stop request, dump error, end of stream}, then stops
/// the dumper and drains errors that arrived just before shutdown.
///
/// A failure to release the dumper's resources is fatal and returned as `Err`;
/// `main` logs it.
pub(crate) async fn supervise<D, F>(
    dumper: &mut D,
    stop_requested: F,
    messages: &Messages,
) -> Result<RunOutcome>
where
    D: Supervised,
    F: Future<Output = ()>,
{
    let errors = dumper.errors();
    let finished = dumper.stream_has_finished();

    let mut outcome = tokio::select! {
        () = stop_requested => {
            println!("{}", messages.closing_application);
            RunOutcome::Stopped
        }
        Some(dump_error) = errors.recv() => {
            println!("{}", messages.dumping_error(&dump_error));
            RunOutcome::Failed(dump_error)
        }
        () = finished.finished() => {
            println!("{}", messages.stream_end);
            println!("{}", messages.closing_application);
            RunOutcome::Finished
        }
    };

    dumper
        .stop()
        .await
        .context("failed to release dump resources")?;

    for late in errors.drain().await {
        warn!(error = %late, "dump error reported during shutdown");
        if !matches!(outcome, RunOutcome::Failed(_)) {
            println!("{}", messages.dumping_error(&late));
            outcome = RunOutcome::Failed(late);
        }
    }

    Ok(outcome)
}
