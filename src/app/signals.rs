//! OS signal wiring.
//!
//! Listens for SIGINT (Ctrl+C) and, on unix, SIGTERM, then cancels a
//! [`CancellationToken`] the runtime treats as a stop request. The dumper
//! itself never sees OS signals.

use anyhow::Result;
#[cfg(unix)]
use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::messages::Messages;

/// Installs the signal listener and returns the stop-request token.
pub(crate) fn install_stop_listener(messages: &Messages) -> Result<CancellationToken> {
    let token = CancellationToken::new();

    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?
    };

    let handler_token = token.clone();
    let messages = messages.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let name = tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => "SIGINT",
                Err(e) => {
                    error!(error = %e, "failed to listen for Ctrl+C");
                    return;
                }
            },
            _ = sigterm.recv() => "SIGTERM",
        };

        #[cfg(not(unix))]
        let name = match tokio::signal::ctrl_c().await {
            Ok(()) => "Ctrl+C",
            Err(e) => {
                error!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
        };

        info!(signal = name, "{}", messages.quit_signal(name));
        handler_token.cancel();
    });

    Ok(token)
}
