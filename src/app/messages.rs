//! User-facing messages printed by the binary.

/// Messages shown on stdout for each way a run can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Messages {
    pub quit_signal_received: &'static str,
    pub closing_application: &'static str,
    pub stream_end: &'static str,
    pub dumping_error_prefix: &'static str,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            quit_signal_received: "Quit signal from O.S. has been received",
            closing_application: "Closing application ...",
            stream_end: "Stream has reached its end.",
            dumping_error_prefix: "Dumping error:",
        }
    }
}

impl Messages {
    pub(crate) fn quit_signal(&self, signal: &str) -> String {
        format!("{}: {signal}", self.quit_signal_received)
    }

    pub(crate) fn dumping_error(&self, error: &dyn std::fmt::Display) -> String {
        format!("{} {error}", self.dumping_error_prefix)
    }
}

/// Intro line printed before anything else: binary name and version.
pub(crate) fn intro_text() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
