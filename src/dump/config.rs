//! Runtime configuration for a [`StreamDumper`](super::StreamDumper).

use std::time::Duration;

use super::constants::{
    CONNECT_TIMEOUT_SECS, COPY_BUFFER_SIZE, ERROR_OUTLET_CAPACITY, READ_TIMEOUT_SECS,
};
use crate::user_agent;

/// Tunables for one dump.
///
/// No whole-request timeout exists on purpose: a live stream has no natural
/// end, so only connection setup and read inactivity can be bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumperConfig {
    /// Maximum time to establish the connection.
    pub connect_timeout: Duration,
    /// Maximum time between two body reads; `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Bytes requested from the body per read.
    pub buffer_size: usize,
    /// Errors the error outlet buffers.
    pub error_capacity: usize,
    /// User-Agent header sent with the GET.
    pub user_agent: String,
}

impl Default for DumperConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: read_timeout_from_secs(READ_TIMEOUT_SECS),
            buffer_size: COPY_BUFFER_SIZE,
            error_capacity: ERROR_OUTLET_CAPACITY,
            user_agent: user_agent::default_user_agent(),
        }
    }
}

impl DumperConfig {
    /// Sets the connect timeout in seconds.
    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout = Duration::from_secs(secs);
        self
    }

    /// Sets the read-inactivity timeout in seconds; zero disables it.
    #[must_use]
    pub fn with_read_timeout_secs(mut self, secs: u64) -> Self {
        self.read_timeout = read_timeout_from_secs(secs);
        self
    }
}

fn read_timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
