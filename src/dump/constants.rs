//! Constants for the dump module (timeouts, buffer sizes, outlet capacity).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default read-inactivity timeout. Zero disables it; live streams may idle.
pub const READ_TIMEOUT_SECS: u64 = 0;

/// Size of the buffer used by the copy task for each read.
pub const COPY_BUFFER_SIZE: usize = 32 * 1024;

/// Number of errors the error outlet buffers before the copy task waits.
pub const ERROR_OUTLET_CAPACITY: usize = 8;
