//! User-Agent string sent with the stream request.

/// Default User-Agent for stream requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("http-stream-dumper/{version}")
}
