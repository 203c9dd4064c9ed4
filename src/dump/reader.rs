//! Byte source guarded by a cancellation token.
//!
//! [`CancellableReader`] checks its token before every read and fails fast once
//! the token fires, without touching the wrapped source. A read that is parked
//! on the source (a stalled network body, for instance) is also woken by the
//! token, so the copy loop can exit and drop the body.

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Marker carried inside the `io::Error` returned by a cancelled read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("stream read was cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Returns true if `error` is the outcome of a cancelled read.
#[must_use]
pub fn is_cancelled(error: &io::Error) -> bool {
    error
        .get_ref()
        .is_some_and(|inner| inner.is::<Cancelled>())
}

fn cancelled_error() -> io::Error {
    io::Error::other(Cancelled)
}

/// Reader that refuses to read once its cancellation token has fired.
pub struct CancellableReader<R> {
    inner: R,
    token: CancellationToken,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl<R> CancellableReader<R> {
    /// Wraps `inner`, binding it to `token`.
    pub fn new(inner: R, token: CancellationToken) -> Self {
        let cancelled = Box::pin(token.clone().cancelled_owned());
        Self {
            inner,
            token,
            cancelled,
        }
    }

    /// Returns a reference to the wrapped source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> fmt::Debug for CancellableReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellableReader")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for CancellableReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.token.is_cancelled() {
            return Poll::Ready(Err(cancelled_error()));
        }

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Pending => {
                // Parked on the source: let the token wake us too.
                if this.cancelled.as_mut().poll(cx).is_ready() {
                    return Poll::Ready(Err(cancelled_error()));
                }
                Poll::Pending
            }
            ready => ready,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::io::AsyncReadExt;

    /// Source that counts how often it is polled.
    struct CountingSource {
        data: &'static [u8],
        polls: Arc<AtomicUsize>,
    }

    impl AsyncRead for CountingSource {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let data = self.data;
            let n = data.len().min(buf.remaining());
            buf.put_slice(&data[..n]);
            self.data = &data[n..];
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_reader_delegates_bytes_and_end_of_stream() {
        let mut reader = CancellableReader::new(&b"live audio bytes"[..], CancellationToken::new());

        let mut out = Vec::new();
        let n = reader.read_to_end(&mut out).await.unwrap();

        assert_eq!(n, 16);
        assert_eq!(out, b"live audio bytes");
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).await.unwrap(), 0, "EOF must pass through");
    }

    #[tokio::test]
    async fn test_reader_fails_fast_without_touching_source_when_cancelled() {
        let polls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        token.cancel();
        let mut reader = CancellableReader::new(
            CountingSource {
                data: b"never read",
                polls: Arc::clone(&polls),
            },
            token,
        );

        let mut buf = [0u8; 8];
        let err = reader.read(&mut buf).await.unwrap_err();

        assert!(is_cancelled(&err), "expected cancelled outcome, got {err:?}");
        assert_eq!(polls.load(Ordering::SeqCst), 0, "source must not be polled");
    }

    #[tokio::test]
    async fn test_reader_checks_token_before_every_read() {
        let polls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let mut reader = CancellableReader::new(
            CountingSource {
                data: b"abcdef",
                polls: Arc::clone(&polls),
            },
            token.clone(),
        );

        let mut buf = [0u8; 3];
        assert_eq!(reader.read(&mut buf).await.unwrap(), 3);
        assert_eq!(&buf, b"abc");

        token.cancel();
        let err = reader.read(&mut buf).await.unwrap_err();
        assert!(is_cancelled(&err));
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reader_passes_source_errors_through() {
        let source = tokio_test::io::Builder::new()
            .read(b"ab")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
            .build();
        let mut reader = CancellableReader::new(source, CancellationToken::new());

        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).await.unwrap(), 2);
        let err = reader.read(&mut buf).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(!is_cancelled(&err));
    }

    #[tokio::test]
    async fn test_reader_parked_on_stalled_source_wakes_on_cancel() {
        // Nobody ever writes to the other half, so the read stays pending.
        let (_writer, stalled) = tokio::io::duplex(64);
        let token = CancellationToken::new();
        let mut reader = CancellableReader::new(stalled, token.clone());

        let read = tokio::spawn(async move {
            let mut buf = [0u8; 16];
            reader.read(&mut buf).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), read)
            .await
            .expect("cancel must wake the parked read")
            .unwrap();
        assert!(is_cancelled(&result.unwrap_err()));
    }

    #[test]
    fn test_is_cancelled_rejects_other_errors() {
        assert!(!is_cancelled(&io::Error::other("connection reset")));
        assert!(!is_cancelled(&io::Error::from(io::ErrorKind::UnexpectedEof)));
        assert!(is_cancelled(&cancelled_error()));
    }

    #[test]
    fn test_into_inner_returns_source() {
        let reader = CancellableReader::new(&b"xyz"[..], CancellationToken::new());
        assert_eq!(reader.get_ref(), &&b"xyz"[..]);
        assert_eq!(reader.into_inner(), b"xyz");
    }
}
