//! Raw HTTP/1.1 servers for body behaviours wiremock cannot produce:
//! a body that stalls mid-stream and a body cut short by the server.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::socket_guard::should_skip_socket_bound_test;

/// Declared length far larger than anything a test sends.
const HUGE_CONTENT_LENGTH: u64 = 1_000_000_000;

/// How the server behaves after sending `prefix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterPrefix {
    /// Keep the connection open and send nothing more.
    Stall,
    /// Close the connection although more bytes were announced.
    Hangup,
}

/// A running raw stream server.
#[derive(Debug)]
pub struct StreamServer {
    url: String,
    task: tokio::task::JoinHandle<()>,
}

impl StreamServer {
    /// Starts a server answering every GET with `prefix` followed by `after`.
    ///
    /// Returns `None` when localhost sockets are unavailable.
    pub async fn start(prefix: &'static [u8], after: AfterPrefix) -> Option<Self> {
        if should_skip_socket_bound_test() {
            return None;
        }
        let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
        let addr = listener.local_addr().ok()?;
        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, prefix, after));
            }
        });
        Some(Self {
            url: format!("http://{addr}/live.mp3"),
            task,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for StreamServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut socket: TcpStream, prefix: &'static [u8], after: AfterPrefix) {
    let mut request = [0u8; 2048];
    let _ = socket.read(&mut request).await;

    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: {HUGE_CONTENT_LENGTH}\r\n\r\n"
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    if socket.write_all(prefix).await.is_err() {
        return;
    }
    let _ = socket.flush().await;

    match after {
        AfterPrefix::Stall => std::future::pending::<()>().await,
        AfterPrefix::Hangup => {
            let _ = socket.shutdown().await;
        }
    }
}
