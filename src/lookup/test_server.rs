//! Canned HTTP server for resolver tests

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How the body of a canned response is delivered
#[derive(Debug, Clone)]
enum Body {
    /// Sent in one piece with a Content-Length
    Full(String),
    /// Sent with chunked transfer encoding, one write per piece
    Chunked(Vec<String>),
    /// Content-Length promises more than is sent before the socket closes
    Truncated { partial: String, declared: usize },
    /// Headers are never sent
    Stalled,
}

/// A response served to one connection
#[derive(Debug, Clone)]
pub struct CannedResponse {
    status: u16,
    body: Body,
}

impl CannedResponse {
    /// 200 response with an HTML body
    pub fn html(body: &str) -> Self {
        Self::with_status(200, body)
    }

    /// Response with an arbitrary status code
    pub fn with_status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: Body::Full(body.to_string()),
        }
    }

    /// 200 response delivered as separate chunks
    pub fn chunked(pieces: Vec<&str>) -> Self {
        Self {
            status: 200,
            body: Body::Chunked(pieces.into_iter().map(str::to_string).collect()),
        }
    }

    /// Connection closes after `partial` although `declared` bytes were promised
    pub fn truncated(partial: &str, declared: usize) -> Self {
        Self {
            status: 200,
            body: Body::Truncated {
                partial: partial.to_string(),
                declared,
            },
        }
    }

    /// Never answers
    pub fn stalled() -> Self {
        Self {
            status: 200,
            body: Body::Stalled,
        }
    }
}

/// Running test server; stops when dropped
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Base URL, without trailing slash
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request targets (path and query) in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start a server answering connections with `responses` in accept order
///
/// Connections beyond the canned list get a 404.
pub async fn spawn(responses: Vec<CannedResponse>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("test server address");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let queue = Arc::new(Mutex::new(VecDeque::from(responses)));

    let task = {
        let requests = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let response = queue
                    .lock()
                    .expect("queue lock")
                    .pop_front()
                    .unwrap_or_else(|| CannedResponse::with_status(404, ""));
                let requests = Arc::clone(&requests);
                tokio::spawn(async move {
                    let _ = serve(stream, response, requests).await;
                });
            }
        })
    };

    TestServer {
        addr,
        requests,
        task,
    }
}

/// Base URL of a local port with nothing listening
pub async fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}

async fn serve(
    mut stream: TcpStream,
    response: CannedResponse,
    requests: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        head.extend_from_slice(&buf[..n]);
    }

    let head = String::from_utf8_lossy(&head);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    requests.lock().expect("requests lock").push(target);

    let status_line = format!("HTTP/1.1 {} {}\r\n", response.status, reason(response.status));
    match response.body {
        Body::Full(body) => {
            let out = format!(
                "{status_line}Content-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(out.as_bytes()).await?;
        }
        Body::Chunked(pieces) => {
            let out = format!(
                "{status_line}Content-Type: text/html\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n"
            );
            stream.write_all(out.as_bytes()).await?;
            for piece in pieces {
                let chunk = format!("{:x}\r\n{piece}\r\n", piece.len());
                stream.write_all(chunk.as_bytes()).await?;
                stream.flush().await?;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            stream.write_all(b"0\r\n\r\n").await?;
        }
        Body::Truncated { partial, declared } => {
            let out = format!(
                "{status_line}Content-Type: text/html\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n{partial}"
            );
            stream.write_all(out.as_bytes()).await?;
        }
        Body::Stalled => {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    }

    stream.flush().await?;
    stream.shutdown().await
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
