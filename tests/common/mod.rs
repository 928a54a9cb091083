//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Response, StatusCode};
use cf_tmdb_proxy::http::{UpstreamClient, UpstreamError, UpstreamRequest};
use futures_util::future::BoxFuture;
use http_body_util::BodyExt;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

// --- in-process fake upstream ---

/// What the fake upstream saw.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// `None` when no body was attached at all.
    pub body: Option<Bytes>,
}

/// How the fake upstream answers.
#[derive(Debug, Clone)]
pub enum Behavior {
    Respond {
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        body: &'static str,
    },
    Fail(&'static str),
    Hang,
}

/// An [`UpstreamClient`] that records every call and never touches the network.
#[derive(Clone)]
pub struct FakeUpstream {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    behavior: Behavior,
}

impl FakeUpstream {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            behavior,
        }
    }

    /// Answers 200 with a small JSON body.
    pub fn ok() -> Self {
        Self::new(Behavior::Respond {
            status: StatusCode::OK,
            headers: vec![("content-type", "application/json")],
            body: r#"{"id":550}"#,
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl UpstreamClient for FakeUpstream {
    fn send(&self, request: UpstreamRequest) -> BoxFuture<'static, Result<Response<Body>, UpstreamError>> {
        let calls = self.calls.clone();
        let behavior = self.behavior.clone();

        Box::pin(async move {
            let body = match request.body {
                Some(body) => Some(body.collect().await.unwrap().to_bytes()),
                None => None,
            };
            calls.lock().unwrap().push(RecordedCall {
                method: request.method,
                url: request.url,
                headers: request.headers,
                body,
            });

            match behavior {
                Behavior::Respond {
                    status,
                    headers,
                    body,
                } => {
                    let mut builder = Response::builder().status(status);
                    for (name, value) in headers {
                        builder = builder.header(name, value);
                    }
                    Ok(builder.body(Body::from(body)).unwrap())
                }
                Behavior::Fail(message) => Err(UpstreamError::Connection(message.to_string())),
                Behavior::Hang => std::future::pending().await,
            }
        })
    }
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// --- raw TCP backend ---

/// A request as it arrived on the wire at the mock backend.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    /// Header lines with lowercased names, in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Start a mock backend on an ephemeral port that answers every request
/// with `status` and `body`, reporting what it received.
pub async fn start_recording_backend(
    status: &'static str,
    body: &'static str,
) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let (socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket);
                let captured = match read_request(&mut reader).await {
                    Some(captured) => captured,
                    None => return,
                };
                let _ = tx.send(captured);

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nCache-Control: no-store\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let mut socket = reader.into_inner();
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// Reserve a port with nothing listening on it.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn read_request<R>(reader: &mut R) -> Option<CapturedRequest>
where
    R: AsyncBufReadExt + AsyncReadExt + Unpin,
{
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await.ok()?;

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await.ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':')?;
        headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
    }

    let header = |name: &str| {
        headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    };

    let mut body = Vec::new();
    if let Some(len) = header("content-length").and_then(|v| v.parse::<usize>().ok()) {
        body.resize(len, 0);
        reader.read_exact(&mut body).await.ok()?;
    } else if header("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).await.ok()?;
            let size = usize::from_str_radix(size_line.trim(), 16).ok()?;
            let mut chunk = vec![0; size + 2];
            reader.read_exact(&mut chunk).await.ok()?;
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    }

    Some(CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body,
    })
}
