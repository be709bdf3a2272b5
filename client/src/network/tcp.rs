//! Newline-delimited JSON-RPC over a single TCP stream.
//!
//! A call may be abandoned at any await point (the connection's request
//! deadline drops the future). The channel stays usable afterwards:
//!
//! - A reply that arrives for an abandoned request carries a lower id than
//!   the current one and is skipped.
//! - A partially read reply line is kept and completed by the next call.
//! - A request line cut off mid-write cannot be repaired, so the next call
//!   drops the stream and reports [`TransportError::Closed`].
//!
//! Any other framing or I/O failure also drops the stream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use super::message::{Request, Response};
use super::rpc::{RpcRequest, RpcResponse};
use super::Channel;
use crate::error::TransportError;

/// A TCP channel carrying one JSON-RPC envelope per line.
///
/// Requests are serialized through an async mutex: one request is in
/// flight at a time, and each reply is matched against its request id.
pub struct TcpChannel {
    address: String,
    link: Mutex<Option<Link>>,
    next_id: AtomicU64,
}

struct Link {
    reader: BufReader<TcpStream>,
    /// Reply bytes read so far, up to but not including the newline.
    partial: Vec<u8>,
    /// Set while a request line is being written.
    writing: bool,
}

impl TcpChannel {
    /// Resolves `address` and connects, giving up after `timeout`.
    pub async fn connect(address: &str, timeout: Duration) -> Result<Self, TransportError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(address))
            .await
            .map_err(|_| TransportError::Unreachable)??;
        stream.set_nodelay(true)?;
        Ok(Self {
            address: address.to_string(),
            link: Mutex::new(Some(Link {
                reader: BufReader::new(stream),
                partial: Vec::new(),
                writing: false,
            })),
            next_id: AtomicU64::new(1),
        })
    }
}

impl Link {
    async fn exchange(&mut self, id: u64, line: &[u8]) -> Result<RpcResponse, TransportError> {
        if self.writing {
            return Err(TransportError::Closed);
        }
        self.writing = true;
        self.reader.get_mut().write_all(line).await?;
        self.reader.get_mut().flush().await?;
        self.writing = false;

        loop {
            // `read_until` keeps partial bytes in `partial` if cancelled.
            self.reader.read_until(b'\n', &mut self.partial).await?;
            if self.partial.last() != Some(&b'\n') {
                return Err(TransportError::Closed);
            }
            let reply = std::mem::take(&mut self.partial);
            let response: RpcResponse = serde_json::from_slice(&reply)?;
            match response.id.as_u64() {
                Some(got) if got == id => return Ok(response),
                Some(got) if got < id => {
                    tracing::debug!(stale = got, current = id, "skipping reply to abandoned request");
                }
                _ => {
                    return Err(TransportError::Frame(format!(
                        "response id {} does not match request id {id}",
                        response.id
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl Channel for TcpChannel {
    fn address(&self) -> &str {
        &self.address
    }

    async fn call(&self, request: Request) -> Result<Response, TransportError> {
        let mut guard = self.link.lock().await;
        let link = guard.as_mut().ok_or(TransportError::Closed)?;

        // Ids grow in send order, so any older reply still in the socket
        // carries a lower id.
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = RpcRequest::encode(id, &request)?;
        let method = envelope.method;
        let mut line = serde_json::to_string(&envelope)?;
        line.push('\n');

        let result = link.exchange(id, line.as_bytes()).await;
        match result {
            Ok(response) => response.decode(method),
            Err(err) => {
                // The stream is out of step; later calls fail fast.
                guard.take();
                tracing::debug!(address = %self.address, error = %err, "dropping tcp stream");
                Err(err)
            }
        }
    }

    async fn close(&self) {
        if let Some(mut link) = self.link.lock().await.take() {
            // Best effort; the socket is dropped either way.
            let _ = link.reader.get_mut().shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::AccountId;
    use crate::network::message::{QueryBody, QueryRequest, ResponseType};
    use crate::status::Status;
    use tokio::net::TcpListener;

    fn balance_request() -> Request {
        Request::Query(QueryRequest {
            response_type: ResponseType::CostAnswer,
            body: QueryBody::AccountBalance {
                account_id: AccountId::simple(2),
            },
        })
    }

    /// Accepts one connection and answers each line with `reply(id)`.
    async fn spawn_peer(reply: fn(serde_json::Value) -> String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);
            let mut line = String::new();
            while reader.read_line(&mut line).await.unwrap() > 0 {
                let request: RpcRequest = serde_json::from_str(line.trim_end()).unwrap();
                let out = reply(request.id) + "\n";
                reader.get_mut().write_all(out.as_bytes()).await.unwrap();
                line.clear();
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_round_trip() {
        let addr = spawn_peer(|id| {
            format!(
                r#"{{"jsonrpc":"2.0","id":{id},"result":{{"precheck":0,"response_type":"cost_answer","cost":25,"answer":null}}}}"#
            )
        })
        .await;

        let channel = TcpChannel::connect(&addr, Duration::from_secs(5)).await.unwrap();
        for _ in 0..2 {
            match channel.call(balance_request()).await.unwrap() {
                Response::Query(response) => {
                    assert_eq!(response.precheck, Status::Ok);
                    assert_eq!(response.cost, 25);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_mismatched_id_is_frame_error() {
        let addr = spawn_peer(|_| {
            r#"{"jsonrpc":"2.0","id":999,"result":{"precheck":0}}"#.to_string()
        })
        .await;
        let channel = TcpChannel::connect(&addr, Duration::from_secs(5)).await.unwrap();
        assert!(matches!(
            channel.call(balance_request()).await,
            Err(TransportError::Frame(_))
        ));
    }

    #[tokio::test]
    async fn test_frame_error_drops_stream() {
        let addr = spawn_peer(|_| r#"{"jsonrpc":"2.0","id":999,"result":{"precheck":0}}"#.to_string()).await;
        let channel = TcpChannel::connect(&addr, Duration::from_secs(5)).await.unwrap();
        assert!(channel.call(balance_request()).await.is_err());
        assert!(matches!(
            channel.call(balance_request()).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_recovers_after_abandoned_call() {
        // Answers in order, but holds the first reply back for 300ms.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);
            let mut line = String::new();
            let mut first = true;
            while reader.read_line(&mut line).await.unwrap() > 0 {
                let request: RpcRequest = serde_json::from_str(line.trim_end()).unwrap();
                if first {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    first = false;
                }
                let out = format!(
                    r#"{{"jsonrpc":"2.0","id":{},"result":{{"precheck":0,"response_type":"cost_answer","cost":{},"answer":null}}}}"#,
                    request.id, request.id
                ) + "\n";
                reader.get_mut().write_all(out.as_bytes()).await.unwrap();
                line.clear();
            }
        });

        let channel = TcpChannel::connect(&addr, Duration::from_secs(5)).await.unwrap();
        let abandoned = tokio::time::timeout(Duration::from_millis(100), channel.call(balance_request())).await;
        assert!(abandoned.is_err());

        // The late reply to request 1 is skipped; each call gets its own answer.
        for expected in [2, 3, 4] {
            match channel.call(balance_request()).await.unwrap() {
                Response::Query(response) => assert_eq!(response.cost, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_call_after_close_fails() {
        let addr = spawn_peer(|id| format!(r#"{{"jsonrpc":"2.0","id":{id},"result":{{"precheck":0}}}}"#)).await;
        let channel = TcpChannel::connect(&addr, Duration::from_secs(5)).await.unwrap();
        channel.close().await;
        channel.close().await;
        assert!(matches!(
            channel.call(balance_request()).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        assert!(TcpChannel::connect(&addr, Duration::from_secs(5)).await.is_err());
    }
}
