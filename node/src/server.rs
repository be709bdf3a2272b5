//! # JSON-RPC Server
//!
//! Accepts TCP connections and answers one JSON-RPC 2.0 envelope per line
//! from an [`Emulator`]. Each connection gets its own task; requests on a
//! connection are answered in order.
//!
//! | Failure                          | Code     |
//! |----------------------------------|----------|
//! | line is not JSON                 | `-32700` |
//! | not a JSON-RPC 2.0 envelope      | `-32600` |
//! | unknown method                   | `-32601` |
//! | params do not match the method   | `-32602` |

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use shardline_client::config::JSONRPC_VERSION;
use shardline_client::network::rpc::{RpcError, RpcMethod, RpcRequest, RpcResponse};
use shardline_client::Emulator;

/// A bound listener plus the ledger it serves.
pub struct NodeServer {
    listener: TcpListener,
    emulator: Emulator,
}

impl NodeServer {
    pub async fn bind(addr: SocketAddr, emulator: Emulator) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, emulator })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    /// Accepts connections until `shutdown` completes. Connections already
    /// open keep their tasks until the peer hangs up.
    pub async fn serve<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("server shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(%peer, "client connected");
                        let emulator = self.emulator.clone();
                        tokio::spawn(async move {
                            if let Err(err) = handle_connection(stream, emulator).await {
                                tracing::debug!(%peer, error = %err, "connection ended with error");
                            }
                            tracing::debug!(%peer, "client disconnected");
                        });
                    }
                    Err(err) => tracing::warn!(error = %err, "accept failed"),
                },
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, emulator: Emulator) -> io::Result<()> {
    stream.set_nodelay(true)?;
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatch(&emulator, &line);
        let mut out = serde_json::to_string(&response).map_err(io::Error::other)?;
        out.push('\n');
        write.write_all(out.as_bytes()).await?;
        write.flush().await?;
    }
    Ok(())
}

/// Answers one raw line. Never fails: every problem becomes a JSON-RPC
/// error object.
pub fn dispatch(emulator: &Emulator, line: &str) -> RpcResponse {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => return RpcResponse::error(Value::Null, RpcError::parse_error(err.to_string())),
    };
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    if value.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return RpcResponse::error(id, RpcError::invalid_request("jsonrpc must be \"2.0\""));
    }
    let Some(method) = value.get("method").and_then(Value::as_str) else {
        return RpcResponse::error(id, RpcError::invalid_request("missing method"));
    };
    if serde_json::from_value::<RpcMethod>(Value::from(method)).is_err() {
        return RpcResponse::error(id, RpcError::method_not_found(method));
    }

    let envelope: RpcRequest = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        Err(err) => return RpcResponse::error(id, RpcError::invalid_request(err.to_string())),
    };
    let request = match envelope.decode() {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(method = ?envelope.method, error = %err.message, "rejected params");
            return RpcResponse::error(id, err);
        }
    };

    let name = request.name();
    let response = emulator.handle(request);
    tracing::debug!(request = name, "request handled");
    RpcResponse::encode(id.clone(), &response)
        .unwrap_or_else(|err| RpcResponse::error(id, RpcError::internal_error(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shardline_client::network::{QueryBody, QueryRequest, Request, ResponseType};
    use shardline_client::{AccountId, SecretKey};

    fn emulator() -> Emulator {
        let emulator = Emulator::default();
        emulator.create_account(AccountId::simple(2), SecretKey::generate().public(), 500);
        emulator
    }

    fn error_code(response: &RpcResponse) -> i32 {
        response.error.as_ref().map(|e| e.code).unwrap_or_default()
    }

    #[test]
    fn parse_error_for_garbage() {
        let response = dispatch(&emulator(), "{not json");
        assert_eq!(error_code(&response), -32700);
        assert_eq!(response.id, Value::Null);
    }

    #[test]
    fn invalid_request_for_wrong_version() {
        let line = json!({"jsonrpc": "1.0", "id": 7, "method": "ledger_query", "params": {}});
        let response = dispatch(&emulator(), &line.to_string());
        assert_eq!(error_code(&response), -32600);
        assert_eq!(response.id, json!(7));
    }

    #[test]
    fn method_not_found() {
        let line = json!({"jsonrpc": "2.0", "id": 1, "method": "ledger_mint", "params": {}});
        let response = dispatch(&emulator(), &line.to_string());
        assert_eq!(error_code(&response), -32601);
    }

    #[test]
    fn invalid_params() {
        let line = json!({"jsonrpc": "2.0", "id": 1, "method": "ledger_query", "params": {"nope": true}});
        let response = dispatch(&emulator(), &line.to_string());
        assert_eq!(error_code(&response), -32602);
    }

    #[test]
    fn balance_query_round_trip() {
        let request = Request::Query(QueryRequest {
            response_type: ResponseType::AnswerOnly,
            body: QueryBody::AccountBalance {
                account_id: AccountId::simple(2),
            },
        });
        let envelope = RpcRequest::encode(42, &request).unwrap();
        let response = dispatch(&emulator(), &serde_json::to_string(&envelope).unwrap());
        assert_eq!(response.id, json!(42));
        assert!(response.error.is_none());

        let result = response.result.unwrap();
        assert_eq!(result["precheck"], json!(0));
        assert_eq!(result["answer"]["account_balance"]["balance"], json!(500));
    }
}
