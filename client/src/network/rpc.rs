//! # JSON-RPC Framing
//!
//! The TCP transport carries one JSON-RPC 2.0 envelope per line. Method
//! names are prefixed with `ledger_` so the endpoint can share a port with
//! other JSON-RPC services.
//!
//! | Method                     | Params              | Result            |
//! |----------------------------|---------------------|-------------------|
//! | `ledger_submitTransaction` | `SignedTransaction` | `{ "precheck" }`  |
//! | `ledger_query`             | `QueryRequest`      | `QueryResponse`   |

use serde::{Deserialize, Serialize};

use super::message::{QueryResponse, Request, Response};
use crate::config::JSONRPC_VERSION;
use crate::error::TransportError;
use crate::status::Status;

// ---------------------------------------------------------------------------
// RPC Method Enumeration
// ---------------------------------------------------------------------------

/// Supported JSON-RPC methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcMethod {
    /// Submit a signed transaction.
    #[serde(rename = "ledger_submitTransaction")]
    SubmitTransaction,
    /// Run a query.
    #[serde(rename = "ledger_query")]
    Query,
}

/// Result payload of `ledger_submitTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub precheck: Status,
}

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version. Always "2.0".
    pub jsonrpc: String,
    /// Request identifier. Echoed back in the response.
    pub id: serde_json::Value,
    pub method: RpcMethod,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: serde_json::Value, method: RpcMethod, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method,
            params,
        }
    }

    /// Wraps a logical request.
    pub fn encode(id: u64, request: &Request) -> Result<Self, TransportError> {
        let (method, params) = match request {
            Request::Transaction(tx) => (RpcMethod::SubmitTransaction, serde_json::to_value(tx)?),
            Request::Query(query) => (RpcMethod::Query, serde_json::to_value(query)?),
        };
        Ok(Self::new(id.into(), method, params))
    }

    /// Unwraps the logical request. Fails with an `invalid_params` error
    /// object suitable for sending back to the caller.
    pub fn decode(&self) -> Result<Request, RpcError> {
        let invalid = |e: serde_json::Error| RpcError::invalid_params(e.to_string());
        match self.method {
            RpcMethod::SubmitTransaction => serde_json::from_value(self.params.clone())
                .map(Request::Transaction)
                .map_err(invalid),
            RpcMethod::Query => serde_json::from_value(self.params.clone())
                .map(Request::Query)
                .map_err(invalid),
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// Exactly one of `result` or `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    /// JSON-RPC version. Always "2.0".
    pub jsonrpc: String,
    /// The request ID this response corresponds to.
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Wraps a logical response.
    pub fn encode(id: serde_json::Value, response: &Response) -> Result<Self, TransportError> {
        let result = match response {
            Response::Transaction { precheck } => serde_json::to_value(SubmitResult {
                precheck: *precheck,
            })?,
            Response::Query(query) => serde_json::to_value(query)?,
        };
        Ok(Self::success(id, result))
    }

    /// Unwraps the logical response to a request sent with `method`.
    pub fn decode(self, method: RpcMethod) -> Result<Response, TransportError> {
        if let Some(error) = self.error {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let result = self
            .result
            .ok_or_else(|| TransportError::Frame("response has neither result nor error".into()))?;
        Ok(match method {
            RpcMethod::SubmitTransaction => {
                let SubmitResult { precheck } = serde_json::from_value(result)?;
                Response::Transaction { precheck }
            }
            RpcMethod::Query => Response::Query(serde_json::from_value::<QueryResponse>(result)?),
        })
    }
}

// ---------------------------------------------------------------------------
// RPC Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object with the standard codes:
///
/// - `-32700`: Parse error
/// - `-32600`: Invalid request
/// - `-32601`: Method not found
/// - `-32602`: Invalid params
/// - `-32603`: Internal error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::with_code(-32700, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_code(-32600, msg)
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::with_code(-32601, format!("method not found: {}", method.into()))
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::with_code(-32602, msg)
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::with_code(-32603, msg)
    }

    fn with_code(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            data: None,
        }
    }
}
