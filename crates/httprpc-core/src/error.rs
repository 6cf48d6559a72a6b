//! Error types shared by the httprpc crates

use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Client-side anomaly: missing response, non-JSON content type or undecodable body.
pub const TRANSPORT_ANOMALY: i64 = -342;

/// Malformed envelope: missing `result` or a batch payload that is not a list.
pub const MALFORMED_ENVELOPE: i64 = -343;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A classified JSON-RPC failure.
///
/// Built either from the `error` object a server returned or synthesized by the
/// client for protocol anomalies ([`TRANSPORT_ANOMALY`], [`MALFORMED_ENVELOPE`]).
/// The original payload is kept untouched so callers can inspect `data` or any
/// other vendor field.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    code: Option<i64>,
    message: Option<String>,
    payload: Value,
}

impl RpcError {
    /// Wrap an error object returned by a server.
    pub fn from_payload(payload: Value) -> Self {
        let code = payload.get("code").and_then(Value::as_i64);
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            code,
            message,
            payload,
        }
    }

    /// Error raised by the client itself rather than the server.
    pub fn synthetic(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            code: Some(code),
            payload: json!({ "code": code, "message": message }),
            message: Some(message),
        }
    }

    pub fn missing_response() -> Self {
        Self::synthetic(TRANSPORT_ANOMALY, "missing HTTP response from server")
    }

    pub fn non_json_response(status: u16, reason: &str) -> Self {
        let status_line = match reason.trim() {
            "" => status.to_string(),
            reason => format!("{} {}", status, reason),
        };
        Self::synthetic(
            TRANSPORT_ANOMALY,
            format!("non-JSON HTTP response with '{}' from server", status_line),
        )
    }

    pub fn decode_failure() -> Self {
        Self::synthetic(TRANSPORT_ANOMALY, "decode JSON response error")
    }

    pub fn missing_result() -> Self {
        Self::synthetic(MALFORMED_ENVELOPE, "missing JSON-RPC result")
    }

    pub fn invalid_batch_response() -> Self {
        Self::synthetic(MALFORMED_ENVELOPE, "invalid response list")
    }

    pub fn code(&self) -> Option<i64> {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}", code)?,
            None => f.write_str("unknown")?,
        }
        write!(f, ": {}", self.message.as_deref().unwrap_or("unknown"))
    }
}

impl std::error::Error for RpcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let err = RpcError::from_payload(json!({"code": -32601, "message": "Method not found"}));
        assert_eq!(err.to_string(), "-32601: Method not found");
    }

    #[test]
    fn test_payload_is_preserved() {
        let payload = json!({"code": -5, "message": "No such block", "data": {"height": 12}});
        let err = RpcError::from_payload(payload.clone());
        assert_eq!(err.code(), Some(-5));
        assert_eq!(err.message(), Some("No such block"));
        assert_eq!(err.payload(), &payload);
    }

    #[test]
    fn test_incomplete_payload() {
        let err = RpcError::from_payload(json!("boom"));
        assert_eq!(err.code(), None);
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "unknown: unknown");
    }

    #[test]
    fn test_non_json_without_reason_phrase() {
        assert_eq!(
            RpcError::non_json_response(599, "").message(),
            Some("non-JSON HTTP response with '599' from server")
        );
    }

    #[test]
    fn test_synthetic_errors() {
        assert_eq!(RpcError::missing_response().code(), Some(TRANSPORT_ANOMALY));
        assert_eq!(RpcError::missing_result().code(), Some(MALFORMED_ENVELOPE));
        assert_eq!(
            RpcError::non_json_response(502, "Bad Gateway").to_string(),
            "-342: non-JSON HTTP response with '502 Bad Gateway' from server"
        );
        assert_eq!(
            RpcError::decode_failure().payload(),
            &json!({"code": -342, "message": "decode JSON response error"})
        );
    }
}
