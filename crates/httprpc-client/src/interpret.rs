//! Response interpretation: HTTP response -> JSON payload -> result or RpcError

use crate::transport::HttpResponse;
use httprpc_core::protocol::RequestId;
use httprpc_core::RpcError;
use serde_json::Value;

/// Validate the HTTP response and decode its JSON body.
pub fn decode(response: Option<HttpResponse>) -> Result<Value, RpcError> {
    let response = response.ok_or_else(RpcError::missing_response)?;

    if !response.is_json() {
        tracing::warn!(
            status = response.status,
            content_type = ?response.content_type(),
            "Server answered with a non-JSON response"
        );
        return Err(RpcError::non_json_response(
            response.status,
            &response.reason,
        ));
    }

    let text = String::from_utf8(response.body).map_err(|_| RpcError::decode_failure())?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::warn!("Failed to decode JSON-RPC response: {}", e);
        RpcError::decode_failure()
    })
}

/// Resolve a single-call envelope into its `result`.
///
/// A non-null `error` wins over any `result`. The response id is not checked
/// against `sent_id`; a mismatch is only logged.
pub fn into_result(envelope: Value, sent_id: RequestId) -> Result<Value, RpcError> {
    let mut envelope = match envelope {
        Value::Object(map) => map,
        _ => return Err(RpcError::missing_result()),
    };

    match envelope.remove("error") {
        None | Some(Value::Null) => {}
        Some(error) => return Err(RpcError::from_payload(error)),
    }

    let response_id = envelope.get("id").and_then(Value::as_u64);
    if response_id != Some(sent_id) {
        tracing::warn!(
            sent_id,
            response_id = ?envelope.get("id"),
            "JSON-RPC response id does not match request id"
        );
    }

    envelope.remove("result").ok_or_else(RpcError::missing_result)
}

/// A batch payload must be a list; entries are returned untouched.
pub fn into_batch(payload: Value) -> Result<Vec<Value>, RpcError> {
    match payload {
        Value::Array(entries) => Ok(entries),
        _ => Err(RpcError::invalid_batch_response()),
    }
}
