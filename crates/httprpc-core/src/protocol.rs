//! JSON-RPC 2.0 request envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Numeric id tagging every request sent by a client.
pub type RequestId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: RequestId,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = Request::new("getblockhash", vec![json!(1000)], 7);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "getblockhash", "params": [1000], "id": 7})
        );
    }

    #[test]
    fn test_empty_params_serialize_as_array() {
        let req = Request::new("getinfo", Vec::new(), 1);
        let text = serde_json::to_string(&req).unwrap();
        assert!(text.contains("\"params\":[]"));
    }

    #[test]
    fn test_params_keep_order() {
        let req = Request::new("foo", vec![json!("a"), json!(2), json!(null), json!([1])], 3);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["params"], json!(["a", 2, null, [1]]));
    }
}
