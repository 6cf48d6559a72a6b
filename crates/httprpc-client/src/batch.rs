//! Batch entries: `[method, arg1, arg2, ...]`

use crate::error::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub method: String,
    pub params: Vec<Value>,
}

impl BatchRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Parse every element of a JSON array of `[method, args...]` entries.
    pub fn parse_list(value: Value) -> Result<Vec<Self>> {
        match value {
            Value::Array(entries) => entries.into_iter().map(Self::try_from).collect(),
            other => Err(Error::InvalidBatchEntry(format!(
                "expected a list of entries, got {}",
                other
            ))),
        }
    }
}

impl TryFrom<Value> for BatchRequest {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let mut items = match value {
            Value::Array(items) => items.into_iter(),
            other => {
                return Err(Error::InvalidBatchEntry(format!(
                    "expected [method, args...], got {}",
                    other
                )))
            }
        };

        match items.next() {
            Some(Value::String(method)) if !method.is_empty() => {
                Ok(Self::new(method, items.collect()))
            }
            Some(other) => Err(Error::InvalidBatchEntry(format!(
                "method must be a non-empty string, got {}",
                other
            ))),
            None => Err(Error::InvalidBatchEntry("empty entry".to_string())),
        }
    }
}
