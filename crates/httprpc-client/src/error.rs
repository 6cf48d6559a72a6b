//! Error types for the JSON-RPC client

use httprpc_core::RpcError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP session is closed")]
    SessionClosed,

    #[error("JSON encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Handle is not bound to a method")]
    Unbound,

    #[error("Invalid method name: {0:?}")]
    InvalidMethod(String),

    #[error("Invalid batch entry: {0}")]
    InvalidBatchEntry(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("No tokio runtime available to schedule calls")]
    NoRuntime,

    #[error("Call task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Pending call polled after completion")]
    Completed,

    #[error("Configuration error: {0}")]
    Config(#[from] httprpc_core::Error),
}

impl Error {
    /// The classified RPC error, if this failure carries one.
    pub fn rpc(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(err) => Some(err),
            _ => None,
        }
    }

    /// Code of the classified RPC error, if any.
    pub fn code(&self) -> Option<i64> {
        self.rpc().and_then(RpcError::code)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
