pub mod error;
pub mod models;
pub mod protocol;
pub mod storage;

pub use error::{Error, Result, RpcError};
