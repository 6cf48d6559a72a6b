//! httprpc client library
//!
//! JSON-RPC 2.0 calls over HTTP: single calls, batches and method-bound
//! handles sharing one session and one request id counter.

pub mod auth;
pub mod batch;
pub mod client;
pub mod error;
pub mod interpret;
pub mod pending;
pub mod transport;

pub use auth::BasicAuth;
pub use batch::BatchRequest;
pub use client::{Client, ClientBuilder, IdCounter, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use httprpc_core::RpcError;
pub use pending::PendingCall;
pub use transport::{HttpRequest, HttpResponse, HttpSession, Transport};
