//! HTTP transport seam
//!
//! The dispatcher only needs "post these bytes, give me status, headers and
//! body back". [`HttpSession`] provides that over a shared `reqwest::Client`;
//! tests and embedders can plug in their own [`Transport`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use std::time::Duration;
use tokio::sync::RwLock;

/// Outbound HTTP POST.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

/// Raw HTTP response handed to the interpreter.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    /// True when the media type, ignoring parameters, is `application/json`.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .and_then(|value| value.split(';').next())
            .map(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false)
    }
}

/// A session able to carry JSON-RPC exchanges.
///
/// Implementations must be safe to share between concurrently running calls.
/// `Ok(None)` means the exchange finished without producing a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: HttpRequest) -> Result<Option<HttpResponse>>;

    /// Release the session. Later posts must fail.
    async fn close(&self);
}

/// reqwest-backed session with connection reuse across calls.
pub struct HttpSession {
    client: RwLock<Option<reqwest::Client>>,
}

impl HttpSession {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self::from_client(client))
    }

    /// Wrap a preconfigured reqwest client (proxies, TLS roots, ...).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.client.read().await.is_none()
    }
}

#[async_trait]
impl Transport for HttpSession {
    async fn post(&self, request: HttpRequest) -> Result<Option<HttpResponse>> {
        // reqwest::Client is an Arc internally; don't hold the lock across I/O.
        let client = self
            .client
            .read()
            .await
            .clone()
            .ok_or(Error::SessionClosed)?;

        let response = client
            .post(&request.url)
            .headers(request.headers)
            .body(request.body)
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(Some(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        }))
    }

    async fn close(&self) {
        if self.client.write().await.take().is_some() {
            tracing::debug!("HTTP session closed");
        }
    }
}
