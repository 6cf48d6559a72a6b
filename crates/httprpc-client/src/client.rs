use crate::auth::BasicAuth;
use crate::batch::BatchRequest;
use crate::error::{Error, Result};
use crate::interpret;
use crate::pending::PendingCall;
use crate::transport::{HttpRequest, HttpSession, Transport};
use httprpc_core::models::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use httprpc_core::protocol::{Request, RequestId};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Request id source shared by a client and every handle derived from it.
#[derive(Debug, Default)]
pub struct IdCounter(AtomicU64);

impl IdCounter {
    /// Increment, then hand out the new value. The first id is 1.
    pub fn next(&self) -> RequestId {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last id handed out, 0 if none.
    pub fn last(&self) -> RequestId {
        self.0.load(Ordering::SeqCst)
    }
}

/// State common to a root client and its method-bound handles.
struct Shared {
    url: String,
    session: Arc<dyn Transport>,
    owns_session: bool,
    timeout: Duration,
    headers: HeaderMap,
    ids: IdCounter,
    runtime: Handle,
}

impl Shared {
    async fn post(&self, body: Vec<u8>) -> Result<Value> {
        let response = self
            .session
            .post(HttpRequest {
                url: self.url.clone(),
                headers: self.headers.clone(),
                body,
                timeout: self.timeout,
            })
            .await?;
        Ok(interpret::decode(response)?)
    }

    async fn single(self: Arc<Self>, body: Vec<u8>, id: RequestId) -> Result<Value> {
        let envelope = self.post(body).await?;
        Ok(interpret::into_result(envelope, id)?)
    }

    async fn batch(self: Arc<Self>, body: Vec<u8>) -> Result<Vec<Value>> {
        let payload = self.post(body).await?;
        Ok(interpret::into_batch(payload)?)
    }
}

/// JSON-RPC 2.0 over HTTP client.
///
/// A client without a bound method is a factory: [`Client::method`] derives a
/// handle bound to a method name which shares the URL, session, timeout and id
/// counter of its parent. Bound handles are invoked with [`Client::invoke`].
///
/// ```no_run
/// # async fn demo() -> httprpc_client::Result<()> {
/// use serde_json::json;
///
/// let client = httprpc_client::Client::new("http://127.0.0.1:8332/")?;
/// let count = client.method("getblockcount")?.invoke(vec![]).await?;
/// let hash = client.call("getblockhash", vec![json!(count)]).await?;
/// client.close().await;
/// # let _ = hash;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
    method: Option<String>,
}

impl Client {
    /// Client for `url` with defaults, scheduled on the ambient tokio runtime.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(url).build()
    }

    pub fn builder(url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(url)
    }

    /// Derive a handle bound to `name`. No I/O happens here.
    pub fn method(&self, name: &str) -> Result<Client> {
        validate_method_name(name)?;
        Ok(Client {
            shared: self.shared.clone(),
            method: Some(name.to_string()),
        })
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    pub fn timeout(&self) -> Duration {
        self.shared.timeout
    }

    /// Whether [`Client::close`] releases the session.
    pub fn owns_session(&self) -> bool {
        self.shared.owns_session
    }

    /// Last request id handed out by this client family.
    pub fn last_id(&self) -> RequestId {
        self.shared.ids.last()
    }

    /// True when both handles share the same session and id counter.
    pub fn same_family(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Invoke the bound method with positional arguments.
    pub fn invoke(&self, params: Vec<Value>) -> PendingCall<Value> {
        match self.method.as_deref() {
            Some(method) => self.dispatch(method, params),
            None => PendingCall::failed(Vec::new(), Error::Unbound),
        }
    }

    /// Call `method` directly, bypassing the factory step.
    pub fn call(&self, method: &str, params: Vec<Value>) -> PendingCall<Value> {
        if let Err(e) = validate_method_name(method) {
            return PendingCall::failed(Vec::new(), e);
        }
        self.dispatch(method, params)
    }

    /// Send several calls in one HTTP exchange.
    ///
    /// Each entry gets its own id, in entry order. Entry method names are checked
    /// like [`Client::method`] before any id is drawn. The decoded list of response
    /// objects is returned as is; per-entry errors are left to the caller.
    pub fn batch<I>(&self, requests: I) -> PendingCall<Vec<Value>>
    where
        I: IntoIterator<Item = BatchRequest>,
    {
        let requests: Vec<BatchRequest> = requests.into_iter().collect();
        if let Err(e) = requests
            .iter()
            .try_for_each(|entry| validate_method_name(&entry.method))
        {
            return PendingCall::failed(Vec::new(), e);
        }

        let envelopes: Vec<Request> = requests
            .into_iter()
            .map(|entry| Request::new(entry.method, entry.params, self.shared.ids.next()))
            .collect();
        let ids: Vec<RequestId> = envelopes.iter().map(|request| request.id).collect();

        let body = match serde_json::to_vec(&envelopes) {
            Ok(body) => body,
            Err(e) => return PendingCall::failed(ids, Error::Encode(e)),
        };

        tracing::debug!(
            url = %self.shared.url,
            entries = ids.len(),
            first_id = ?ids.first(),
            "Dispatching JSON-RPC batch"
        );

        let handle = self
            .shared
            .runtime
            .spawn(self.shared.clone().batch(body));

        PendingCall::running(ids, handle)
    }

    /// Release the session if this client created it.
    ///
    /// A session supplied through [`ClientBuilder::session`] belongs to the
    /// caller and is left open.
    pub async fn close(&self) {
        if self.shared.owns_session {
            self.shared.session.close().await;
        } else {
            tracing::debug!("Session supplied by caller; not closing it");
        }
    }

    fn dispatch(&self, method: &str, params: Vec<Value>) -> PendingCall<Value> {
        let id = self.shared.ids.next();
        let request = Request::new(method, params, id);

        let body = match serde_json::to_vec(&request) {
            Ok(body) => body,
            Err(e) => return PendingCall::failed(vec![id], Error::Encode(e)),
        };

        tracing::debug!(method = %method, id, url = %self.shared.url, "Dispatching JSON-RPC request");

        let handle = self
            .shared
            .runtime
            .spawn(self.shared.clone().single(body, id));

        PendingCall::running(vec![id], handle)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.shared.url)
            .field("method", &self.method)
            .field("timeout", &self.shared.timeout)
            .field("owns_session", &self.shared.owns_session)
            .finish()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    url: String,
    method: Option<String>,
    timeout: Duration,
    session: Option<Arc<dyn Transport>>,
    runtime: Option<Handle>,
    auth: Option<BasicAuth>,
}

impl ClientBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            timeout: DEFAULT_TIMEOUT,
            session: None,
            runtime: None,
            auth: None,
        }
    }

    /// Seed the builder from a validated [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let mut builder =
            Self::new(config.url.trim()).timeout(Duration::from_secs(config.timeout_secs));
        if let Some(ref auth) = config.auth {
            builder = builder.basic_auth(BasicAuth::from(auth));
        }
        Ok(builder)
    }

    /// Bind the client to a default method.
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.method = Some(name.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a caller-owned session. The client will never close it.
    pub fn session(mut self, session: Arc<dyn Transport>) -> Self {
        self.session = Some(session);
        self
    }

    /// Runtime on which calls are spawned. Defaults to the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn basic_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn build(self) -> Result<Client> {
        if let Some(ref name) = self.method {
            validate_method_name(name)?;
        }

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| Error::NoRuntime)?,
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref auth) = self.auth {
            let mut value = HeaderValue::from_str(&auth.to_basic_auth())
                .map_err(|e| Error::InvalidHeader(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let (session, owns_session) = match self.session {
            Some(session) => (session, false),
            None => (Arc::new(HttpSession::new()?) as Arc<dyn Transport>, true),
        };

        Ok(Client {
            shared: Arc::new(Shared {
                url: self.url,
                session,
                owns_session,
                timeout: self.timeout,
                headers,
                ids: IdCounter::default(),
                runtime,
            }),
            method: self.method,
        })
    }
}

/// Reject names a factory must not turn into methods.
fn validate_method_name(name: &str) -> Result<()> {
    if name.is_empty() || (name.starts_with("__") && name.ends_with("__")) {
        return Err(Error::InvalidMethod(name.to_string()));
    }
    Ok(())
}
