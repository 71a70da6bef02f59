//! The narrow seam between the reconciliation core and the remote API.

use async_trait::async_trait;
use thiserror::Error;

/// HTTP-ish method for a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// One logical request against the remote API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the transport's base URL, query string included.
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        ApiRequest {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The transport's answer: a status code plus parsed JSON body, if any.
/// Status classification (retry vs. reject) happens in the executor.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Opaque reference to an in-progress asynchronous remote operation.
/// Carried through `TimeoutError` so callers can resume polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(pub String);

/// Result of polling an asynchronous operation once.
#[derive(Debug, Clone)]
pub enum PollStatus {
    Pending,
    /// Finished; the payload is the operation's response body, when the
    /// backend provides one.
    Done(Option<serde_json::Value>),
    /// The operation itself failed remotely; `code` is the backend's
    /// error code.
    Failed { code: u16, message: String },
}

/// Failures below the HTTP layer. Anything that produced a status code
/// comes back as an [`ApiResponse`] instead.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection-level failure: reset, refused, request timeout.
    /// Retryable.
    #[error("connection failure: {0}")]
    Connect(String),

    /// The request could not be constructed or serialized. Not
    /// retryable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Remote API surface the executor dispatches against.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, TransportError>;

    async fn poll_operation(&self, handle: &OperationHandle)
        -> Result<PollStatus, TransportError>;
}
