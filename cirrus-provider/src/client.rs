//! reqwest-backed implementation of the core's transport seam.

use async_trait::async_trait;
use tracing::{debug, warn};

use cirrus_core::{
    ApiRequest, ApiResponse, Method, OperationHandle, PollStatus, RemoteTransport, TransportError,
};

use crate::config::ProviderConfig;

/// HTTP/JSON transport against a Google-style REST API.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ProviderConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(HttpTransport {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Resolve a core-relative path (or an already absolute operation
    /// name) against the base URL.
    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    async fn execute(
        &self,
        method: reqwest::Method,
        url: String,
        body: Option<&serde_json::Value>,
        headers: &[(String, String)],
    ) -> Result<ApiResponse, TransportError> {
        let mut builder = self.http.request(method, &url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        // Everything that fails before a status code exists is a
        // connection-level problem and therefore retryable.
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let body = if text.is_empty() {
            None
        } else {
            match serde_json::from_str(&text) {
                Ok(json) => Some(json),
                // Non-JSON error pages still carry useful detail.
                Err(_) => Some(serde_json::Value::String(text)),
            }
        };
        debug!(%url, status, "response received");
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = match req.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = self.url_for(&req.url);
        debug!(method = req.method.as_str(), %url, "sending");
        self.execute(method, url, req.body.as_ref(), &req.headers)
            .await
    }

    async fn poll_operation(
        &self,
        handle: &OperationHandle,
    ) -> Result<PollStatus, TransportError> {
        let url = self.url_for(&handle.0);
        let response = self.execute(reqwest::Method::GET, url, None, &[]).await?;

        if response.status >= 500 {
            // Server hiccup while polling; the operation itself is
            // still running.
            return Err(TransportError::Connect(format!(
                "poll returned HTTP {}",
                response.status
            )));
        }
        let body = match response.body {
            Some(body) if response.is_success() => body,
            _ => {
                warn!(handle = %handle.0, status = response.status, "poll rejected");
                return Ok(PollStatus::Failed {
                    code: response.status,
                    message: format!("operation poll rejected with HTTP {}", response.status),
                });
            }
        };

        if body.get("done").and_then(|d| d.as_bool()) != Some(true) {
            return Ok(PollStatus::Pending);
        }
        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(|c| c.as_u64()).unwrap_or(500) as u16;
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("operation failed")
                .to_string();
            return Ok(PollStatus::Failed { code, message });
        }
        Ok(PollStatus::Done(body.get("response").cloned()))
    }
}
