//! Provider configuration, passed explicitly into every pass.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use cirrus_core::{AttributeSet, ResourceSchema, RetryPolicy, Value};

fn default_user_agent() -> String {
    format!("cirrus/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_retry_attempts() -> u32 {
    3
}

/// Provider-level settings: endpoint, credentials, and the defaults
/// that fall back into resources that leave `project`/`region`/`zone`
/// unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the backend API, no trailing slash required.
    pub base_url: String,

    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,

    /// Bearer token; acquiring it is the caller's business.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-pass deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ProviderConfig {
            base_url: base_url.into(),
            project: None,
            region: None,
            zone: None,
            token: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            ..RetryPolicy::default()
        }
    }

    /// Fill provider-level defaults into an attribute set: when the
    /// schema declares `project`/`region`/`zone`/`location` and the
    /// caller left it unset, the provider default applies.
    pub fn apply_defaults(&self, schema: &ResourceSchema, attrs: &AttributeSet) -> AttributeSet {
        let mut out = attrs.clone();
        let defaults = [
            ("project", &self.project),
            ("region", &self.region),
            ("location", &self.region),
            ("zone", &self.zone),
        ];
        for (field, value) in defaults {
            if let Some(value) = value {
                if schema.field(field).is_some() && !out.contains(field) {
                    // Errors cannot occur for a plain top-level key.
                    let _ = out.insert(field, Value::String(value.clone()));
                }
            }
        }
        out
    }
}
