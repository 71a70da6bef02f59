//! Reconciliation error taxonomy.

use thiserror::Error;

use crate::transport::OperationHandle;

/// Errors that can occur during a reconciliation pass.
///
/// Every variant carries enough structure for the caller to decide retry
/// vs. abort. `PartiallyApplied` and `Timeout` are never retried by the
/// core itself: re-dispatching a create is not idempotent in general.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A referenced field is absent and has no default.
    #[error("missing field `{path}` ({context})")]
    MissingField { path: String, context: String },

    /// A value could not be coerced to the declared field kind.
    #[error("type mismatch at `{path}`: expected {expected}, got {got}")]
    TypeMismatch {
        path: String,
        expected: String,
        got: String,
    },

    /// Desired state violates the schema (unknown field, bad shape).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend rejected the request (4xx). Not retryable.
    #[error("remote rejected ({status}): {detail}")]
    RemoteRejected { status: u16, detail: String },

    /// Network/5xx failure that survived the retry budget.
    #[error("transient failure after {attempts} attempts: {detail}")]
    Transient { attempts: u32, detail: String },

    /// An asynchronous operation outlived the pass deadline. The handle
    /// lets the caller resume polling instead of re-dispatching.
    #[error("deadline exceeded waiting for operation `{}`", handle.0)]
    Timeout { handle: OperationHandle },

    /// Replace deleted the old resource but failed to recreate it.
    /// The resource is absent remotely; the caller must re-apply.
    #[error("replace partially applied: `{identifier}` deleted but not recreated ({detail})")]
    PartiallyApplied { identifier: String, detail: String },
}

impl ReconcileError {
    /// True if a fresh reconciliation pass may safely be attempted.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReconcileError::Transient { .. })
    }

    /// True if the remote side-effect may have partially landed.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            ReconcileError::PartiallyApplied { .. } | ReconcileError::Timeout { .. }
        )
    }

    /// The resumable operation handle, if this failure carries one.
    pub fn resumable_handle(&self) -> Option<&OperationHandle> {
        match self {
            ReconcileError::Timeout { handle } => Some(handle),
            _ => None,
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
