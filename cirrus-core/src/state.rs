//! State store seam: the caller's persisted record of managed resources.
//!
//! The core only reads and writes attribute sets keyed by canonical
//! identifier; persistence, locking, and format belong to the caller.

use async_trait::async_trait;
use thiserror::Error;

use crate::attrs::AttributeSet;

/// Errors from the caller's state backend.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state io: {0}")]
    Io(String),

    #[error("state corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the stored attribute set, `None` when the identifier is
    /// unknown.
    async fn read_state(&self, identifier: &str) -> Result<Option<AttributeSet>, StateError>;

    async fn write_state(
        &self,
        identifier: &str,
        attrs: &AttributeSet,
    ) -> Result<(), StateError>;

    /// Remove the record after a successful delete.
    async fn delete_state(&self, identifier: &str) -> Result<(), StateError>;
}
