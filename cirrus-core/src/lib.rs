//! cirrus-core: the declarative reconciliation engine.
//!
//! A caller hands us a desired attribute set and (maybe) an observed one,
//! plus a schema describing each field's type and mutability. We classify
//! the difference into a single operation (create, masked update,
//! replace-via-recreate, delete, or no-op), execute it against a remote
//! API through a narrow transport trait, and hand back the merged
//! canonical state.
//!
//! Everything here is pass-local: no shared mutable state, no globals.
//! Callers may reconcile many resources concurrently.

pub mod attrs;
pub mod diff;
pub mod error;
pub mod executor;
pub mod projection;
pub mod reconcile;
pub mod schema;
pub mod state;
pub mod template;
pub mod transport;

pub use attrs::{AttributeSet, Value};
pub use diff::{plan, Operation};
pub use error::{ReconcileError, Result};
pub use executor::{Backoff, Clock, Executor, RetryPolicy, SystemClock};
pub use reconcile::{Applied, ReconcileContext, reconcile, read_resource};
pub use schema::{Absence, FieldKind, FieldSpec, Mutability, ResourceSchema, RestLayout, UpdateVerb};
pub use state::StateStore;
pub use transport::{ApiRequest, ApiResponse, Method, OperationHandle, PollStatus, RemoteTransport, TransportError};
