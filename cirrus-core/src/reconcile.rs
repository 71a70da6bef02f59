//! The single entry point: diff desired against observed state, execute
//! the resulting operation, and hand back merged canonical state.

use std::time::Duration;

use tracing::info;

use crate::attrs::AttributeSet;
use crate::diff::{plan, Operation};
use crate::error::{ReconcileError, Result};
use crate::executor::{Clock, Executor, RetryPolicy};
use crate::projection;
use crate::schema::ResourceSchema;
use crate::template;
use crate::transport::RemoteTransport;

/// Everything one reconciliation pass needs, passed explicitly per
/// call. No process-wide singletons.
pub struct ReconcileContext<'a> {
    pub transport: &'a dyn RemoteTransport,
    pub clock: &'a dyn Clock,
    pub retry: RetryPolicy,
    /// Pass deadline; dispatch retries and async polling stop here.
    pub timeout: Duration,
}

/// Outcome of a successful pass.
#[derive(Debug, Clone)]
pub struct Applied {
    /// The operation that was classified and executed.
    pub operation: Operation,
    /// Canonical identifier; re-derived after a replace.
    pub identifier: String,
    /// Merged state to persist; `None` after a delete.
    pub state: Option<AttributeSet>,
}

/// Reconcile one resource.
///
/// `desired = None` declares the resource should not exist (delete);
/// `observed = None` is the "does not exist" sentinel. Within one pass
/// a replace's delete step fully settles before its create dispatches.
pub async fn reconcile(
    schema: &ResourceSchema,
    ctx: &ReconcileContext<'_>,
    desired: Option<&AttributeSet>,
    observed: Option<&AttributeSet>,
) -> Result<Applied> {
    let executor = Executor::new(ctx.transport, ctx.clock, ctx.retry.clone(), ctx.timeout);

    let desired = match desired {
        Some(d) => d,
        None => {
            let target = match observed {
                Some(o) => o,
                // Nothing desired, nothing observed.
                None => {
                    return Ok(Applied {
                        operation: Operation::NoOp,
                        identifier: String::new(),
                        state: None,
                    })
                }
            };
            let identifier = template::render(&schema.rest.resource, schema, target)?;
            info!(resource = %schema.type_name, id = %identifier, "reconciling: delete");
            executor.delete(schema, target).await?;
            return Ok(Applied {
                operation: Operation::Delete,
                identifier,
                state: None,
            });
        }
    };

    projection::validate(schema, desired)?;
    let operation = plan(schema, desired, observed)?;
    info!(resource = %schema.type_name, operation = %operation, "reconciling");

    match &operation {
        Operation::NoOp => {
            let state = match observed {
                Some(o) => desired.merged_with(o),
                None => desired.clone(),
            };
            let identifier = template::render(&schema.rest.resource, schema, &state)?;
            Ok(Applied {
                operation,
                identifier,
                state: Some(state),
            })
        }
        Operation::Create => {
            let remote = executor.create(schema, desired).await?;
            let state = desired.merged_with(&remote);
            let identifier = template::render(&schema.rest.resource, schema, &state)?;
            Ok(Applied {
                operation,
                identifier,
                state: Some(state),
            })
        }
        Operation::Update { field_mask } => {
            let remote = executor.update(schema, desired, field_mask).await?;
            let state = desired.merged_with(&remote);
            let identifier = template::render(&schema.rest.resource, schema, &state)?;
            Ok(Applied {
                operation,
                identifier,
                state: Some(state),
            })
        }
        Operation::Replace => {
            // Delete targets the observed resource; it settles fully
            // before the create dispatches.
            let target = observed.expect("replace planned without observed state");
            let old_identifier = template::render(&schema.rest.resource, schema, target)?;
            executor.delete(schema, target).await?;
            match executor.create(schema, desired).await {
                Ok(remote) => {
                    let state = desired.merged_with(&remote);
                    let identifier = template::render(&schema.rest.resource, schema, &state)?;
                    Ok(Applied {
                        operation,
                        identifier,
                        state: Some(state),
                    })
                }
                // A timed-out create is still in flight remotely; the
                // handle lets the caller resume, so pass it through.
                Err(e @ ReconcileError::Timeout { .. }) => Err(e),
                Err(e) => Err(ReconcileError::PartiallyApplied {
                    identifier: old_identifier,
                    detail: e.to_string(),
                }),
            }
        }
        Operation::Delete => unreachable!("plan never emits delete"),
    }
}

/// Data-source style read: resolve the identifier from the given
/// arguments, fetch, and decode. No diffing, no mutation.
pub async fn read_resource(
    schema: &ResourceSchema,
    ctx: &ReconcileContext<'_>,
    arguments: &AttributeSet,
) -> Result<Option<AttributeSet>> {
    let executor = Executor::new(ctx.transport, ctx.clock, ctx.retry.clone(), ctx.timeout);
    let identifier = template::render(&schema.rest.resource, schema, arguments)?;
    info!(resource = %schema.type_name, id = %identifier, "reading");
    executor.read(schema, arguments).await
}
