//! cirrus: plan and apply declarative cloud resources.
//!
//! Desired state lives in JSON files; applied state is persisted in a
//! local state file keyed by canonical identifier. `plan` classifies
//! the pending operation without touching the backend's resources,
//! `apply` executes it, `destroy` removes a resource, and `read` runs
//! a read-only data source lookup.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cirrus_core::{
    plan, read_resource, reconcile, template, AttributeSet, ReconcileContext, ReconcileError,
    ResourceSchema, StateStore, SystemClock,
};
use cirrus_provider::{resources, FileStateStore, HttpTransport, ProviderConfig};

/// cirrus resource reconciler
#[derive(Parser, Debug)]
#[command(name = "cirrus", version, about)]
struct Args {
    /// Provider configuration file (JSON)
    #[arg(long, default_value = "provider.json")]
    config: PathBuf,

    /// State file path
    #[arg(long, default_value = "cirrus.state.json")]
    state: PathBuf,

    /// Override the configured backend base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Override the configured bearer token
    #[arg(long)]
    token: Option<String>,

    /// Override the per-pass deadline in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the operation a desired-state file would trigger
    Plan {
        /// Resource type (e.g. sql_user)
        #[arg(long)]
        resource: String,

        /// Desired state file (JSON)
        #[arg(long)]
        desired: PathBuf,

        /// Refresh observed state from the backend instead of the
        /// state file
        #[arg(long)]
        refresh: bool,
    },

    /// Execute the pending operation and persist the result
    Apply {
        #[arg(long)]
        resource: String,

        #[arg(long)]
        desired: PathBuf,

        #[arg(long)]
        refresh: bool,
    },

    /// Delete a managed resource and drop it from state
    Destroy {
        #[arg(long)]
        resource: String,

        /// Desired state file naming the resource to destroy
        #[arg(long)]
        desired: PathBuf,
    },

    /// Read a data source and print its attributes
    Read {
        /// Data source type (e.g. management_server)
        #[arg(long)]
        data_source: String,

        /// Lookup arguments file (JSON)
        #[arg(long)]
        args: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cirrus=info,cirrus_core=info,cirrus_provider=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = load_config(&args.config).await?;
    if let Some(endpoint) = &args.endpoint {
        config.base_url = endpoint.clone();
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    let store = FileStateStore::new(&args.state);

    let output = match &args.command {
        Commands::Plan {
            resource,
            desired,
            refresh,
        } => cmd_plan(&config, &store, resource, desired, *refresh).await?,
        Commands::Apply {
            resource,
            desired,
            refresh,
        } => cmd_apply(&config, &store, resource, desired, *refresh).await?,
        Commands::Destroy { resource, desired } => {
            cmd_destroy(&config, &store, resource, desired).await?
        }
        Commands::Read { data_source, args } => cmd_read(&config, data_source, args).await?,
    };
    println!("{output}");
    Ok(())
}

async fn cmd_plan(
    config: &ProviderConfig,
    store: &FileStateStore,
    resource: &str,
    desired: &PathBuf,
    refresh: bool,
) -> Result<String> {
    let schema = resource_schema(resource)?;
    let desired = load_attrs(desired, config, &schema).await?;
    let observed = observe(config, store, &schema, &desired, refresh).await?;
    let operation = plan(&schema, &desired, observed.as_ref())?;
    Ok(format!("{resource}: {operation}"))
}

async fn cmd_apply(
    config: &ProviderConfig,
    store: &FileStateStore,
    resource: &str,
    desired: &PathBuf,
    refresh: bool,
) -> Result<String> {
    let schema = resource_schema(resource)?;
    let desired = load_attrs(desired, config, &schema).await?;
    let observed = observe(config, store, &schema, &desired, refresh).await?;
    let old_identifier = identifier_of(&schema, observed.as_ref());

    let transport = HttpTransport::new(config)?;
    let clock = SystemClock;
    let ctx = ReconcileContext {
        transport: &transport,
        clock: &clock,
        retry: config.retry_policy(),
        timeout: config.timeout(),
    };

    match reconcile(&schema, &ctx, Some(&desired), observed.as_ref()).await {
        Ok(applied) => {
            if let Some(state) = &applied.state {
                // A replace may have moved the resource to a new
                // identifier; drop the old record first.
                if let Some(old) = old_identifier {
                    if old != applied.identifier {
                        store.delete_state(&old).await?;
                    }
                }
                store.write_state(&applied.identifier, state).await?;
            }
            info!(id = %applied.identifier, "apply complete");
            Ok(format!(
                "{resource}: {} -> {}",
                applied.operation, applied.identifier
            ))
        }
        Err(e @ ReconcileError::PartiallyApplied { .. }) => {
            // The old resource is gone remotely; forget it so the
            // next apply recreates instead of diffing a ghost.
            if let Some(old) = old_identifier {
                store.delete_state(&old).await?;
            }
            warn!(error = %e, "apply partially completed, re-run to finish");
            bail!("{e}");
        }
        Err(e @ ReconcileError::Timeout { .. }) => {
            if let Some(handle) = e.resumable_handle() {
                warn!(handle = %handle.0, "deadline exceeded; operation still running");
            }
            bail!("{e}");
        }
        Err(e) => bail!("{e}"),
    }
}

async fn cmd_destroy(
    config: &ProviderConfig,
    store: &FileStateStore,
    resource: &str,
    desired: &PathBuf,
) -> Result<String> {
    let schema = resource_schema(resource)?;
    let desired = load_attrs(desired, config, &schema).await?;
    let identifier = template::render(&schema.rest.resource, &schema, &desired)?;
    let observed = store
        .read_state(&identifier)
        .await?
        .unwrap_or_else(|| desired.clone());

    let transport = HttpTransport::new(config)?;
    let clock = SystemClock;
    let ctx = ReconcileContext {
        transport: &transport,
        clock: &clock,
        retry: config.retry_policy(),
        timeout: config.timeout(),
    };

    reconcile(&schema, &ctx, None, Some(&observed)).await?;
    store.delete_state(&identifier).await?;
    Ok(format!("{resource}: destroyed {identifier}"))
}

async fn cmd_read(
    config: &ProviderConfig,
    data_source: &str,
    args: &PathBuf,
) -> Result<String> {
    let schema = resources::data_source_for(data_source).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown data source `{data_source}` (available: {})",
            resources::data_source_names().join(", ")
        )
    })?;
    let arguments = load_attrs(args, config, &schema).await?;

    let transport = HttpTransport::new(config)?;
    let clock = SystemClock;
    let ctx = ReconcileContext {
        transport: &transport,
        clock: &clock,
        retry: config.retry_policy(),
        timeout: config.timeout(),
    };

    match read_resource(&schema, &ctx, &arguments).await? {
        Some(attrs) => Ok(serde_json::to_string_pretty(&attrs.to_json())?),
        None => bail!("{data_source} not found"),
    }
}

async fn load_config(path: &PathBuf) -> Result<ProviderConfig> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading provider config {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing provider config {}", path.display()))
}

fn resource_schema(name: &str) -> Result<ResourceSchema> {
    resources::schema_for(name).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown resource `{name}` (available: {})",
            resources::resource_names().join(", ")
        )
    })
}

/// Load a JSON attribute file and fill in provider-level defaults.
async fn load_attrs(
    path: &PathBuf,
    config: &ProviderConfig,
    schema: &ResourceSchema,
) -> Result<AttributeSet> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    let attrs = AttributeSet::from_json(&json)?;
    Ok(config.apply_defaults(schema, &attrs))
}

/// Observed state: the state-file record, or a live read when
/// refreshing.
async fn observe(
    config: &ProviderConfig,
    store: &FileStateStore,
    schema: &ResourceSchema,
    desired: &AttributeSet,
    refresh: bool,
) -> Result<Option<AttributeSet>> {
    let identifier = template::render(&schema.rest.resource, schema, desired)?;
    if refresh {
        let transport = HttpTransport::new(config)?;
        let clock = SystemClock;
        let ctx = ReconcileContext {
            transport: &transport,
            clock: &clock,
            retry: config.retry_policy(),
            timeout: config.timeout(),
        };
        return Ok(read_resource(schema, &ctx, desired).await?);
    }
    Ok(store.read_state(&identifier).await?)
}

fn identifier_of(schema: &ResourceSchema, observed: Option<&AttributeSet>) -> Option<String> {
    let observed = observed?;
    template::render(&schema.rest.resource, schema, observed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn desired_file(dir: &tempfile::TempDir, json: serde_json::Value) -> PathBuf {
        let path = dir.path().join("desired.json");
        tokio::fs::write(&path, serde_json::to_vec(&json).unwrap())
            .await
            .unwrap();
        path
    }

    fn config_for(base_url: String) -> ProviderConfig {
        let mut cfg = ProviderConfig::new(base_url);
        cfg.project = Some("p1".into());
        cfg.region = Some("us-central1".into());
        cfg.retry_attempts = 1;
        cfg
    }

    #[tokio::test]
    async fn plan_reports_create_without_touching_the_backend() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        // No server is listening here; plan must not dial out.
        let cfg = config_for("http://127.0.0.1:1".into());
        let desired = desired_file(
            &dir,
            serde_json::json!({"name": "r1", "throughput_capacity": 4}),
        )
        .await;

        let out = cmd_plan(&cfg, &store, "pubsub_lite_reservation", &desired, false)
            .await
            .unwrap();
        assert_eq!(out, "pubsub_lite_reservation: create");
    }

    #[tokio::test]
    async fn apply_persists_state_and_replays_as_noop() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/p1/locations/us-central1/reservations"))
            .and(query_param("reservationId", "r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "r1",
                "throughputCapacity": 4,
                "id": "projects/p1/locations/us-central1/reservations/r1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        let cfg = config_for(server.uri());
        let desired = desired_file(
            &dir,
            serde_json::json!({"name": "r1", "throughput_capacity": 4}),
        )
        .await;

        let out = cmd_apply(&cfg, &store, "pubsub_lite_reservation", &desired, false)
            .await
            .unwrap();
        assert!(out.contains("create"));

        // Second pass reads observed state from the file; nothing
        // drifted, so no request reaches the backend (the mock allows
        // exactly one POST).
        let out = cmd_apply(&cfg, &store, "pubsub_lite_reservation", &desired, false)
            .await
            .unwrap();
        assert!(out.contains("no-op"));
    }

    #[tokio::test]
    async fn partially_applied_replace_drops_the_state_record() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/projects/p1/instances/main/users"))
            .and(query_param("name", "admin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "operations/op-1",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/projects/p1/instances/main/users"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        let cfg = config_for(server.uri());

        let mut observed = AttributeSet::new();
        observed.insert("name", "admin".into()).unwrap();
        observed.insert("instance", "main".into()).unwrap();
        observed.insert("project", "p1".into()).unwrap();
        observed.insert("host", "old-host".into()).unwrap();
        let identifier = "projects/p1/instances/main/users/admin";
        store.write_state(identifier, &observed).await.unwrap();

        // Host is immutable, so changing it deletes then recreates;
        // the recreate fails.
        let desired = desired_file(
            &dir,
            serde_json::json!({
                "name": "admin",
                "instance": "main",
                "host": "new-host",
                "password": "secret"
            }),
        )
        .await;

        let err = cmd_apply(&cfg, &store, "sql_user", &desired, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("partially applied"));
        // The record is gone; the next apply recreates from scratch.
        assert!(store.read_state(identifier).await.unwrap().is_none());
    }
}
