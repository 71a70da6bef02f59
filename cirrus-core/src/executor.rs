//! Apply executor: drives one planned operation against the remote API.
//!
//! Each pass runs the state machine
//! `Pending -> Dispatching -> PollingAsync (optional) -> Settled | Failed`.
//! Transient dispatch failures (connect errors, 5xx) are retried with
//! exponential backoff up to a fixed attempt budget; 4xx responses are
//! surfaced immediately with the parsed backend detail. Asynchronous
//! operations are polled against the pass deadline; on expiry the last
//! known handle is returned so the caller can resume polling instead of
//! re-dispatching.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::attrs::AttributeSet;
use crate::error::{ReconcileError, Result};
use crate::projection;
use crate::schema::{ResourceSchema, UpdateVerb};
use crate::template;
use crate::transport::{
    ApiRequest, ApiResponse, Method, OperationHandle, PollStatus, RemoteTransport,
};

/// Injectable time source so polling and backoff are deterministic in
/// tests.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by tokio's timer.
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Exponential backoff schedule.
#[derive(Debug, Clone)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: f64,
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let scaled = self.initial.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max.as_secs_f64()))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Retry budget for transient dispatch failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            backoff: Backoff::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Dispatching,
    PollingAsync,
    Settled,
    Failed,
}

/// Executes planned operations for one reconciliation pass.
pub struct Executor<'a> {
    transport: &'a dyn RemoteTransport,
    clock: &'a dyn Clock,
    policy: RetryPolicy,
    deadline: Instant,
}

impl<'a> Executor<'a> {
    pub fn new(
        transport: &'a dyn RemoteTransport,
        clock: &'a dyn Clock,
        policy: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        let deadline = clock.now() + timeout;
        Executor {
            transport,
            clock,
            policy,
            deadline,
        }
    }

    /// Create the resource from desired state and return the decoded
    /// remote attributes.
    pub async fn create(
        &self,
        schema: &ResourceSchema,
        desired: &AttributeSet,
    ) -> Result<AttributeSet> {
        let url = template::render(&schema.rest.collection, schema, desired)?;
        let body = projection::encode(schema, desired, None)?;
        let response = self
            .run(schema, ApiRequest::new(Method::Post, url).with_body(body))
            .await?;
        self.settle_read(schema, desired, response).await
    }

    /// Apply a masked in-place update and return the decoded remote
    /// attributes.
    pub async fn update(
        &self,
        schema: &ResourceSchema,
        desired: &AttributeSet,
        field_mask: &BTreeSet<String>,
    ) -> Result<AttributeSet> {
        let path = schema
            .rest
            .update
            .as_deref()
            .unwrap_or(&schema.rest.resource);
        let mut url = template::render(path, schema, desired)?;
        if let Some(param) = &schema.rest.update_mask_param {
            let wire_mask = self.wire_mask(schema, field_mask);
            let sep = if url.contains('?') { '&' } else { '?' };
            url = format!("{url}{sep}{param}={wire_mask}");
        }
        let method = match schema.rest.update_verb {
            UpdateVerb::Patch => Method::Patch,
            UpdateVerb::Put => Method::Put,
        };
        let body = projection::encode(schema, desired, Some(field_mask))?;
        let response = self
            .run(schema, ApiRequest::new(method, url).with_body(body))
            .await?;
        self.settle_read(schema, desired, response).await
    }

    /// Delete the resource. A 404 means it is already gone and counts
    /// as success.
    pub async fn delete(&self, schema: &ResourceSchema, attrs: &AttributeSet) -> Result<()> {
        let path = schema
            .rest
            .delete
            .as_deref()
            .unwrap_or(&schema.rest.resource);
        let url = template::render(path, schema, attrs)?;
        let request = ApiRequest::new(Method::Delete, url);
        match self.run(schema, request).await {
            Ok(_) => Ok(()),
            Err(ReconcileError::RemoteRejected { status: 404, .. }) => {
                debug!(resource = %schema.type_name, "delete target already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Read the resource; `None` when the backend reports 404.
    pub async fn read(
        &self,
        schema: &ResourceSchema,
        attrs: &AttributeSet,
    ) -> Result<Option<AttributeSet>> {
        let url = template::render(&schema.rest.resource, schema, attrs)?;
        match self.dispatch(ApiRequest::new(Method::Get, url)).await {
            Ok(response) => {
                let body = response.body.unwrap_or(serde_json::Value::Null);
                Ok(Some(projection::decode(schema, &body)?))
            }
            Err(ReconcileError::RemoteRejected { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Dispatch one mutation and, when the backend hands back an
    /// asynchronous operation envelope, poll it to completion. Returns
    /// the final response payload (operation result or direct body).
    async fn run(
        &self,
        schema: &ResourceSchema,
        request: ApiRequest,
    ) -> Result<Option<serde_json::Value>> {
        let mut phase = Phase::Pending;
        debug!(resource = %schema.type_name, phase = ?phase, method = request.method.as_str(),
               url = %request.url, "pass starting");

        phase = Phase::Dispatching;
        debug!(resource = %schema.type_name, phase = ?phase, "dispatching");
        let response = match self.dispatch(request).await {
            Ok(r) => r,
            Err(e) => {
                phase = Phase::Failed;
                debug!(resource = %schema.type_name, phase = ?phase, error = %e, "dispatch failed");
                return Err(e);
            }
        };

        let body = response.body;
        if schema.rest.async_operations {
            match operation_envelope(body.as_ref()) {
                Some(OperationEnvelope::Running(handle)) => {
                    phase = Phase::PollingAsync;
                    debug!(resource = %schema.type_name, phase = ?phase, handle = %handle.0, "polling");
                    return match self.await_operation(&handle).await {
                        Ok(result) => {
                            phase = Phase::Settled;
                            debug!(resource = %schema.type_name, phase = ?phase, "operation settled");
                            Ok(result)
                        }
                        Err(e) => {
                            phase = Phase::Failed;
                            debug!(resource = %schema.type_name, phase = ?phase, error = %e, "operation failed");
                            Err(e)
                        }
                    };
                }
                Some(OperationEnvelope::Completed(result)) => {
                    phase = Phase::Settled;
                    debug!(resource = %schema.type_name, phase = ?phase, "operation already complete");
                    return Ok(result);
                }
                None => {}
            }
        }
        phase = Phase::Settled;
        debug!(resource = %schema.type_name, phase = ?phase, "request settled");
        Ok(body)
    }

    /// One logical request with the transient retry budget.
    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut last_detail = String::new();
        let mut attempts_made = 0u32;
        for attempt in 0..self.policy.attempts {
            if attempt > 0 {
                let delay = self.policy.backoff.delay(attempt - 1);
                if self.clock.now() + delay >= self.deadline {
                    break;
                }
                self.clock.sleep(delay).await;
            }
            attempts_made += 1;
            match self.transport.send(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if response.status >= 500 => {
                    last_detail = error_detail(&response);
                    warn!(status = response.status, attempt, "transient server error, will retry");
                }
                Ok(response) => {
                    // 4xx: not retryable, surface the backend detail.
                    return Err(ReconcileError::RemoteRejected {
                        status: response.status,
                        detail: error_detail(&response),
                    });
                }
                Err(crate::transport::TransportError::Connect(detail)) => {
                    last_detail = detail;
                    warn!(attempt, detail = %last_detail, "connection failure, will retry");
                }
                Err(crate::transport::TransportError::InvalidRequest(detail)) => {
                    return Err(ReconcileError::Validation(detail));
                }
            }
        }
        if last_detail.is_empty() {
            last_detail = "retry budget exhausted before any attempt".to_string();
        }
        Err(ReconcileError::Transient {
            attempts: attempts_made,
            detail: last_detail,
        })
    }

    /// Poll an asynchronous operation until done, failed, or the pass
    /// deadline expires. In-flight operations are not aborted on
    /// expiry; we stop waiting and hand the caller the handle.
    async fn await_operation(
        &self,
        handle: &OperationHandle,
    ) -> Result<Option<serde_json::Value>> {
        let mut attempt = 0u32;
        loop {
            let delay = self.policy.backoff.delay(attempt);
            if self.clock.now() + delay >= self.deadline {
                return Err(ReconcileError::Timeout {
                    handle: handle.clone(),
                });
            }
            self.clock.sleep(delay).await;
            attempt = attempt.saturating_add(1);

            match self.transport.poll_operation(handle).await {
                Ok(PollStatus::Done(result)) => return Ok(result),
                Ok(PollStatus::Pending) => {
                    debug!(handle = %handle.0, attempt, "operation still pending");
                }
                Ok(PollStatus::Failed { code, message }) => {
                    return Err(ReconcileError::RemoteRejected {
                        status: code,
                        detail: message,
                    });
                }
                Err(crate::transport::TransportError::Connect(detail)) => {
                    // Poll failures are absorbed until the deadline;
                    // the operation keeps running server-side.
                    warn!(handle = %handle.0, detail = %detail, "poll failed, retrying");
                }
                Err(crate::transport::TransportError::InvalidRequest(detail)) => {
                    return Err(ReconcileError::Validation(detail));
                }
            }
        }
    }

    /// Turn a settled mutation response into attributes, re-reading the
    /// resource when the response is not self-describing.
    async fn settle_read(
        &self,
        schema: &ResourceSchema,
        desired: &AttributeSet,
        response: Option<serde_json::Value>,
    ) -> Result<AttributeSet> {
        if !schema.rest.read_after_write {
            if let Some(body) = &response {
                let decoded = projection::decode(schema, body)?;
                if !decoded.is_empty() {
                    return Ok(decoded);
                }
            }
        }
        match self.read(schema, desired).await? {
            Some(attrs) => Ok(attrs),
            // The mutation settled but the read says gone: surface the
            // backend's own view rather than fabricating state.
            None => Err(ReconcileError::RemoteRejected {
                status: 404,
                detail: format!(
                    "{} not found on read-back after a successful write",
                    schema.type_name
                ),
            }),
        }
    }

    /// Top-level wire names covered by the mask, for `updateMask=`
    /// style query parameters.
    fn wire_mask(&self, schema: &ResourceSchema, mask: &BTreeSet<String>) -> String {
        let mut names: Vec<&str> = Vec::new();
        for spec in &schema.fields {
            if projection::mask_covers(mask, &spec.name) {
                names.push(&spec.api_name);
            }
        }
        names.join(",")
    }
}

/// An asynchronous operation envelope, recognized by its `done` flag.
enum OperationEnvelope {
    /// Still running; poll the named operation.
    Running(OperationHandle),
    /// Finished inline; the payload is the envelope's `response`.
    Completed(Option<serde_json::Value>),
}

fn operation_envelope(body: Option<&serde_json::Value>) -> Option<OperationEnvelope> {
    let body = body?;
    let done = body.get("done")?;
    if done.as_bool() == Some(true) {
        return Some(OperationEnvelope::Completed(body.get("response").cloned()));
    }
    let name = body
        .get("name")
        .or_else(|| body.get("selfLink"))?
        .as_str()?;
    Some(OperationEnvelope::Running(OperationHandle(name.to_string())))
}

/// Extract the backend's error message from a response body, Google
/// style (`{"error": {"code", "message"}}`), falling back to the raw
/// body.
pub fn error_detail(response: &ApiResponse) -> String {
    match &response.body {
        Some(body) => body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
            .unwrap_or_else(|| body.to_string()),
        None => format!("HTTP {}", response.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, FieldSpec, Mutability, RestLayout};
    use crate::transport::TransportError;
    use crate::Value;
    use std::sync::Mutex;

    /// Scripted transport: pops one canned outcome per send/poll and
    /// records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        sends: Mutex<Vec<std::result::Result<ApiResponse, TransportError>>>,
        polls: Mutex<Vec<std::result::Result<PollStatus, TransportError>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn push_send(&self, outcome: std::result::Result<ApiResponse, TransportError>) {
            self.sends.lock().unwrap().push(outcome);
        }

        fn push_poll(&self, outcome: std::result::Result<PollStatus, TransportError>) {
            self.polls.lock().unwrap().push(outcome);
        }

        fn recorded(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteTransport for ScriptedTransport {
        async fn send(&self, req: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
            self.requests.lock().unwrap().push(req);
            let mut sends = self.sends.lock().unwrap();
            if sends.is_empty() {
                panic!("unexpected send");
            }
            sends.remove(0)
        }

        async fn poll_operation(
            &self,
            _handle: &OperationHandle,
        ) -> std::result::Result<PollStatus, TransportError> {
            let mut polls = self.polls.lock().unwrap();
            if polls.is_empty() {
                panic!("unexpected poll");
            }
            polls.remove(0)
        }
    }

    /// Clock that jumps forward instantly on sleep.
    struct FakeClock {
        now: Mutex<Instant>,
    }

    impl FakeClock {
        fn new() -> Self {
            FakeClock {
                now: Mutex::new(Instant::now()),
            }
        }
    }

    #[async_trait]
    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += duration;
        }
    }

    fn schema(async_ops: bool) -> ResourceSchema {
        ResourceSchema {
            type_name: "widget".into(),
            fields: vec![
                FieldSpec::new("project", FieldKind::String, Mutability::Immutable).required(),
                FieldSpec::new("name", FieldKind::String, Mutability::Immutable).required(),
                FieldSpec::new("tier", FieldKind::String, Mutability::Updatable),
                FieldSpec::new("id", FieldKind::String, Mutability::ComputedOnly),
            ],
            rest: RestLayout {
                collection: "projects/{{project}}/widgets".into(),
                resource: "projects/{{project}}/widgets/{{name}}".into(),
                update_mask_param: Some("updateMask".into()),
                async_operations: async_ops,
                ..RestLayout::default()
            },
        }
    }

    fn desired() -> AttributeSet {
        let mut attrs = AttributeSet::new();
        attrs.insert("project", "p1".into()).unwrap();
        attrs.insert("name", "w1".into()).unwrap();
        attrs.insert("tier", "small".into()).unwrap();
        attrs
    }

    fn ok_body() -> ApiResponse {
        ApiResponse {
            status: 200,
            body: Some(serde_json::json!({
                "name": "w1", "tier": "small", "id": "projects/p1/widgets/w1"
            })),
        }
    }

    fn executor<'a>(
        transport: &'a ScriptedTransport,
        clock: &'a FakeClock,
        timeout: Duration,
    ) -> Executor<'a> {
        Executor::new(transport, clock, RetryPolicy::default(), timeout)
    }

    #[tokio::test]
    async fn create_decodes_direct_response() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ok_body()));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(60));

        let attrs = exec.create(&schema(false), &desired()).await.unwrap();
        assert_eq!(attrs.get("id").unwrap().as_str(), Some("projects/p1/widgets/w1"));

        let reqs = transport.recorded();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, Method::Post);
        assert_eq!(reqs[0].url, "projects/p1/widgets");
    }

    #[tokio::test]
    async fn transient_5xx_is_retried_then_succeeds() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ApiResponse {
            status: 503,
            body: None,
        }));
        transport.push_send(Ok(ok_body()));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(60));

        let attrs = exec.create(&schema(false), &desired()).await.unwrap();
        assert_eq!(attrs.get("tier").unwrap().as_str(), Some("small"));
        assert_eq!(transport.recorded().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_transient() {
        let transport = ScriptedTransport::default();
        for _ in 0..3 {
            transport.push_send(Err(TransportError::Connect("reset".into())));
        }
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(600));

        let err = exec.create(&schema(false), &desired()).await.unwrap_err();
        match err {
            ReconcileError::Transient { attempts, detail } => {
                assert_eq!(attempts, 3);
                assert_eq!(detail, "reset");
            }
            other => panic!("expected Transient, got {other}"),
        }
    }

    #[tokio::test]
    async fn rejected_4xx_is_not_retried() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ApiResponse {
            status: 409,
            body: Some(serde_json::json!({
                "error": {"code": 409, "message": "already exists"}
            })),
        }));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(60));

        let err = exec.create(&schema(false), &desired()).await.unwrap_err();
        match err {
            ReconcileError::RemoteRejected { status, detail } => {
                assert_eq!(status, 409);
                assert_eq!(detail, "already exists");
            }
            other => panic!("expected RemoteRejected, got {other}"),
        }
        assert_eq!(transport.recorded().len(), 1);
    }

    #[tokio::test]
    async fn async_operation_polls_to_completion() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ApiResponse {
            status: 200,
            body: Some(serde_json::json!({
                "name": "operations/op-1", "done": false
            })),
        }));
        transport.push_poll(Ok(PollStatus::Pending));
        transport.push_poll(Ok(PollStatus::Done(Some(serde_json::json!({
            "name": "w1", "tier": "small", "id": "projects/p1/widgets/w1"
        })))));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(600));

        let attrs = exec.create(&schema(true), &desired()).await.unwrap();
        assert_eq!(attrs.get("id").unwrap().as_str(), Some("projects/p1/widgets/w1"));
    }

    #[tokio::test]
    async fn poll_deadline_returns_timeout_with_handle() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ApiResponse {
            status: 200,
            body: Some(serde_json::json!({
                "name": "operations/op-2", "done": false
            })),
        }));
        // Enough pendings to outlast the deadline.
        for _ in 0..16 {
            transport.push_poll(Ok(PollStatus::Pending));
        }
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(20));

        let err = exec.create(&schema(true), &desired()).await.unwrap_err();
        match err {
            ReconcileError::Timeout { handle } => {
                assert_eq!(handle.0, "operations/op-2");
            }
            other => panic!("expected Timeout, got {other}"),
        }
    }

    #[tokio::test]
    async fn completed_operation_unwraps_response_payload() {
        let transport = ScriptedTransport::default();
        // The backend finished the operation inline; the resource lives
        // in the envelope's `response`, never in the envelope itself.
        transport.push_send(Ok(ApiResponse {
            status: 200,
            body: Some(serde_json::json!({
                "name": "operations/op-4",
                "done": true,
                "response": {"name": "w1", "tier": "small", "id": "srv-1"}
            })),
        }));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(60));

        let attrs = exec.create(&schema(true), &desired()).await.unwrap();
        assert_eq!(attrs.get("name").unwrap().as_str(), Some("w1"));
        assert_eq!(attrs.get("id").unwrap().as_str(), Some("srv-1"));
    }

    #[tokio::test]
    async fn deadline_preempted_retry_reports_actual_attempts() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ApiResponse {
            status: 503,
            body: None,
        }));
        let clock = FakeClock::new();
        // The first backoff delay already overshoots the deadline, so
        // only one attempt is ever made.
        let exec = executor(&transport, &clock, Duration::from_millis(100));

        let err = exec.create(&schema(false), &desired()).await.unwrap_err();
        match err {
            ReconcileError::Transient { attempts, .. } => assert_eq!(attempts, 1),
            other => panic!("expected Transient, got {other}"),
        }
    }

    #[tokio::test]
    async fn failed_operation_surfaces_backend_detail() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ApiResponse {
            status: 200,
            body: Some(serde_json::json!({
                "name": "operations/op-3", "done": false
            })),
        }));
        transport.push_poll(Ok(PollStatus::Failed {
            code: 400,
            message: "invalid tier".into(),
        }));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(600));

        let err = exec.create(&schema(true), &desired()).await.unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::RemoteRejected { status: 400, .. }
        ));
    }

    #[tokio::test]
    async fn update_appends_wire_mask() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ok_body()));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(60));

        let mask: BTreeSet<String> = BTreeSet::from(["tier".to_string()]);
        exec.update(&schema(false), &desired(), &mask).await.unwrap();

        let reqs = transport.recorded();
        assert_eq!(reqs[0].method, Method::Patch);
        assert_eq!(reqs[0].url, "projects/p1/widgets/w1?updateMask=tier");
        let body = reqs[0].body.as_ref().unwrap();
        assert_eq!(body["tier"], serde_json::json!("small"));
        assert!(body.get("name").is_none());
    }

    #[tokio::test]
    async fn delete_tolerates_absent_resource() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ApiResponse {
            status: 404,
            body: None,
        }));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(60));

        exec.delete(&schema(false), &desired()).await.unwrap();
    }

    #[tokio::test]
    async fn read_maps_404_to_none() {
        let transport = ScriptedTransport::default();
        transport.push_send(Ok(ApiResponse {
            status: 404,
            body: None,
        }));
        let clock = FakeClock::new();
        let exec = executor(&transport, &clock, Duration::from_secs(60));

        let result = exec.read(&schema(false), &desired()).await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn backoff_grows_and_caps() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(0), Duration::from_millis(500));
        assert_eq!(backoff.delay(1), Duration::from_secs(1));
        assert_eq!(backoff.delay(10), Duration::from_secs(10));
    }
}
