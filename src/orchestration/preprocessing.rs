//! # Pre-Processing Orchestrator
//!
//! Sequential worker behind one listener. Each message is parsed, staged, checked
//! against its input schema, has its configuration dependencies resolved and is
//! then re-emitted as an "OrderedProcess" event for downstream processing.
//!
//! The message loop is the top of the call stack, so nothing is returned to a
//! caller: failures become "ErrorCreated" events on the fixed error queue. The one
//! exception is a schema rejection, which marks the input itself with the
//! invalid-schema status instead.
//!
//! Collaborator calls sit inline in the loop and are each bounded by the configured
//! collaborator timeout.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::ProcessingState;
use crate::clients::{
    with_timeout, DependencyLister, InputStatus, InputStatusUpdater, SchemaType,
    SchemaValidator, ServiceTuple,
};
use crate::config::CollaboratorConfig;
use crate::constants::routing;
use crate::error::PipelineResult;
use crate::events::{Event, EventDispatcher};
use crate::logging::log_listener_operation;
use crate::messaging::{InputMessage, MessageProcessor};
use crate::models::{ErrMsg, EventOrder, ProcessOrder};
use crate::repository::StagingRepository;

#[derive(Debug, Default)]
pub struct PreProcessingStats {
    pub messages_received: AtomicU64,
    pub parse_failures: AtomicU64,
    pub dispatched: AtomicU64,
    pub status_updates: AtomicU64,
    pub failures: AtomicU64,
}

pub struct PreProcessingOrchestrator {
    repository: Arc<StagingRepository>,
    dispatcher: Arc<EventDispatcher>,
    schema_validator: Arc<dyn SchemaValidator>,
    dependency_lister: Arc<dyn DependencyLister>,
    status_updater: Arc<dyn InputStatusUpdater>,
    timeout: Duration,
    stats: PreProcessingStats,
}

impl PreProcessingOrchestrator {
    pub fn new(
        repository: Arc<StagingRepository>,
        dispatcher: Arc<EventDispatcher>,
        schema_validator: Arc<dyn SchemaValidator>,
        dependency_lister: Arc<dyn DependencyLister>,
        status_updater: Arc<dyn InputStatusUpdater>,
        collaborators: &CollaboratorConfig,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            schema_validator,
            dependency_lister,
            status_updater,
            timeout: collaborators.timeout(),
            stats: PreProcessingStats::default(),
        }
    }

    pub fn stats(&self) -> &PreProcessingStats {
        &self.stats
    }

    pub fn repository(&self) -> &Arc<StagingRepository> {
        &self.repository
    }

    /// Run one raw message through the pipeline and report where it ended
    pub async fn process_message(&self, bytes: &[u8], listener_tag: &str) -> ProcessingState {
        self.stats.messages_received.fetch_add(1, Ordering::Relaxed);

        let message = match InputMessage::parse(bytes) {
            Ok(message) => message,
            Err(e) => {
                self.stats.parse_failures.fetch_add(1, Ordering::Relaxed);
                self.report_error(format!("failed to parse message: {e}"), bytes, listener_tag)
                    .await;
                return ProcessingState::Failed;
            }
        };
        debug!(
            listener_tag = %listener_tag,
            input_id = %message.id,
            state = %ProcessingState::Parsed,
            "Message parsed"
        );

        match self.execute(&message).await {
            Ok(state) => state,
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                self.report_error(e.to_string(), bytes, listener_tag).await;
                ProcessingState::Failed
            }
        }
    }

    /// Stage, process and unstage one parsed message.
    ///
    /// The staged record is deleted on every exit once staging succeeded, not only
    /// after a successful dispatch, so rejected and failed attempts leave nothing behind.
    async fn execute(&self, message: &InputMessage) -> PipelineResult<ProcessingState> {
        let order = EventOrder::from_message(message)?;
        self.repository.create(&order)?;
        transition(&order, ProcessingState::Staged);

        let outcome = self.process_staged(&order).await;

        // Staged records never outlive the attempt that created them
        let unstaged = match self.repository.delete(&order.id) {
            Ok(()) => true,
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Failed to unstage event order");
                false
            }
        };

        match outcome? {
            ProcessingState::Dispatched if unstaged => {
                transition(&order, ProcessingState::Unstaged);
                Ok(ProcessingState::Unstaged)
            }
            state => Ok(state),
        }
    }

    async fn process_staged(&self, order: &EventOrder) -> PipelineResult<ProcessingState> {
        let process_order = ProcessOrder::from(order);
        let service = ServiceTuple::new(&order.provider, &order.service, &order.source);

        let validation = with_timeout(
            "validate_schema",
            self.timeout,
            self.schema_validator
                .validate_schema(&service, SchemaType::Input, &order.payload),
        )
        .await;

        match validation {
            Ok(()) => transition(order, ProcessingState::Validated),
            Err(e) if e.is_rejection() => {
                warn!(
                    order_id = %order.id,
                    input_id = %order.input_id,
                    service = %service,
                    error = %e,
                    "Input rejected by schema validation, marking input status"
                );
                with_timeout(
                    "update_input_status",
                    self.timeout,
                    self.status_updater
                        .update_input_status(&order.input_id, InputStatus::invalid_schema()),
                )
                .await?;
                self.stats.status_updates.fetch_add(1, Ordering::Relaxed);
                transition(order, ProcessingState::StatusUpdated);
                return Ok(ProcessingState::StatusUpdated);
            }
            Err(e) => return Err(e.into()),
        }

        let dependencies = with_timeout(
            "list_dependencies",
            self.timeout,
            self.dependency_lister
                .list_dependencies(&order.provider, &order.service, &order.source),
        )
        .await?;
        debug!(
            order_id = %order.id,
            dependencies = dependencies.len(),
            state = %ProcessingState::DependenciesResolved,
            "Dependencies resolved"
        );

        let routing_key =
            routing::input_pre_processed(&order.provider, &order.service, &order.source);
        if let Err(e) = self
            .dispatcher
            .dispatch(Event::OrderedProcess(process_order), &routing_key)
            .await
        {
            warn!(
                order_id = %order.id,
                routing_key = %routing_key,
                error = %e,
                "OrderedProcess dispatch reported an error"
            );
        }
        self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
        transition(order, ProcessingState::Dispatched);

        Ok(ProcessingState::Dispatched)
    }

    async fn report_error(&self, cause: String, raw: &[u8], listener_tag: &str) {
        warn!(listener_tag = %listener_tag, cause = %cause, "Pre-processing failed");

        let event = Event::ErrorCreated(ErrMsg::new(cause, raw, listener_tag));
        if let Err(e) = self
            .dispatcher
            .dispatch(event, routing::ERROR_CREATED_PRE_PROCESSING)
            .await
        {
            warn!(listener_tag = %listener_tag, error = %e, "ErrorCreated dispatch reported an error");
        }
    }
}

fn transition(order: &EventOrder, state: ProcessingState) {
    debug!(
        order_id = %order.id,
        processing_id = %order.processing_id,
        state = %state,
        "Pre-processing state transition"
    );
}

#[async_trait]
impl MessageProcessor for PreProcessingOrchestrator {
    async fn process_message_channel(
        &self,
        mut channel: mpsc::Receiver<Vec<u8>>,
        listener_tag: String,
    ) {
        log_listener_operation("process_message_channel", &listener_tag, "started", None);

        while let Some(message) = channel.recv().await {
            self.process_message(&message, &listener_tag).await;
        }

        info!(
            listener_tag = %listener_tag,
            received = self.stats.messages_received.load(Ordering::Relaxed),
            dispatched = self.stats.dispatched.load(Ordering::Relaxed),
            "Message channel closed"
        );
        log_listener_operation("process_message_channel", &listener_tag, "drained", None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ClientError, ClientResult, Dependency, Input};
    use crate::events::{EventHandler, EventKind};
    use crate::store::DocumentStore;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(Event, String)>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &Event, routing_key: &str) {
            self.events.lock().push((event.clone(), routing_key.to_string()));
        }
    }

    struct Validator(Option<ClientError>);

    #[async_trait]
    impl SchemaValidator for Validator {
        async fn validate_schema(&self, _: &ServiceTuple, _: SchemaType, _: &Value) -> ClientResult<()> {
            match &self.0 {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    struct Lister {
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl DependencyLister for Lister {
        async fn list_dependencies(&self, p: &str, s: &str, o: &str) -> ClientResult<Vec<Dependency>> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(ClientError::DependencyLookup {
                    service_tuple: format!("{p}.{s}.{o}"),
                    reason: "configuration service unavailable".to_string(),
                });
            }
            Ok(Vec::new())
        }
    }

    struct Updater;

    #[async_trait]
    impl InputStatusUpdater for Updater {
        async fn update_input_status(&self, input_id: &str, status: InputStatus) -> ClientResult<Input> {
            Ok(Input {
                id: input_id.to_string(),
                provider: "prov".to_string(),
                service: "svc".to_string(),
                source: "src".to_string(),
                data: Value::Null,
                status,
            })
        }
    }

    fn orchestrator(
        validator: Validator,
        lister: Lister,
    ) -> (PreProcessingOrchestrator, Arc<Recorder>) {
        let store = DocumentStore::new("test");
        let repository = Arc::new(StagingRepository::new(&store, "event_orders").unwrap());
        let dispatcher = Arc::new(EventDispatcher::new());
        let recorder = Arc::new(Recorder::default());
        dispatcher.register(EventKind::OrderedProcess, recorder.clone()).unwrap();
        dispatcher.register(EventKind::ErrorCreated, recorder.clone()).unwrap();

        let orchestrator = PreProcessingOrchestrator::new(
            repository,
            dispatcher,
            Arc::new(validator),
            Arc::new(lister),
            Arc::new(Updater),
            &CollaboratorConfig { timeout_ms: 50 },
        );
        (orchestrator, recorder)
    }

    fn message_bytes() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "in-1",
            "service": "svc",
            "source": "src",
            "provider": "prov",
            "data": {"key": "value"}
        }))
        .unwrap()
    }

    fn fast_lister() -> Lister {
        Lister {
            delay: Duration::ZERO,
            fail: false,
        }
    }

    #[tokio::test]
    async fn test_success_path_unstages() {
        let (orchestrator, recorder) = orchestrator(Validator(None), fast_lister());
        let state = orchestrator.process_message(&message_bytes(), "c:q:k").await;

        assert_eq!(state, ProcessingState::Unstaged);
        assert!(orchestrator.repository().find_all().unwrap().is_empty());
        let events = recorder.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1, "input.pre-processed.prov.svc.src");
    }

    #[tokio::test]
    async fn test_dependency_failure_emits_error_and_unstages() {
        let lister = Lister {
            delay: Duration::ZERO,
            fail: true,
        };
        let (orchestrator, recorder) = orchestrator(Validator(None), lister);
        let state = orchestrator.process_message(&message_bytes(), "c:q:k").await;

        assert_eq!(state, ProcessingState::Failed);
        assert!(orchestrator.repository().find_all().unwrap().is_empty());
        let events = recorder.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0.kind(), EventKind::ErrorCreated);
        assert_eq!(events[0].1, "error.created.pre-processing");
    }

    #[tokio::test]
    async fn test_slow_collaborator_times_out() {
        let lister = Lister {
            delay: Duration::from_millis(500),
            fail: false,
        };
        let (orchestrator, recorder) = orchestrator(Validator(None), lister);
        let state = orchestrator.process_message(&message_bytes(), "c:q:k").await;

        assert_eq!(state, ProcessingState::Failed);
        let events = recorder.events.lock();
        match &events[0].0 {
            Event::ErrorCreated(err) => assert!(err.cause.contains("timed out")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validator_transport_error_takes_error_path() {
        let validator = Validator(Some(ClientError::transport("schemas", "connection refused")));
        let (orchestrator, recorder) = orchestrator(validator, fast_lister());
        let state = orchestrator.process_message(&message_bytes(), "c:q:k").await;

        assert_eq!(state, ProcessingState::Failed);
        assert_eq!(orchestrator.stats().status_updates.load(Ordering::Relaxed), 0);
        assert_eq!(recorder.events.lock()[0].0.kind(), EventKind::ErrorCreated);
    }

    #[tokio::test]
    async fn test_in_flight_duplicate_is_rejected_and_left_staged() {
        let (orchestrator, recorder) = orchestrator(Validator(None), fast_lister());
        let message = InputMessage::parse(&message_bytes()).unwrap();
        let in_flight = EventOrder::from_message(&message).unwrap();
        orchestrator.repository().create(&in_flight).unwrap();

        let state = orchestrator.process_message(&message_bytes(), "c:q:k").await;

        assert_eq!(state, ProcessingState::Failed);
        // The first attempt still owns its record
        assert!(orchestrator.repository().find_by_id(&in_flight.id).is_ok());
        assert_eq!(recorder.events.lock()[0].0.kind(), EventKind::ErrorCreated);
    }

    #[tokio::test]
    async fn test_message_without_data_is_not_dispatched() {
        let (orchestrator, recorder) = orchestrator(Validator(None), fast_lister());
        let state = orchestrator
            .process_message(
                br#"{"id":"in-1","service":"svc","source":"src","provider":"prov"}"#,
                "c:q:k",
            )
            .await;

        assert_eq!(state, ProcessingState::Failed);
        assert!(orchestrator.repository().find_all().unwrap().is_empty());
        assert_eq!(orchestrator.stats().dispatched.load(Ordering::Relaxed), 0);
        let events = recorder.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0.kind(), EventKind::ErrorCreated);
        assert_eq!(events[0].1, "error.created.pre-processing");
        match &events[0].0 {
            Event::ErrorCreated(err) => assert!(err.cause.contains("payload must not be empty")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_fail_construction() {
        let (orchestrator, recorder) = orchestrator(Validator(None), fast_lister());
        let state = orchestrator
            .process_message(br#"{"service":"svc","data":{}}"#, "c:q:k")
            .await;

        assert_eq!(state, ProcessingState::Failed);
        assert_eq!(orchestrator.stats().failures.load(Ordering::Relaxed), 1);
        assert_eq!(orchestrator.stats().parse_failures.load(Ordering::Relaxed), 0);
        assert_eq!(recorder.events.lock().len(), 1);
    }
}
