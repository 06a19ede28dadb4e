#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use preprocessor_core::config::CollaboratorConfig;
use preprocessor_core::events::{EventDispatcher, EventKind, SharedEventHandler};
use preprocessor_core::orchestration::PreProcessingOrchestrator;
use preprocessor_core::repository::StagingRepository;
use preprocessor_core::store::DocumentStore;
use serde_json::{json, Value};
use std::sync::Arc;

/// Orchestrator wired to recording mocks
pub struct Harness {
    pub store: DocumentStore,
    pub repository: Arc<StagingRepository>,
    pub dispatcher: Arc<EventDispatcher>,
    pub recorder: Arc<RecordingHandler>,
    pub validator: Arc<StubSchemaValidator>,
    pub dependencies: Arc<StubDependencyLister>,
    pub status_updater: Arc<RecordingStatusUpdater>,
    pub orchestrator: Arc<PreProcessingOrchestrator>,
}

impl Harness {
    pub fn new(validator: StubSchemaValidator, dependencies: StubDependencyLister) -> Self {
        let store = DocumentStore::new("integration");
        let repository = Arc::new(
            StagingRepository::new(&store, "event_orders").expect("staging collection"),
        );
        let dispatcher = Arc::new(EventDispatcher::new());
        let recorder = Arc::new(RecordingHandler::new("recorder"));
        let shared: SharedEventHandler = recorder.clone();
        dispatcher
            .register(EventKind::OrderedProcess, shared.clone())
            .expect("register OrderedProcess");
        dispatcher
            .register(EventKind::ErrorCreated, shared)
            .expect("register ErrorCreated");

        let validator = Arc::new(validator);
        let dependencies = Arc::new(dependencies);
        let status_updater = Arc::new(RecordingStatusUpdater::default());

        let orchestrator = Arc::new(PreProcessingOrchestrator::new(
            repository.clone(),
            dispatcher.clone(),
            validator.clone(),
            dependencies.clone(),
            status_updater.clone(),
            &CollaboratorConfig::default(),
        ));

        Self {
            store,
            repository,
            dispatcher,
            recorder,
            validator,
            dependencies,
            status_updater,
            orchestrator,
        }
    }

    pub fn happy() -> Self {
        Self::new(StubSchemaValidator::accepting(), StubDependencyLister::empty())
    }
}

pub fn input_message(data: Value) -> Value {
    json!({
        "id": "input-1",
        "service": "svc",
        "source": "src",
        "provider": "prov",
        "data": data
    })
}

pub fn input_bytes(data: Value) -> Vec<u8> {
    serde_json::to_vec(&input_message(data)).expect("serialize input message")
}
