use async_trait::async_trait;
use parking_lot::Mutex;
use preprocessor_core::clients::{
    ClientError, ClientResult, Dependency, DependencyLister, Input, InputStatus,
    InputStatusUpdater, Notifier, SchemaType, SchemaValidator, ServiceTuple,
};
use preprocessor_core::events::{Event, EventHandler};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Event handler that records every event it sees
#[derive(Debug)]
pub struct RecordingHandler {
    name: String,
    pub events: Mutex<Vec<(Event, String)>>,
    pub delay: Duration,
}

impl RecordingHandler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(name: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(name)
        }
    }

    pub fn recorded(&self) -> Vec<(Event, String)> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: &Event, routing_key: &str) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.events.lock().push((event.clone(), routing_key.to_string()));
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Notifier that keeps what it would have published
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub published: Mutex<Vec<(Vec<u8>, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, body: Vec<u8>, routing_key: &str) -> ClientResult<()> {
        self.published.lock().push((body, routing_key.to_string()));
        Ok(())
    }
}

#[derive(Debug)]
pub struct StubSchemaValidator {
    outcome: Option<ClientError>,
    pub calls: Mutex<Vec<(ServiceTuple, SchemaType, Value)>>,
}

impl StubSchemaValidator {
    pub fn accepting() -> Self {
        Self {
            outcome: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            outcome: Some(ClientError::validation(reason)),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SchemaValidator for StubSchemaValidator {
    async fn validate_schema(
        &self,
        service: &ServiceTuple,
        schema_type: SchemaType,
        data: &Value,
    ) -> ClientResult<()> {
        self.calls
            .lock()
            .push((service.clone(), schema_type, data.clone()));
        match &self.outcome {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct StubDependencyLister {
    dependencies: Vec<Dependency>,
    pub calls: AtomicUsize,
}

impl StubDependencyLister {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(dependencies: Vec<Dependency>) -> Self {
        Self {
            dependencies,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DependencyLister for StubDependencyLister {
    async fn list_dependencies(
        &self,
        _provider: &str,
        _service: &str,
        _source: &str,
    ) -> ClientResult<Vec<Dependency>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.dependencies.clone())
    }
}

#[derive(Debug, Default)]
pub struct RecordingStatusUpdater {
    pub updates: Mutex<Vec<(String, InputStatus)>>,
}

#[async_trait]
impl InputStatusUpdater for RecordingStatusUpdater {
    async fn update_input_status(&self, input_id: &str, status: InputStatus) -> ClientResult<Input> {
        self.updates
            .lock()
            .push((input_id.to_string(), status.clone()));
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
