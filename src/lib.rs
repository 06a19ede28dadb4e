#![allow(clippy::doc_markdown)] // Allow technical terms like RabbitMQ in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Pre-Processing Core
//!
//! Broker-fed pre-processing pipeline for the input services.
//!
//! ## Overview
//!
//! Inputs announced on `input.created.{provider}.{service}.{source}` are picked up
//! by listeners, staged in a thread-safe in-memory document store, validated against
//! their registered input schema, checked for configuration dependencies and
//! re-emitted as "OrderedProcess" events on
//! `input.pre-processed.{provider}.{service}.{source}`. Anything that goes wrong is
//! published as an "ErrorCreated" event on `error.created.pre-processing`.
//!
//! ## Architecture
//!
//! ```text
//! broker ─► BrokerConsumer ─(bytes)─► PreProcessingOrchestrator ─► EventDispatcher ─► handlers
//!                                      │                │
//!                                      ▼                ▼
//!                             StagingRepository   collaborators (schemas,
//!                               └── DocumentStore   dependencies, input status)
//! ```
//!
//! Each listener runs its consumer and its orchestrator as two tasks joined by a
//! bounded channel, so messages of one listener are handled strictly in order while
//! listeners run in parallel.
//!
//! ## Module Organization
//!
//! - [`store`] - In-memory document store, collections and the typed store client
//! - [`repository`] - Staging repository for in-flight event orders
//! - [`models`] - Staging entity and outbound DTOs
//! - [`events`] - Closed event union and the concurrent fan-out dispatcher
//! - [`messaging`] - Consumers, the listener registry and the server
//! - [`orchestration`] - The pre-processing state machine
//! - [`clients`] - Collaborator capabilities (broker publish, schemas, dependencies, input status)
//! - [`config`] - Configuration loading and validation
//! - [`logging`] - Structured logging setup and helpers
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use preprocessor_core::config::ConfigLoader;
//! use preprocessor_core::events::EventDispatcher;
//! use preprocessor_core::repository::StagingRepository;
//! use preprocessor_core::store::DocumentStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! preprocessor_core::logging::init_structured_logging(&config.logging);
//!
//! let store = DocumentStore::new(config.store.name.clone());
//! let repository = Arc::new(StagingRepository::new(&store, &config.store.staging_collection)?);
//! let dispatcher = Arc::new(EventDispatcher::new());
//! # let _ = (repository, dispatcher);
//! # Ok(())
//! # }
//! ```

pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod repository;
pub mod store;

pub use config::{ConfigLoader, ListenerConfig, PipelineConfig};
pub use error::{PipelineError, PipelineResult};
pub use events::{Event, EventDispatcher, EventHandler, EventKind};
pub use messaging::{BrokerConsumer, ListenerRegistry, Server};
pub use models::{ErrMsg, EventOrder, ProcessOrder};
pub use orchestration::{PreProcessingOrchestrator, ProcessingState};
pub use repository::StagingRepository;
pub use store::{DocumentStore, StoreClient};
