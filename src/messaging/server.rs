//! # Listener Server
//!
//! Starts every registered listener, parks on a shutdown token and stops the
//! listeners when it fires. Signal wiring is left to the embedding process apart
//! from the [`Server::run_until_ctrl_c`] convenience.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::registry::ListenerRegistry;
use crate::config::ServerConfig;

#[derive(Debug)]
pub struct Server {
    registry: Arc<ListenerRegistry>,
    shutdown: CancellationToken,
    shutdown_timeout: Duration,
}

impl Server {
    pub fn new(registry: Arc<ListenerRegistry>, config: &ServerConfig) -> Self {
        Self {
            registry,
            shutdown: CancellationToken::new(),
            shutdown_timeout: config.shutdown_timeout(),
        }
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// Token that ends [`Server::run`] when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Start all listeners and block until shutdown is requested
    pub async fn run(&self) {
        let mut handles = Vec::new();
        for tag in self.registry.listener_tags() {
            match self.registry.start_listener(&tag) {
                Ok(handle) => handles.push(handle),
                Err(e) => error!(listener_tag = %tag, error = %e, "Failed to start listener"),
            }
        }
        info!(listeners = handles.len(), "Server started");

        self.shutdown.cancelled().await;
        info!("Shutdown requested, stopping listeners");
        self.registry.stop_all();

        match tokio::time::timeout(self.shutdown_timeout, join_all(handles)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!(error = %e, "Listener task failed");
                    }
                }
                info!("Server stopped");
            }
            Err(_) => warn!(
                timeout_ms = self.shutdown_timeout.as_millis() as u64,
                "Listeners did not finish before the shutdown timeout"
            ),
        }
    }

    /// [`Server::run`] with Ctrl-C wired to the shutdown token
    pub async fn run_until_ctrl_c(&self) {
        let token = self.shutdown_token();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => token.cancel(),
                Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
        self.run().await;
    }
}
