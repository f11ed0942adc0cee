//! Room Monitor - room temperature and humidity monitoring service
//!
//! Polls a remote sensor record, keeps a short window of readings, derives
//! averages and trends from it, and sends a rate-limited alert when the room
//! gets too hot.

pub mod alert;
pub mod analyzer;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod history;
pub mod io;
pub mod notifier;
pub mod reading;
pub mod source;
pub mod state;
pub mod webhook;

pub use config::{load_config, Config};
pub use error::{Result, RoomMonitorError};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::alert::AlertDispatcher;
use crate::engine::Engine;
use crate::io::ReqwestHttpClient;
use crate::notifier::Notifier;
use crate::source::{FirebaseSource, SensorSource};
use crate::webhook::WebhookNotifier;

/// Run the room monitor service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let cancel = CancellationToken::new();

    // Sensor source
    let source_http: Arc<dyn io::HttpClient> =
        Arc::new(ReqwestHttpClient::with_timeout(config.source.fetch_timeout)?);
    let source: Arc<dyn SensorSource> =
        Arc::new(FirebaseSource::new(&config.source, source_http));

    // Alerting
    let dispatcher = if config.alert.enabled {
        let alert_http: Arc<dyn io::HttpClient> =
            Arc::new(ReqwestHttpClient::with_timeout(config.alert.request_timeout)?);
        let notifier: Arc<dyn Notifier> =
            Arc::new(WebhookNotifier::new(config.alert.endpoint.clone(), alert_http));
        Some(Arc::new(AlertDispatcher::from_config(&config.alert, notifier)))
    } else {
        tracing::info!("High temperature alerts are disabled");
        None
    };

    // Build shared state
    let state = state::new_state_handle(
        config.history.capacity,
        config.analysis.trend_threshold,
        config.alert.log_size,
    );

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    // Start dashboard if enabled
    if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        let router = dashboard::build_router(Arc::clone(&state), dispatcher.clone());
        let cancel_for_dashboard = cancel.clone();

        tokio::spawn(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
            tracing::info!("Status API listening on http://{}", addr);

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind status API to port {}: {}. Continuing without it.",
                        dashboard_port,
                        e
                    );
                    return;
                }
            };

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_dashboard.cancelled().await;
                })
                .await
                .ok();

            tracing::debug!("Status API stopped");
        });
    }

    let engine = Engine::new(
        source,
        dispatcher,
        state,
        config.poller.interval,
        config.source.fetch_timeout,
    );

    tracing::info!("Room monitor started");

    // Runs until cancelled
    engine.start(cancel).join().await;

    tracing::info!("Room monitor stopped");

    Ok(())
}
