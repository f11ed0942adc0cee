//! Status API exposing the latest reading, analysis, and alert log

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::alert::AlertDispatcher;
use crate::state::StateHandle;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub dispatcher: Option<Arc<AlertDispatcher>>,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle, dispatcher: Option<Arc<AlertDispatcher>>) -> Router {
    let dashboard_state = DashboardState { state, dispatcher };

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/history", get(history_handler))
        .route("/api/alerts", get(alerts_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

async fn status_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let alert = match &dashboard.dispatcher {
        Some(dispatcher) => {
            let alert_state = dispatcher.state();
            serde_json::json!({
                "enabled": true,
                "threshold_celsius": dispatcher.threshold(),
                "cooldown_seconds": dispatcher.cooldown().as_secs(),
                "last_sent_at": alert_state.last_sent_at,
            })
        }
        None => serde_json::json!({ "enabled": false }),
    };

    let state = dashboard.state.read().await;

    axum::Json(serde_json::json!({
        "latest": state.latest(),
        "analysis": state.analysis,
        "window_size": state.history.len(),
        "window_capacity": state.history.capacity(),
        "stats": state.stats,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "alert": alert,
    }))
}

async fn history_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(state.history.snapshot())
}

async fn alerts_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(state.alerts.iter().cloned().collect::<Vec<_>>())
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
