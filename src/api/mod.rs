//! Live JSON API over a continuously ticking plant.
//!
//! Routes:
//! - `GET /telemetry` latest snapshot
//! - `GET /history` rolling history window
//! - `GET /controls`, `POST /controls` operator state (role in `x-role`)
//! - `GET /strategy` weather-driven advice
//! - `GET /notifications` recent alerts
//! - `GET /weather`, `PUT /weather` current conditions and outlook
//! - `GET /resources` daily wind and irradiance history

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

use crate::control::ControlState;
use crate::sim::engine::Engine;
use crate::weather::{ForecastDay, ResourceDay};

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-role";

/// Application state shared between the tick driver and request handlers.
///
/// The driver copies `controls` at the start of each tick, so a command
/// applied mid-tick takes effect on the next one.
pub struct AppState {
    pub engine: RwLock<Engine>,
    pub controls: RwLock<ControlState>,
    /// Seven-day outlook generated at startup.
    pub outlook: Vec<ForecastDay>,
    /// Resource history generated at startup, oldest day first.
    pub resources: Vec<ResourceDay>,
}

impl AppState {
    pub fn new(
        engine: Engine,
        controls: ControlState,
        outlook: Vec<ForecastDay>,
        resources: Vec<ResourceDay>,
    ) -> Self {
        Self {
            engine: RwLock::new(engine),
            controls: RwLock::new(controls),
            outlook,
            resources,
        }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/telemetry", get(handlers::get_telemetry))
        .route("/history", get(handlers::get_history))
        .route(
            "/controls",
            get(handlers::get_controls).post(handlers::post_control),
        )
        .route("/strategy", get(handlers::get_strategy))
        .route("/notifications", get(handlers::get_notifications))
        .route(
            "/weather",
            get(handlers::get_weather).put(handlers::put_weather),
        )
        .route("/resources", get(handlers::get_resources))
        .with_state(state)
}

/// Advances the engine once per `period` until the task is dropped.
pub async fn drive(state: Arc<AppState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let control = *state.controls.read().await;
        let mut engine = state.engine.write().await;
        if let Err(e) = engine.step(&control) {
            tracing::warn!(error = %e, "tick skipped: invalid control state");
        }
    }
}

/// Binds to the given address, starts the tick driver and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
/// * `period` - Wall-clock time between ticks
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr, period: Duration) {
    let driver = tokio::spawn(drive(Arc::clone(&state), period));
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    tracing::info!(%addr, "API server listening");
    let result = axum::serve(listener, app).await;
    driver.abort();
    result.unwrap_or_else(|e| panic!("server error: {e}"));
}
