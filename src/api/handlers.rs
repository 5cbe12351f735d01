//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::access::Role;
use crate::control::{ControlCommand, ControlError, ControlState};
use crate::sim::history::HistoryPoint;
use crate::sim::snapshot::TelemetrySnapshot;
use crate::strategy::recommend_strategy;
use crate::weather::{ResourceDay, Weather};

use super::types::{ErrorResponse, StrategyResponse, WeatherResponse};
use super::{AppState, ROLE_HEADER};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// `GET /telemetry` → 200 + latest `TelemetrySnapshot`
pub async fn get_telemetry(State(state): State<Arc<AppState>>) -> Json<TelemetrySnapshot> {
    Json(*state.engine.read().await.current())
}

/// `GET /history` → 200 + history points, oldest first
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryPoint>> {
    Json(state.engine.read().await.history().to_vec())
}

/// `GET /controls` → 200 + `ControlState`
pub async fn get_controls(State(state): State<Arc<AppState>>) -> Json<ControlState> {
    Json(*state.controls.read().await)
}

/// Applies one control command on behalf of the role in `x-role`.
///
/// `POST /controls` → 200 + updated `ControlState`
/// missing or unknown role → 400; role lacks capability → 403;
/// locked by emergency shutdown → 409; actuator out of range → 422
pub async fn post_control(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(command): Json<ControlCommand>,
) -> Result<Json<ControlState>, ApiError> {
    let role: Role = headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, format!("missing {ROLE_HEADER} header")))?
        .parse()
        .map_err(|e: String| error(StatusCode::BAD_REQUEST, e))?;

    let mut controls = state.controls.write().await;
    match controls.apply_as(role, command) {
        Ok(()) => {
            tracing::info!(%role, field = command.field(), "control command applied");
            Ok(Json(*controls))
        }
        Err(e) => {
            tracing::warn!(%role, error = %e, "control command rejected");
            let status = match e {
                ControlError::Forbidden { .. } => StatusCode::FORBIDDEN,
                ControlError::LockedOut { .. } => StatusCode::CONFLICT,
                ControlError::OutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            };
            Err(error(status, e.to_string()))
        }
    }
}

/// `GET /strategy` → 200 + `StrategyResponse`
pub async fn get_strategy(State(state): State<Arc<AppState>>) -> Json<StrategyResponse> {
    let weather = state
        .engine
        .read()
        .await
        .weather()
        .copied()
        .unwrap_or_default();
    let priority = state.controls.read().await.source_priority;
    let strategy = recommend_strategy(&weather, priority);
    Json(StrategyResponse {
        differs: strategy.differs_from(priority),
        mode: strategy.mode,
        reason: strategy.reason,
        current_priority: priority,
    })
}

/// `GET /notifications` → 200 + messages, newest first
pub async fn get_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.engine.read().await.notifications().messages())
}

/// `GET /weather` → 200 + `WeatherResponse`
pub async fn get_weather(State(state): State<Arc<AppState>>) -> Json<WeatherResponse> {
    let engine = state.engine.read().await;
    Json(WeatherResponse {
        current: engine.weather().copied().unwrap_or_default(),
        limits_sources: engine.weather().is_some(),
        outlook: state.outlook.clone(),
    })
}

/// `GET /resources` → 200 + daily resource records, oldest first
pub async fn get_resources(State(state): State<Arc<AppState>>) -> Json<Vec<ResourceDay>> {
    Json(state.resources.clone())
}

/// Replaces the weather limiting source availability.
///
/// `PUT /weather` → 200 + `WeatherResponse`; invalid fields → 422
pub async fn put_weather(
    State(state): State<Arc<AppState>>,
    Json(weather): Json<Weather>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let errors = weather.validate();
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, message));
    }

    state.engine.write().await.set_weather(Some(weather));
    Ok(Json(WeatherResponse {
        current: weather,
        limits_sources: true,
        outlook: state.outlook.clone(),
    }))
}
