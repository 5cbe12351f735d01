//! API response types.
//!
//! Snapshots, history points and control state are serialized as-is; the
//! types here only cover responses that combine several sources.

use serde::Serialize;

use crate::control::SourcePriority;
use crate::weather::{ForecastDay, Weather};

/// Error body returned with every 4xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Current weather plus the weekly outlook.
#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub current: Weather,
    /// Whether `current` is limiting source availability.
    pub limits_sources: bool,
    pub outlook: Vec<ForecastDay>,
}

/// Strategy advice for the current weather.
#[derive(Debug, Serialize)]
pub struct StrategyResponse {
    pub mode: SourcePriority,
    pub reason: String,
    /// Operator's current source priority.
    pub current_priority: SourcePriority,
    /// `true` when the advice differs from `current_priority`.
    pub differs: bool,
}
