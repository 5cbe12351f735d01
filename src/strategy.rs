//! Weather-driven operating mode advice.

use serde::{Deserialize, Serialize};

use crate::control::SourcePriority;
use crate::weather::Weather;

/// Recommended source priority and the reason behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub mode: SourcePriority,
    pub reason: String,
}

impl Strategy {
    /// Whether the operator's current priority disagrees with this advice.
    pub fn differs_from(&self, priority: SourcePriority) -> bool {
        self.mode != priority
    }
}

/// Maps current weather to a recommended source priority.
///
/// Overcast and windy favours wind, clear and calm favours solar, anything
/// else is left to automatic balancing. `current_priority` does not change
/// the advice; callers use it to decide whether the advice is news.
///
/// # Examples
///
/// ```
/// use microgrid_sim::control::SourcePriority;
/// use microgrid_sim::strategy::recommend_strategy;
/// use microgrid_sim::weather::Weather;
///
/// let storm = Weather { cloud_cover_pct: 70.0, wind_speed_ms: 8.0, ..Weather::default() };
/// let s = recommend_strategy(&storm, SourcePriority::Auto);
/// assert_eq!(s.mode, SourcePriority::Wind);
/// assert!(s.differs_from(SourcePriority::Auto));
/// ```
pub fn recommend_strategy(weather: &Weather, current_priority: SourcePriority) -> Strategy {
    let (mode, reason) = if weather.cloud_cover_pct > 60.0 && weather.wind_speed_ms > 6.0 {
        (SourcePriority::Wind, "High cloud cover & strong wind")
    } else if weather.cloud_cover_pct < 30.0 && weather.wind_speed_ms < 4.0 {
        (SourcePriority::Solar, "Clear sky & low wind")
    } else {
        (SourcePriority::Auto, "Balanced conditions")
    };

    let strategy = Strategy {
        mode,
        reason: reason.to_string(),
    };
    if strategy.differs_from(current_priority) {
        tracing::debug!(
            recommended = mode.as_str(),
            current = current_priority.as_str(),
            "strategy differs from operator priority"
        );
    }
    strategy
}
