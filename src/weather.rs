//! Site weather: current conditions, the weekly outlook, and how the
//! weather limits the renewable sources.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest availability weather can impose on a source.
pub const MIN_AVAILABILITY: f64 = 0.1;

/// Wind speed at which the turbine reaches its full voltage ceiling (m/s).
pub const DEFAULT_RATED_WIND_SPEED: f64 = 12.0;

const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Summary sky condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    Sunny,
    Cloudy,
    Windy,
    Rainy,
}

/// Current conditions at the site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Weather {
    pub temperature_c: f64,
    /// Sky cover (%, 0..=100).
    pub cloud_cover_pct: f64,
    /// Hub-height wind speed (m/s).
    pub wind_speed_ms: f64,
    /// Plane-of-array irradiance (W/m²).
    pub irradiance_wm2: f64,
    /// Chance of rain (%, 0..=100).
    pub rain_probability_pct: f64,
    pub condition: Condition,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            temperature_c: 24.0,
            cloud_cover_pct: 45.0,
            wind_speed_ms: 5.5,
            irradiance_wm2: 600.0,
            rain_probability_pct: 10.0,
            condition: Condition::Cloudy,
        }
    }
}

/// Invalid weather field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} {message}, got {value}")]
pub struct WeatherError {
    pub field: &'static str,
    pub message: &'static str,
    pub value: f64,
}

impl Weather {
    /// Returns every out-of-range field.
    pub fn validate(&self) -> Vec<WeatherError> {
        let mut errors = Vec::new();
        let mut pct = |field, value: f64| {
            if !(value.is_finite() && (0.0..=100.0).contains(&value)) {
                errors.push(WeatherError {
                    field,
                    message: "must be within [0, 100]",
                    value,
                });
            }
        };
        pct("cloud_cover_pct", self.cloud_cover_pct);
        pct("rain_probability_pct", self.rain_probability_pct);

        for (field, value) in [
            ("wind_speed_ms", self.wind_speed_ms),
            ("irradiance_wm2", self.irradiance_wm2),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(WeatherError {
                    field,
                    message: "must be finite and >= 0",
                    value,
                });
            }
        }
        if !self.temperature_c.is_finite() {
            errors.push(WeatherError {
                field: "temperature_c",
                message: "must be finite",
                value: self.temperature_c,
            });
        }
        errors
    }

    /// Fraction of the solar voltage ceiling reachable under this sky.
    ///
    /// # Examples
    ///
    /// ```
    /// use microgrid_sim::weather::Weather;
    ///
    /// let overcast = Weather { cloud_cover_pct: 100.0, ..Weather::default() };
    /// assert_eq!(overcast.solar_availability(), 0.1);
    /// ```
    pub fn solar_availability(&self) -> f64 {
        (1.0 - self.cloud_cover_pct / 100.0).clamp(MIN_AVAILABILITY, 1.0)
    }

    /// Fraction of the wind voltage ceiling reachable at this wind speed.
    ///
    /// # Panics
    ///
    /// Panics if `rated_speed_ms` is not positive.
    pub fn wind_availability(&self, rated_speed_ms: f64) -> f64 {
        assert!(rated_speed_ms > 0.0, "rated wind speed must be > 0");
        (self.wind_speed_ms / rated_speed_ms).clamp(MIN_AVAILABILITY, 1.0)
    }
}

/// One day of the weekly outlook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: String,
    pub condition: Condition,
    pub temp_high_c: f64,
    pub temp_low_c: f64,
    pub wind_speed_ms: f64,
    pub irradiance_wm2: f64,
}

/// Seven-day outlook starting at `start_weekday` (0 = Monday).
///
/// Cloudy days dominate; rain and wind are progressively rarer draws.
pub fn weekly_outlook<R: Rng + ?Sized>(rng: &mut R, start_weekday: usize) -> Vec<ForecastDay> {
    (0..7)
        .map(|i| {
            let condition = if rng.random::<f64>() > 0.7 {
                Condition::Cloudy
            } else if rng.random::<f64>() > 0.8 {
                Condition::Rainy
            } else if rng.random::<f64>() > 0.85 {
                Condition::Windy
            } else {
                Condition::Sunny
            };
            ForecastDay {
                day: DAYS[(start_weekday + i) % 7].to_string(),
                condition,
                temp_high_c: (22.0 + rng.random::<f64>() * 8.0).floor(),
                temp_low_c: (15.0 + rng.random::<f64>() * 5.0).floor(),
                wind_speed_ms: (3.0 + rng.random::<f64>() * 8.0).floor(),
                irradiance_wm2: (400.0 + rng.random::<f64>() * 400.0).floor(),
            }
        })
        .collect()
}

/// Daily renewable resource record for the analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceDay {
    pub day: u32,
    pub avg_wind_ms: f64,
    pub peak_wind_ms: f64,
    pub solar_irradiance_wm2: f64,
}

/// Synthetic resource history for the last `days` days (day 1 is oldest).
pub fn resource_history<R: Rng + ?Sized>(rng: &mut R, days: u32) -> Vec<ResourceDay> {
    (1..=days)
        .map(|day| ResourceDay {
            day,
            avg_wind_ms: (rng.random::<f64>() * 10.0).floor() + 2.0,
            peak_wind_ms: (rng.random::<f64>() * 15.0).floor() + 5.0,
            solar_irradiance_wm2: (rng.random::<f64>() * 800.0).floor() + 200.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn default_is_valid() {
        assert!(Weather::default().validate().is_empty());
    }

    #[test]
    fn validate_reports_each_bad_field() {
        let w = Weather {
            cloud_cover_pct: 120.0,
            wind_speed_ms: -1.0,
            ..Weather::default()
        };
        let fields: Vec<_> = w.validate().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["cloud_cover_pct", "wind_speed_ms"]);
    }

    #[test]
    fn availability_is_floored_and_capped() {
        let clear = Weather {
            cloud_cover_pct: 0.0,
            wind_speed_ms: 30.0,
            ..Weather::default()
        };
        assert_eq!(clear.solar_availability(), 1.0);
        assert_eq!(clear.wind_availability(12.0), 1.0);

        let calm = Weather {
            wind_speed_ms: 0.0,
            ..Weather::default()
        };
        assert_eq!(calm.wind_availability(12.0), MIN_AVAILABILITY);
        assert!((Weather::default().solar_availability() - 0.55).abs() < 1e-12);
    }

    #[test]
    fn outlook_has_seven_consecutive_days() {
        let mut rng = StdRng::seed_from_u64(42);
        let days = weekly_outlook(&mut rng, 5);
        let names: Vec<_> = days.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(names, ["Sat", "Sun", "Mon", "Tue", "Wed", "Thu", "Fri"]);
        for d in &days {
            assert!((22.0..30.0).contains(&d.temp_high_c));
            assert!((15.0..20.0).contains(&d.temp_low_c));
            assert!((3.0..11.0).contains(&d.wind_speed_ms));
            assert!((400.0..800.0).contains(&d.irradiance_wm2));
        }
    }

    #[test]
    fn resource_history_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        let hist = resource_history(&mut rng, 30);
        assert_eq!(hist.len(), 30);
        assert_eq!(hist[0].day, 1);
        assert!(hist.iter().all(|d| (2.0..12.0).contains(&d.avg_wind_ms)));
        assert!(hist.iter().all(|d| (200.0..1000.0).contains(&d.solar_irradiance_wm2)));
    }
}
