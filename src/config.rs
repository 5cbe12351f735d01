//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::control::ControlState;
use crate::devices::{AcParams, BatteryParams, DriftBand, GridParams, LoadParams, SourceParams};
use crate::sim::engine::SimConfig;
use crate::sim::history::DEFAULT_CAPACITY;
use crate::sim::tick::PlantParams;
use crate::weather::{Condition, DEFAULT_RATED_WIND_SPEED, Weather};

/// Plant scenario: equipment bands, weather and operator state for one run.
///
/// Every section may be omitted from a scenario file, in which case the
/// commissioning defaults of [`ScenarioConfig::baseline`] apply.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run length, timing and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub solar: SourceConfig,
    #[serde(default)]
    pub wind: SourceConfig,
    /// Load category bands.
    #[serde(default)]
    pub loads: LoadParams,
    #[serde(default)]
    pub battery: BatteryParams,
    #[serde(default)]
    pub grid: GridParams,
    /// Inverter AC output.
    #[serde(default)]
    pub ac: AcParams,
    /// Fixed weather limiting source availability; absent means unlimited.
    #[serde(default)]
    pub weather: Option<Weather>,
    /// Operator state held for the whole batch run.
    #[serde(default)]
    pub controls: ControlState,
}

/// Longest batch run accepted; every snapshot of a batch is kept in memory.
pub const MAX_BATCH_TICKS: u64 = 10_000_000;

/// Run length, timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Ticks to run in batch mode.
    pub ticks: u64,
    /// Master random seed.
    pub seed: u64,
    /// Simulated milliseconds per tick (and live tick period).
    pub tick_ms: u64,
    /// Ticks per simulated day (must be > 0).
    pub ticks_per_day: u64,
    /// Battery SOC at start (%).
    pub initial_soc_pct: f64,
    /// Power-to-energy factor per tick.
    pub energy_scale: f64,
    /// Wind speed at full turbine availability (m/s).
    pub rated_wind_speed_ms: f64,
    /// Points kept in the rolling history window.
    pub history_len: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 3_600,
            seed: 42,
            tick_ms: 1_000,
            ticks_per_day: 86_400,
            initial_soc_pct: 85.0,
            energy_scale: 1e-4,
            rated_wind_speed_ms: DEFAULT_RATED_WIND_SPEED,
            history_len: DEFAULT_CAPACITY,
        }
    }
}

/// Renewable source section (`[solar]` or `[wind]`).
///
/// Fields left out keep the defaults of the source the section belongs to,
/// so `[wind]` with only `cut_in_v` still drifts like a turbine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub voltage: Option<DriftBand>,
    pub current: Option<DriftBand>,
    pub cut_in_v: Option<f64>,
}

impl SourceConfig {
    /// Parameters with every unset field taken from `base`.
    pub fn resolve(&self, base: SourceParams) -> SourceParams {
        SourceParams {
            voltage: self.voltage.unwrap_or(base.voltage),
            current: self.current.unwrap_or(base.current),
            cut_in_v: self.cut_in_v.unwrap_or(base.cut_in_v),
        }
    }
}

/// Scenario problem found while loading or validating, keyed by dotted field path.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.ticks_per_day"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: commissioning state, unlimited weather.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            solar: SourceConfig::default(),
            wind: SourceConfig::default(),
            loads: LoadParams::default(),
            battery: BatteryParams::default(),
            grid: GridParams::default(),
            ac: AcParams::default(),
            weather: None,
            controls: ControlState::default(),
        }
    }

    /// Returns the overcast-storm preset: heavy cloud caps solar, strong wind.
    pub fn overcast_storm() -> Self {
        Self {
            weather: Some(Weather {
                temperature_c: 14.0,
                cloud_cover_pct: 90.0,
                wind_speed_ms: 11.0,
                irradiance_wm2: 120.0,
                rain_probability_pct: 80.0,
                condition: Condition::Rainy,
            }),
            controls: ControlState {
                source_priority: crate::control::SourcePriority::Wind,
                ..ControlState::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the low-battery preset: depleted bank under heavy HVAC load.
    pub fn low_battery() -> Self {
        Self {
            simulation: SimulationConfig {
                initial_soc_pct: 18.0,
                ..SimulationConfig::default()
            },
            loads: LoadParams {
                hvac: DriftBand::new(600.0, 1500.0, 10.0),
                ..LoadParams::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "overcast_storm", "low_battery"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "overcast_storm" => Ok(Self::overcast_storm()),
            "low_battery" => Ok(Self::low_battery()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Solar string parameters, defaults filled in.
    pub fn solar_params(&self) -> SourceParams {
        self.solar.resolve(SourceParams::solar())
    }

    /// Wind turbine parameters, defaults filled in.
    pub fn wind_params(&self) -> SourceParams {
        self.wind.resolve(SourceParams::wind())
    }

    /// Plant parameters for the engine.
    pub fn plant_params(&self) -> PlantParams {
        PlantParams {
            solar: self.solar_params(),
            wind: self.wind_params(),
            loads: self.loads,
            battery: self.battery,
            grid: self.grid,
            ac: self.ac,
            energy_scale: self.simulation.energy_scale,
            rated_wind_speed_ms: self.simulation.rated_wind_speed_ms,
        }
    }

    /// Engine run settings.
    pub fn sim_config(&self) -> SimConfig {
        let s = &self.simulation;
        SimConfig {
            seed: s.seed,
            tick_ms: s.tick_ms,
            ticks_per_day: s.ticks_per_day,
            initial_soc_pct: s.initial_soc_pct,
            history_len: s.history_len,
        }
    }

    /// Validates every field and returns all errors found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.ticks > MAX_BATCH_TICKS {
            errors.push(ConfigError::new(
                "simulation.ticks",
                format!("must be <= {MAX_BATCH_TICKS}"),
            ));
        }
        if s.tick_ms == 0 {
            errors.push(ConfigError::new("simulation.tick_ms", "must be > 0"));
        }
        if s.ticks_per_day == 0 {
            errors.push(ConfigError::new("simulation.ticks_per_day", "must be > 0"));
        }
        if s.history_len == 0 {
            errors.push(ConfigError::new("simulation.history_len", "must be > 0"));
        }
        if !(0.0..=100.0).contains(&s.initial_soc_pct) {
            errors.push(ConfigError::new(
                "simulation.initial_soc_pct",
                "must be in [0, 100]",
            ));
        }
        if !(s.energy_scale.is_finite() && s.energy_scale >= 0.0) {
            errors.push(ConfigError::new("simulation.energy_scale", "must be >= 0"));
        }
        if !(s.rated_wind_speed_ms.is_finite() && s.rated_wind_speed_ms > 0.0) {
            errors.push(ConfigError::new(
                "simulation.rated_wind_speed_ms",
                "must be > 0",
            ));
        }

        for (name, src) in [("solar", self.solar_params()), ("wind", self.wind_params())] {
            check_band(&mut errors, &format!("{name}.voltage"), &src.voltage);
            check_band(&mut errors, &format!("{name}.current"), &src.current);
            if src.current.min < 0.0 {
                errors.push(ConfigError::new(
                    format!("{name}.current.min"),
                    "must be >= 0",
                ));
            }
            if !(src.cut_in_v.is_finite() && src.cut_in_v >= 0.0) {
                errors.push(ConfigError::new(format!("{name}.cut_in_v"), "must be >= 0"));
            }
        }

        let l = &self.loads;
        for (name, band) in [
            ("critical", &l.critical),
            ("hvac", &l.hvac),
            ("lighting", &l.lighting),
            ("aux", &l.aux),
        ] {
            let field = format!("loads.{name}");
            check_band(&mut errors, &field, band);
            if band.min < 0.0 {
                errors.push(ConfigError::new(format!("{field}.min"), "must be >= 0"));
            }
        }

        let b = &self.battery;
        if !(b.max_rate_w.is_finite() && b.max_rate_w > 0.0) {
            errors.push(ConfigError::new("battery.max_rate_w", "must be > 0"));
        }
        if !(0.0 <= b.discharge_floor_pct
            && b.discharge_floor_pct < b.charge_ceiling_pct
            && b.charge_ceiling_pct <= 100.0)
        {
            errors.push(ConfigError::new(
                "battery.discharge_floor_pct",
                "must satisfy 0 <= discharge_floor_pct < charge_ceiling_pct <= 100",
            ));
        }
        if !(b.soc_per_watt.is_finite() && b.soc_per_watt >= 0.0) {
            errors.push(ConfigError::new("battery.soc_per_watt", "must be >= 0"));
        }
        if !(b.status_deadband_w >= 0.0) {
            errors.push(ConfigError::new("battery.status_deadband_w", "must be >= 0"));
        }
        if !(0.0..=b.status_deadband_w).contains(&b.status_hysteresis_w) {
            errors.push(ConfigError::new(
                "battery.status_hysteresis_w",
                "must be in [0, battery.status_deadband_w]",
            ));
        }
        if !(b.nominal_voltage > 0.0) {
            errors.push(ConfigError::new("battery.nominal_voltage", "must be > 0"));
        }
        check_band(&mut errors, "battery.voltage", &b.voltage);
        check_band(&mut errors, "battery.temperature", &b.temperature);

        let g = &self.grid;
        if !(g.nominal_voltage > 0.0) {
            errors.push(ConfigError::new("grid.nominal_voltage", "must be > 0"));
        }
        check_band(&mut errors, "grid.voltage", &g.voltage);
        check_band(&mut errors, "grid.frequency", &g.frequency);

        let ac = &self.ac;
        if !(ac.line_voltage > 0.0) {
            errors.push(ConfigError::new("ac.line_voltage", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&ac.power_factor) {
            errors.push(ConfigError::new("ac.power_factor", "must be in [0, 1]"));
        }
        check_band(&mut errors, "ac.voltage", &ac.voltage);
        check_band(&mut errors, "ac.frequency", &ac.frequency);

        if let Some(w) = &self.weather {
            for e in w.validate() {
                errors.push(ConfigError::new(
                    format!("weather.{}", e.field),
                    format!("{} (got {})", e.message, e.value),
                ));
            }
        }

        if let Err(e) = self.controls.validate() {
            errors.push(ConfigError::new("controls", e.to_string()));
        }

        errors
    }
}

fn check_band(errors: &mut Vec<ConfigError>, field: &str, band: &DriftBand) {
    if !band.is_valid() {
        errors.push(ConfigError::new(
            field,
            "must have finite min <= max and volatility >= 0",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn empty_document_gives_distinct_source_defaults() {
        let cfg = ScenarioConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.wind_params(), SourceParams::wind());
        assert_eq!(cfg.solar_params(), SourceParams::solar());
    }

    #[test]
    fn partial_wind_section_keeps_turbine_defaults() {
        let cfg = ScenarioConfig::from_toml_str("[wind]\ncut_in_v = 6.0\n").unwrap();
        let wind = cfg.wind_params();
        assert_eq!(wind.cut_in_v, 6.0);
        assert_eq!(wind.voltage, SourceParams::wind().voltage);
        assert_eq!(wind.current, SourceParams::wind().current);
        assert_eq!(cfg.solar_params(), SourceParams::solar());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_solar_section_keeps_solar_defaults() {
        let cfg = ScenarioConfig::from_toml_str(
            "[solar]\nvoltage = { min = 0.0, max = 30.0, volatility = 0.4 }\n",
        )
        .unwrap();
        let solar = cfg.plant_params().solar;
        assert_eq!(solar.voltage.max, 30.0);
        assert_eq!(solar.current, SourceParams::solar().current);
        assert_eq!(solar.cut_in_v, SourceParams::solar().cut_in_v);
    }

    #[test]
    fn from_preset_unknown() {
        let e = ScenarioConfig::from_preset("nonexistent").unwrap_err();
        assert_eq!(e.field, "preset");
        assert!(e.message.contains("unknown preset"));
        assert!(e.to_string().starts_with("config error: preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
ticks = 600
seed = 99
ticks_per_day = 300
initial_soc_pct = 60.0

[solar]
voltage = { min = 0.0, max = 36.0, volatility = 0.8 }
current = { min = 0.0, max = 10.0, volatility = 0.2 }
cut_in_v = 6.0

[battery]
max_rate_w = 800.0
status_hysteresis_w = 2.0

[loads]
hvac = { min = 0.0, max = 900.0, volatility = 5.0 }

[weather]
cloud_cover_pct = 70.0
wind_speed_ms = 8.0

[controls]
wind_brake = true
source_priority = "WIND"
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.simulation.ticks, 600);
        assert_eq!(cfg.simulation.ticks_per_day, 300);
        assert_eq!(cfg.solar_params().voltage.max, 36.0);
        assert_eq!(cfg.battery.max_rate_w, 800.0);
        assert_eq!(cfg.battery.charge_ceiling_pct, 98.0);
        assert_eq!(cfg.loads.hvac.max, 900.0);
        assert_eq!(cfg.loads.critical, LoadParams::default().critical);
        assert_eq!(cfg.weather.map(|w| w.cloud_cover_pct), Some(70.0));
        assert_eq!(cfg.weather.map(|w| w.irradiance_wm2), Some(600.0));
        assert!(cfg.controls.wind_brake);
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.plant_params().battery.max_rate_w, 800.0);
        assert_eq!(cfg.sim_config().seed, 99);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
ticks_per_day = 24
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_zero_ticks_per_day() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.ticks_per_day = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.ticks_per_day"));
    }

    #[test]
    fn validation_bounds_batch_length() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.ticks = u64::MAX;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.ticks"));

        cfg.simulation.ticks = MAX_BATCH_TICKS;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_invalid_soc() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.initial_soc_pct = 150.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.initial_soc_pct"));
    }

    #[test]
    fn validation_catches_inverted_band() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.loads.aux = DriftBand::new(200.0, 20.0, 5.0);
        cfg.battery.charge_ceiling_pct = 5.0;
        let fields: Vec<_> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"loads.aux".to_string()));
        assert!(fields.contains(&"battery.discharge_floor_pct".to_string()));
    }

    #[test]
    fn validation_reports_weather_and_controls() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.weather = Some(Weather {
            cloud_cover_pct: -5.0,
            ..Weather::default()
        });
        cfg.controls.solar_tilt_deg = 95.0;
        let fields: Vec<_> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["weather.cloud_cover_pct", "controls"]);
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn presets_differ_where_expected() {
        let storm = ScenarioConfig::overcast_storm();
        assert!(storm.weather.is_some_and(|w| w.cloud_cover_pct > 60.0));
        let low = ScenarioConfig::low_battery();
        assert!(low.simulation.initial_soc_pct < 20.0);
        assert!(low.loads.hvac.min > LoadParams::default().hvac.min);
    }
}
