//! Tick driver that owns the plant state between ticks.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::alerts::{self, NotificationLog};
use crate::control::{ControlError, ControlState};
use crate::weather::Weather;

use super::history::{DEFAULT_CAPACITY, HistoryPoint, HistoryWindow};
use super::snapshot::TelemetrySnapshot;
use super::tick::{PlantParams, advance_tick};

/// Run-level settings for an `Engine`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// RNG seed; equal seeds and inputs give identical runs.
    pub seed: u64,
    /// Simulated time per tick (ms).
    pub tick_ms: u64,
    /// Ticks per simulated day; energy-today counters reset at each boundary.
    pub ticks_per_day: u64,
    pub initial_soc_pct: f64,
    pub history_len: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_ms: 1_000,
            ticks_per_day: 86_400,
            initial_soc_pct: 85.0,
            history_len: DEFAULT_CAPACITY,
        }
    }
}

/// Simulation engine owning the current snapshot and everything derived from it.
///
/// Each `step` replaces the snapshot with its successor; nothing else
/// mutates it.
pub struct Engine {
    params: PlantParams,
    config: SimConfig,
    rng: StdRng,
    current: TelemetrySnapshot,
    weather: Option<Weather>,
    history: HistoryWindow,
    notifications: NotificationLog,
}

impl Engine {
    /// Creates an engine at the commissioning snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `ticks_per_day` or `history_len` is zero, or the initial
    /// SOC is outside `[0, 100]`.
    pub fn new(params: PlantParams, config: SimConfig) -> Self {
        assert!(config.ticks_per_day > 0, "ticks_per_day must be > 0");
        Self {
            params,
            rng: StdRng::seed_from_u64(config.seed),
            current: TelemetrySnapshot::initial(config.initial_soc_pct),
            weather: None,
            history: HistoryWindow::new(config.history_len),
            notifications: NotificationLog::default(),
            config,
        }
    }

    /// Sets or clears the weather that limits source availability.
    pub fn set_weather(&mut self, weather: Option<Weather>) {
        tracing::debug!(?weather, "weather override updated");
        self.weather = weather;
    }

    /// Advances one tick using `control` as read at tick start.
    ///
    /// # Errors
    ///
    /// Returns a `ControlError` if `control` has out-of-range actuator
    /// positions; the engine state is left unchanged.
    pub fn step(&mut self, control: &ControlState) -> Result<&TelemetrySnapshot, ControlError> {
        control.validate()?;

        let previous = if self.starts_new_day() {
            tracing::info!(tick = self.current.tick, "day boundary, resetting energy counters");
            self.current.with_day_reset()
        } else {
            self.current
        };

        let timestamp_ms = (previous.tick + 1) * self.config.tick_ms;
        let next = advance_tick(
            &previous,
            control,
            self.weather.as_ref(),
            &self.params,
            &mut self.rng,
            timestamp_ms,
        );

        tracing::debug!(
            tick = next.tick,
            soc = next.battery.state_of_charge,
            battery_w = next.battery.power,
            grid_w = next.grid.power,
            "tick"
        );

        self.notifications.record(&alerts::evaluate(&next));
        self.history.push(HistoryPoint::from(&next));
        self.current = next;
        Ok(&self.current)
    }

    /// Runs `ticks` steps with a fixed control state and returns every snapshot.
    ///
    /// # Errors
    ///
    /// Returns a `ControlError` if `control` is invalid; no tick is run.
    pub fn run(
        &mut self,
        ticks: u64,
        control: &ControlState,
    ) -> Result<Vec<TelemetrySnapshot>, ControlError> {
        control.validate()?;
        let mut snapshots = Vec::new();
        for _ in 0..ticks {
            snapshots.push(*self.step(control)?);
        }
        tracing::info!(ticks, final_soc = self.current.battery.state_of_charge, "run complete");
        Ok(snapshots)
    }

    fn starts_new_day(&self) -> bool {
        self.current.tick > 0 && self.current.tick % self.config.ticks_per_day == 0
    }

    pub fn current(&self) -> &TelemetrySnapshot {
        &self.current
    }

    pub fn weather(&self) -> Option<&Weather> {
        self.weather.as_ref()
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    pub fn params(&self) -> &PlantParams {
        &self.params
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
