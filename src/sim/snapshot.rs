//! Per-tick telemetry record.

use serde::{Deserialize, Serialize};

use crate::control::{ControlState, SystemFlags};
use crate::devices::{
    AcReading, BatteryReading, BatteryStatus, GridReading, GridStatus, LoadBreakdown, LoadReading,
    SourceReading,
};

/// Complete plant state after one tick. Produced once and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Ticks since the simulation started (0 for the initial snapshot).
    pub tick: u64,
    /// Milliseconds since the simulation started.
    pub timestamp_ms: u64,
    pub solar: SourceReading,
    pub wind: SourceReading,
    pub battery: BatteryReading,
    pub grid: GridReading,
    pub loads: LoadReading,
    pub ac_output: AcReading,
    pub system_flags: SystemFlags,
}

impl TelemetrySnapshot {
    /// Plant state at commissioning with the given state of charge.
    ///
    /// The battery starts idle and the grid carries the whole imbalance.
    ///
    /// # Panics
    ///
    /// Panics if `soc_pct` is outside `[0, 100]`.
    pub fn initial(soc_pct: f64) -> Self {
        assert!(
            (0.0..=100.0).contains(&soc_pct),
            "initial soc must be within [0, 100], got {soc_pct}"
        );
        let solar = SourceReading::new(18.5, 4.2, 450.2);
        let wind = SourceReading::new(12.1, 2.5, 210.5);
        let loads = LoadReading::from_breakdown(LoadBreakdown {
            critical: 300.0,
            hvac: 300.0,
            lighting: 100.0,
            aux: 100.0,
        });
        let grid_power = loads.total_power - (solar.power + wind.power);

        Self {
            tick: 0,
            timestamp_ms: 0,
            solar,
            wind,
            battery: BatteryReading {
                voltage: 12.8,
                current: 0.0,
                power: 0.0,
                state_of_charge: soc_pct,
                temperature: 29.0,
                health: 97.0,
                status: BatteryStatus::Idle,
            },
            grid: GridReading {
                status: GridStatus::Connected,
                voltage: 230.0,
                current: grid_power.abs() / 230.0,
                power: grid_power,
                import_today: 12.5,
                export_today: 8.2,
                frequency: 50.0,
            },
            loads,
            ac_output: AcReading {
                voltage: 230.5,
                current: loads.total_power / 230.0,
                power: loads.total_power,
                frequency: 50.0,
                power_factor: 0.96,
            },
            system_flags: ControlState::default().system_flags(),
        }
    }

    /// Total renewable generation (W).
    pub fn generation_w(&self) -> f64 {
        self.solar.power + self.wind.power
    }

    /// Power left unaccounted for after load, battery and grid (W).
    ///
    /// Generation plus grid import must equal load plus battery charging,
    /// so this is zero up to floating-point rounding for every snapshot the
    /// engine produces.
    pub fn conservation_residual_w(&self) -> f64 {
        self.generation_w() - self.loads.total_power - self.battery.power + self.grid.power
    }

    /// Copy with every energy-today counter reset for a new simulated day.
    pub fn with_day_reset(&self) -> Self {
        let mut next = *self;
        next.solar.energy_today = 0.0;
        next.wind.energy_today = 0.0;
        next.grid.import_today = 0.0;
        next.grid.export_today = 0.0;
        next
    }
}
