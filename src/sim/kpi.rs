//! Post-hoc run summary computed from snapshots.

use std::fmt;

use crate::devices::BatteryStatus;

use super::snapshot::TelemetrySnapshot;

/// Aggregate indicators over a batch of ticks.
///
/// Energies use the same per-tick power-to-energy factor as the plant's
/// day counters, so they can be compared directly with them.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: usize,
    pub solar_energy: f64,
    pub wind_energy: f64,
    pub load_energy: f64,
    pub import_energy: f64,
    pub export_energy: f64,
    /// Peak grid import (W, positive).
    pub peak_import_w: f64,
    /// Peak grid export (W, positive magnitude).
    pub peak_export_w: f64,
    pub min_soc_pct: f64,
    pub max_soc_pct: f64,
    /// Sum of |battery power| × scale.
    pub battery_throughput: f64,
    /// Share of load not met by grid import (%).
    pub self_sufficiency_pct: f64,
    pub ticks_charging: usize,
    pub ticks_discharging: usize,
    pub ticks_idle: usize,
    /// Largest |conservation residual| seen (W).
    pub max_residual_w: f64,
}

impl RunSummary {
    /// Computes the summary from a run's snapshots.
    ///
    /// # Arguments
    ///
    /// * `snapshots` - Snapshots in tick order
    /// * `energy_scale` - Power-to-energy factor per tick
    pub fn from_snapshots(snapshots: &[TelemetrySnapshot], energy_scale: f64) -> Self {
        if snapshots.is_empty() {
            return Self {
                ticks: 0,
                solar_energy: 0.0,
                wind_energy: 0.0,
                load_energy: 0.0,
                import_energy: 0.0,
                export_energy: 0.0,
                peak_import_w: 0.0,
                peak_export_w: 0.0,
                min_soc_pct: 0.0,
                max_soc_pct: 0.0,
                battery_throughput: 0.0,
                self_sufficiency_pct: 0.0,
                ticks_charging: 0,
                ticks_discharging: 0,
                ticks_idle: 0,
                max_residual_w: 0.0,
            };
        }

        let mut solar = 0.0_f64;
        let mut wind = 0.0_f64;
        let mut load = 0.0_f64;
        let mut import = 0.0_f64;
        let mut export = 0.0_f64;
        let mut peak_import = 0.0_f64;
        let mut peak_export = 0.0_f64;
        let mut min_soc = f64::INFINITY;
        let mut max_soc = f64::NEG_INFINITY;
        let mut throughput = 0.0_f64;
        let (mut charging, mut discharging, mut idle) = (0_usize, 0_usize, 0_usize);
        let mut max_residual = 0.0_f64;

        for s in snapshots {
            solar += s.solar.power * energy_scale;
            wind += s.wind.power * energy_scale;
            load += s.loads.total_power * energy_scale;
            import += s.grid.power.max(0.0) * energy_scale;
            export += (-s.grid.power).max(0.0) * energy_scale;

            peak_import = peak_import.max(s.grid.power);
            peak_export = peak_export.max(-s.grid.power);

            min_soc = min_soc.min(s.battery.state_of_charge);
            max_soc = max_soc.max(s.battery.state_of_charge);
            throughput += s.battery.power.abs() * energy_scale;

            match s.battery.status {
                BatteryStatus::Charging => charging += 1,
                BatteryStatus::Discharging => discharging += 1,
                BatteryStatus::Idle => idle += 1,
            }
            max_residual = max_residual.max(s.conservation_residual_w().abs());
        }

        let self_sufficiency_pct = if load > 0.0 {
            (100.0 * (load - import) / load).clamp(0.0, 100.0)
        } else {
            100.0
        };

        Self {
            ticks: snapshots.len(),
            solar_energy: solar,
            wind_energy: wind,
            load_energy: load,
            import_energy: import,
            export_energy: export,
            peak_import_w: peak_import,
            peak_export_w: peak_export,
            min_soc_pct: min_soc,
            max_soc_pct: max_soc,
            battery_throughput: throughput,
            self_sufficiency_pct,
            ticks_charging: charging,
            ticks_discharging: discharging,
            ticks_idle: idle,
            max_residual_w: max_residual,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ({} ticks) ---", self.ticks)?;
        writeln!(
            f,
            "Generation:            solar {:.3}, wind {:.3}",
            self.solar_energy, self.wind_energy
        )?;
        writeln!(f, "Load served:           {:.3}", self.load_energy)?;
        writeln!(
            f,
            "Grid:                  import {:.3}, export {:.3}",
            self.import_energy, self.export_energy
        )?;
        writeln!(
            f,
            "Peak grid:             import {:.1} W, export {:.1} W",
            self.peak_import_w, self.peak_export_w
        )?;
        writeln!(
            f,
            "Battery SOC:           {:.2}% .. {:.2}%",
            self.min_soc_pct, self.max_soc_pct
        )?;
        writeln!(f, "Battery throughput:    {:.3}", self.battery_throughput)?;
        writeln!(
            f,
            "Battery status ticks:  charging {}, discharging {}, idle {}",
            self.ticks_charging, self.ticks_discharging, self.ticks_idle
        )?;
        writeln!(f, "Self-sufficiency:      {:.1}%", self.self_sufficiency_pct)?;
        write!(f, "Max balance residual:  {:.2e} W", self.max_residual_w)
    }
}
