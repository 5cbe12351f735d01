//! One-tick advance of the simulated plant.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::control::ControlState;
use crate::devices::{
    AcParams, BatteryParams, BatteryReading, GridParams, LoadParams, SourceConditions,
    SourceParams,
};
use crate::weather::{DEFAULT_RATED_WIND_SPEED, Weather};

use super::balance::{balance_energy, integrate_soc};
use super::snapshot::TelemetrySnapshot;

/// Physical parameters of the whole plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantParams {
    pub solar: SourceParams,
    pub wind: SourceParams,
    pub loads: LoadParams,
    pub battery: BatteryParams,
    pub grid: GridParams,
    pub ac: AcParams,
    /// Power-to-energy factor applied to every counter each tick.
    pub energy_scale: f64,
    /// Wind speed giving full turbine availability (m/s).
    pub rated_wind_speed_ms: f64,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            solar: SourceParams::solar(),
            wind: SourceParams::wind(),
            loads: LoadParams::default(),
            battery: BatteryParams::default(),
            grid: GridParams::default(),
            ac: AcParams::default(),
            energy_scale: 1e-4,
            rated_wind_speed_ms: DEFAULT_RATED_WIND_SPEED,
        }
    }
}

/// Advances the plant by one tick and returns the next snapshot.
///
/// Draw order from `rng` is fixed (solar, wind, loads, battery, grid, AC)
/// so a seeded run is reproducible.
///
/// # Arguments
///
/// * `previous` - Snapshot from the previous tick
/// * `control` - Operator state read for this tick
/// * `weather_override` - When present, limits source availability
/// * `params` - Plant parameters
/// * `rng` - Random source
/// * `timestamp_ms` - Timestamp stamped onto the new snapshot
///
/// # Panics
///
/// Panics if `control` has out-of-range actuator positions or if the
/// previous snapshot breaks the balance preconditions (SOC outside
/// `[0, 100]`, non-finite power).
pub fn advance_tick<R: Rng + ?Sized>(
    previous: &TelemetrySnapshot,
    control: &ControlState,
    weather_override: Option<&Weather>,
    params: &PlantParams,
    rng: &mut R,
    timestamp_ms: u64,
) -> TelemetrySnapshot {
    if let Err(e) = control.validate() {
        panic!("invalid control state: {e}");
    }

    let (solar_conditions, wind_conditions) = match weather_override {
        Some(w) => (
            SourceConditions::available(w.solar_availability()),
            SourceConditions::available(w.wind_availability(params.rated_wind_speed_ms)),
        ),
        None => (SourceConditions::UNRESTRICTED, SourceConditions::UNRESTRICTED),
    };

    let solar =
        params
            .solar
            .next_reading(rng, &previous.solar, solar_conditions, params.energy_scale);
    let wind = params.wind.next_reading(
        rng,
        &previous.wind,
        wind_conditions.with_brake(control.wind_brake),
        params.energy_scale,
    );
    let loads = params.loads.next_reading(rng, &previous.loads);

    let soc = previous.battery.state_of_charge;
    let balance = balance_energy(
        solar.power + wind.power,
        loads.total_power,
        soc,
        &params.battery,
    );

    let bp = &params.battery;
    let battery = BatteryReading {
        voltage: bp.voltage.next(rng, previous.battery.voltage),
        current: bp.current_for(balance.battery_power_w),
        power: balance.battery_power_w,
        state_of_charge: integrate_soc(soc, balance.battery_power_w, bp),
        temperature: bp.temperature.next(rng, previous.battery.temperature),
        health: previous.battery.health,
        status: bp.classify(balance.battery_power_w, previous.battery.status),
    };

    let grid = params.grid.next_reading(
        rng,
        &previous.grid,
        control.grid_status(),
        balance.grid_power_w,
        params.energy_scale,
    );

    let ac_output = params.ac.next_reading(
        rng,
        &previous.ac_output,
        loads.total_power,
        control.inverter_on,
        control.load_on,
    );

    TelemetrySnapshot {
        tick: previous.tick + 1,
        timestamp_ms,
        solar,
        wind,
        battery,
        grid,
        loads,
        ac_output,
        system_flags: control.system_flags(),
    }
}
