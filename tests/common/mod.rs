//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use microgrid_sim::control::ControlState;
use microgrid_sim::sim::engine::{Engine, SimConfig};
use microgrid_sim::sim::snapshot::TelemetrySnapshot;
use microgrid_sim::sim::tick::PlantParams;

/// Conservation tolerance (W).
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// Engine settings for tests: seed 42, 1 s ticks, 1000-tick days.
pub fn default_config(seed: u64) -> SimConfig {
    SimConfig {
        seed,
        ticks_per_day: 1_000,
        ..SimConfig::default()
    }
}

/// Default engine with the given seed.
pub fn default_engine(seed: u64) -> Engine {
    Engine::new(PlantParams::default(), default_config(seed))
}

/// Runs `ticks` ticks with `control` from a fresh seeded engine.
pub fn run(seed: u64, ticks: u64, control: &ControlState) -> Vec<TelemetrySnapshot> {
    default_engine(seed)
        .run(ticks, control)
        .unwrap_or_else(|e| panic!("run failed: {e}"))
}

/// Asserts the per-tick invariants every snapshot must satisfy.
pub fn assert_invariants(s: &TelemetrySnapshot) {
    let soc = s.battery.state_of_charge;
    assert!((0.0..=100.0).contains(&soc), "tick {}: soc {soc}", s.tick);
    assert!(
        s.battery.power.abs() <= 500.0,
        "tick {}: battery {} W",
        s.tick,
        s.battery.power
    );
    let b = &s.loads.breakdown;
    assert_eq!(
        s.loads.total_power,
        b.critical + b.hvac + b.lighting + b.aux,
        "tick {}: load sum",
        s.tick
    );
    // Grid power is positive on import, so it adds to the supply side.
    let residual = s.solar.power + s.wind.power - s.loads.total_power - s.battery.power
        + s.grid.power;
    assert!(
        residual.abs() <= BALANCE_TOLERANCE,
        "tick {}: residual {residual}",
        s.tick
    );
    assert!(s.solar.power >= 0.0 && s.wind.power >= 0.0);
}
