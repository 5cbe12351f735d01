//! Runs presets and scenario files end to end through the library and the CLI.

mod common;

use std::path::Path;
use std::process::Command;

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::devices::GridStatus;
use microgrid_sim::sim::engine::Engine;
use microgrid_sim::sim::kpi::RunSummary;
use microgrid_sim::sim::snapshot::TelemetrySnapshot;

fn run_snapshots(scenario: &ScenarioConfig, ticks: u64) -> (Engine, Vec<TelemetrySnapshot>) {
    assert!(scenario.validate().is_empty(), "{:?}", scenario.validate());
    let params = scenario.plant_params();
    let mut engine = Engine::new(params, scenario.sim_config());
    engine.set_weather(scenario.weather);
    let snaps = engine
        .run(ticks, &scenario.controls)
        .unwrap_or_else(|e| panic!("run failed: {e}"));
    for s in &snaps {
        common::assert_invariants(s);
    }
    (engine, snaps)
}

fn run_scenario(scenario: &ScenarioConfig, ticks: u64) -> (Engine, RunSummary) {
    let (engine, snaps) = run_snapshots(scenario, ticks);
    let summary = RunSummary::from_snapshots(&snaps, scenario.simulation.energy_scale);
    (engine, summary)
}

/// First tick at which the bank sits at or below its discharge floor.
fn first_floor_tick(snaps: &[TelemetrySnapshot], floor_pct: f64) -> Option<u64> {
    snaps
        .iter()
        .find(|s| s.battery.state_of_charge <= floor_pct)
        .map(|s| s.tick)
}

#[test]
fn every_preset_runs_with_invariants_intact() {
    for name in ScenarioConfig::PRESETS {
        let scenario = ScenarioConfig::from_preset(name).unwrap();
        let (_, summary) = run_scenario(&scenario, 2_000);
        assert_eq!(summary.ticks, 2_000, "{name}");
        assert!(summary.max_residual_w <= common::BALANCE_TOLERANCE, "{name}");
    }
}

#[test]
fn presets_produce_distinct_dynamics() {
    let baseline_cfg = ScenarioConfig::baseline();
    let low_cfg = ScenarioConfig::low_battery();
    let (_, baseline_snaps) = run_snapshots(&baseline_cfg, 2_000);
    let (engine, low_snaps) = run_snapshots(&low_cfg, 2_000);
    let baseline = RunSummary::from_snapshots(&baseline_snaps, baseline_cfg.simulation.energy_scale);
    let (_, storm) = run_scenario(&ScenarioConfig::overcast_storm(), 2_000);

    // Cloud cover caps solar below cut-in for the whole storm run.
    assert!(storm.solar_energy < baseline.solar_energy * 0.01);

    // Both banks may end up parked at the floor; the depleted one gets there first.
    let floor = low_cfg.battery.discharge_floor_pct;
    let low_floor = first_floor_tick(&low_snaps, floor).expect("low_battery never reached the floor");
    if let Some(base_floor) = first_floor_tick(&baseline_snaps, floor) {
        assert!(low_floor < base_floor, "low {low_floor} vs baseline {base_floor}");
    }
    let mean_soc = |snaps: &[TelemetrySnapshot]| {
        snaps.iter().map(|s| s.battery.state_of_charge).sum::<f64>() / snaps.len() as f64
    };
    assert!(mean_soc(&low_snaps) < mean_soc(&baseline_snaps));
    assert!(
        engine
            .notifications()
            .messages()
            .contains(&"CRITICAL: Battery Low (<20%)".to_string())
    );
}

#[test]
fn scenario_files_parse_and_validate() {
    for path in [
        "scenarios/baseline.toml",
        "scenarios/calm_night.toml",
        "scenarios/islanded_sunny.toml",
    ] {
        let scenario = ScenarioConfig::from_toml_file(Path::new(path))
            .unwrap_or_else(|e| panic!("{path}: {e}"));
        assert!(scenario.validate().is_empty(), "{path}");
    }
}

#[test]
fn calm_night_drains_battery_to_floor() {
    let scenario = ScenarioConfig::from_toml_file(Path::new("scenarios/calm_night.toml")).unwrap();
    let (engine, summary) = run_scenario(&scenario, 1_000);
    assert_eq!(summary.solar_energy, 0.0);
    assert_eq!(summary.wind_energy, 0.0);
    // One full-rate tick past the floor is the most it can overshoot.
    assert!(summary.min_soc_pct <= 10.0 + 0.25);
    assert!(summary.min_soc_pct >= 10.0 - 0.25);
    assert!(engine.current().grid.power > 0.0);
}

#[test]
fn islanded_scenario_reports_islanded_grid() {
    let scenario =
        ScenarioConfig::from_toml_file(Path::new("scenarios/islanded_sunny.toml")).unwrap();
    let (engine, _) = run_scenario(&scenario, 200);
    assert_eq!(engine.current().grid.status, GridStatus::Islanded);
    assert!(
        engine
            .notifications()
            .messages()
            .contains(&"WARNING: Grid Island Mode".to_string())
    );
}

#[test]
fn cli_runs_preset_and_prints_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--preset", "overcast_storm", "--ticks", "500", "--seed", "3"])
        .output()
        .expect("microgrid-sim process should run");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert!(stdout.contains("--- Run Summary (500 ticks) ---"));
    assert!(stdout.contains("Strategy: WIND"));
}

#[test]
fn cli_rejects_unknown_preset() {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--preset", "volcano"])
        .output()
        .expect("microgrid-sim process should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("preset"));
}

#[test]
fn cli_rejects_oversized_batch() {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--ticks", &u64::MAX.to_string()])
        .output()
        .expect("microgrid-sim process should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("simulation.ticks"));
}
