//! Microgrid simulator entry point: CLI wiring and config-driven engine construction.

use std::path::Path;
use std::process;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::io::export::export_csv;
use microgrid_sim::sim::engine::Engine;
use microgrid_sim::sim::kpi::RunSummary;
use microgrid_sim::strategy::recommend_strategy;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    ticks_override: Option<u64>,
    telemetry_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("microgrid-sim: hybrid microgrid plant telemetry simulator");
    eprintln!();
    eprintln!("Usage: microgrid-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --ticks <u64>            Override number of ticks to run");
    eprintln!("  --telemetry-out <path>   Export snapshots to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Keep ticking live and serve the JSON API");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

/// Returns the value following flag `name`, exiting if it is missing.
fn flag_value(args: &[String], i: usize, name: &str, kind: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {name} requires a {kind} argument");
            process::exit(1);
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str, kind: &str) -> T {
    value.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {name} value \"{value}\" is not a valid {kind}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        ticks_override: None,
        telemetry_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(flag_value(&args, i, "--scenario", "path"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(flag_value(&args, i, "--preset", "name"));
            }
            "--seed" => {
                i += 1;
                let v = flag_value(&args, i, "--seed", "u64");
                cli.seed_override = Some(parse_number(&v, "--seed", "u64"));
            }
            "--ticks" => {
                i += 1;
                let v = flag_value(&args, i, "--ticks", "u64");
                cli.ticks_override = Some(parse_number(&v, "--ticks", "u64"));
            }
            "--telemetry-out" => {
                i += 1;
                cli.telemetry_out = Some(flag_value(&args, i, "--telemetry-out", "path"));
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let v = flag_value(&args, i, "--port", "u16");
                cli.port = parse_number(&v, "--port", "u16");
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = parse_args();
    init_tracing();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(ticks) = cli.ticks_override {
        scenario.simulation.ticks = ticks;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let params = scenario.plant_params();
    let mut engine = Engine::new(params, scenario.sim_config());
    engine.set_weather(scenario.weather);
    let controls = scenario.controls;

    tracing::info!(
        seed = scenario.simulation.seed,
        ticks = scenario.simulation.ticks,
        "starting batch run"
    );
    let snapshots = match engine.run(scenario.simulation.ticks, &controls) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let summary = RunSummary::from_snapshots(&snapshots, params.energy_scale);
    println!("{summary}");

    let weather = scenario.weather.unwrap_or_default();
    let strategy = recommend_strategy(&weather, controls.source_priority);
    println!(
        "\nStrategy: {} ({}){}",
        strategy.mode.as_str(),
        strategy.reason,
        if strategy.differs_from(controls.source_priority) {
            " - differs from current priority"
        } else {
            ""
        }
    );

    let notifications = engine.notifications().messages();
    if !notifications.is_empty() {
        println!("\nNotifications:");
        for n in &notifications {
            println!("  {n}");
        }
    }

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&snapshots, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        tracing::info!(path = %path, rows = snapshots.len(), "telemetry written");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;
        use std::time::{Duration, SystemTime, UNIX_EPOCH};

        use rand::SeedableRng;
        use rand::rngs::StdRng;

        // 1970-01-01 was a Thursday; index 0 is Monday.
        let days = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() / 86_400)
            .unwrap_or(0);
        let weekday = ((days + 3) % 7) as usize;
        let mut rng = StdRng::seed_from_u64(scenario.simulation.seed);
        let outlook = microgrid_sim::weather::weekly_outlook(&mut rng, weekday);
        let resources = microgrid_sim::weather::resource_history(&mut rng, 30);

        let period = Duration::from_millis(scenario.simulation.tick_ms);
        let state = Arc::new(microgrid_sim::api::AppState::new(
            engine, controls, outlook, resources,
        ));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(microgrid_sim::api::serve(state, addr, period));
    }
}
