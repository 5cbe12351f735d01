//! CSV export for telemetry snapshots.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::control::ActiveSource;
use crate::sim::snapshot::TelemetrySnapshot;

/// Column header for CSV telemetry export.
const HEADER: &str = "tick,timestamp_ms,\
                      solar_v,solar_a,solar_w,solar_energy_today,\
                      wind_v,wind_a,wind_w,wind_energy_today,\
                      load_w,load_critical_w,load_hvac_w,load_lighting_w,load_aux_w,\
                      battery_v,battery_a,battery_w,battery_soc,battery_temp_c,battery_status,\
                      grid_status,grid_v,grid_w,grid_hz,grid_import_today,grid_export_today,\
                      ac_v,ac_a,ac_w,ac_hz,\
                      active_source,inverter_on,load_on,fault_detected";

/// Exports snapshots to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(snapshots: &[TelemetrySnapshot], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(snapshots, buf)
}

fn active_source_str(source: ActiveSource) -> &'static str {
    match source {
        ActiveSource::Solar => "SOLAR",
        ActiveSource::Wind => "WIND",
        ActiveSource::Hybrid => "HYBRID",
    }
}

/// Writes snapshots as CSV to any writer, one row per tick.
///
/// Powers are written with six decimals so a row's balance can be checked
/// from the file alone.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(snapshots: &[TelemetrySnapshot], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for s in snapshots {
        let b = &s.loads.breakdown;
        let f = &s.system_flags;
        wtr.write_record(&[
            s.tick.to_string(),
            s.timestamp_ms.to_string(),
            format!("{:.3}", s.solar.voltage),
            format!("{:.3}", s.solar.current),
            format!("{:.6}", s.solar.power),
            format!("{:.6}", s.solar.energy_today),
            format!("{:.3}", s.wind.voltage),
            format!("{:.3}", s.wind.current),
            format!("{:.6}", s.wind.power),
            format!("{:.6}", s.wind.energy_today),
            format!("{:.6}", s.loads.total_power),
            format!("{:.6}", b.critical),
            format!("{:.6}", b.hvac),
            format!("{:.6}", b.lighting),
            format!("{:.6}", b.aux),
            format!("{:.3}", s.battery.voltage),
            format!("{:.3}", s.battery.current),
            format!("{:.6}", s.battery.power),
            format!("{:.4}", s.battery.state_of_charge),
            format!("{:.2}", s.battery.temperature),
            s.battery.status.as_str().to_string(),
            s.grid.status.as_str().to_string(),
            format!("{:.2}", s.grid.voltage),
            format!("{:.6}", s.grid.power),
            format!("{:.3}", s.grid.frequency),
            format!("{:.6}", s.grid.import_today),
            format!("{:.6}", s.grid.export_today),
            format!("{:.2}", s.ac_output.voltage),
            format!("{:.3}", s.ac_output.current),
            format!("{:.6}", s.ac_output.power),
            format!("{:.3}", s.ac_output.frequency),
            active_source_str(f.active_source).to_string(),
            f.inverter_on.to_string(),
            f.load_on.to_string(),
            f.fault_detected.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
