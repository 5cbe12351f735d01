use rand::Rng;
use serde::{Deserialize, Serialize};

use super::drift::DriftBand;

/// Utility connection characteristics.
///
/// Voltage and frequency are drawn around their nominal values each tick
/// rather than walking from the previous reading: the utility holds them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridParams {
    /// Nominal line voltage (V).
    pub nominal_voltage: f64,
    /// Measured voltage band (V).
    pub voltage: DriftBand,
    /// Nominal frequency (Hz).
    pub nominal_frequency: f64,
    /// Measured frequency band (Hz).
    pub frequency: DriftBand,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            nominal_voltage: 230.0,
            voltage: DriftBand::new(228.0, 232.0, 0.2),
            nominal_frequency: 50.0,
            frequency: DriftBand::new(49.9, 50.1, 0.02),
        }
    }
}

impl GridParams {
    /// Builds the grid reading for this tick.
    ///
    /// # Arguments
    ///
    /// * `rng` - Random source
    /// * `previous` - Reading from the previous tick (for the day counters)
    /// * `status` - Connection status reported by the control layer
    /// * `power_w` - Settled grid power (W; positive = import)
    /// * `energy_scale` - Power-to-energy factor applied per tick
    pub fn next_reading<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        previous: &GridReading,
        status: GridStatus,
        power_w: f64,
        energy_scale: f64,
    ) -> GridReading {
        let voltage = self.voltage.next(rng, self.nominal_voltage);
        let frequency = self.frequency.next(rng, self.nominal_frequency);

        let (imported, exported) = if power_w > 0.0 {
            (power_w * energy_scale, 0.0)
        } else if power_w < 0.0 {
            (0.0, -power_w * energy_scale)
        } else {
            (0.0, 0.0)
        };

        GridReading {
            status,
            voltage,
            current: power_w.abs() / self.nominal_voltage,
            power: power_w,
            import_today: previous.import_today + imported,
            export_today: previous.export_today + exported,
            frequency,
        }
    }
}

/// Utility connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GridStatus {
    Connected,
    Islanded,
    Fault,
}

impl GridStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "CONNECTED",
            Self::Islanded => "ISLANDED",
            Self::Fault => "FAULT",
        }
    }
}

/// Grid tie measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridReading {
    pub status: GridStatus,
    /// Line voltage (V).
    pub voltage: f64,
    /// Line current magnitude (A).
    pub current: f64,
    /// Power (W; positive = import, negative = export).
    pub power: f64,
    /// Energy imported since the start of the simulated day.
    pub import_today: f64,
    /// Energy exported since the start of the simulated day.
    pub export_today: f64,
    /// Line frequency (Hz).
    pub frequency: f64,
}
