use rand::Rng;
use serde::{Deserialize, Serialize};

use super::drift::DriftBand;

/// AC side of the inverter feeding the site loads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcParams {
    /// Output voltage band while the inverter runs (V).
    pub voltage: DriftBand,
    /// Output frequency band (Hz).
    pub frequency: DriftBand,
    /// Voltage used to derive load current (V).
    pub line_voltage: f64,
    /// Reported power factor.
    pub power_factor: f64,
}

impl Default for AcParams {
    fn default() -> Self {
        Self {
            voltage: DriftBand::new(225.0, 235.0, 0.5),
            frequency: DriftBand::new(49.8, 50.2, 0.05),
            line_voltage: 230.0,
            power_factor: 0.96,
        }
    }
}

impl AcParams {
    /// Builds the AC output reading for this tick.
    ///
    /// An inverter that is off reports 0 V; a load breaker that is open
    /// reports no current or power, whatever the DC side produces.
    pub fn next_reading<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        previous: &AcReading,
        load_w: f64,
        inverter_on: bool,
        load_on: bool,
    ) -> AcReading {
        let voltage = if inverter_on {
            self.voltage.next(rng, previous.voltage)
        } else {
            0.0
        };
        let (current, power) = if load_on {
            (load_w / self.line_voltage, load_w)
        } else {
            (0.0, 0.0)
        };
        AcReading {
            voltage,
            current,
            power,
            frequency: self.frequency.next(rng, previous.frequency),
            power_factor: self.power_factor,
        }
    }
}

/// Inverter AC output measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcReading {
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    pub frequency: f64,
    pub power_factor: f64,
}
