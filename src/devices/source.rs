//! Renewable source models (solar array, wind turbine).

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::drift::DriftBand;

/// Electrical parameters of one renewable DC source.
///
/// Voltage performs a bounded random walk. Current only flows while the
/// voltage is above the cut-in threshold; below it the source is treated as
/// disconnected and current is forced to zero regardless of its prior value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceParams {
    /// Terminal voltage band (V).
    pub voltage: DriftBand,
    /// Output current band while above cut-in (A).
    pub current: DriftBand,
    /// Voltage at or below which no current flows (V).
    pub cut_in_v: f64,
}

impl SourceParams {
    /// Default 24 V solar string.
    pub const fn solar() -> Self {
        Self {
            voltage: DriftBand::new(0.0, 24.0, 0.5),
            current: DriftBand::new(0.0, 15.0, 0.2),
            cut_in_v: 5.0,
        }
    }

    /// Default small wind turbine; voltage is more volatile than solar.
    pub const fn wind() -> Self {
        Self {
            voltage: DriftBand::new(0.0, 24.0, 1.5),
            current: DriftBand::new(0.0, 20.0, 0.5),
            cut_in_v: 5.0,
        }
    }

    /// Draws the next reading from the previous one.
    ///
    /// # Arguments
    ///
    /// * `rng` - Random source
    /// * `previous` - Reading from the previous tick
    /// * `conditions` - External limits for this tick (weather, brake)
    /// * `energy_scale` - Power-to-energy factor applied per tick
    pub fn next_reading<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        previous: &SourceReading,
        conditions: SourceConditions,
        energy_scale: f64,
    ) -> SourceReading {
        let band = if conditions.availability < 1.0 {
            self.voltage.with_ceiling_scaled(conditions.availability)
        } else {
            self.voltage
        };
        let voltage = band.next(rng, previous.voltage);

        let current = if voltage > self.cut_in_v && !conditions.braked {
            self.current.next(rng, previous.current)
        } else {
            0.0
        };

        let power = voltage * current;
        SourceReading {
            voltage,
            current,
            power,
            energy_today: previous.energy_today + power * energy_scale,
        }
    }
}

/// Per-tick external limits on a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceConditions {
    /// Fraction of the nominal voltage ceiling reachable this tick (0.0..=1.0).
    pub availability: f64,
    /// Mechanical brake or isolator engaged; no current flows.
    pub braked: bool,
}

impl SourceConditions {
    /// No weather limit and no brake.
    pub const UNRESTRICTED: Self = Self {
        availability: 1.0,
        braked: false,
    };

    /// Conditions with the given availability and no brake.
    ///
    /// # Panics
    ///
    /// Panics if `availability` is outside `[0.0, 1.0]`.
    pub fn available(availability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&availability),
            "availability must be within [0, 1], got {availability}"
        );
        Self {
            availability,
            braked: false,
        }
    }

    /// Returns the same conditions with the brake set to `braked`.
    pub fn with_brake(self, braked: bool) -> Self {
        Self { braked, ..self }
    }
}

/// One DC source measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceReading {
    /// Terminal voltage (V).
    pub voltage: f64,
    /// Output current (A, >= 0).
    pub current: f64,
    /// Output power, `voltage * current` (W, >= 0).
    pub power: f64,
    /// Energy produced since the start of the simulated day.
    pub energy_today: f64,
}

impl SourceReading {
    /// Reading with `power` derived from `voltage` and `current`.
    pub fn new(voltage: f64, current: f64, energy_today: f64) -> Self {
        Self {
            voltage,
            current,
            power: voltage * current,
            energy_today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    const SCALE: f64 = 1e-4;

    #[test]
    fn below_cut_in_forces_zero_current() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = SourceParams::solar();
        // 3 V with tiny volatility cannot climb past the 5 V cut-in.
        let previous = SourceReading::new(3.0, 9.0, 10.0);
        let next = params.next_reading(&mut rng, &previous, SourceConditions::UNRESTRICTED, SCALE);
        assert!(next.voltage < params.cut_in_v);
        assert_eq!(next.current, 0.0);
        assert_eq!(next.power, 0.0);
        assert_eq!(next.energy_today, 10.0);
    }

    #[test]
    fn above_cut_in_produces_power() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = SourceParams::solar();
        let previous = SourceReading::new(18.5, 4.2, 0.0);
        let next = params.next_reading(&mut rng, &previous, SourceConditions::UNRESTRICTED, SCALE);
        assert!(next.current > 0.0);
        assert_eq!(next.power, next.voltage * next.current);
        assert!((next.energy_today - next.power * SCALE).abs() < 1e-12);
    }

    #[test]
    fn brake_stops_current() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = SourceParams::wind();
        let previous = SourceReading::new(15.0, 8.0, 1.0);
        let conditions = SourceConditions::UNRESTRICTED.with_brake(true);
        let next = params.next_reading(&mut rng, &previous, conditions, SCALE);
        assert_eq!(next.current, 0.0);
        assert_eq!(next.power, 0.0);
    }

    #[test]
    fn availability_caps_voltage() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = SourceParams::solar();
        let mut reading = SourceReading::new(20.0, 5.0, 0.0);
        for _ in 0..500 {
            reading =
                params.next_reading(&mut rng, &reading, SourceConditions::available(0.25), SCALE);
            assert!(reading.voltage <= 6.0 + 1e-12);
        }
    }

    #[test]
    fn readings_stay_in_bands_and_energy_grows() {
        let mut rng = StdRng::seed_from_u64(99);
        for params in [SourceParams::solar(), SourceParams::wind()] {
            let mut reading = SourceReading::new(12.0, 2.0, 0.0);
            for _ in 0..5_000 {
                let next =
                    params.next_reading(&mut rng, &reading, SourceConditions::UNRESTRICTED, SCALE);
                assert!(next.voltage >= params.voltage.min && next.voltage <= params.voltage.max);
                assert!(next.current >= 0.0 && next.current <= params.current.max);
                assert!(next.power >= 0.0);
                assert!(next.energy_today >= reading.energy_today);
                reading = next;
            }
        }
    }

    #[test]
    #[should_panic]
    fn availability_above_one_panics() {
        SourceConditions::available(1.5);
    }
}
