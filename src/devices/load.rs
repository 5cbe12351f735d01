use rand::Rng;
use serde::{Deserialize, Serialize};

use super::drift::DriftBand;

/// Site load model made of four independently drifting categories.
///
/// The total is never drifted on its own; it is recomputed from the
/// breakdown every tick so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadParams {
    /// Servers, PLCs and other always-on equipment (W).
    pub critical: DriftBand,
    /// Cooling; the wide band models compressor cycling (W).
    pub hvac: DriftBand,
    /// Lighting (W).
    pub lighting: DriftBand,
    /// Everything else (W).
    pub aux: DriftBand,
}

impl Default for LoadParams {
    fn default() -> Self {
        Self {
            critical: DriftBand::new(280.0, 320.0, 2.0),
            hvac: DriftBand::new(0.0, 1500.0, 10.0),
            lighting: DriftBand::new(50.0, 150.0, 1.0),
            aux: DriftBand::new(20.0, 200.0, 5.0),
        }
    }
}

impl LoadParams {
    /// Draws the next load reading from the previous breakdown.
    pub fn next_reading<R: Rng + ?Sized>(&self, rng: &mut R, previous: &LoadReading) -> LoadReading {
        let prev = &previous.breakdown;
        LoadReading::from_breakdown(LoadBreakdown {
            critical: self.critical.next(rng, prev.critical),
            hvac: self.hvac.next(rng, prev.hvac),
            lighting: self.lighting.next(rng, prev.lighting),
            aux: self.aux.next(rng, prev.aux),
        })
    }
}

/// Per-category load (W).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadBreakdown {
    pub critical: f64,
    pub hvac: f64,
    pub lighting: f64,
    pub aux: f64,
}

impl LoadBreakdown {
    /// Sum of all categories, in declaration order.
    pub fn sum(&self) -> f64 {
        self.critical + self.hvac + self.lighting + self.aux
    }
}

/// Site load measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadReading {
    /// Always equal to `breakdown.sum()`.
    pub total_power: f64,
    pub breakdown: LoadBreakdown,
}

impl LoadReading {
    pub fn from_breakdown(breakdown: LoadBreakdown) -> Self {
        Self {
            total_power: breakdown.sum(),
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn start() -> LoadReading {
        LoadReading::from_breakdown(LoadBreakdown {
            critical: 300.0,
            hvac: 300.0,
            lighting: 100.0,
            aux: 100.0,
        })
    }

    #[test]
    fn total_is_exact_sum_every_tick() {
        let params = LoadParams::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut reading = start();
        for _ in 0..2_000 {
            reading = params.next_reading(&mut rng, &reading);
            let b = reading.breakdown;
            assert_eq!(reading.total_power, b.critical + b.hvac + b.lighting + b.aux);
        }
    }

    #[test]
    fn categories_respect_their_bands() {
        let params = LoadParams::default();
        let mut rng = StdRng::seed_from_u64(8);
        let mut reading = start();
        for _ in 0..5_000 {
            reading = params.next_reading(&mut rng, &reading);
            let b = reading.breakdown;
            assert!((280.0..=320.0).contains(&b.critical));
            assert!((0.0..=1500.0).contains(&b.hvac));
            assert!((50.0..=150.0).contains(&b.lighting));
            assert!((20.0..=200.0).contains(&b.aux));
        }
    }

    #[test]
    fn deterministic_with_same_seed() {
        let params = LoadParams::default();
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(1);
        let (mut ra, mut rb) = (start(), start());
        for _ in 0..50 {
            ra = params.next_reading(&mut a, &ra);
            rb = params.next_reading(&mut b, &rb);
        }
        assert_eq!(ra, rb);
    }
}
