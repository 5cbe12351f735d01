//! Bounded random walk shared by every simulated measurement.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Advances a bounded stochastic quantity by one step.
///
/// Draws a symmetric perturbation in `[-volatility / 2, +volatility / 2)`,
/// adds it to `current` and clamps the result to `[min, max]`.
///
/// # Arguments
///
/// * `rng` - Random source (seed it for reproducible sequences)
/// * `current` - Value from the previous step
/// * `min` - Inclusive lower bound
/// * `max` - Inclusive upper bound
/// * `volatility` - Width of the perturbation window (>= 0)
///
/// # Panics
///
/// Panics if `min > max`, `volatility` is negative, or any input is not finite.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::drift::drift;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let next = drift(&mut rng, 12.0, 0.0, 24.0, 0.5);
/// assert!((11.75..=12.25).contains(&next));
/// ```
pub fn drift<R: Rng + ?Sized>(
    rng: &mut R,
    current: f64,
    min: f64,
    max: f64,
    volatility: f64,
) -> f64 {
    assert!(
        min.is_finite() && max.is_finite() && min <= max,
        "drift bounds must be finite with min <= max, got [{min}, {max}]"
    );
    assert!(
        volatility.is_finite() && volatility >= 0.0,
        "drift volatility must be finite and >= 0, got {volatility}"
    );
    assert!(current.is_finite(), "drift input must be finite, got {current}");

    let change = (rng.random::<f64>() - 0.5) * volatility;
    (current + change).clamp(min, max)
}

/// Bounds and volatility of one drifting quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriftBand {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Perturbation window width per step.
    pub volatility: f64,
}

impl DriftBand {
    pub const fn new(min: f64, max: f64, volatility: f64) -> Self {
        Self {
            min,
            max,
            volatility,
        }
    }

    /// Draws the next value of this band starting from `current`.
    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R, current: f64) -> f64 {
        drift(rng, current, self.min, self.max, self.volatility)
    }

    /// Same band with the upper bound scaled by `factor`, never below `min`.
    pub fn with_ceiling_scaled(&self, factor: f64) -> Self {
        Self {
            max: (self.max * factor).max(self.min),
            ..*self
        }
    }

    /// Returns `true` when the band is well-formed.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && self.volatility.is_finite()
            && self.volatility >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn stays_within_bounds_over_long_walk() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut v = 50.0;
        for _ in 0..10_000 {
            v = drift(&mut rng, v, 45.0, 55.0, 4.0);
            assert!((45.0..=55.0).contains(&v), "left bounds: {v}");
        }
    }

    #[test]
    fn step_never_exceeds_half_volatility() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut v = 100.0;
        for _ in 0..1_000 {
            let next = drift(&mut rng, v, 0.0, 200.0, 2.0);
            assert!((next - v).abs() <= 1.0 + 1e-12);
            v = next;
        }
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(drift(&mut rng, 500.0, 0.0, 24.0, 0.5), 24.0);
        assert_eq!(drift(&mut rng, -500.0, 0.0, 24.0, 0.5), 0.0);
    }

    #[test]
    fn zero_volatility_is_identity_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(drift(&mut rng, 7.5, 0.0, 24.0, 0.0), 7.5);
    }

    #[test]
    fn degenerate_band_pins_value() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..10 {
            assert_eq!(drift(&mut rng, 3.0, 5.0, 5.0, 1.0), 5.0);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = StdRng::seed_from_u64(77);
        let mut b = StdRng::seed_from_u64(77);
        let (mut va, mut vb) = (10.0, 10.0);
        for _ in 0..100 {
            va = drift(&mut a, va, 0.0, 20.0, 1.0);
            vb = drift(&mut b, vb, 0.0, 20.0, 1.0);
            assert_eq!(va, vb);
        }
    }

    #[test]
    #[should_panic]
    fn inverted_bounds_panic() {
        let mut rng = StdRng::seed_from_u64(0);
        drift(&mut rng, 1.0, 10.0, 0.0, 1.0);
    }

    #[test]
    #[should_panic]
    fn negative_volatility_panics() {
        let mut rng = StdRng::seed_from_u64(0);
        drift(&mut rng, 1.0, 0.0, 10.0, -1.0);
    }

    #[test]
    fn scaled_ceiling_never_drops_below_floor() {
        let band = DriftBand::new(5.0, 24.0, 0.5);
        assert_eq!(band.with_ceiling_scaled(0.5).max, 12.0);
        assert_eq!(band.with_ceiling_scaled(0.0).max, 5.0);
        assert!(band.with_ceiling_scaled(0.1).is_valid());
    }
}
