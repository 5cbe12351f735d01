//! Battery-first dispatch of the generation/load imbalance.

use crate::devices::BatteryParams;

/// Result of dispatching one tick's imbalance.
///
/// # Power Flow Convention
/// - `battery_power_w`: positive = charging, negative = discharging
/// - `grid_power_w`: positive = import, negative = export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBalance {
    /// Generation minus load before dispatch (W).
    pub net_w: f64,
    pub battery_power_w: f64,
    pub grid_power_w: f64,
}

/// Routes surplus or deficit to the battery first and the residual to the grid.
///
/// The battery charges only below `charge_ceiling_pct` and discharges only
/// above `discharge_floor_pct`, never faster than `max_rate_w` either way.
/// Whatever the battery does not take is imported or exported, so
/// `generation + grid - load - battery == 0`.
///
/// # Arguments
///
/// * `generation_w` - Total renewable generation (W, >= 0)
/// * `load_w` - Total site load (W, >= 0)
/// * `soc_pct` - Battery state of charge before this tick (%)
/// * `params` - Battery limits
///
/// # Panics
///
/// Panics if `generation_w` or `load_w` is negative or not finite, or if
/// `soc_pct` is outside `[0, 100]`.
///
/// # Examples
///
/// ```
/// use microgrid_sim::devices::BatteryParams;
/// use microgrid_sim::sim::balance::balance_energy;
///
/// let b = balance_energy(100.0, 800.0, 50.0, &BatteryParams::default());
/// assert_eq!(b.battery_power_w, -500.0);
/// assert_eq!(b.grid_power_w, 200.0);
/// ```
pub fn balance_energy(
    generation_w: f64,
    load_w: f64,
    soc_pct: f64,
    params: &BatteryParams,
) -> EnergyBalance {
    assert!(
        generation_w.is_finite() && generation_w >= 0.0,
        "generation must be finite and >= 0, got {generation_w}"
    );
    assert!(
        load_w.is_finite() && load_w >= 0.0,
        "load must be finite and >= 0, got {load_w}"
    );
    assert!(
        (0.0..=100.0).contains(&soc_pct),
        "soc must be within [0, 100], got {soc_pct}"
    );

    let net_w = generation_w - load_w;
    let battery_power_w = if net_w > 0.0 && soc_pct < params.charge_ceiling_pct {
        net_w.min(params.max_rate_w)
    } else if net_w < 0.0 && soc_pct > params.discharge_floor_pct {
        net_w.max(-params.max_rate_w)
    } else {
        0.0
    };
    let residual_w = net_w - battery_power_w;

    EnergyBalance {
        net_w,
        battery_power_w,
        grid_power_w: -residual_w,
    }
}

/// Integrates battery power into state of charge, clamped to `[0, 100]`.
pub fn integrate_soc(soc_pct: f64, battery_power_w: f64, params: &BatteryParams) -> f64 {
    (soc_pct + battery_power_w * params.soc_per_watt).clamp(0.0, 100.0)
}
