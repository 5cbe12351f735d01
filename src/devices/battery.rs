use serde::{Deserialize, Serialize};

use super::drift::DriftBand;

/// Battery bank limits and pack characteristics.
///
/// # Power Flow Convention
/// - Positive power: charging (absorbing surplus)
/// - Negative power: discharging (covering a deficit)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryParams {
    /// Maximum charge or discharge power magnitude (W).
    pub max_rate_w: f64,
    /// Charging is only permitted strictly below this SOC (%).
    pub charge_ceiling_pct: f64,
    /// Discharging is only permitted strictly above this SOC (%).
    pub discharge_floor_pct: f64,
    /// SOC change per watt per tick (% / W).
    pub soc_per_watt: f64,
    /// Power magnitude at or below which the bank reports IDLE (W).
    pub status_deadband_w: f64,
    /// How far inside the dead-band an existing CHARGING/DISCHARGING label
    /// survives before falling back to IDLE (W). Zero disables hysteresis.
    pub status_hysteresis_w: f64,
    /// Nominal DC bus voltage used to derive pack current (V).
    pub nominal_voltage: f64,
    /// Measured terminal voltage band (V).
    pub voltage: DriftBand,
    /// Pack temperature band (°C).
    pub temperature: DriftBand,
}

impl Default for BatteryParams {
    fn default() -> Self {
        Self {
            max_rate_w: 500.0,
            charge_ceiling_pct: 98.0,
            discharge_floor_pct: 10.0,
            soc_per_watt: 0.0005,
            status_deadband_w: 5.0,
            status_hysteresis_w: 0.0,
            nominal_voltage: 12.0,
            voltage: DriftBand::new(11.5, 14.4, 0.05),
            temperature: DriftBand::new(20.0, 45.0, 0.1),
        }
    }
}

impl BatteryParams {
    /// Labels a battery power flow.
    ///
    /// With zero hysteresis this is a plain dead-band: `|power_w| <=
    /// status_deadband_w` is IDLE. With hysteresis, a bank already
    /// CHARGING (DISCHARGING) keeps that label while the flow stays above
    /// `status_deadband_w - status_hysteresis_w` in the same direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use microgrid_sim::devices::battery::{BatteryParams, BatteryStatus};
    ///
    /// let params = BatteryParams::default();
    /// assert_eq!(params.classify(120.0, BatteryStatus::Idle), BatteryStatus::Charging);
    /// assert_eq!(params.classify(-4.0, BatteryStatus::Discharging), BatteryStatus::Idle);
    /// ```
    pub fn classify(&self, power_w: f64, previous: BatteryStatus) -> BatteryStatus {
        let enter = self.status_deadband_w;
        let hold = (enter - self.status_hysteresis_w).max(0.0);
        match previous {
            BatteryStatus::Charging if power_w > hold => BatteryStatus::Charging,
            BatteryStatus::Discharging if power_w < -hold => BatteryStatus::Discharging,
            _ if power_w > enter => BatteryStatus::Charging,
            _ if power_w < -enter => BatteryStatus::Discharging,
            _ => BatteryStatus::Idle,
        }
    }

    /// DC current for a given power at nominal voltage (A, signed like power).
    pub fn current_for(&self, power_w: f64) -> f64 {
        power_w / self.nominal_voltage
    }
}

/// Direction label reported for the battery bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Idle,
}

impl BatteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charging => "CHARGING",
            Self::Discharging => "DISCHARGING",
            Self::Idle => "IDLE",
        }
    }
}

/// Battery bank measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// Terminal voltage (V).
    pub voltage: f64,
    /// DC current (A; positive = charging).
    pub current: f64,
    /// Power flow (W; positive = charging).
    pub power: f64,
    /// State of charge (%, 0..=100).
    pub state_of_charge: f64,
    /// Pack temperature (°C).
    pub temperature: f64,
    /// State of health (%).
    pub health: f64,
    pub status: BatteryStatus,
}
