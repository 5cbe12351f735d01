//! Operator control state and the commands that mutate it.
//!
//! The plant reads a `ControlState` copy once per tick; commands are applied
//! between ticks by whoever owns the live copy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{Capability, Role, permits};
use crate::devices::GridStatus;

/// Which source the operator wants to favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourcePriority {
    Solar,
    Wind,
    #[default]
    Auto,
}

impl SourcePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solar => "SOLAR",
            Self::Wind => "WIND",
            Self::Auto => "AUTO",
        }
    }
}

/// Source reported as active in the telemetry flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActiveSource {
    Solar,
    Wind,
    Hybrid,
}

impl From<SourcePriority> for ActiveSource {
    fn from(priority: SourcePriority) -> Self {
        match priority {
            SourcePriority::Solar => Self::Solar,
            SourcePriority::Wind => Self::Wind,
            SourcePriority::Auto => Self::Hybrid,
        }
    }
}

/// Status flags merged into every snapshot, derived from `ControlState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFlags {
    pub active_source: ActiveSource,
    pub inverter_on: bool,
    pub load_on: bool,
    pub fault_detected: bool,
}

/// Operator intents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlState {
    /// Load breaker closed.
    pub load_on: bool,
    pub inverter_on: bool,
    pub source_priority: SourcePriority,
    pub battery_protection: bool,
    /// Array azimuth (degrees, 0..=180).
    pub solar_pan_deg: f64,
    /// Array tilt (degrees, 0..=90).
    pub solar_tilt_deg: f64,
    pub wind_brake: bool,
    pub emergency_shutdown: bool,
    pub grid_tie_enabled: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            load_on: true,
            inverter_on: true,
            source_priority: SourcePriority::Auto,
            battery_protection: true,
            solar_pan_deg: 45.0,
            solar_tilt_deg: 30.0,
            wind_brake: false,
            emergency_shutdown: false,
            grid_tie_enabled: true,
        }
    }
}

pub const PAN_RANGE: (f64, f64) = (0.0, 180.0);
pub const TILT_RANGE: (f64, f64) = (0.0, 90.0);

/// A single-field mutation of `ControlState`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum ControlCommand {
    SetLoad(bool),
    SetInverter(bool),
    SetSourcePriority(SourcePriority),
    SetBatteryProtection(bool),
    SetSolarPan(f64),
    SetSolarTilt(f64),
    SetWindBrake(bool),
    SetEmergencyShutdown(bool),
    SetGridTie(bool),
}

impl ControlCommand {
    /// Capability a role must hold to issue this command.
    pub fn required_capability(&self) -> Capability {
        match self {
            Self::SetEmergencyShutdown(_) => Capability::EmergencyShutdown,
            Self::SetGridTie(_) => Capability::GridTie,
            _ => Capability::OperateControls,
        }
    }

    /// Field name used in errors and logs.
    pub fn field(&self) -> &'static str {
        match self {
            Self::SetLoad(_) => "load_on",
            Self::SetInverter(_) => "inverter_on",
            Self::SetSourcePriority(_) => "source_priority",
            Self::SetBatteryProtection(_) => "battery_protection",
            Self::SetSolarPan(_) => "solar_pan_deg",
            Self::SetSolarTilt(_) => "solar_tilt_deg",
            Self::SetWindBrake(_) => "wind_brake",
            Self::SetEmergencyShutdown(_) => "emergency_shutdown",
            Self::SetGridTie(_) => "grid_tie_enabled",
        }
    }
}

/// Rejected control command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("role {role} lacks capability {capability}")]
    Forbidden { role: Role, capability: Capability },

    #[error("{field} is locked while emergency shutdown is active")]
    LockedOut { field: &'static str },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), ControlError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ControlError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl ControlState {
    /// Checks actuator positions.
    pub fn validate(&self) -> Result<(), ControlError> {
        check_range("solar_pan_deg", self.solar_pan_deg, PAN_RANGE)?;
        check_range("solar_tilt_deg", self.solar_tilt_deg, TILT_RANGE)
    }

    pub fn system_flags(&self) -> SystemFlags {
        SystemFlags {
            active_source: self.source_priority.into(),
            inverter_on: self.inverter_on,
            load_on: self.load_on,
            fault_detected: self.emergency_shutdown,
        }
    }

    /// Grid connection status implied by the operator state.
    pub fn grid_status(&self) -> GridStatus {
        if self.emergency_shutdown {
            GridStatus::Fault
        } else if !self.grid_tie_enabled {
            GridStatus::Islanded
        } else {
            GridStatus::Connected
        }
    }

    /// Applies a command without a role check.
    ///
    /// While emergency shutdown is active only `SetEmergencyShutdown` is
    /// accepted. On error the state is left unchanged.
    pub fn apply(&mut self, command: ControlCommand) -> Result<(), ControlError> {
        if self.emergency_shutdown && !matches!(command, ControlCommand::SetEmergencyShutdown(_)) {
            return Err(ControlError::LockedOut {
                field: command.field(),
            });
        }

        match command {
            ControlCommand::SetLoad(on) => self.load_on = on,
            ControlCommand::SetInverter(on) => self.inverter_on = on,
            ControlCommand::SetSourcePriority(p) => self.source_priority = p,
            ControlCommand::SetBatteryProtection(on) => self.battery_protection = on,
            ControlCommand::SetSolarPan(deg) => {
                check_range("solar_pan_deg", deg, PAN_RANGE)?;
                self.solar_pan_deg = deg;
            }
            ControlCommand::SetSolarTilt(deg) => {
                check_range("solar_tilt_deg", deg, TILT_RANGE)?;
                self.solar_tilt_deg = deg;
            }
            ControlCommand::SetWindBrake(on) => self.wind_brake = on,
            ControlCommand::SetEmergencyShutdown(on) => self.emergency_shutdown = on,
            ControlCommand::SetGridTie(on) => self.grid_tie_enabled = on,
        }
        Ok(())
    }

    /// Applies a command on behalf of `role`.
    pub fn apply_as(&mut self, role: Role, command: ControlCommand) -> Result<(), ControlError> {
        let capability = command.required_capability();
        if !permits(role, capability) {
            return Err(ControlError::Forbidden { role, capability });
        }
        self.apply(command)
    }
}
