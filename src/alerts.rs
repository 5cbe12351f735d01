//! Threshold alerts raised from telemetry, and the operator notification log.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::devices::GridStatus;
use crate::sim::snapshot::TelemetrySnapshot;

/// Battery SOC below which a critical alert is raised (%).
pub const LOW_SOC_PCT: f64 = 20.0;
/// AC output voltage above which a warning is raised (V).
pub const HIGH_AC_VOLTAGE: f64 = 250.0;
/// Notifications kept in the log.
pub const LOG_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Critical,
}

/// Alert condition detected on a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    BatteryLow,
    AcVoltageHigh,
    EmergencyShutdown,
    GridIsland,
}

impl Alert {
    pub fn severity(&self) -> Severity {
        match self {
            Self::BatteryLow | Self::EmergencyShutdown => Severity::Critical,
            Self::AcVoltageHigh | Self::GridIsland => Severity::Warning,
        }
    }

    fn text(&self) -> &'static str {
        match self {
            Self::BatteryLow => "Battery Low (<20%)",
            Self::AcVoltageHigh => "AC Voltage High",
            Self::EmergencyShutdown => "EMERGENCY SHUTDOWN ACTIVE",
            Self::GridIsland => "Grid Island Mode",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity() {
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{level}: {}", self.text())
    }
}

/// Returns every alert condition present in `snapshot`, in a fixed order.
pub fn evaluate(snapshot: &TelemetrySnapshot) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if snapshot.battery.state_of_charge < LOW_SOC_PCT {
        alerts.push(Alert::BatteryLow);
    }
    if snapshot.ac_output.voltage > HIGH_AC_VOLTAGE {
        alerts.push(Alert::AcVoltageHigh);
    }
    if snapshot.system_flags.fault_detected {
        alerts.push(Alert::EmergencyShutdown);
    }
    if snapshot.grid.status != GridStatus::Connected {
        alerts.push(Alert::GridIsland);
    }
    alerts
}

/// Most recent distinct notifications, newest first.
///
/// A message already in the log is not repeated; it keeps its position.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    messages: VecDeque<String>,
}

impl NotificationLog {
    /// Records `message`. Returns `true` if it was new.
    pub fn push(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.messages.contains(&message) {
            return false;
        }
        self.messages.push_front(message);
        self.messages.truncate(LOG_CAPACITY);
        true
    }

    /// Records each alert, logging the new ones.
    pub fn record(&mut self, alerts: &[Alert]) {
        for alert in alerts {
            let message = alert.to_string();
            if self.push(message.as_str()) {
                match alert.severity() {
                    Severity::Critical => tracing::error!(%message, "alert raised"),
                    Severity::Warning => tracing::warn!(%message, "alert raised"),
                }
            }
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
