//! Operator roles and the single capability check used by every surface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operator role. How a caller came to hold a role is outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    User,
}

/// Something a role may or may not be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Breakers, source priority, actuators and the wind brake.
    OperateControls,
    EmergencyShutdown,
    GridTie,
}

/// Returns whether `role` holds `capability`.
///
/// # Examples
///
/// ```
/// use microgrid_sim::access::{Capability, Role, permits};
///
/// assert!(permits(Role::Manager, Capability::GridTie));
/// assert!(!permits(Role::User, Capability::EmergencyShutdown));
/// ```
pub fn permits(role: Role, capability: Capability) -> bool {
    match role {
        Role::Admin | Role::Manager => true,
        Role::User => capability == Capability::OperateControls,
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "USER" => Ok(Self::User),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OperateControls => "operate_controls",
            Self::EmergencyShutdown => "emergency_shutdown",
            Self::GridTie => "grid_tie",
        };
        f.write_str(name)
    }
}
