//! Simulated plant equipment: drifting measurements and their parameters.

/// Battery bank limits, status labelling and readings.
pub mod battery;
/// Bounded random walk used by every measurement.
pub mod drift;
/// Utility connection.
pub mod grid;
/// Inverter AC output.
pub mod inverter;
pub mod load;
pub mod source;

// Re-export the main types for convenience
pub use battery::{BatteryParams, BatteryReading, BatteryStatus};
pub use drift::{DriftBand, drift};
pub use grid::{GridParams, GridReading, GridStatus};
pub use inverter::{AcParams, AcReading};
pub use load::{LoadBreakdown, LoadParams, LoadReading};
pub use source::{SourceConditions, SourceParams, SourceReading};
