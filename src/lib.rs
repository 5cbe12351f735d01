//! Hybrid microgrid plant telemetry simulator.

/// Operator roles and capability checks.
pub mod access;
pub mod alerts;
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod control;
pub mod devices;
pub mod io;
/// Plant tick, engine, history and run summary.
pub mod sim;
pub mod strategy;
pub mod weather;
