/// Battery-first dispatch and SOC integration.
pub mod balance;
pub mod engine;
/// Rolling window of recent readings.
pub mod history;
pub mod kpi;
pub mod snapshot;
/// Single-tick plant advance.
pub mod tick;
