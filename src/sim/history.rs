//! Rolling window of recent power readings for trend views.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::snapshot::TelemetrySnapshot;

/// Default number of points kept.
pub const DEFAULT_CAPACITY: usize = 30;

/// One point in the trend window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub tick: u64,
    pub timestamp_ms: u64,
    pub solar_w: f64,
    pub wind_w: f64,
    pub load_w: f64,
    pub soc_pct: f64,
    /// Positive = import, negative = export.
    pub grid_w: f64,
}

impl From<&TelemetrySnapshot> for HistoryPoint {
    fn from(s: &TelemetrySnapshot) -> Self {
        Self {
            tick: s.tick,
            timestamp_ms: s.timestamp_ms,
            solar_w: s.solar.power,
            wind_w: s.wind.power,
            load_w: s.loads.total_power,
            soc_pct: s.battery.state_of_charge,
            grid_w: s.grid.power,
        }
    }
}

/// Bounded FIFO of history points, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl HistoryWindow {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be > 0");
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a point, evicting the oldest once full.
    pub fn push(&mut self, point: HistoryPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.points.iter().copied().collect()
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(tick: u64) -> HistoryPoint {
        HistoryPoint {
            tick,
            timestamp_ms: tick * 1000,
            solar_w: 1.0,
            wind_w: 2.0,
            load_w: 3.0,
            soc_pct: 50.0,
            grid_w: 0.0,
        }
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut h = HistoryWindow::default();
        for t in 0..100 {
            h.push(point(t));
            assert!(h.len() <= DEFAULT_CAPACITY);
        }
        assert_eq!(h.len(), 30);
        let ticks: Vec<_> = h.iter().map(|p| p.tick).collect();
        assert_eq!(ticks.first(), Some(&70));
        assert_eq!(ticks.last(), Some(&99));
    }

    #[test]
    fn from_snapshot_copies_powers() {
        let s = TelemetrySnapshot::initial(85.0);
        let p = HistoryPoint::from(&s);
        assert_eq!(p.soc_pct, 85.0);
        assert_eq!(p.load_w, 800.0);
        assert_eq!(p.grid_w, s.grid.power);
    }
}
