//! Per-server load bookkeeping and the bounded-load threshold.
//!
//! The tracker keeps an integer load per server plus a running total that is
//! adjusted on every mutation instead of being recomputed. The threshold
//! used for capacity-aware placement is
//!
//! ```text
//! ceil(max(1, floor(total / servers)) * 1.25)
//! ```
//!
//! Note that the division is an integer division performed *before* the
//! scaling; changing that order changes which server `get_least` picks.
//!
//! Load and total updates wrap on `i64` overflow, so the total always equals
//! the wrapping sum of the per-server loads. The capacity check saturates.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Scaling applied to the average load to get the per-server cap.
pub const LOAD_FACTOR: f64 = 1.25;

/// Loads of all live servers.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    loads: HashMap<String, i64>,
    total: i64,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `server` at zero load. Returns `false` if it was
    /// already tracked, in which case its load is left untouched.
    pub fn register(&mut self, server: &str) -> bool {
        if self.loads.contains_key(server) {
            return false;
        }
        self.loads.insert(server.to_string(), 0);
        true
    }

    /// Stop tracking `server`, returning its last load.
    ///
    /// The total drops by that load so it stays equal to the sum of the
    /// remaining entries.
    pub fn unregister(&mut self, server: &str) -> Option<i64> {
        let load = self.loads.remove(server)?;
        self.total -= load;
        Some(load)
    }

    pub fn contains(&self, server: &str) -> bool {
        self.loads.contains_key(server)
    }

    /// Set an absolute load. Unknown servers are ignored.
    pub fn update(&mut self, server: &str, load: i64) {
        if let Some(current) = self.loads.get_mut(server) {
            self.total = self.total.wrapping_add(load.wrapping_sub(*current));
            *current = load;
        }
    }

    /// Add one unit of load. Unknown servers are ignored.
    pub fn inc(&mut self, server: &str) {
        self.adjust(server, 1);
    }

    /// Remove one unit of load. Unknown servers are ignored.
    ///
    /// Not clamped at zero: an unmatched `done` drives the load negative.
    pub fn done(&mut self, server: &str) {
        self.adjust(server, -1);
    }

    fn adjust(&mut self, server: &str, delta: i64) {
        if let Some(current) = self.loads.get_mut(server) {
            *current = current.wrapping_add(delta);
            self.total = self.total.wrapping_add(delta);
        }
    }

    pub fn get(&self, server: &str) -> Option<i64> {
        self.loads.get(server).copied()
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    /// Number of tracked servers.
    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    pub fn servers(&self) -> Vec<String> {
        self.loads.keys().cloned().collect()
    }

    /// Copy of the current loads.
    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.loads.clone()
    }

    /// Current per-server cap.
    ///
    /// A zero total counts as 1 and an empty tracker counts as an average
    /// of 0, so the smallest possible cap is `ceil(1 * 1.25) = 2`.
    pub fn max_load(&self) -> i64 {
        let total = if self.total == 0 { 1 } else { self.total };
        threshold(total, self.loads.len())
    }

    /// Whether `server` can take one more unit without exceeding the cap
    /// computed as if that unit were already placed.
    ///
    /// A negative total (more `done` than `inc`) is treated as 0.
    pub fn load_ok(&self, server: &str) -> Result<bool> {
        let load = self.get(server).ok_or_else(|| {
            Error::InvariantViolated(format!("server '{server}' is on the ring but has no load record"))
        })?;
        let cap = threshold(self.total.max(0).saturating_add(1), self.loads.len());
        Ok(load.saturating_add(1) <= cap)
    }
}

/// `ceil(max(1, floor(total / servers)) * LOAD_FACTOR)`.
fn threshold(total: i64, servers: usize) -> i64 {
    let avg = match servers {
        0 => 0,
        n => total / n as i64,
    };
    let avg = if avg == 0 { 1.0 } else { avg as f64 };
    (avg * LOAD_FACTOR).ceil() as i64
}
