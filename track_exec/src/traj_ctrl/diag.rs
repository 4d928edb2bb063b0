//! # Acceleration diagnostics
//!
//! While enabled, trajectory control records the vehicle's acceleration once per cycle so that
//! the speed response can be analysed offline.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single acceleration sample.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AccelRecord {
    /// Time since logging started, advanced by one cycle period per record.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Acceleration over the last cycle.
    ///
    /// Units: meters/second^2
    pub accel_ms2: f64,
}

/// Ordered log of acceleration records.
///
/// The log is optionally bounded: once `capacity` records are held the oldest is dropped for each
/// new one.
#[derive(Debug, Clone, Serialize)]
pub struct AccelLog {
    records: VecDeque<AccelRecord>,

    #[serde(skip)]
    capacity: Option<usize>,

    #[serde(skip)]
    period_s: f64,

    #[serde(skip)]
    time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AccelLog {
    /// Create an empty log for a given cycle rate.
    pub fn new(cycle_rate_hz: f64, capacity: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
            period_s: 1.0 / cycle_rate_hz,
            time_s: 0.0,
        }
    }

    /// Advance time by one cycle and append the acceleration.
    pub fn push(&mut self, accel_ms2: f64) -> AccelRecord {
        self.time_s += self.period_s;

        let record = AccelRecord {
            time_s: self.time_s,
            accel_ms2,
        };

        match self.capacity {
            Some(0) => (),
            Some(cap) => {
                while self.records.len() >= cap {
                    self.records.pop_front();
                }
                self.records.push_back(record);
            }
            None => self.records.push_back(record),
        }

        record
    }

    /// Remove all records and restart time from zero.
    pub fn clear(&mut self) {
        self.records.clear();
        self.time_s = 0.0;
    }

    pub fn records(&self) -> impl Iterator<Item = &AccelRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split the log into parallel acceleration and time series.
    pub fn to_series(&self) -> (Vec<f64>, Vec<f64>) {
        self.records.iter().map(|r| (r.accel_ms2, r.time_s)).unzip()
    }
}
