//! Lock-free counters for the serving path.
//!
//! Counters only ever increase; readers take a [`ServingMetricsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters maintained by the prediction service.
#[derive(Debug, Default)]
pub struct ServingMetrics {
    pub predictions_same_day: Counter,
    pub predictions_future: Counter,
    pub predictions_legacy: Counter,
    pub validation_failures: Counter,
    pub unavailable: Counter,
    /// Requests whose neighbourhood was absent from the bundle vocabulary
    /// and was encoded as the reserved unknown code.
    pub unknown_neighbourhoods: Counter,
}

impl ServingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ServingMetricsSnapshot {
        ServingMetricsSnapshot {
            predictions_same_day: self.predictions_same_day.get(),
            predictions_future: self.predictions_future.get(),
            predictions_legacy: self.predictions_legacy.get(),
            validation_failures: self.validation_failures.get(),
            unavailable: self.unavailable.get(),
            unknown_neighbourhoods: self.unknown_neighbourhoods.get(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServingMetricsSnapshot {
    pub predictions_same_day: u64,
    pub predictions_future: u64,
    pub predictions_legacy: u64,
    pub validation_failures: u64,
    pub unavailable: u64,
    pub unknown_neighbourhoods: u64,
}

impl ServingMetricsSnapshot {
    pub fn predictions_total(&self) -> u64 {
        self.predictions_same_day + self.predictions_future + self.predictions_legacy
    }
}
