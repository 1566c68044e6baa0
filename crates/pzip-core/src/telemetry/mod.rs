//! In-process metrics and profiling hooks.
//!
//! Metric calls are always cheap to make. Values are only retained when the
//! `telemetry` feature is enabled; profiling events only reach `tracing`
//! when `profiling` is enabled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod profile;
pub mod tags;
pub mod worker;

pub use worker::{DefaultWorkerTelemetry, WorkerTelemetry};

/// Summary of the samples recorded for one histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub total: u64,
    pub min: u64,
    pub max: u64,
}

impl HistogramSnapshot {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

/// Point-in-time copy of every counter and histogram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: BTreeMap<String, u64>,
    pub histograms: BTreeMap<String, HistogramSnapshot>,
}

impl TelemetrySnapshot {
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.counters.get(name).copied()
    }

    pub fn histogram(&self, name: &str) -> Option<HistogramSnapshot> {
        self.histograms.get(name).copied()
    }
}

/// Adds `value` to the named counter.
///
/// Labels are accepted for call-site readability; the registry keys on name only.
#[inline]
pub fn increment_counter(name: &'static str, value: u64, _labels: &[(&str, &str)]) {
    #[cfg(feature = "telemetry")]
    registry::increment_counter(name, value);

    let _ = (name, value);
}

/// Records one histogram sample.
#[inline]
pub fn record_histogram(name: &'static str, value: u64, _labels: &[(&str, &str)]) {
    #[cfg(feature = "telemetry")]
    registry::record_histogram(name, value);

    let _ = (name, value);
}

/// Copies the registry. Always empty without the `telemetry` feature.
pub fn snapshot() -> TelemetrySnapshot {
    #[cfg(feature = "telemetry")]
    {
        return registry::snapshot();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        TelemetrySnapshot::default()
    }
}

/// Clears all recorded metrics.
pub fn reset() {
    #[cfg(feature = "telemetry")]
    registry::reset();
}

#[cfg(feature = "telemetry")]
mod registry {
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    use super::{HistogramSnapshot, TelemetrySnapshot};

    #[derive(Default)]
    struct Registry {
        counters: BTreeMap<&'static str, u64>,
        histograms: BTreeMap<&'static str, HistogramSnapshot>,
    }

    fn registry() -> MutexGuard<'static, Registry> {
        static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
        let mutex = REGISTRY.get_or_init(|| Mutex::new(Registry::default()));
        // Metrics stay usable even if a recording thread panicked.
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(super) fn increment_counter(name: &'static str, value: u64) {
        let mut registry = registry();
        let entry = registry.counters.entry(name).or_insert(0);
        *entry = entry.saturating_add(value);
    }

    pub(super) fn record_histogram(name: &'static str, value: u64) {
        let mut registry = registry();
        let entry = registry.histograms.entry(name).or_default();
        if entry.count == 0 {
            entry.min = value;
            entry.max = value;
        } else {
            entry.min = entry.min.min(value);
            entry.max = entry.max.max(value);
        }
        entry.count = entry.count.saturating_add(1);
        entry.total = entry.total.saturating_add(value);
    }

    pub(super) fn snapshot() -> TelemetrySnapshot {
        let registry = registry();
        TelemetrySnapshot {
            counters: registry
                .counters
                .iter()
                .map(|(name, value)| ((*name).to_owned(), *value))
                .collect(),
            histograms: registry
                .histograms
                .iter()
                .map(|(name, value)| ((*name).to_owned(), *value))
                .collect(),
        }
    }

    pub(super) fn reset() {
        let mut registry = registry();
        registry.counters.clear();
        registry.histograms.clear();
    }
}
