//! Named counter sinks
//!
//! The scenario only ever increments counters by name; where they end up is
//! decided by the caller:
//! - `PrometheusCounters` forwards to the global `metrics` recorder
//! - `RecordingCounters` keeps totals in memory for run summaries and tests
//! - `TeeCounters` feeds two sinks at once

use dashmap::DashMap;
use metrics::counter;
use std::collections::BTreeMap;
use std::sync::Arc;

const ACTIONS_COUNTER: &str = "rooms_loadtest_actions_total";

/// Write-only, fire-and-forget counter interface
pub trait CounterSink: Send + Sync {
    fn increment(&self, name: &str);
}

impl<T: CounterSink + ?Sized> CounterSink for Arc<T> {
    fn increment(&self, name: &str) {
        (**self).increment(name);
    }
}

/// Forwards increments to `rooms_loadtest_actions_total{action="<name>"}`
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusCounters;

impl CounterSink for PrometheusCounters {
    fn increment(&self, name: &str) {
        counter!(ACTIONS_COUNTER, "action" => name.to_string()).increment(1);
    }
}

/// In-memory counter totals, safe to share across virtual users
#[derive(Debug, Default)]
pub struct RecordingCounters {
    counts: DashMap<String, u64>,
}

impl RecordingCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter (0 if never incremented)
    pub fn get(&self, name: &str) -> u64 {
        self.counts.get(name).map(|count| *count).unwrap_or(0)
    }

    /// Sum of all counters
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sorted copy of every counter
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

impl CounterSink for RecordingCounters {
    fn increment(&self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }
}

/// Sends every increment to both sinks
#[derive(Debug, Default, Clone)]
pub struct TeeCounters<A, B>(pub A, pub B);

impl<A: CounterSink, B: CounterSink> CounterSink for TeeCounters<A, B> {
    fn increment(&self, name: &str) {
        self.0.increment(name);
        self.1.increment(name);
    }
}
