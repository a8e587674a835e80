//! Run summary

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::rooms::Action;

/// Aggregated results of a load run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub users: usize,
    pub scenarios_run: u64,
    pub scenarios_failed: u64,
    /// Virtual users whose task panicked; their runs are missing from the totals
    pub users_lost: usize,
    /// Failed scenarios keyed by the counter name of the failing action
    pub failures_by_action: BTreeMap<String, u64>,
    /// Successful scenarios keyed by participant count
    pub participants: BTreeMap<u32, u64>,
    /// Action counters, filled in by the caller from its counter sink
    pub counters: BTreeMap<String, u64>,
    pub duration_secs: f64,
    pub finished_at: String,
}

impl RunReport {
    pub fn new(users: usize) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    pub(crate) fn merge(
        &mut self,
        runs: u64,
        failures: &BTreeMap<Action, u64>,
        participants: &BTreeMap<u32, u64>,
    ) {
        self.scenarios_run += runs;
        for (action, count) in failures {
            self.scenarios_failed += count;
            *self
                .failures_by_action
                .entry(action.counter_name().to_string())
                .or_insert(0) += count;
        }
        for (n, count) in participants {
            *self.participants.entry(*n).or_insert(0) += count;
        }
    }

    pub(crate) fn lose_user(&mut self) {
        self.users_lost += 1;
    }

    pub(crate) fn finish(&mut self, elapsed: Duration) {
        self.duration_secs = elapsed.as_secs_f64();
        self.finished_at = chrono::Utc::now().to_rfc3339();
    }

    pub fn with_counters(mut self, counters: BTreeMap<String, u64>) -> Self {
        self.counters = counters;
        self
    }

    pub fn scenarios_succeeded(&self) -> u64 {
        self.scenarios_run - self.scenarios_failed
    }

    /// Failed fraction of scenario runs (0.0 when nothing ran)
    pub fn failure_rate(&self) -> f64 {
        if self.scenarios_run > 0 {
            self.scenarios_failed as f64 / self.scenarios_run as f64
        } else {
            0.0
        }
    }

    /// Completed scenarios per second
    pub fn throughput(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.scenarios_run as f64 / self.duration_secs
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn print_summary(&self) {
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!(
            " ROOMS LOAD RUN: {} users, {:.1}s",
            self.users, self.duration_secs
        );
        println!("═══════════════════════════════════════════════════════════════");
        println!(
            "   Scenarios:   {} run, {} ok, {} failed ({:.2}%)",
            self.scenarios_run,
            self.scenarios_succeeded(),
            self.scenarios_failed,
            self.failure_rate() * 100.0
        );
        println!("   Throughput:  {:.1} scenarios/s", self.throughput());
        if self.users_lost > 0 {
            println!(
                "   Lost users:  {} of {} (runs not counted)",
                self.users_lost, self.users
            );
        }

        if !self.failures_by_action.is_empty() {
            println!();
            println!(" ─── Failures ──────────────────────────────────────────────────");
            for (action, count) in &self.failures_by_action {
                println!("   {:<24} {}", action, count);
            }
        }

        if !self.counters.is_empty() {
            println!();
            println!(" ─── Counters ──────────────────────────────────────────────────");
            for (name, count) in &self.counters {
                println!("   {:<24} {}", name, count);
            }
        }
        println!("═══════════════════════════════════════════════════════════════");
    }
}
