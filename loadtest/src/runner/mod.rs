//! Multi-user load runner
//!
//! Spawns one task per virtual user. Each user runs room scenarios back to
//! back until its iteration count is reached or the run duration elapses.
//! A failed scenario is logged and counted; the user then carries on with
//! the next one.

mod report;

pub use report::RunReport;

use futures_util::future::join_all;
use metrics::counter;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::rooms::Action;
use crate::scenario::{RandomDecider, RoomScenario};

const SCENARIOS_COUNTER: &str = "rooms_loadtest_scenarios_total";

/// When a virtual user stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunBound {
    /// Keep starting scenarios until this much time has passed
    Duration(Duration),
    /// Run exactly this many scenarios per user
    Iterations(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    pub users: usize,
    pub bound: RunBound,
}

/// Per-user totals, merged into the `RunReport`
#[derive(Debug, Default)]
struct UserTally {
    runs: u64,
    failures: BTreeMap<Action, u64>,
    participants: BTreeMap<u32, u64>,
}

impl UserTally {
    fn finished(&self, bound: RunBound, deadline: Instant) -> bool {
        match bound {
            RunBound::Iterations(n) => self.runs >= n,
            RunBound::Duration(_) => Instant::now() >= deadline,
        }
    }
}

/// Runs a `RoomScenario` across many concurrent virtual users
pub struct LoadRunner {
    scenario: Arc<RoomScenario>,
    config: RunnerConfig,
}

impl LoadRunner {
    pub fn new(scenario: Arc<RoomScenario>, config: RunnerConfig) -> Self {
        Self { scenario, config }
    }

    pub async fn run(&self) -> RunReport {
        let start = Instant::now();
        let deadline = match self.config.bound {
            RunBound::Duration(duration) => start + duration,
            RunBound::Iterations(_) => start,
        };

        info!(
            "Starting load run: {} users, {:?}",
            self.config.users, self.config.bound
        );

        let handles: Vec<_> = (0..self.config.users)
            .map(|_| {
                let scenario = self.scenario.clone();
                let bound = self.config.bound;
                tokio::spawn(virtual_user(scenario, bound, deadline))
            })
            .collect();

        let mut report = RunReport::new(self.config.users);
        for result in join_all(handles).await {
            match result {
                Ok(tally) => report.merge(tally.runs, &tally.failures, &tally.participants),
                Err(e) => {
                    warn!("Virtual user task failed, its runs are lost: {}", e);
                    report.lose_user();
                }
            }
        }
        report.finish(start.elapsed());

        info!(
            "Load run finished: {} scenarios, {} failed, {} users lost in {:.1}s",
            report.scenarios_run,
            report.scenarios_failed,
            report.users_lost,
            report.duration_secs
        );
        report
    }
}

async fn virtual_user(scenario: Arc<RoomScenario>, bound: RunBound, deadline: Instant) -> UserTally {
    let span = info_span!("user", id = %Uuid::new_v4());

    async move {
        let mut tally = UserTally::default();

        while !tally.finished(bound, deadline) {
            tally.runs += 1;
            let mut decider = RandomDecider::new();

            match scenario.run(&mut decider).await {
                Ok(outcome) => {
                    counter!(SCENARIOS_COUNTER, "outcome" => "success").increment(1);
                    *tally.participants.entry(outcome.participants).or_insert(0) += 1;
                    debug!(
                        room = %outcome.room_token,
                        participants = outcome.participants,
                        refreshes = outcome.refreshes,
                        leaves = outcome.leaves,
                        deleted = outcome.room_deleted,
                        "Scenario completed"
                    );
                }
                Err(e) => {
                    counter!(SCENARIOS_COUNTER, "outcome" => "failure").increment(1);
                    *tally.failures.entry(e.action()).or_insert(0) += 1;
                    warn!("Scenario failed: {}", e);
                }
            }
        }

        tally
    }
    .instrument(span)
    .await
}
