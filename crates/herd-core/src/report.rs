//! ---
//! herd_section: "01-core-functionality"
//! herd_subsection: "reporting"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Cycle, worker and run summaries produced by the driver."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use herd_common::ScheduleMode;
use serde::Serialize;

/// Outcome of one sequential cycle over the whole herd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub cycle: u64,
    pub attempted: usize,
    pub delivered: usize,
}

impl CycleSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.delivered
    }
}

/// How a concurrent worker ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerOutcome {
    Completed,
    Panicked,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub device_id: String,
    pub ticks: u64,
    pub delivered: u64,
    pub failed: u64,
    pub outcome: WorkerOutcome,
}

/// Aggregate result returned by [`crate::SimulationDriver::run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: ScheduleMode,
    /// Completed sequential cycles; zero in concurrent mode.
    pub cycles: u64,
    pub attempted: u64,
    pub delivered: u64,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workers: Vec<WorkerReport>,
}

impl RunSummary {
    pub fn failed(&self) -> u64 {
        self.attempted - self.delivered
    }

    /// Workers that did not reach [`WorkerOutcome::Completed`].
    pub fn unfinished_workers(&self) -> usize {
        self.workers
            .iter()
            .filter(|worker| worker.outcome != WorkerOutcome::Completed)
            .count()
    }
}

fn as_secs_f64<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

/// Counters a worker updates after every tick.
///
/// The driver holds the other reference, so a panicked or abandoned worker
/// still reports how far it got.
#[derive(Debug, Default)]
pub(crate) struct WorkerCounters {
    ticks: AtomicU64,
    delivered: AtomicU64,
}

impl WorkerCounters {
    pub(crate) fn record(&self, delivered: bool) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if delivered {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn report(&self, device_id: String, outcome: WorkerOutcome) -> WorkerReport {
        let ticks = self.ticks.load(Ordering::Relaxed);
        let delivered = self.delivered.load(Ordering::Relaxed);
        WorkerReport {
            device_id,
            ticks,
            delivered,
            failed: ticks - delivered,
            outcome,
        }
    }
}
