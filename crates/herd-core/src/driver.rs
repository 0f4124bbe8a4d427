//! ---
//! herd_section: "01-core-functionality"
//! herd_subsection: "driver"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Schedules entity ticks and transmits their telemetry."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
//! Two scheduling models share one tick path:
//!
//! * sequential: one loop walks the herd in order, pausing `entity_stagger`
//!   between entities and padding each cycle out to `cycle_period`;
//! * concurrent: every entity runs in its own task on its own interval until
//!   the configured duration elapses or the caller raises the stop signal.
//!
//! A tick always runs to completion once started. Stop requests are only
//! observed at sleep points.
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use herd_common::{ScheduleConfig, ScheduleMode, ValueRange};
use herd_net::TelemetrySink;
use herd_rt::{sleep_or_stop, StopListener, StopSignal};
use herd_sim::{EntitySimulator, RandomSource, SeededRandom};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::report::{CycleSummary, RunSummary, WorkerCounters, WorkerOutcome, WorkerReport};

/// Owns the herd and a sink and advances the herd on a schedule.
pub struct SimulationDriver<S, R = SeededRandom> {
    schedule: ScheduleConfig,
    sink: Arc<S>,
    entities: Vec<EntitySimulator<R>>,
    interval_source: Box<dyn RandomSource>,
}

impl<S, R> SimulationDriver<S, R>
where
    S: TelemetrySink,
    R: RandomSource + 'static,
{
    pub fn new(schedule: ScheduleConfig, sink: S, entities: Vec<EntitySimulator<R>>) -> Self {
        Self::with_shared_sink(schedule, Arc::new(sink), entities)
    }

    pub fn with_shared_sink(
        schedule: ScheduleConfig,
        sink: Arc<S>,
        entities: Vec<EntitySimulator<R>>,
    ) -> Self {
        Self {
            schedule,
            sink,
            entities,
            interval_source: Box::new(SeededRandom::from_entropy()),
        }
    }

    /// Replace the source used to draw per-worker intervals in concurrent mode.
    pub fn with_interval_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.interval_source = Box::new(source);
        self
    }

    pub fn entities(&self) -> &[EntitySimulator<R>] {
        &self.entities
    }

    /// Run until the configured duration elapses or `stop` is raised.
    ///
    /// Without a configured duration the driver runs until stopped.
    pub async fn run(self, stop: StopListener) -> RunSummary {
        info!(
            mode = ?self.schedule.mode,
            entities = self.entities.len(),
            sink = %self.sink.describe(),
            duration_secs = self.schedule.duration.map(|d| d.as_secs()),
            "simulation starting"
        );
        let summary = match self.schedule.mode {
            ScheduleMode::Sequential => self.run_sequential(stop).await,
            ScheduleMode::Concurrent => self.run_concurrent(stop).await,
        };
        info!(
            mode = ?summary.mode,
            cycles = summary.cycles,
            attempted = summary.attempted,
            delivered = summary.delivered,
            failed = summary.failed(),
            unfinished_workers = summary.unfinished_workers(),
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "simulation finished"
        );
        summary
    }

    /// Advance and transmit every entity once, in order, with the entity
    /// stagger between consecutive entities.
    pub async fn run_cycle(&mut self, cycle: u64) -> CycleSummary {
        let idle = StopSignal::new();
        let mut listener = idle.subscribe();
        self.cycle(cycle, &mut listener).await
    }

    async fn cycle(&mut self, cycle: u64, stop: &mut StopListener) -> CycleSummary {
        let mut summary = CycleSummary {
            cycle,
            attempted: 0,
            delivered: 0,
        };
        let stagger = self.schedule.entity_stagger;
        let count = self.entities.len();
        for (index, entity) in self.entities.iter_mut().enumerate() {
            summary.attempted += 1;
            if tick(entity, self.sink.as_ref()).await {
                summary.delivered += 1;
            }
            if index + 1 < count && sleep_or_stop(stagger, stop).await {
                break;
            }
        }
        info!(
            cycle,
            delivered = summary.delivered,
            attempted = summary.attempted,
            "cycle complete: {}/{} delivered",
            summary.delivered,
            summary.attempted
        );
        summary
    }

    async fn run_sequential(mut self, mut stop: StopListener) -> RunSummary {
        let started = Instant::now();
        let deadline = self.schedule.duration.map(|duration| started + duration);
        let period = self.schedule.cycle_period;
        let mut cycles = 0u64;
        let mut attempted = 0u64;
        let mut delivered = 0u64;

        loop {
            if stop.is_stopped() || deadline.is_some_and(|at| Instant::now() >= at) {
                break;
            }
            let cycle_started = Instant::now();
            let summary = self.cycle(cycles + 1, &mut stop).await;
            cycles += 1;
            attempted += summary.attempted as u64;
            delivered += summary.delivered as u64;

            let mut wait = period.saturating_sub(cycle_started.elapsed());
            if let Some(at) = deadline {
                wait = wait.min(at.saturating_duration_since(Instant::now()));
            }
            if sleep_or_stop(wait, &mut stop).await {
                break;
            }
        }

        RunSummary {
            mode: ScheduleMode::Sequential,
            cycles,
            attempted,
            delivered,
            elapsed: started.elapsed(),
            workers: Vec::new(),
        }
    }

    async fn run_concurrent(self, mut stop: StopListener) -> RunSummary {
        let Self {
            schedule,
            sink,
            entities,
            mut interval_source,
        } = self;
        let started = Instant::now();
        let workers_stop = StopSignal::new();

        let mut workers = Vec::with_capacity(entities.len());
        for (index, entity) in entities.into_iter().enumerate() {
            let device_id = entity.device_id().to_owned();
            let start_delay = schedule.startup_stagger.saturating_mul(index as u32);
            let interval = sample_interval(interval_source.as_mut(), &schedule.worker_interval_secs);
            info!(
                device_id = %device_id,
                start_delay_ms = start_delay.as_millis() as u64,
                interval_secs = interval.as_secs(),
                "worker starting"
            );
            let counters = Arc::new(WorkerCounters::default());
            let handle = tokio::spawn(supervise(
                device_id.clone(),
                drive_worker(
                    entity,
                    Arc::clone(&sink),
                    start_delay,
                    interval,
                    workers_stop.subscribe(),
                    Arc::clone(&counters),
                ),
            ));
            workers.push(Worker {
                device_id,
                counters,
                handle,
            });
        }

        match schedule.duration {
            Some(duration) => {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => info!("configured duration elapsed"),
                    _ = stop.stopped() => info!("stop requested"),
                }
            }
            None => stop.stopped().await,
        }
        workers_stop.trigger();

        let grace_deadline = Instant::now() + schedule.shutdown_grace;
        let reports = join_all(workers.into_iter().map(|worker| worker.join(grace_deadline))).await;

        let attempted = reports.iter().map(|report| report.ticks).sum();
        let delivered = reports.iter().map(|report| report.delivered).sum();
        RunSummary {
            mode: ScheduleMode::Concurrent,
            cycles: 0,
            attempted,
            delivered,
            elapsed: started.elapsed(),
            workers: reports,
        }
    }
}

struct Worker {
    device_id: String,
    counters: Arc<WorkerCounters>,
    handle: JoinHandle<WorkerOutcome>,
}

impl Worker {
    async fn join(mut self, deadline: Instant) -> WorkerReport {
        let outcome = match tokio::time::timeout_at(deadline, &mut self.handle).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                error!(device_id = %self.device_id, error = %err, "worker terminated abnormally");
                WorkerOutcome::Panicked
            }
            Err(_) => {
                warn!(device_id = %self.device_id, "worker did not stop within the grace period");
                self.handle.abort();
                WorkerOutcome::TimedOut
            }
        };
        self.counters.report(self.device_id, outcome)
    }
}

/// Run a worker to completion, logging a panic the moment it happens rather
/// than when the worker is joined at shutdown.
async fn supervise<F>(device_id: String, work: F) -> WorkerOutcome
where
    F: Future<Output = ()>,
{
    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(()) => WorkerOutcome::Completed,
        Err(payload) => {
            error!(
                device_id = %device_id,
                panic = %panic_message(payload.as_ref()),
                "worker panicked; entity stops ticking"
            );
            WorkerOutcome::Panicked
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

async fn drive_worker<S, R>(
    mut entity: EntitySimulator<R>,
    sink: Arc<S>,
    start_delay: Duration,
    interval: Duration,
    mut stop: StopListener,
    counters: Arc<WorkerCounters>,
) where
    S: TelemetrySink,
    R: RandomSource,
{
    if sleep_or_stop(start_delay, &mut stop).await {
        return;
    }
    loop {
        let delivered = tick(&mut entity, sink.as_ref()).await;
        counters.record(delivered);
        if sleep_or_stop(interval, &mut stop).await {
            break;
        }
    }
}

/// Advance one entity and hand its record to the sink. Returns whether the
/// sink accepted it; failures are logged and not retried.
async fn tick<S, R>(entity: &mut EntitySimulator<R>, sink: &S) -> bool
where
    S: TelemetrySink + ?Sized,
    R: RandomSource,
{
    let record = entity.advance();
    match sink.deliver(&record).await {
        Ok(()) => {
            info!(
                device_id = %record.device_id,
                tag = %record.tag,
                behavior = %record.behavior,
                lat = record.latitude,
                lng = record.longitude,
                speed = record.speed,
                battery = record.battery_level,
                "telemetry delivered"
            );
            true
        }
        Err(err) => {
            warn!(device_id = %record.device_id, error = %err, "telemetry delivery failed");
            false
        }
    }
}

/// Whole seconds drawn uniformly from the inclusive range.
fn sample_interval(source: &mut dyn RandomSource, range: &ValueRange<u64>) -> Duration {
    let span = range.max.saturating_sub(range.min);
    let offset = (source.next_unit() * (span as f64 + 1.0)).floor() as u64;
    Duration::from_secs(range.min + offset.min(span))
}
