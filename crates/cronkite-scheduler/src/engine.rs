use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use cronkite_core::{Clock, EventBus};
use cronkite_exec::{resolve, Executor};

use crate::error::{Result, SchedulerError};
use crate::registry::JobRegistry;
use crate::types::Job;

/// Periodic dispatcher: scans the registry on a fixed cadence and hands due
/// jobs to the executor.
///
/// Stopped or running; both transitions are idempotent. The scan itself is
/// exposed as [`Scheduler::tick`] so tests can drive virtual time directly.
pub struct Scheduler {
    registry: Arc<JobRegistry>,
    executor: Arc<Executor>,
    events: EventBus,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    running: Mutex<Option<watch::Sender<bool>>>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<JobRegistry>,
        executor: Arc<Executor>,
        events: EventBus,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            registry,
            executor,
            events,
            clock,
            tick_interval,
            running: Mutex::new(None),
        }
    }

    /// Begin periodic scanning. No-op when already running. The first scan
    /// happens immediately, then every `tick_interval`.
    pub fn start(self: &Arc<Self>) {
        let mut running = self.running.lock().unwrap();
        if running.is_some() {
            return;
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.run(shutdown_rx).await });
        *running = Some(shutdown_tx);
        drop(running);

        info!("cron scheduler started");
        self.events.log("Cron scheduler started");
    }

    /// Stop periodic scanning. No-op when already stopped. In-flight
    /// executions finish on their own; only the scan loop stops.
    pub fn stop(&self) {
        let mut running = self.running.lock().unwrap();
        if let Some(shutdown_tx) = running.take() {
            let _ = shutdown_tx.send(true);
            drop(running);

            info!("cron scheduler stopped");
            self.events.log("Cron scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().unwrap().is_some()
    }

    /// One due-job scan. Jobs are visited in registry order. A due job whose
    /// previous run is still in flight is left untouched — its timing does
    /// not advance, so it stays due and fires on the first tick after that
    /// run finishes.
    pub fn tick(&self) {
        let now = self.clock.now();
        for job in self.registry.list() {
            if !job.is_due(now) {
                continue;
            }
            if self.executor.is_inflight(&job.id) {
                debug!(job_id = %job.id, "previous run still in flight; skipping");
                continue;
            }
            if let Err(e) = self.dispatch(&job) {
                error!(job_id = %job.id, "dispatch failed: {e}");
            }
        }
    }

    /// Dispatch one job immediately, regardless of due-ness or whether the
    /// periodic loop is running.
    pub fn run_now(&self, id: &str) -> Result<Job> {
        let job = self
            .registry
            .get(id)
            .ok_or_else(|| SchedulerError::NotFound { id: id.to_string() })?;
        if self.executor.is_inflight(id) {
            return Err(SchedulerError::AlreadyRunning { id: id.to_string() });
        }
        info!(job_id = %id, name = %job.name, "manual run");
        self.dispatch(&job)
    }

    /// Advance timing, then hand the job to the executor. The timing update
    /// is persisted before the process spawns.
    fn dispatch(&self, job: &Job) -> Result<Job> {
        let updated = self.registry.mark_dispatched(&job.id)?;
        let command = resolve(
            &updated.target,
            &updated.arguments,
            updated.use_custom_command,
            &updated.custom_command,
        );
        self.executor.dispatch(&updated.id, &updated.name, command);
        Ok(updated)
    }

    async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("scheduler loop exited");
    }
}
