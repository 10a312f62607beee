use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::info;
use uuid::Uuid;

use cronkite_core::{Clock, CronEvent, EventBus};

use crate::error::{Result, SchedulerError};
use crate::schedule;
use crate::store::JobStore;
use crate::types::{Job, JobDraft};

/// Single-writer owner of the job collection.
///
/// All mutation funnels through one registry. Each mutation persists to the
/// store while the lock is held, and rolls the in-memory change back if the
/// write fails, so registry and file always agree. Iteration order is
/// insertion order.
pub struct JobRegistry {
    jobs: Mutex<Vec<Job>>,
    store: JobStore,
    events: EventBus,
    clock: Arc<dyn Clock>,
}

impl JobRegistry {
    /// Load the persisted collection and wrap it in a registry.
    pub fn open(store: JobStore, events: EventBus, clock: Arc<dyn Clock>) -> Self {
        let jobs = store.load();
        info!(count = jobs.len(), path = %store.path().display(), "jobs loaded");
        events.log(format!("Loaded {} jobs", jobs.len()));
        Self {
            jobs: Mutex::new(jobs),
            store,
            events,
            clock,
        }
    }

    /// Validate and append a new job. Assigns a fresh id and schedules the
    /// first run at `now` — a brand-new job is due immediately.
    pub fn add(&self, draft: JobDraft) -> Result<Job> {
        validate(
            &draft.name,
            &draft.target,
            draft.interval_minutes,
            draft.use_custom_command,
        )?;

        let now = self.clock.now();
        let job = Job {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            target: draft.target,
            arguments: draft.arguments,
            use_custom_command: draft.use_custom_command,
            custom_command: draft.custom_command,
            interval_minutes: draft.interval_minutes,
            enabled: draft.enabled,
            last_run: None,
            next_run: Some(schedule::next_run_after(None, draft.interval_minutes, now)),
        };

        {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push(job.clone());
            if let Err(e) = self.store.save(&jobs) {
                jobs.pop();
                return Err(e);
            }
        }

        info!(job_id = %job.id, name = %job.name, "job added");
        self.events.emit(CronEvent::RegistryChanged);
        self.events.log(format!("Added job: {}", job.name));
        Ok(job)
    }

    /// Replace the record with the matching id, keeping its position.
    /// `nextRun` is recomputed from the incoming `lastRun` and interval.
    pub fn update(&self, mut job: Job) -> Result<Job> {
        validate(
            &job.name,
            &job.target,
            job.interval_minutes,
            job.use_custom_command,
        )?;

        job.recompute_next_run(self.clock.now());
        {
            let mut jobs = self.jobs.lock().unwrap();
            let pos = jobs
                .iter()
                .position(|j| j.id == job.id)
                .ok_or_else(|| SchedulerError::NotFound { id: job.id.clone() })?;
            let prev = std::mem::replace(&mut jobs[pos], job.clone());
            if let Err(e) = self.store.save(&jobs) {
                jobs[pos] = prev;
                return Err(e);
            }
        }

        info!(job_id = %job.id, name = %job.name, "job updated");
        self.events.emit(CronEvent::RegistryChanged);
        self.events.log(format!("Updated job: {}", job.name));
        Ok(job)
    }

    /// Remove a job. An unknown id is an error and leaves both the registry
    /// and the file untouched.
    pub fn remove(&self, id: &str) -> Result<Job> {
        let removed = {
            let mut jobs = self.jobs.lock().unwrap();
            let pos = jobs
                .iter()
                .position(|j| j.id == id)
                .ok_or_else(|| SchedulerError::NotFound { id: id.to_string() })?;
            let removed = jobs.remove(pos);
            if let Err(e) = self.store.save(&jobs) {
                jobs.insert(pos, removed);
                return Err(e);
            }
            removed
        };

        info!(job_id = %id, name = %removed.name, "job removed");
        self.events.emit(CronEvent::RegistryChanged);
        self.events.log(format!("Removed job: {}", removed.name));
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<Job> {
        self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned()
    }

    /// Snapshot of all jobs in insertion order.
    pub fn list(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Advance a job's timing for a dispatch happening now: `lastRun`
    /// becomes `now`, `nextRun` moves one interval ahead. Persisted before
    /// the caller spawns the process.
    pub fn mark_dispatched(&self, id: &str) -> Result<Job> {
        let now = self.clock.now();
        let job = {
            let mut jobs = self.jobs.lock().unwrap();
            let pos = jobs
                .iter()
                .position(|j| j.id == id)
                .ok_or_else(|| SchedulerError::NotFound { id: id.to_string() })?;
            let prev = jobs[pos].clone();
            jobs[pos].last_run = Some(now);
            jobs[pos].recompute_next_run(now);
            if let Err(e) = self.store.save(&jobs) {
                jobs[pos] = prev;
                return Err(e);
            }
            jobs[pos].clone()
        };

        self.events.emit(CronEvent::RegistryChanged);
        Ok(job)
    }
}

/// Field checks shared by add and update. Failures abort before anything is
/// mutated or persisted. The target-exists check is skipped for custom
/// commands, whose target may be virtual (an interpreter argument).
fn validate(name: &str, target: &str, interval_minutes: u32, use_custom_command: bool) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SchedulerError::Validation(
            "job name must not be empty".to_string(),
        ));
    }
    if target.trim().is_empty() {
        return Err(SchedulerError::Validation(
            "target path must not be empty".to_string(),
        ));
    }
    if !use_custom_command && !Path::new(target).exists() {
        return Err(SchedulerError::Validation(format!(
            "target does not exist: {target}"
        )));
    }
    if interval_minutes == 0 {
        return Err(SchedulerError::Validation(
            "interval must be at least 1 minute".to_string(),
        ));
    }
    Ok(())
}
