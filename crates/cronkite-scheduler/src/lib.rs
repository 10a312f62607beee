//! `cronkite-scheduler` — job registry, JSON persistence, and the periodic
//! dispatch loop.
//!
//! # Overview
//!
//! Jobs are fixed-interval records persisted to a single JSON file
//! (`cronjobs.json`). The [`registry::JobRegistry`] owns the collection and
//! persists every mutation; the [`engine::Scheduler`] scans it on a fixed
//! cadence (30 s by default) and hands due jobs to the executor, advancing
//! `lastRun`/`nextRun` before each spawn so a job fires at most once per
//! interval regardless of how long it runs.
//!
//! # Timing model
//!
//! | State                  | Behaviour                                   |
//! |------------------------|---------------------------------------------|
//! | never ran              | due immediately                             |
//! | ran at T               | due at T + interval                         |
//! | disabled               | never due                                   |
//! | previous run in flight | skipped; fires on the first tick after it   |

pub mod engine;
pub mod error;
pub mod registry;
pub mod schedule;
pub mod store;
pub mod types;

pub use engine::Scheduler;
pub use error::{Result, SchedulerError};
pub use registry::JobRegistry;
pub use store::JobStore;
pub use types::{Job, JobDraft};
