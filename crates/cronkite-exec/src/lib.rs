//! cronkite-exec — command resolution and fire-and-forget job execution.
//!
//! [`command::resolve`] maps a job's target to a concrete program/args pair;
//! script extensions select an interpreter from a flat table. The
//! [`executor::Executor`] spawns resolved commands through the [`Launcher`]
//! seam and reports exactly one completion event per dispatch, however the
//! process ends.

pub mod command;
pub mod error;
pub mod executor;
pub mod launcher;
pub mod types;

pub use command::{resolve, split_arguments};
pub use error::{ExecError, Result};
pub use executor::Executor;
pub use launcher::{Launcher, ProcessLauncher};
pub use types::{ExitKind, ResolvedCommand, RunOutput};
