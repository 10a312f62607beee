//! Shared data types for cronkite-exec.

use serde::{Deserialize, Serialize};

/// A fully resolved process invocation: the program to spawn and its
/// argument vector, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// How the child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitKind {
    /// Normal termination with an exit code.
    Exited(i32),
    /// Killed by a signal — abnormal termination.
    Signaled(i32),
}

/// Captured result of a completed child process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub status: ExitKind,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// Success means a normal exit with code zero.
    pub fn success(&self) -> bool {
        matches!(self.status, ExitKind::Exited(0))
    }
}
