//! Process launching behind a trait seam, so scheduling logic can be tested
//! without spawning real children.

use async_trait::async_trait;
use tokio::process::Command as AsyncCommand;

use crate::error::{ExecError, Result};
use crate::types::{ExitKind, ResolvedCommand, RunOutput};

/// Runs one resolved command to completion, capturing its output.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, command: &ResolvedCommand) -> Result<RunOutput>;
}

/// Real launcher on `tokio::process`. stdout/stderr are piped and captured;
/// stdin is null so a job waiting on input fails fast instead of hanging on
/// a terminal that isn't there.
pub struct ProcessLauncher {
    /// Kill the child after this many seconds. `None` = no limit.
    timeout_secs: Option<u64>,
}

impl ProcessLauncher {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self { timeout_secs }
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, command: &ResolvedCommand) -> Result<RunOutput> {
        let child = AsyncCommand::new(&command.program)
            .args(&command.args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| ExecError::Spawn(e.to_string()))?;

        // `wait_with_output` takes the child by value, so we drive it on a
        // spawned task and communicate back via a oneshot channel.  The PID
        // is captured first for the kill on the timeout path.
        let pid = child.id();
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(child.wait_with_output().await);
        });

        let waited = match self.timeout_secs {
            None => rx.await,
            Some(secs) => {
                match tokio::time::timeout(std::time::Duration::from_secs(secs), rx).await {
                    Ok(res) => res,
                    // Deadline expired — kill the child via its PID.
                    Err(_elapsed) => {
                        if let Some(raw_pid) = pid {
                            // Safety: raw_pid is our direct child, still running.
                            #[cfg(unix)]
                            unsafe {
                                libc::kill(raw_pid as libc::pid_t, libc::SIGKILL);
                            }
                            #[cfg(not(unix))]
                            {
                                let _ = std::process::Command::new("taskkill")
                                    .args(["/F", "/PID", &raw_pid.to_string()])
                                    .output();
                            }
                        }
                        return Err(ExecError::Timeout { secs });
                    }
                }
            }
        };

        let output = match waited {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ExecError::Io(e)),
            // The oneshot channel was dropped — the wait task panicked.
            Err(_recv_err) => return Err(ExecError::Spawn("wait task panicked".to_string())),
        };

        Ok(RunOutput {
            status: exit_kind(&output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn exit_kind(status: &std::process::ExitStatus) -> ExitKind {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return ExitKind::Signaled(sig);
        }
    }
    ExitKind::Exited(status.code().unwrap_or(-1))
}
