//! Fire-and-forget job execution.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use cronkite_core::{CronEvent, EventBus};

use crate::error::ExecError;
use crate::launcher::Launcher;
use crate::types::{ExitKind, ResolvedCommand, RunOutput};

/// Section header inserted between captured stdout and stderr.
pub const STDERR_HEADER: &str = "\n[stderr]\n";

/// Dispatches resolved commands without blocking the caller and reports each
/// outcome as exactly one [`CronEvent::ExecutionCompleted`].
pub struct Executor {
    launcher: Arc<dyn Launcher>,
    events: EventBus,
    inflight: Arc<Mutex<HashSet<String>>>,
}

impl Executor {
    pub fn new(launcher: Arc<dyn Launcher>, events: EventBus) -> Self {
        Self {
            launcher,
            events,
            inflight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Whether a dispatch for `job_id` has not completed yet.
    pub fn is_inflight(&self, job_id: &str) -> bool {
        self.inflight.lock().unwrap().contains(job_id)
    }

    pub fn inflight_count(&self) -> usize {
        self.inflight.lock().unwrap().len()
    }

    /// Spawn `command` for `job_id` and return immediately.
    ///
    /// The job is marked in-flight before this returns, so a caller checking
    /// [`Executor::is_inflight`] right after dispatch observes it. A detached
    /// task clears the mark and emits the completion event once the process
    /// ends, however it ends.
    pub fn dispatch(&self, job_id: &str, name: &str, command: ResolvedCommand) {
        self.inflight.lock().unwrap().insert(job_id.to_string());
        info!(%job_id, %name, program = %command.program, "executing job");
        self.events.log(format!("Executing job: {name}"));

        let launcher = Arc::clone(&self.launcher);
        let events = self.events.clone();
        let inflight = Arc::clone(&self.inflight);
        let job_id = job_id.to_string();
        let name = name.to_string();

        tokio::spawn(async move {
            let result = launcher.launch(&command).await;
            inflight.lock().unwrap().remove(&job_id);

            let outcome = classify(result);
            if outcome.success {
                info!(%job_id, %name, "job completed");
            } else {
                warn!(%job_id, %name, "job failed: {}", outcome.log);
            }
            events.log(outcome.log);
            events.emit(CronEvent::ExecutionCompleted {
                job_id,
                success: outcome.success,
                output: outcome.output,
            });
        });
    }
}

struct Outcome {
    success: bool,
    /// Event payload: captured output for normal exits, a short reason
    /// string for everything else.
    output: String,
    /// Activity-log line.
    log: String,
}

/// Map a launch result onto the completion event fields. Non-zero exits keep
/// the captured output; abnormal terminations replace it with a reason.
fn classify(result: crate::error::Result<RunOutput>) -> Outcome {
    match result {
        Ok(out) => match out.status {
            ExitKind::Exited(code) => Outcome {
                success: code == 0,
                output: combine_output(&out.stdout, &out.stderr),
                log: format!("Job completed with exit code: {code}"),
            },
            ExitKind::Signaled(sig) => failure(format!("Process crashed (signal {sig})")),
        },
        Err(ExecError::Spawn(e)) => failure(format!("Failed to start: {e}")),
        Err(ExecError::Timeout { secs }) => failure(format!("Timed out after {secs}s")),
        Err(ExecError::Io(e)) => failure(format!("Unknown error: {e}")),
    }
}

fn failure(reason: String) -> Outcome {
    Outcome {
        success: false,
        log: format!("Job error: {reason}"),
        output: reason,
    }
}

/// Combined process output: stdout, then stderr under a [`STDERR_HEADER`]
/// section when any was produced.
pub fn combine_output(stdout: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        stdout.to_string()
    } else {
        format!("{stdout}{STDERR_HEADER}{stderr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as ExecResult;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Scripted launcher: returns a canned result, optionally waiting for a
    /// notification first.
    struct FakeLauncher {
        result: Box<dyn Fn() -> ExecResult<RunOutput> + Send + Sync>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeLauncher {
        fn ok(stdout: &str, stderr: &str, code: i32) -> Self {
            let (stdout, stderr) = (stdout.to_string(), stderr.to_string());
            Self {
                result: Box::new(move || {
                    Ok(RunOutput {
                        status: ExitKind::Exited(code),
                        stdout: stdout.clone(),
                        stderr: stderr.clone(),
                    })
                }),
                gate: None,
            }
        }

        fn failing(err: fn() -> ExecError) -> Self {
            Self {
                result: Box::new(move || Err(err())),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl Launcher for FakeLauncher {
        async fn launch(&self, _command: &ResolvedCommand) -> ExecResult<RunOutput> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            (self.result)()
        }
    }

    fn cmd() -> ResolvedCommand {
        ResolvedCommand {
            program: "whatever".to_string(),
            args: vec![],
        }
    }

    async fn next_completion(
        rx: &mut tokio::sync::broadcast::Receiver<CronEvent>,
    ) -> (String, bool, String) {
        loop {
            match tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("timed out waiting for completion event")
                .expect("event bus closed")
            {
                CronEvent::ExecutionCompleted {
                    job_id,
                    success,
                    output,
                } => return (job_id, success, output),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn zero_exit_reports_success_with_output() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let exec = Executor::new(Arc::new(FakeLauncher::ok("all good\n", "", 0)), bus);

        exec.dispatch("job-1", "backup", cmd());

        let (id, success, output) = next_completion(&mut rx).await;
        assert_eq!(id, "job-1");
        assert!(success);
        assert_eq!(output, "all good\n");
    }

    #[tokio::test]
    async fn nonzero_exit_reports_failure_but_keeps_output() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let exec = Executor::new(Arc::new(FakeLauncher::ok("partial\n", "disk full\n", 2)), bus);

        exec.dispatch("job-2", "sync", cmd());

        let (_, success, output) = next_completion(&mut rx).await;
        assert!(!success);
        assert_eq!(output, format!("partial\n{STDERR_HEADER}disk full\n"));
    }

    #[tokio::test]
    async fn spawn_failure_reports_reason_instead_of_output() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let exec = Executor::new(
            Arc::new(FakeLauncher::failing(|| ExecError::Spawn("no such file".to_string()))),
            bus,
        );

        exec.dispatch("job-3", "broken", cmd());

        let (_, success, output) = next_completion(&mut rx).await;
        assert!(!success);
        assert_eq!(output, "Failed to start: no such file");
    }

    #[tokio::test]
    async fn signal_death_reports_a_crash_reason() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let launcher = FakeLauncher {
            result: Box::new(|| {
                Ok(RunOutput {
                    status: ExitKind::Signaled(9),
                    stdout: "some output".to_string(),
                    stderr: String::new(),
                })
            }),
            gate: None,
        };
        let exec = Executor::new(Arc::new(launcher), bus);

        exec.dispatch("job-4", "crashy", cmd());

        let (_, success, output) = next_completion(&mut rx).await;
        assert!(!success);
        assert_eq!(output, "Process crashed (signal 9)");
    }

    #[tokio::test]
    async fn exactly_one_completion_event_per_dispatch() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let exec = Executor::new(Arc::new(FakeLauncher::ok("", "", 0)), bus);

        exec.dispatch("job-5", "once", cmd());

        let _ = next_completion(&mut rx).await;
        // No second completion may arrive.
        let extra = tokio::time::timeout(Duration::from_millis(200), async {
            next_completion(&mut rx).await
        })
        .await;
        assert!(extra.is_err());
    }

    #[tokio::test]
    async fn inflight_mark_spans_the_run() {
        let gate = Arc::new(Notify::new());
        let launcher = FakeLauncher {
            result: Box::new(|| {
                Ok(RunOutput {
                    status: ExitKind::Exited(0),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }),
            gate: Some(Arc::clone(&gate)),
        };
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let exec = Executor::new(Arc::new(launcher), bus);

        assert!(!exec.is_inflight("job-6"));
        exec.dispatch("job-6", "slow", cmd());
        assert!(exec.is_inflight("job-6"));
        assert_eq!(exec.inflight_count(), 1);

        gate.notify_one();
        let _ = next_completion(&mut rx).await;
        assert!(!exec.is_inflight("job-6"));
        assert_eq!(exec.inflight_count(), 0);
    }

    #[test]
    fn combine_output_omits_header_without_stderr() {
        assert_eq!(combine_output("out", ""), "out");
        assert_eq!(combine_output("out", "err"), format!("out{STDERR_HEADER}err"));
        assert_eq!(combine_output("", "err"), format!("{STDERR_HEADER}err"));
    }
}
