//! Concrete WS method handlers.
//!
//! Each handler extracts its params, calls into the engine through
//! [`AppState`], and returns a `ResFrame`. `dispatch::route` is the only
//! caller. Engine failures map onto stable wire error codes here, so the
//! scheduler crate never needs to know about the protocol.

use cronkite_protocol::frames::ResFrame;
use cronkite_scheduler::{Job, JobDraft, SchedulerError};
use serde_json::json;
use tracing::warn;

use crate::app::AppState;
use crate::autostart::{self, AutostartError};

fn map_scheduler_error(req_id: &str, e: SchedulerError) -> ResFrame {
    match e {
        SchedulerError::Validation(ref msg) => ResFrame::err(req_id, "VALIDATION_FAILED", msg),
        SchedulerError::NotFound { ref id } => {
            ResFrame::err(req_id, "NOT_FOUND", &format!("no job with id {id}"))
        }
        SchedulerError::AlreadyRunning { ref id } => {
            ResFrame::err(req_id, "ALREADY_RUNNING", &format!("job {id} is already running"))
        }
        e => ResFrame::err(req_id, "INTERNAL_ERROR", &e.to_string()),
    }
}

fn map_autostart_error(req_id: &str, e: AutostartError) -> ResFrame {
    match e {
        AutostartError::Unsupported => ResFrame::err(req_id, "UNAVAILABLE", &e.to_string()),
        AutostartError::Io(e) => ResFrame::err(req_id, "INTERNAL_ERROR", &e.to_string()),
    }
}

/// Pull a non-empty string `id` out of the params object.
fn require_id<'a>(params: Option<&'a serde_json::Value>) -> Option<&'a str> {
    params
        .and_then(|p| p.get("id"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

// ----------------------------------------------------------------------
// Jobs
// ----------------------------------------------------------------------

/// Handler for `job.add`.
///
/// Params: a job draft object (`name`, `target`, `arguments`,
/// `useCustomCommand`, `customCommand`, `intervalMinutes`, `enabled`).
pub async fn handle_job_add(
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    let draft: JobDraft = match params {
        Some(p) => match serde_json::from_value(p.clone()) {
            Ok(d) => d,
            Err(e) => {
                return ResFrame::err(req_id, "BAD_REQUEST", &format!("invalid job draft: {e}"))
            }
        },
        None => return ResFrame::err(req_id, "BAD_REQUEST", "params object required"),
    };

    match app.registry.add(draft) {
        Ok(job) => ResFrame::ok(req_id, json!({ "job": job })),
        Err(e) => {
            warn!(error = %e, "job.add failed");
            map_scheduler_error(req_id, e)
        }
    }
}

/// Handler for `job.update`.
///
/// Params: a full job record including `id`. `nextRun` is recomputed
/// server-side; whatever the client sends for it is ignored.
pub async fn handle_job_update(
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    let job: Job = match params {
        Some(p) => match serde_json::from_value(p.clone()) {
            Ok(j) => j,
            Err(e) => {
                return ResFrame::err(req_id, "BAD_REQUEST", &format!("invalid job record: {e}"))
            }
        },
        None => return ResFrame::err(req_id, "BAD_REQUEST", "params object required"),
    };
    if job.id.trim().is_empty() {
        return ResFrame::err(req_id, "BAD_REQUEST", "missing or empty 'id' field");
    }

    match app.registry.update(job) {
        Ok(job) => ResFrame::ok(req_id, json!({ "job": job })),
        Err(e) => {
            warn!(error = %e, "job.update failed");
            map_scheduler_error(req_id, e)
        }
    }
}

/// Handler for `job.remove`.
///
/// Params: `{ "id": "<job id>" }`.
pub async fn handle_job_remove(
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    let Some(id) = require_id(params) else {
        return ResFrame::err(req_id, "BAD_REQUEST", "missing or empty 'id' field");
    };

    match app.registry.remove(id) {
        Ok(job) => ResFrame::ok(req_id, json!({ "removed": job.id })),
        Err(e) => {
            warn!(error = %e, "job.remove failed");
            map_scheduler_error(req_id, e)
        }
    }
}

/// Handler for `job.get`.
///
/// Params: `{ "id": "<job id>" }`.
pub async fn handle_job_get(
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    let Some(id) = require_id(params) else {
        return ResFrame::err(req_id, "BAD_REQUEST", "missing or empty 'id' field");
    };

    match app.registry.get(id) {
        Some(job) => ResFrame::ok(req_id, json!({ "job": job })),
        None => ResFrame::err(req_id, "NOT_FOUND", &format!("no job with id {id}")),
    }
}

/// Handler for `job.list`. No params.
pub async fn handle_job_list(req_id: &str, app: &AppState) -> ResFrame {
    ResFrame::ok(req_id, json!({ "jobs": app.registry.list() }))
}

/// Handler for `job.run_now` — dispatch immediately, ignoring the schedule.
///
/// Params: `{ "id": "<job id>" }`. The response confirms the dispatch only;
/// the outcome arrives later as a `job.completed` event.
pub async fn handle_job_run_now(
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &AppState,
) -> ResFrame {
    let Some(id) = require_id(params) else {
        return ResFrame::err(req_id, "BAD_REQUEST", "missing or empty 'id' field");
    };

    match app.scheduler.run_now(id) {
        Ok(job) => ResFrame::ok(req_id, json!({ "dispatched": job.id })),
        Err(e) => {
            warn!(error = %e, "job.run_now failed");
            map_scheduler_error(req_id, e)
        }
    }
}

// ----------------------------------------------------------------------
// Scheduler lifecycle
// ----------------------------------------------------------------------

/// Handler for `scheduler.start`. Idempotent — starting a running
/// scheduler is a no-op.
pub async fn handle_scheduler_start(req_id: &str, app: &AppState) -> ResFrame {
    app.scheduler.start();
    ResFrame::ok(req_id, json!({ "running": true }))
}

/// Handler for `scheduler.stop`. In-flight runs finish on their own.
pub async fn handle_scheduler_stop(req_id: &str, app: &AppState) -> ResFrame {
    app.scheduler.stop();
    ResFrame::ok(req_id, json!({ "running": false }))
}

/// Handler for `scheduler.status`. No params.
pub async fn handle_scheduler_status(req_id: &str, app: &AppState) -> ResFrame {
    ResFrame::ok(
        req_id,
        json!({
            "running": app.scheduler.is_running(),
            "jobs": app.registry.count(),
            "inflight": app.executor.inflight_count(),
        }),
    )
}

// ----------------------------------------------------------------------
// Autostart registration
// ----------------------------------------------------------------------

/// Handler for `autostart.set`.
///
/// Params: `{ "enabled": true|false }`.
pub async fn handle_autostart_set(params: Option<&serde_json::Value>, req_id: &str) -> ResFrame {
    let Some(enabled) = params.and_then(|p| p.get("enabled")).and_then(|v| v.as_bool()) else {
        return ResFrame::err(req_id, "BAD_REQUEST", "missing boolean 'enabled' field");
    };

    match autostart::set_auto_start(enabled) {
        Ok(state) => ResFrame::ok(req_id, json!({ "enabled": state })),
        Err(e) => {
            warn!(error = %e, "autostart.set failed");
            map_autostart_error(req_id, e)
        }
    }
}

/// Handler for `autostart.get`. No params.
pub async fn handle_autostart_get(req_id: &str) -> ResFrame {
    match autostart::is_auto_start_enabled() {
        Ok(enabled) => ResFrame::ok(req_id, json!({ "enabled": enabled })),
        Err(e) => map_autostart_error(req_id, e),
    }
}

// ----------------------------------------------------------------------
// App surface
// ----------------------------------------------------------------------

/// Handler for `app.activate` — rebroadcast to every connection so any
/// attached UI can raise its window.
pub async fn handle_app_activate(req_id: &str, app: &AppState) -> ResFrame {
    app.broadcast_activate();
    ResFrame::ok(req_id, json!({ "ok": true }))
}
