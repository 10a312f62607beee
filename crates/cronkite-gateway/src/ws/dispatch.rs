use std::sync::Arc;

use cronkite_protocol::frames::ResFrame;
use cronkite_protocol::methods;

use crate::app::AppState;
use crate::ws::handlers;

/// Route a WS method call to the correct handler.
///
/// All handlers live in `ws/handlers.rs`; this match is the single list of
/// everything the control surface can do.
pub async fn route(
    method: &str,
    params: Option<&serde_json::Value>,
    req_id: &str,
    app: &Arc<AppState>,
) -> ResFrame {
    match method {
        // ------------------------------------------------------------------
        // Jobs
        // ------------------------------------------------------------------
        methods::JOB_ADD => handlers::handle_job_add(params, req_id, app).await,

        methods::JOB_UPDATE => handlers::handle_job_update(params, req_id, app).await,

        methods::JOB_REMOVE => handlers::handle_job_remove(params, req_id, app).await,

        methods::JOB_GET => handlers::handle_job_get(params, req_id, app).await,

        methods::JOB_LIST => handlers::handle_job_list(req_id, app).await,

        methods::JOB_RUN_NOW => handlers::handle_job_run_now(params, req_id, app).await,

        // ------------------------------------------------------------------
        // Scheduler lifecycle
        // ------------------------------------------------------------------
        methods::SCHEDULER_START => handlers::handle_scheduler_start(req_id, app).await,

        methods::SCHEDULER_STOP => handlers::handle_scheduler_stop(req_id, app).await,

        methods::SCHEDULER_STATUS => handlers::handle_scheduler_status(req_id, app).await,

        // ------------------------------------------------------------------
        // Autostart registration
        // ------------------------------------------------------------------
        methods::AUTOSTART_SET => handlers::handle_autostart_set(params, req_id).await,

        methods::AUTOSTART_GET => handlers::handle_autostart_get(req_id).await,

        // ------------------------------------------------------------------
        // App surface
        // ------------------------------------------------------------------
        methods::APP_ACTIVATE => handlers::handle_app_activate(req_id, app).await,

        // ------------------------------------------------------------------
        // Fallthrough
        // ------------------------------------------------------------------
        _ => ResFrame::err(
            req_id,
            "BAD_REQUEST",
            &format!("unknown method '{}'", method),
        ),
    }
}
