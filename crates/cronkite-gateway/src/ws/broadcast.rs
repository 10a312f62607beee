use std::sync::Arc;

use cronkite_core::CronEvent;
use cronkite_protocol::{frames::EventFrame, methods};
use tokio::sync::broadcast;
use tracing::warn;

use crate::app::AppState;

const BROADCAST_CAPACITY: usize = 256;

/// Fan-out pre-serialized event frames to all connected WS clients.
pub struct EventBroadcaster {
    tx: broadcast::Sender<String>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// New client subscribes to the broadcast stream.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Push a JSON event string to all subscribers.
    /// Silently drops if no subscribers exist.
    pub fn send(&self, payload: String) {
        let _ = self.tx.send(payload);
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate one engine event into its wire frame.
///
/// `jobs.changed` carries the full job list so clients never need a
/// follow-up `job.list` round trip.
fn frame_for(app: &AppState, event: &CronEvent) -> EventFrame {
    match event {
        CronEvent::ExecutionCompleted {
            job_id,
            success,
            output,
        } => EventFrame::new(
            methods::EVENT_JOB_COMPLETED,
            serde_json::json!({ "job_id": job_id, "success": success, "output": output }),
        ),
        CronEvent::RegistryChanged => EventFrame::new(
            methods::EVENT_JOBS_CHANGED,
            serde_json::json!({ "jobs": app.registry.list() }),
        ),
        CronEvent::Log { message } => EventFrame::new(
            methods::EVENT_LOG_MESSAGE,
            serde_json::json!({ "message": message }),
        ),
    }
}

/// Pump engine events into the WS broadcaster until the bus closes.
pub async fn pump(app: Arc<AppState>) {
    let mut rx = app.events.subscribe();
    loop {
        match rx.recv().await {
            Ok(event) => {
                let frame = frame_for(&app, &event).with_seq(app.next_seq());
                match serde_json::to_string(&frame) {
                    Ok(json) => app.broadcaster.send(json),
                    Err(e) => warn!(error = %e, "event frame serialization failed"),
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "event pump lagged; frames dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
