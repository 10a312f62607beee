use axum::{
    routing::{get, post},
    Router,
};
use cronkite_core::{CronkiteConfig, EventBus};
use cronkite_exec::Executor;
use cronkite_protocol::{frames::EventFrame, methods};
use cronkite_scheduler::{JobRegistry, Scheduler};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::ws::broadcast::EventBroadcaster;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: CronkiteConfig,
    pub event_seq: AtomicU64,
    pub broadcaster: EventBroadcaster,
    pub events: EventBus,
    pub registry: Arc<JobRegistry>,
    pub executor: Arc<Executor>,
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(
        config: CronkiteConfig,
        events: EventBus,
        registry: Arc<JobRegistry>,
        executor: Arc<Executor>,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            config,
            event_seq: AtomicU64::new(0),
            broadcaster: EventBroadcaster::new(),
            events,
            registry,
            executor,
            scheduler,
        }
    }

    /// Monotonically increasing sequence for pushed event frames.
    pub fn next_seq(&self) -> u64 {
        self.event_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Broadcast `app.activate` — every connected UI raises its window.
    pub fn broadcast_activate(&self) {
        let frame = EventFrame::new(methods::EVENT_APP_ACTIVATE, serde_json::json!({}))
            .with_seq(self.next_seq());
        if let Ok(json) = serde_json::to_string(&frame) {
            self.broadcaster.send(json);
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .route("/activate", post(crate::http::activate_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
