use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 256;

/// Engine notifications fanned out to every consumer surface.
///
/// Events carry no timestamps; consumers stamp them on receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CronEvent {
    /// Terminal outcome of one dispatch. Exactly one per dispatch,
    /// success or failure.
    ExecutionCompleted {
        job_id: String,
        success: bool,
        output: String,
    },
    /// The job collection or some job's fields changed; consumers re-fetch.
    RegistryChanged,
    /// Human-readable activity line for UI logs.
    Log { message: String },
}

/// Clone-shareable fan-out bus for [`CronEvent`]s.
///
/// Thin wrapper over a tokio broadcast channel. Emitting never blocks;
/// with no subscribers the event is dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CronEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CronEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: CronEvent) {
        let _ = self.tx.send(event);
    }

    /// Shorthand for a [`CronEvent::Log`] line.
    pub fn log(&self, message: impl Into<String>) {
        self.emit(CronEvent::Log {
            message: message.into(),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
