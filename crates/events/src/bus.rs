//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ResizeEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the orchestrator and any
//! observers (progress UIs, persistence hooks).

use chrono::{DateTime, Utc};
use retarget_core::types::Id;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ResizeEvent
// ---------------------------------------------------------------------------

/// A domain event emitted by the batch pipeline.
///
/// Constructed via [`ResizeEvent::new`] and enriched with the builder
/// methods [`with_batch`](ResizeEvent::with_batch),
/// [`with_job`](ResizeEvent::with_job), and
/// [`with_payload`](ResizeEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeEvent {
    /// Dot-separated event name, e.g. `"job.completed"`.
    pub event_type: String,

    /// Batch this event belongs to, when applicable.
    pub batch_id: Option<Id>,

    /// Job this event belongs to, when applicable.
    pub job_id: Option<Id>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ResizeEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            batch_id: None,
            job_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_batch(mut self, batch_id: Id) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    pub fn with_job(mut self, job_id: Id) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ResizeEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ResizeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: ResizeEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ResizeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
