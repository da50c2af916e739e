//! Event types for the Easy Booking event system
//!
//! Provides import event definitions and the EventBus used to fan them out
//! to SSE clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Import lifecycle events
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportEvent {
    /// Import run accepted and started
    ImportSessionStarted {
        session_id: Uuid,
        /// External system the records come from (e.g. "repairshopr")
        source: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A page finished processing
    ImportProgressUpdate {
        session_id: Uuid,
        total: u64,
        current: u64,
        percentage: u8,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Run ended with pagination exhausted
    ImportSessionCompleted {
        session_id: Uuid,
        imported_count: u64,
        failed_count: u64,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Run aborted by a fatal error
    ImportSessionFailed {
        session_id: Uuid,
        imported_count: u64,
        failed_count: u64,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Run stopped by an admin cancel request
    ImportSessionCancelled {
        session_id: Uuid,
        imported_count: u64,
        failed_count: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ImportEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            ImportEvent::ImportSessionStarted { .. } => "ImportSessionStarted",
            ImportEvent::ImportProgressUpdate { .. } => "ImportProgressUpdate",
            ImportEvent::ImportSessionCompleted { .. } => "ImportSessionCompleted",
            ImportEvent::ImportSessionFailed { .. } => "ImportSessionFailed",
            ImportEvent::ImportSessionCancelled { .. } => "ImportSessionCancelled",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            ImportEvent::ImportSessionStarted { session_id, .. }
            | ImportEvent::ImportProgressUpdate { session_id, .. }
            | ImportEvent::ImportSessionCompleted { session_id, .. }
            | ImportEvent::ImportSessionFailed { session_id, .. }
            | ImportEvent::ImportSessionCancelled { session_id, .. } => *session_id,
        }
    }
}

/// Broadcast bus for import events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ImportEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    ///
    /// # Examples
    ///
    /// ```
    /// use easybook_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ImportEvent,
    ) -> Result<usize, broadcast::error::SendError<ImportEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ImportEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
