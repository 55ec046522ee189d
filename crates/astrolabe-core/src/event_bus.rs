//! Change notifications for front-ends.
//!
//! The workbench publishes an event after every applied transition so any
//! number of front-ends (a GUI shell, a web view, a test) can redraw without
//! polling.
//!
//! # Example
//!
//! ```rust
//! use astrolabe_core::event_bus::{EventBus, SNIPPETS_CHANGED};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.emit(SNIPPETS_CHANGED, &serde_json::json!({"count": 2}));
//!
//! let event = rx.try_recv().unwrap();
//! assert_eq!(event.event_type, SNIPPETS_CHANGED);
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Slow subscribers start lagging after this many buffered events.
const DEFAULT_CAPACITY: usize = 256;

/// The snippet list changed and was persisted. Payload: snippet count.
pub const SNIPPETS_CHANGED: &str = "snippets:changed";
/// The editor session changed. Payload: the session.
pub const SESSION_CHANGED: &str = "session:changed";
/// A user-facing error. Payload: `{"message": ...}`.
pub const NOTICE_ERROR: &str = "notice:error";
/// The user typed into the read-only saved view and must confirm.
pub const CONFIRM_OVERRIDE: &str = "editor:confirm-override";
/// The pane layout changed. Payload: the layout.
pub const LAYOUT_CHANGED: &str = "layout:changed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastEvent {
    pub event_type: String,
    pub payload: serde_json::Value,
}

impl BroadcastEvent {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// Broadcast channel fanning events out to every subscriber.
pub struct EventBus {
    sender: broadcast::Sender<BroadcastEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the number of subscribers reached; with none the event is
    /// dropped and 0 is returned.
    pub fn emit<T: Serialize>(&self, event_type: &str, payload: &T) -> usize {
        let payload = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Failed to serialize {} payload: {}", event_type, e);
                return 0;
            }
        };
        self.sender
            .send(BroadcastEvent::new(event_type, payload))
            .unwrap_or(0)
    }

    /// Emit a user-facing error notice.
    pub fn notify_error(&self, message: &str) -> usize {
        self.emit(NOTICE_ERROR, &serde_json::json!({ "message": message }))
    }

    /// Receive all future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emit_without_subscribers_is_dropped() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(SESSION_CHANGED, &json!({})), 0);
    }

    #[test]
    fn subscriber_count_tracks_receivers() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn notify_error_wraps_message() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        assert_eq!(bus.notify_error("Failed to import snippets: nope"), 1);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type, NOTICE_ERROR);
        assert_eq!(event.payload["message"], "Failed to import snippets: nope");
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(SNIPPETS_CHANGED, &json!({"count": 1}));
        bus.emit(SNIPPETS_CHANGED, &json!({"count": 2}));

        assert_eq!(rx.recv().await.unwrap().payload["count"], 1);
        assert_eq!(rx.recv().await.unwrap().payload["count"], 2);
    }

    #[tokio::test]
    async fn late_subscriber_misses_old_events() {
        let bus = EventBus::new();
        let mut early = bus.subscribe();

        bus.emit("early", &json!({}));
        let mut late = bus.subscribe();
        bus.emit("later", &json!({}));

        assert_eq!(early.recv().await.unwrap().event_type, "early");
        assert_eq!(early.recv().await.unwrap().event_type, "later");
        assert_eq!(late.recv().await.unwrap().event_type, "later");
    }

    #[test]
    fn serializes_for_ipc() {
        let event = BroadcastEvent::new(CONFIRM_OVERRIDE, json!({"id": "a"}));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"editor:confirm-override\""));
    }
}
