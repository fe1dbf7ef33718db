//! Structured observability events.
//!
//! Every externally visible action of the store (sheet open, resource open,
//! retry attempt, read counts, mutation outcomes) is reported as an [`Event`]
//! on a process-wide broadcast channel. Each event is also printed to stdout
//! as one JSON line, so the host process gets structured logs without any
//! formatting logic living in this crate.

use chrono::Local;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Event severity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// A single structured event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Local timestamp, `YYYY-MM-DDTHH:MM:SS`.
    pub ts: String,
    /// Severity level.
    pub level: Level,
    /// Event name, e.g. `retry` or `update_status_not_found`.
    pub event: String,
    /// Emitting module path.
    pub module: String,
    /// Free-form metadata.
    pub meta: Value,
}

impl Event {
    pub fn new(level: Level, event: impl Into<String>, module: &str, meta: Value) -> Self {
        Self {
            ts: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            level,
            event: event.into(),
            module: module.to_string(),
            meta,
        }
    }
}

/// Global event broadcaster.
pub static EVENT_BUS: Lazy<EventBus> = Lazy::new(EventBus::new);

/// Broadcasts events to all subscribers and mirrors them to stdout.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emit an event to stdout and to all subscribers.
    pub fn emit(&self, event: Event) {
        if let Ok(line) = serde_json::to_string(&event) {
            println!("{}", line);
        }
        // Broadcast to subscribers (ignore if no receivers)
        let _ = self.sender.send(event);
    }

    /// Get a receiver for observing emitted events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient emit functions
pub fn info(event: impl Into<String>, module: &str, meta: Value) {
    EVENT_BUS.emit(Event::new(Level::Info, event, module, meta));
}

pub fn warning(event: impl Into<String>, module: &str, meta: Value) {
    EVENT_BUS.emit(Event::new(Level::Warning, event, module, meta));
}

pub fn error(event: impl Into<String>, module: &str, meta: Value) {
    EVENT_BUS.emit(Event::new(Level::Error, event, module, meta));
}

/// Subscribe to the global bus.
pub fn subscribe() -> broadcast::Receiver<Event> {
    EVENT_BUS.subscribe()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serializes_as_flat_json() {
        let event = Event::new(
            Level::Info,
            "read_products",
            "sheetstore::store",
            json!({ "count": 3 }),
        );
        let line = serde_json::to_string(&event).unwrap();
        assert!(line.contains("\"level\":\"INFO\""));
        assert!(line.contains("\"event\":\"read_products\""));
        assert!(line.contains("\"count\":3"));
    }

    #[tokio::test]
    async fn test_subscriber_receives_emitted_event() {
        let mut rx = subscribe();
        info("bus_smoke", "sheetstore::events", json!({ "probe": true }));

        // Drain until we hit our own event; other tests share the bus.
        loop {
            let event = rx.recv().await.unwrap();
            if event.event == "bus_smoke" {
                assert_eq!(event.level, Level::Info);
                break;
            }
        }
    }
}
