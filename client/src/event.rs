//! User-facing event surface.
//!
//! The sync engine never renders anything; it emits events the embedding UI
//! turns into banners and conflict prompts. All events are JSON-encodable
//! with a `type` tag.

use quotesync_engine::Conflict;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Severity of a notification banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Events sent from the sync engine to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// A notification banner.
    Notice {
        /// Human-readable message
        message: String,
        /// Banner severity
        severity: Severity,
    },

    /// The head of the conflict queue needs a user decision.
    ConflictPending {
        /// The conflicting record pair
        conflict: Conflict,
    },
}

/// Sender half of the event surface.
///
/// Sends never block and never fail: if the receiver is gone (headless use,
/// shut-down UI) events are simply dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Option<mpsc::UnboundedSender<UiEvent>>,
}

impl EventBus {
    /// Create a connected bus and the receiver the UI drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    /// Create a bus that drops every event (headless embedders, tests).
    pub fn sink() -> Self {
        Self { sender: None }
    }

    /// Emit a notification banner.
    pub fn notice(&self, severity: Severity, message: impl Into<String>) {
        self.send(UiEvent::Notice {
            message: message.into(),
            severity,
        });
    }

    /// Emit a conflict-presentation event for the queue head.
    pub fn conflict_pending(&self, conflict: &Conflict) {
        self.send(UiEvent::ConflictPending {
            conflict: conflict.clone(),
        });
    }

    fn send(&self, event: UiEvent) {
        if let Some(sender) = &self.sender {
            // Receiver gone means nobody is rendering; nothing to do.
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotesync_engine::Quote;

    #[test]
    fn notice_reaches_receiver() {
        let (bus, mut rx) = EventBus::channel();
        bus.notice(Severity::Success, "Quotes synced with server");

        let event = rx.try_recv().unwrap();
        assert_eq!(
            event,
            UiEvent::Notice {
                message: "Quotes synced with server".into(),
                severity: Severity::Success,
            }
        );
    }

    #[test]
    fn conflict_pending_carries_the_pair() {
        let (bus, mut rx) = EventBus::channel();
        let conflict = Conflict {
            local: Quote::new("a", "local", "c", 100),
            server: Quote::new("a", "server", "c", 200),
        };
        bus.conflict_pending(&conflict);

        match rx.try_recv().unwrap() {
            UiEvent::ConflictPending { conflict: c } => assert_eq!(c, conflict),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn sink_drops_events_silently() {
        let bus = EventBus::sink();
        bus.notice(Severity::Error, "nobody is listening");
    }

    #[test]
    fn dropped_receiver_is_tolerated() {
        let (bus, rx) = EventBus::channel();
        drop(rx);
        bus.notice(Severity::Info, "still fine");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = UiEvent::Notice {
            message: "hi".into(),
            severity: Severity::Warning,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"notice\""));
        assert!(json.contains("\"severity\":\"warning\""));

        let parsed: UiEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
