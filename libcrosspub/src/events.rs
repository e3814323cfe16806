//! Event system for workflow progress
//!
//! An in-process event bus that distributes workflow events to subscribers
//! without blocking the operation that emits them.
//!
//! # Architecture
//!
//! The bus uses `tokio::sync::broadcast` for multi-subscriber support.
//! Events are emitted by the publisher and the account linker as their
//! workflows advance, and can be consumed by any number of subscribers
//! (CLI progress output, machine-readable streams, etc.).
//!
//! # Non-Blocking Behavior
//!
//! If no subscribers exist, events are dropped immediately. Subscribers can
//! lag without blocking emitters; a lagging subscriber loses oldest events
//! first.
//!
//! # Example
//!
//! ```no_run
//! use libcrosspub::events::{Event, EventBus};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::DraftSaved {
//!     post_id: "abc123".to_string(),
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::linker::LinkState;
use crate::types::{Platform, PlatformResult, PostStatus};

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Event bus for distributing workflow events
///
/// Backed by a broadcast channel; events reach every live subscriber and are
/// dropped when there is none, so emitting never fails and never blocks.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the specified capacity
    ///
    /// The capacity bounds how many events a lagging subscriber can fall
    /// behind before it starts losing the oldest ones.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events
    ///
    /// The receiver sees every event emitted after this call. Multiple
    /// subscribers are supported.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: Event) {
        // send() errs when nobody is listening, which is fine
        let _ = self.sender.send(event);
    }

    /// Number of active subscribers
    ///
    /// Useful for debugging, not for control flow.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Events emitted as publish and link workflows advance
///
/// All events are cloneable and serialize as tagged JSON so shells can
/// forward them verbatim to machine-readable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A draft was created without publishing
    DraftSaved {
        post_id: String,
    },

    /// A publish-now orchestration created its post and is fanning out
    PublishStarted {
        post_id: String,
        platforms: Vec<Platform>,
    },

    /// Publish finished; status is the aggregate over the results
    PublishCompleted {
        post_id: String,
        status: PostStatus,
        results: Vec<PlatformResult>,
    },

    /// Publish aborted on a gateway failure.
    ///
    /// `post_id` is absent when the create call itself failed.
    PublishFailed {
        post_id: Option<String>,
        error: String,
    },

    /// A connect attempt moved to a new state
    LinkStateChanged {
        platform: Platform,
        state: LinkState,
    },

    /// A connect attempt found its newly authorized account
    AccountLinked {
        platform: Platform,
        account_id: String,
        account_name: String,
    },

    /// An account was removed
    AccountDisconnected {
        account_id: String,
    },

    /// The backend confirmed stored credentials for a platform
    CredentialsSaved {
        platform: Platform,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(Event::DraftSaved {
            post_id: "test123".to_string(),
        });

        let received = receiver.recv().await.unwrap();
        match received {
            Event::DraftSaved { post_id } => assert_eq!(post_id, "test123"),
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.emit(Event::PublishStarted {
            post_id: "test456".to_string(),
            platforms: vec![Platform::Facebook, Platform::Linkedin],
        });

        for receiver in [&mut receiver1, &mut receiver2] {
            match receiver.recv().await.unwrap() {
                Event::PublishStarted { post_id, platforms } => {
                    assert_eq!(post_id, "test456");
                    assert_eq!(platforms, vec![Platform::Facebook, Platform::Linkedin]);
                }
                other => panic!("Wrong event type received: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let event_bus = EventBus::new(10);

        // Must not panic or block with nobody listening
        event_bus.emit(Event::AccountDisconnected {
            account_id: "acc-1".to_string(),
        });

        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_count() {
        let event_bus = EventBus::new(10);
        assert_eq!(event_bus.subscriber_count(), 0);

        let _receiver1 = event_bus.subscribe();
        assert_eq!(event_bus.subscriber_count(), 1);

        let _receiver2 = event_bus.subscribe();
        assert_eq!(event_bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_serialization() {
        let event = Event::PublishCompleted {
            post_id: "serial_test".to_string(),
            status: PostStatus::Partial,
            results: vec![
                PlatformResult::success(Platform::Facebook),
                PlatformResult::failure(Platform::Twitter, "Rate limited"),
            ],
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"publish_completed"#));
        assert!(json.contains(r#""status":"partial"#));
        assert!(json.contains("Rate limited"));

        let deserialized: Event = serde_json::from_str(&json).unwrap();
        match deserialized {
            Event::PublishCompleted { post_id, status, results } => {
                assert_eq!(post_id, "serial_test");
                assert_eq!(status, PostStatus::Partial);
                assert_eq!(results.len(), 2);
            }
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_link_state_event_serialization() {
        let event = Event::LinkStateChanged {
            platform: Platform::Tiktok,
            state: LinkState::AwaitingAuthorization,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"link_state_changed"#));
        assert!(json.contains(r#""platform":"tiktok"#));
        assert!(json.contains(r#""state":"awaiting_authorization"#));
    }
}
