//! Outbound notifications for presentation and audio layers.
//!
//! The engine never calls into other subsystems. Anything a host may want to
//! react to (a new rep, a phase change, a message worth saying aloud) is
//! published on a broadcast channel instead.

use formcheck_core::{ExercisePhase, FeedbackItem, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    PhaseChanged {
        from: ExercisePhase,
        to: ExercisePhase,
        at: Timestamp,
    },
    RepCompleted {
        count: u32,
        at: Timestamp,
    },
    /// Top feedback items of a finished analysis cycle
    FeedbackUpdated { items: Vec<FeedbackItem> },
    /// A message suitable for speech output
    Announce { message: String },
    Reset,
}

/// Broadcast publisher shared by all subscribers of one engine
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Publish without blocking. Having no subscribers is not an error.
    pub fn publish(&self, event: EngineEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("event dropped, no subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
