//! Broadcast bus carrying a fresh snapshot after every controller mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::lifecycle::LifecycleSnapshot;
use crate::request::RequestSnapshot;

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StateEvent {
    LifecycleChanged {
        snapshot: LifecycleSnapshot,
        timestamp: DateTime<Utc>,
    },
    RequestChanged {
        snapshot: RequestSnapshot,
        timestamp: DateTime<Utc>,
    },
}

impl StateEvent {
    pub fn lifecycle(snapshot: LifecycleSnapshot) -> Self {
        Self::LifecycleChanged {
            snapshot,
            timestamp: Utc::now(),
        }
    }

    pub fn request(snapshot: RequestSnapshot) -> Self {
        Self::RequestChanged {
            snapshot,
            timestamp: Utc::now(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::LifecycleChanged { timestamp, .. } => *timestamp,
            Self::RequestChanged { timestamp, .. } => *timestamp,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LifecycleChanged { .. } => "lifecycle.changed",
            Self::RequestChanged { .. } => "request.changed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StateEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.tx.subscribe()
    }

    pub fn emit_lifecycle(&self, snapshot: LifecycleSnapshot) {
        // No subscribers is fine: snapshots stay readable from the controllers.
        let _ = self.tx.send(StateEvent::lifecycle(snapshot));
    }

    pub fn emit_request(&self, snapshot: RequestSnapshot) {
        let _ = self.tx.send(StateEvent::request(snapshot));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
