//! Shared session store
//!
//! Owns the snapshot and the last head direction behind locks, applying
//! transitions so that every swap is whole: a reader sees either the state
//! before an event or the state after it, never a mix.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::{apply, HeadDirection, Snapshot};
use crate::notify::Severity;
use crate::protocol::ControllerEvent;

/// Thread-safe owner of the canonical session snapshot
pub struct SessionState {
    snapshot: RwLock<Snapshot>,
    direction: RwLock<HeadDirection>,
}

impl SessionState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            snapshot: RwLock::new(Snapshot::default()),
            direction: RwLock::new(HeadDirection::Stop),
        })
    }

    /// Current snapshot (cloned; the stored record is immutable per version)
    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    /// Last reported head direction
    pub async fn direction(&self) -> HeadDirection {
        *self.direction.read().await
    }

    /// Apply one decoded event, returning the notification it produced, if
    /// any. Both locks are held across the swap so the pair stays coherent.
    pub async fn handle(&self, event: &ControllerEvent) -> Option<(String, Severity)> {
        let mut snapshot = self.snapshot.write().await;
        let mut direction = self.direction.write().await;

        let transition = apply(&snapshot, *direction, event);
        *snapshot = transition.snapshot;
        *direction = transition.direction;
        transition.notification
    }

    /// Record the transport lifecycle phase in the snapshot
    pub async fn set_link(&self, connected: bool, connecting: bool) {
        let mut snapshot = self.snapshot.write().await;
        let mut next = snapshot.clone();
        next.connected = connected;
        next.connecting = connecting;
        *snapshot = next;
    }
}
