//! Notification queue with deadline-based expiry
//!
//! Each entry carries a deadline computed at push time; expiry is a sweep
//! performed on any access rather than a timer per entry, which keeps the
//! queue testable without wall-clock waits. The clock is injected for the
//! same reason.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Display window for a notification before automatic removal
pub const DEFAULT_TTL: Duration = Duration::from_millis(4000);

/// Notification severity, mapped by the presentation layer to styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A single user-facing message
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
}

struct Entry {
    notification: Notification,
    deadline: Instant,
}

/// Time source for expiry deadlines
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Self-expiring notification queue
///
/// Entries are never mutated, only appended and removed. `remove` is
/// idempotent. The queue retains all active entries; "show only the N most
/// recent" is a read-side display policy, see [`NotificationQueue::recent`].
pub struct NotificationQueue {
    entries: Mutex<Vec<Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl NotificationQueue {
    /// Create a queue with the default 4-second display window
    pub fn new() -> Arc<Self> {
        Self::with_clock(DEFAULT_TTL, Arc::new(SystemClock))
    }

    /// Create a queue with a custom TTL and clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            ttl,
            clock,
        })
    }

    /// Append a message, returning its id. Schedules removal after the TTL.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let id = Uuid::new_v4();
        let now = self.clock.now();

        let mut entries = self.lock_entries();
        entries.retain(|e| e.deadline > now);
        entries.push(Entry {
            notification: Notification {
                id,
                message: message.into(),
                severity,
            },
            deadline: now + self.ttl,
        });
        id
    }

    /// Dismiss a notification. Removing an already-removed id is a no-op.
    pub fn remove(&self, id: Uuid) {
        let mut entries = self.lock_entries();
        entries.retain(|e| e.notification.id != id);
    }

    /// All active (non-expired) notifications, oldest first
    pub fn active(&self) -> Vec<Notification> {
        let now = self.clock.now();
        let mut entries = self.lock_entries();
        entries.retain(|e| e.deadline > now);
        entries.iter().map(|e| e.notification.clone()).collect()
    }

    /// The `count` most recent active notifications (display truncation)
    pub fn recent(&self, count: usize) -> Vec<Notification> {
        let active = self.active();
        let skip = active.len().saturating_sub(count);
        active.into_iter().skip(skip).collect()
    }

    /// Number of active entries
    pub fn len(&self) -> usize {
        self.active().len()
    }

    /// Whether any active entries remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries are plain data; recover the lock if a holder panicked
    fn lock_entries(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Manually advanced clock for expiry tests
    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Instant::now()),
            })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[test]
    fn test_push_then_remove() {
        let queue = NotificationQueue::new();
        let id = queue.push("Connected", Severity::Success);

        assert_eq!(queue.len(), 1);
        queue.remove(id);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let queue = NotificationQueue::new();
        queue.push("hello", Severity::Info);

        queue.remove(Uuid::new_v4());
        assert_eq!(queue.len(), 1);

        // Removing twice is equally harmless
        let id = queue.push("again", Severity::Info);
        queue.remove(id);
        queue.remove(id);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let clock = ManualClock::new();
        let queue = NotificationQueue::with_clock(Duration::from_millis(4000), clock.clone());

        queue.push("first", Severity::Info);
        clock.advance(Duration::from_millis(3999));
        assert_eq!(queue.len(), 1);

        clock.advance(Duration::from_millis(1));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_expiry_is_per_entry() {
        let clock = ManualClock::new();
        let queue = NotificationQueue::with_clock(Duration::from_millis(4000), clock.clone());

        queue.push("old", Severity::Info);
        clock.advance(Duration::from_millis(3000));
        queue.push("new", Severity::Info);
        clock.advance(Duration::from_millis(1500));

        let active = queue.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "new");
    }

    #[test]
    fn test_recent_truncates_oldest_first() {
        let queue = NotificationQueue::new();
        for i in 0..5 {
            queue.push(format!("msg-{}", i), Severity::Info);
        }

        let shown = queue.recent(3);
        assert_eq!(shown.len(), 3);
        assert_eq!(shown[0].message, "msg-2");
        assert_eq!(shown[2].message, "msg-4");

        // The queue itself retains everything active
        assert_eq!(queue.len(), 5);
    }

    #[test]
    fn test_severity_preserved() {
        let queue = NotificationQueue::new();
        queue.push("bad", Severity::Error);
        assert_eq!(queue.active()[0].severity, Severity::Error);
    }
}
