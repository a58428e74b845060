//! Ephemeral user-facing notifications
//!
//! An append-only, self-expiring list of short-lived messages, independent
//! of connection and session state. Failures in the core are visible to the
//! presentation layer through this queue and nowhere else.

mod queue;

pub use queue::{Clock, Notification, NotificationQueue, Severity, SystemClock};
