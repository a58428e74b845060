//! Chairlink - client core for an assistive-mobility controller
//!
//! Maintains a synchronized view of a remote wheelchair controller's state
//! (operating mode, navigation targets, motion telemetry) over a persistent
//! WebSocket connection, and relays user commands back to the controller.
//!
//! ## Components
//!
//! - **Protocol**: tagged JSON event codec (decode inbound, encode outbound)
//! - **Session**: canonical state snapshot and the per-event transition rules
//! - **Notify**: self-expiring queue of short-lived user-facing messages
//! - **Connection**: transport lifecycle with automatic reconnection
//! - **Dispatch**: user intents mapped to outbound controller commands

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod notify;
pub mod protocol;
pub mod session;
pub mod types;

pub use config::Args;
pub use connection::{ConnectionManager, LinkState};
pub use dispatch::CommandDispatcher;
pub use notify::{Notification, NotificationQueue, Severity};
pub use session::{HeadDirection, Mode, SessionState, Snapshot};
pub use types::{LinkError, Result};
