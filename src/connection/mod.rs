//! Transport lifecycle
//!
//! Owns the WebSocket connection to the controller: connect, send,
//! disconnect, and automatic reconnection. Decoded events feed the session
//! store; user-visible failures feed the notification queue. Nothing here
//! propagates an error past the connection boundary.

mod manager;

pub use manager::{ConnectionManager, LinkState};
