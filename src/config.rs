//! Configuration for chairlink
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::time::Duration;

/// Chairlink - assistive-mobility controller client
#[derive(Parser, Debug, Clone)]
#[command(name = "chairlink")]
#[command(about = "Client core for an assistive-mobility controller dashboard")]
pub struct Args {
    /// Controller WebSocket URL
    #[arg(long, env = "CONTROLLER_URL", default_value = "ws://localhost:8765/ws")]
    pub controller_url: String,

    /// Delay before a reconnection attempt after a connection failure, in
    /// milliseconds. Constant by design: the controller is a fixed local
    /// endpoint and bounded reconnection latency matters more than backoff
    /// growth.
    #[arg(long, env = "RECONNECT_DELAY_MS", default_value = "2000")]
    pub reconnect_delay_ms: u64,

    /// Notification display window in milliseconds
    #[arg(long, env = "NOTIFICATION_TTL_MS", default_value = "4000")]
    pub notification_ttl_ms: u64,

    /// How many recent notifications the presentation layer shows at once
    #[arg(long, env = "NOTIFICATION_DISPLAY_CAP", default_value = "3")]
    pub notification_display_cap: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Reconnect delay as a Duration
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Notification time-to-live as a Duration
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.controller_url.starts_with("ws://") && !self.controller_url.starts_with("wss://") {
            return Err(format!(
                "CONTROLLER_URL must be a ws:// or wss:// URL, got {}",
                self.controller_url
            ));
        }

        if self.reconnect_delay_ms == 0 {
            return Err("RECONNECT_DELAY_MS must be greater than zero".to_string());
        }

        if self.notification_ttl_ms == 0 {
            return Err("NOTIFICATION_TTL_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Args {
        Args::parse_from(["chairlink"])
    }

    #[test]
    fn test_defaults_valid() {
        let args = defaults();
        assert!(args.validate().is_ok());
        assert_eq!(args.reconnect_delay(), Duration::from_millis(2000));
        assert_eq!(args.notification_ttl(), Duration::from_millis(4000));
        assert_eq!(args.notification_display_cap, 3);
    }

    #[test]
    fn test_rejects_non_websocket_url() {
        let mut args = defaults();
        args.controller_url = "http://localhost:8765".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_delay() {
        let mut args = defaults();
        args.reconnect_delay_ms = 0;
        assert!(args.validate().is_err());
    }
}
