//! Chairlink - client core for an assistive-mobility controller
//!
//! Connects to the controller, keeps the session snapshot synchronized, and
//! logs state changes and notifications. Rendering is someone else's job;
//! this binary is the headless core plus a trace of what a UI would show.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chairlink::{
    Args, CommandDispatcher, ConnectionManager, NotificationQueue, SessionState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("chairlink={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Chairlink - controller client core");
    info!("======================================");
    info!("Controller: {}", args.controller_url);
    info!("Reconnect delay: {:?}", args.reconnect_delay());
    info!("Notification TTL: {:?}", args.notification_ttl());
    info!("======================================");

    let session = SessionState::new();
    let notifications = NotificationQueue::with_clock(
        args.notification_ttl(),
        Arc::new(chairlink::notify::SystemClock),
    );
    let connection = ConnectionManager::with_reconnect_delay(
        args.controller_url.clone(),
        Arc::clone(&session),
        Arc::clone(&notifications),
        args.reconnect_delay(),
    );
    let _dispatcher = CommandDispatcher::new(Arc::clone(&connection));

    connection.connect().await;

    // Trace snapshot changes and live notifications until ctrl-c
    let mut last_snapshot = session.snapshot().await;
    let mut shown = std::collections::HashSet::new();
    let display_cap = args.notification_display_cap;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                connection.disconnect().await;
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                let snapshot = session.snapshot().await;
                if snapshot != last_snapshot {
                    info!(
                        "mode={} connected={} highlight={:?} selected={:?} battery={:.1}% speed={:.1}",
                        snapshot.mode,
                        snapshot.connected,
                        snapshot.highlight,
                        snapshot.selected,
                        snapshot.battery_percentage,
                        snapshot.motor_speed,
                    );
                    last_snapshot = snapshot;
                }

                for notification in notifications.recent(display_cap) {
                    if shown.insert(notification.id) {
                        info!("[{:?}] {}", notification.severity, notification.message);
                    }
                }
            }
        }
    }

    Ok(())
}
