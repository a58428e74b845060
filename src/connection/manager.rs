//! Controller connection manager
//!
//! Maintains a persistent WebSocket connection to the controller. Handles
//! reconnection with a fixed delay and provides a thread-safe interface for
//! sending commands.
//!
//! The lifecycle is a single authoritative state enum plus one cancellable
//! pending-reconnect handle. `connect()` is an idempotent no-op while an
//! attempt is pending or a connection is open, so overlapping triggers (a
//! manual reconnect while an automatic one is scheduled) can never produce
//! duplicate sockets.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::{frame::coding::CloseCode, CloseFrame, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::notify::{NotificationQueue, Severity};
use crate::protocol::{self, Command};
use crate::session::SessionState;
use crate::types::{LinkError, Result};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Baseline delay before a reconnection attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Transport lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No connection, nothing in flight
    Idle,
    /// A connection attempt is pending
    Connecting,
    /// Connected; commands may be sent
    Open,
    /// A deliberate local close is in progress
    Closing,
}

/// Controller connection manager
pub struct ConnectionManager {
    /// Controller WebSocket URL
    url: String,
    /// Baseline reconnect delay; constant by design, the controller is a
    /// fixed local endpoint
    base_delay: Duration,
    /// Authoritative lifecycle state
    state: RwLock<LinkState>,
    /// Delay for the next scheduled attempt, reset to baseline on success
    current_delay: StdMutex<Duration>,
    /// Write half of the socket while open
    sink: Mutex<Option<WsSink>>,
    /// The single pending reconnect timer; abort-replaced, never stacked
    reconnect: StdMutex<Option<JoinHandle<()>>>,
    /// Set by `disconnect()` so the close handler skips reconnection
    deliberate_close: AtomicBool,
    session: Arc<SessionState>,
    notifications: Arc<NotificationQueue>,
}

impl ConnectionManager {
    /// Create a manager targeting the given controller URL
    pub fn new(
        url: impl Into<String>,
        session: Arc<SessionState>,
        notifications: Arc<NotificationQueue>,
    ) -> Arc<Self> {
        Self::with_reconnect_delay(url, session, notifications, DEFAULT_RECONNECT_DELAY)
    }

    /// Create a manager with a custom reconnect delay
    pub fn with_reconnect_delay(
        url: impl Into<String>,
        session: Arc<SessionState>,
        notifications: Arc<NotificationQueue>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            url: url.into(),
            base_delay: delay,
            state: RwLock::new(LinkState::Idle),
            current_delay: StdMutex::new(delay),
            sink: Mutex::new(None),
            reconnect: StdMutex::new(None),
            deliberate_close: AtomicBool::new(false),
            session,
            notifications,
        })
    }

    /// Current lifecycle state
    pub async fn state(&self) -> LinkState {
        *self.state.read().await
    }

    /// Whether the transport is open
    pub async fn is_connected(&self) -> bool {
        matches!(self.state().await, LinkState::Open)
    }

    /// Start a connection attempt.
    ///
    /// No-op while already Open or Connecting: the check and the transition
    /// happen under one write lock, so redundant calls can never open a
    /// second socket. The attempt itself runs in a spawned task; this call
    /// never blocks on the network.
    pub async fn connect(self: &Arc<Self>) {
        {
            let mut state = self.state.write().await;
            match *state {
                LinkState::Open | LinkState::Connecting => {
                    debug!("connect() ignored, state is {:?}", *state);
                    return;
                }
                _ => *state = LinkState::Connecting,
            }
        }

        self.deliberate_close.store(false, Ordering::SeqCst);
        self.session.set_link(false, true).await;
        info!("Connecting to controller at {}", self.url);

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.run_attempt().await;
        });
    }

    /// Send a command. Requires the transport to be Open; otherwise the
    /// command is dropped and a "not connected" error notification is
    /// appended. No queueing, no retry.
    pub async fn send(&self, command: &Command) -> Result<()> {
        if !self.is_connected().await {
            warn!("Dropping command, not connected: {:?}", command.tag());
            self.notifications
                .push("Cannot send message: Not connected", Severity::Error);
            return Err(LinkError::NotConnected);
        }

        let mut sink = self.sink.lock().await;
        let Some(sink) = sink.as_mut() else {
            self.notifications
                .push("Cannot send message: Not connected", Severity::Error);
            return Err(LinkError::NotConnected);
        };

        let frame = command.encode();
        debug!("Sending frame: {}", frame);
        sink.send(Message::Text(frame)).await.map_err(|e| {
            error!("Failed to send to controller: {}", e);
            self.notifications
                .push("WebSocket connection error", Severity::Error);
            LinkError::Transport(e.to_string())
        })
    }

    /// Deliberately close the connection and suppress auto-reconnection.
    ///
    /// The pending reconnect timer is cancelled before the close is issued,
    /// so no attempt can fire after this returns.
    pub async fn disconnect(&self) {
        // Flag first, then take the timer: schedule_reconnect checks the flag
        // under the same lock, so one of the two always cancels the attempt
        self.deliberate_close.store(true, Ordering::SeqCst);
        if let Some(handle) = self.take_pending_reconnect() {
            handle.abort();
            debug!("Cancelled pending reconnection");
        }

        {
            let mut state = self.state.write().await;
            if *state == LinkState::Open {
                *state = LinkState::Closing;
            }
        }

        if let Some(sink) = self.sink.lock().await.as_mut() {
            let close = Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "client disconnect".into(),
            }));
            let _ = sink.send(close).await;
        }

        *self.state.write().await = LinkState::Idle;
        self.session.set_link(false, false).await;
        info!("Disconnected from controller");
    }

    /// One connection attempt: dial, run the read loop, then either settle
    /// in Idle (deliberate close) or schedule the next attempt.
    async fn run_attempt(self: Arc<Self>) {
        match connect_async(self.url.as_str()).await {
            Ok((ws, _)) => {
                let (mut sink, stream) = ws.split();

                // A disconnect may have landed while the handshake was in
                // flight. Commit to Open only if the attempt is still wanted;
                // otherwise close the fresh socket and stay down.
                {
                    let mut state = self.state.write().await;
                    if self.deliberate_close.load(Ordering::SeqCst)
                        || *state != LinkState::Connecting
                    {
                        drop(state);
                        let close = Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "client disconnect".into(),
                        }));
                        let _ = sink.send(close).await;
                        info!("Discarding socket, disconnect intervened during handshake");
                        return;
                    }
                    *self.sink.lock().await = Some(sink);
                    *state = LinkState::Open;
                }
                *lock_or_recover(&self.current_delay) = self.base_delay;
                self.session.set_link(true, false).await;
                self.notifications
                    .push("Connected to wheelchair controller", Severity::Success);
                info!("Connected to controller");

                // Ask for a full state refresh so the snapshot converges
                if let Err(e) = self.send(&Command::GetStatus).await {
                    warn!("Status request after connect failed: {}", e);
                }

                let normal_close = self.read_loop(stream).await;

                *self.sink.lock().await = None;
                *self.state.write().await = LinkState::Idle;
                self.session.set_link(false, false).await;

                if self.deliberate_close.load(Ordering::SeqCst) || normal_close {
                    info!("Connection closed, not reconnecting");
                } else {
                    self.notifications.push(
                        "Connection lost. Attempting to reconnect...",
                        Severity::Error,
                    );
                    self.schedule_reconnect();
                }
            }
            Err(e) => {
                error!("Failed to connect to controller: {}", e);
                *self.state.write().await = LinkState::Idle;
                self.session.set_link(false, false).await;

                if self.deliberate_close.load(Ordering::SeqCst) {
                    return;
                }
                self.notifications
                    .push("WebSocket connection error", Severity::Error);
                self.schedule_reconnect();
            }
        }
    }

    /// Consume inbound frames until the connection ends. Returns whether the
    /// peer closed with a normal-closure code.
    async fn read_loop(&self, mut stream: WsStream) -> bool {
        let mut normal_close = false;

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    // Undecodable frames are dropped silently; the transport
                    // may carry frames this layer does not own
                    if let Some(event) = protocol::decode(&text) {
                        if let Some((message, severity)) = self.session.handle(&event).await {
                            self.notifications.push(message, severity);
                        }
                    }
                }
                Ok(Message::Ping(data)) => {
                    if let Some(sink) = self.sink.lock().await.as_mut() {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                }
                Ok(Message::Close(frame)) => {
                    normal_close =
                        matches!(&frame, Some(f) if f.code == CloseCode::Normal);
                    info!("Controller closed connection: {:?}", frame);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Controller WebSocket error: {}", e);
                    self.notifications
                        .push("WebSocket connection error", Severity::Error);
                    break;
                }
            }
        }

        normal_close
    }

    /// Replace any pending reconnect timer with a fresh one. A new close
    /// event cancels the previous timer instead of stacking attempts, and a
    /// deliberate disconnect wins over a concurrently scheduled attempt: the
    /// flag is checked under the timer lock and again when the timer fires.
    fn schedule_reconnect(self: &Arc<Self>) {
        let delay = *lock_or_recover(&self.current_delay);

        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if manager.deliberate_close.load(Ordering::SeqCst) {
                debug!("Reconnect timer fired after deliberate disconnect, ignoring");
                return;
            }
            manager.connect().await;
        });

        let mut pending = lock_or_recover(&self.reconnect);
        if self.deliberate_close.load(Ordering::SeqCst) {
            handle.abort();
            debug!("Reconnect cancelled, disconnect intervened");
            return;
        }
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(handle);
        warn!("Reconnecting to controller in {:?}...", delay);
    }

    fn take_pending_reconnect(&self) -> Option<JoinHandle<()>> {
        lock_or_recover(&self.reconnect).take()
    }
}

/// Lock a std mutex, recovering from poisoning. The guarded values are plain
/// data; a panicked holder cannot leave them inconsistent.
fn lock_or_recover<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
