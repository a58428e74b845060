//! Command dispatch
//!
//! Stateless pass-through from user intents to outbound controller frames.
//! This is the only way the presentation layer influences the controller;
//! every method encodes via the protocol codec and hands the frame to the
//! connection manager. Commands issued while disconnected are dropped and
//! surfaced as an error notification by the manager, never queued.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::connection::ConnectionManager;
use crate::protocol::{CameraFrame, Command};
use crate::types::Result;

/// Maps user intents to outbound protocol commands
pub struct CommandDispatcher {
    connection: Arc<ConnectionManager>,
}

impl CommandDispatcher {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }

    /// Request a full state refresh from the controller
    pub async fn get_status(&self) -> Result<()> {
        self.connection.send(&Command::GetStatus).await
    }

    /// Start head calibration
    pub async fn calibrate(&self) -> Result<()> {
        self.connection.send(&Command::Calibrate).await
    }

    /// Start nose-center calibration
    pub async fn calibrate_nose(&self) -> Result<()> {
        self.connection.send(&Command::CalibrateNose).await
    }

    /// Start eye-tracking calibration
    pub async fn calibrate_eyes(&self) -> Result<()> {
        self.connection.send(&Command::CalibrateEyes).await
    }

    /// Reset the controller's place catalog
    pub async fn reset_places(&self) -> Result<()> {
        self.connection.send(&Command::ResetPlaces).await
    }

    /// Escape hatch for out-of-band frames that do not affect the snapshot
    pub async fn send_raw(&self, value: serde_json::Value) -> Result<()> {
        self.connection.send(&Command::Raw(value)).await
    }

    /// Forward a captured still for remote face analysis. The detection
    /// result comes back as a regular FACE_STATUS event.
    pub async fn forward_camera_frame(&self, jpeg: &[u8]) -> Result<()> {
        let timestamp = epoch_millis();
        debug!("Forwarding camera frame ({} bytes)", jpeg.len());
        let frame = CameraFrame::from_jpeg(jpeg, timestamp);
        self.connection.send(&frame.into_command()).await
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
