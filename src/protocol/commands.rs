//! Outbound command encoding
//!
//! Commands are the fixed envelope `{event: <tag>}`. Encoding is pure and
//! total: every command is representable, there is no failure path.

use serde::Serialize;
use serde_json::{json, Value};

/// A user-initiated command for the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Request a full state refresh
    GetStatus,
    /// Calibrate head tracking
    Calibrate,
    /// Calibrate the nose-center reference point
    CalibrateNose,
    /// Calibrate eye tracking
    CalibrateEyes,
    /// Reset the place catalog on the controller
    ResetPlaces,
    /// Escape hatch: arbitrary out-of-band frame (e.g. capture data)
    Raw(Value),
}

impl Command {
    /// The wire tag for fixed commands; `None` for raw frames
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Command::GetStatus => Some("GET_STATUS"),
            Command::Calibrate => Some("CALIBRATE"),
            Command::CalibrateNose => Some("CALIBRATE_NOSE"),
            Command::CalibrateEyes => Some("CALIBRATE_EYES"),
            Command::ResetPlaces => Some("RESET_PLACES"),
            Command::Raw(_) => None,
        }
    }

    /// Encode the command as a text frame
    pub fn encode(&self) -> String {
        match self {
            Command::Raw(value) => value.to_string(),
            fixed => json!({ "event": fixed.tag() }).to_string(),
        }
    }
}

/// Out-of-band still-image frame forwarded for remote analysis.
///
/// The capture collaborator sends one of these nominally every 200 ms; the
/// detection result returns as a regular FACE_STATUS event.
#[derive(Debug, Clone, Serialize)]
pub struct CameraFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    /// JPEG still as a base64 data URL
    pub image: String,
    /// Capture time, epoch milliseconds
    pub timestamp: u64,
}

impl CameraFrame {
    /// Build a camera frame from raw JPEG bytes
    pub fn from_jpeg(jpeg: &[u8], timestamp: u64) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};
        Self {
            frame_type: "camera_frame".to_string(),
            image: format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)),
            timestamp,
        }
    }

    /// Wrap the frame as a raw command for transmission
    pub fn into_command(self) -> Command {
        // Serialize of a plain struct with string/number fields cannot fail
        Command::Raw(serde_json::to_value(self).unwrap_or(Value::Null))
    }
}
