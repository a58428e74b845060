//! Inbound event decoding
//!
//! Every received frame is an envelope `{event: <tag>, payload?: <object>}`.
//! Malformed or non-JSON frames decode to `None` and are dropped silently:
//! the transport may carry out-of-band or partial frames this layer does not
//! own. Unknown tags decode to [`ControllerEvent::Unrecognized`] so that
//! forward-compatible peers never break the session.
//!
//! Payload structs are all-optional and defaulted, so a partial payload never
//! fails the decode; the transition rules decide each field's fallback.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Raw inbound envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Option<Value>,
}

/// Payload of an INIT event (full state refresh from the controller)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InitPayload {
    pub rooms: Option<Vec<String>>,
    pub highlight: Option<String>,
    pub mode: Option<String>,
}

/// Payload of a MODE_CHANGE event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModeChangePayload {
    pub mode: Option<String>,
}

/// Payload of a NOSE_MOVE event (high-rate motion telemetry)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoseMovePayload {
    pub direction: Option<String>,
    pub motor_speed: Option<f64>,
    pub movement_intensity: Option<f64>,
    pub battery_percentage: Option<f64>,
    pub total_distance: Option<f64>,
    pub session_time: Option<f64>,
}

/// Payload of PLACE_HIGHLIGHT and PLACE_SELECT events
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlacePayload {
    pub place: Option<String>,
}

/// Payload of a SYSTEM_STATUS event (periodic telemetry broadcast)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemStatusPayload {
    pub battery_percentage: Option<f64>,
    pub motor_speed: Option<f64>,
    pub total_distance: Option<f64>,
    pub session_time: Option<f64>,
    pub face_tracking: Option<bool>,
}

/// Payload of a TRACKING event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackingPayload {
    pub status: Option<String>,
}

/// Payload of a FACE_STATUS event (remote face-detection result)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FaceStatusPayload {
    pub active: Option<bool>,
    /// Number of faces the detector saw; informational only
    pub faces: Option<u32>,
}

/// Payload of a BLINK_EVENT event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlinkPayload {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub blink_type: Option<String>,
    pub action: Option<String>,
}

/// Payload of an ERROR event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorPayload {
    pub message: Option<String>,
}

/// A decoded inbound event from the controller
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    Init(InitPayload),
    ModeChange(ModeChangePayload),
    NoseMove(NoseMovePayload),
    PlaceHighlight(PlacePayload),
    PlaceSelect(PlacePayload),
    SystemReset,
    SystemStatus(SystemStatusPayload),
    Tracking(TrackingPayload),
    Calibrated,
    CalibratedNose,
    FaceStatus(FaceStatusPayload),
    BlinkEvent(BlinkPayload),
    Error(ErrorPayload),
    /// Echo of a command frame; log-only
    Command,
    /// Unknown tag; log-only, never fatal
    Unrecognized(String),
}

/// Decode a raw text frame into a tagged event.
///
/// Returns `None` for malformed frames and for frames without an `event`
/// tag — both are dropped without surfacing an error.
pub fn decode(raw: &str) -> Option<ControllerEvent> {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(env) => env,
        Err(e) => {
            debug!("Dropping undecodable frame: {}", e);
            return None;
        }
    };

    let payload = envelope.payload.unwrap_or(Value::Null);

    let event = match envelope.event.as_str() {
        "INIT" => ControllerEvent::Init(parse_payload(payload)),
        "MODE_CHANGE" => ControllerEvent::ModeChange(parse_payload(payload)),
        "NOSE_MOVE" => ControllerEvent::NoseMove(parse_payload(payload)),
        "PLACE_HIGHLIGHT" => ControllerEvent::PlaceHighlight(parse_payload(payload)),
        "PLACE_SELECT" => ControllerEvent::PlaceSelect(parse_payload(payload)),
        "SYSTEM_RESET" => ControllerEvent::SystemReset,
        "SYSTEM_STATUS" => ControllerEvent::SystemStatus(parse_payload(payload)),
        "TRACKING" => ControllerEvent::Tracking(parse_payload(payload)),
        "CALIBRATED" => ControllerEvent::Calibrated,
        "CALIBRATED_NOSE" => ControllerEvent::CalibratedNose,
        "FACE_STATUS" => ControllerEvent::FaceStatus(parse_payload(payload)),
        "BLINK_EVENT" => ControllerEvent::BlinkEvent(parse_payload(payload)),
        "ERROR" => ControllerEvent::Error(parse_payload(payload)),
        "COMMAND" => ControllerEvent::Command,
        other => ControllerEvent::Unrecognized(other.to_string()),
    };

    Some(event)
}

/// Parse a payload object into its struct, falling back to defaults when the
/// payload is missing or the wrong shape. The wire format is loosely typed;
/// the transition table owns the per-field fallback rules.
fn parse_payload<T: serde::de::DeserializeOwned + Default>(payload: Value) -> T {
    serde_json::from_value(payload).unwrap_or_default()
}
