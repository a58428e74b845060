//! Session state: the canonical client-side view of the controller
//!
//! The snapshot is a single record replaced immutably on each transition, so
//! no consumer ever observes a partially-applied event. The last head
//! direction lives beside the snapshot rather than inside it: it changes at
//! a much higher rate and consumers legitimately want it alone.

mod store;
mod transition;

pub use store::SessionState;
pub use transition::{apply, Transition};

use serde::Serialize;

/// Default place catalog until the controller sends an INIT refresh
const DEFAULT_ROOMS: [&str; 4] = ["Kitchen", "Bedroom", "Living Room", "Restroom"];

/// The controller's top-level operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Stop,
    Wheelchair,
    Place,
}

impl Mode {
    /// Parse a wire-format mode string. Unknown or absent values coerce to
    /// STOP: the safe mode is the only defensible default for a mobility
    /// controller.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("WHEELCHAIR") => Mode::Wheelchair,
            Some("PLACE") => Mode::Place,
            _ => Mode::Stop,
        }
    }

    /// The wire-format name of this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Stop => "STOP",
            Mode::Wheelchair => "WHEELCHAIR",
            Mode::Place => "PLACE",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last reported head direction, updated only by movement events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HeadDirection {
    #[default]
    Stop,
    Forward,
    Backward,
    Left,
    Right,
}

impl HeadDirection {
    /// Parse a wire-format direction string, coercing unknowns to STOP
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("FORWARD") => HeadDirection::Forward,
            Some("BACKWARD") => HeadDirection::Backward,
            Some("LEFT") => HeadDirection::Left,
            Some("RIGHT") => HeadDirection::Right,
            _ => HeadDirection::Stop,
        }
    }

    /// The wire-format name of this direction
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadDirection::Stop => "STOP",
            HeadDirection::Forward => "FORWARD",
            HeadDirection::Backward => "BACKWARD",
            HeadDirection::Left => "LEFT",
            HeadDirection::Right => "RIGHT",
        }
    }
}

/// Complete, consistent record of controller state as understood by the
/// client. Cheap to clone; replaced wholesale on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Transport is open
    pub connected: bool,
    /// A connection attempt is in flight
    pub connecting: bool,
    /// Current operating mode
    pub mode: Mode,
    /// Place catalog, replaceable only via INIT
    pub rooms: Vec<String>,
    /// Cursor-highlighted room; `None` whenever mode is not PLACE-capable
    pub highlight: Option<String>,
    /// Confirmed destination; same null-on-STOP rule as `highlight`
    pub selected: Option<String>,
    pub battery_percentage: f64,
    pub motor_speed: f64,
    /// Conventionally in [0, 1]
    pub movement_intensity: f64,
    pub total_distance: f64,
    /// Seconds; monotonic unless explicitly reset
    pub session_time: f64,
    /// Remote peer's last reported detection-active status
    pub face_tracking: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            connected: false,
            connecting: false,
            mode: Mode::Stop,
            rooms: DEFAULT_ROOMS.iter().map(|s| s.to_string()).collect(),
            highlight: None,
            selected: None,
            battery_percentage: 85.0,
            motor_speed: 0.0,
            movement_intensity: 0.0,
            total_distance: 0.0,
            session_time: 0.0,
            face_tracking: false,
        }
    }
}
