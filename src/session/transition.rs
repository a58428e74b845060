//! Per-event transition rules
//!
//! One explicit, total rule per event tag: every snapshot field has a
//! default-or-unchanged rule, so a partial payload never produces an
//! undefined snapshot. All unlisted fields pass through unchanged.

use tracing::debug;

use super::{HeadDirection, Mode, Snapshot};
use crate::notify::Severity;
use crate::protocol::ControllerEvent;

/// Result of applying one event: the next snapshot and direction, plus an
/// optional user-facing message.
#[derive(Debug, Clone)]
pub struct Transition {
    pub snapshot: Snapshot,
    pub direction: HeadDirection,
    pub notification: Option<(String, Severity)>,
}

/// Apply one decoded event to the current state.
///
/// Pure function: no I/O, no clock, no locks. The caller owns atomicity.
pub fn apply(snapshot: &Snapshot, direction: HeadDirection, event: &ControllerEvent) -> Transition {
    let mut next = snapshot.clone();
    let mut next_direction = direction;
    let mut notification = None;

    match event {
        ControllerEvent::Init(p) => {
            if let Some(rooms) = &p.rooms {
                next.rooms = rooms.clone();
            }
            if let Some(highlight) = &p.highlight {
                next.highlight = Some(highlight.clone());
            }
            next.mode = Mode::parse(p.mode.as_deref());
            // A refresh always invalidates any previously confirmed choice
            next.selected = None;
        }

        ControllerEvent::ModeChange(p) => {
            let new_mode = Mode::parse(p.mode.as_deref());
            next.mode = new_mode;
            if new_mode == Mode::Stop {
                next.highlight = None;
                next.selected = None;
            }
            if new_mode != Mode::Wheelchair {
                next_direction = HeadDirection::Stop;
            }
            notification = Some((format!("Mode changed to {}", new_mode), Severity::Info));
        }

        ControllerEvent::NoseMove(p) => {
            next_direction = HeadDirection::parse(p.direction.as_deref());
            next.motor_speed = p.motor_speed.unwrap_or(0.0);
            next.movement_intensity = p.movement_intensity.unwrap_or(0.0);
            next.battery_percentage = p.battery_percentage.unwrap_or(0.0);
            // Accumulators keep their last value when the field is absent
            next.total_distance = p.total_distance.unwrap_or(snapshot.total_distance);
            next.session_time = p.session_time.unwrap_or(snapshot.session_time);
        }

        ControllerEvent::PlaceHighlight(p) => {
            next.highlight = p.place.clone();
        }

        ControllerEvent::PlaceSelect(p) => {
            next.selected = p.place.clone();
            let name = p.place.as_deref().unwrap_or("none");
            notification = Some((format!("Selected: {}", name), Severity::Info));
        }

        ControllerEvent::SystemReset => {
            next.mode = Mode::Stop;
            next.highlight = None;
            next.selected = None;
            next.motor_speed = 0.0;
            next.movement_intensity = 0.0;
            next_direction = HeadDirection::Stop;
            notification = Some(("System reset to STOP mode".to_string(), Severity::Info));
        }

        ControllerEvent::SystemStatus(p) => {
            next.battery_percentage = p.battery_percentage.unwrap_or(snapshot.battery_percentage);
            next.motor_speed = p.motor_speed.unwrap_or(snapshot.motor_speed);
            next.total_distance = p.total_distance.unwrap_or(snapshot.total_distance);
            next.session_time = p.session_time.unwrap_or(snapshot.session_time);
            // Unlike the telemetry fields, tracking status defaults to false
            next.face_tracking = p.face_tracking.unwrap_or(false);
        }

        ControllerEvent::Tracking(p) => {
            if p.status.as_deref() == Some("lost") {
                notification = Some(("Face tracking lost".to_string(), Severity::Error));
            }
        }

        ControllerEvent::Calibrated => {
            notification = Some((
                "Head calibrated successfully".to_string(),
                Severity::Success,
            ));
        }

        ControllerEvent::CalibratedNose => {
            notification = Some((
                "Nose center calibrated successfully".to_string(),
                Severity::Success,
            ));
        }

        ControllerEvent::FaceStatus(p) => {
            next.face_tracking = p.active.unwrap_or(false);
            if let Some(faces) = p.faces {
                debug!("Face detection reported {} face(s)", faces);
            }
        }

        ControllerEvent::BlinkEvent(p) => {
            if let Some(message) = &p.message {
                let severity = if p.blink_type.as_deref() == Some("long") {
                    Severity::Error
                } else if p.action.as_deref() == Some("select_place") {
                    Severity::Success
                } else {
                    Severity::Info
                };
                notification = Some((message.clone(), severity));
            }
        }

        ControllerEvent::Error(p) => {
            let message = p
                .message
                .clone()
                .unwrap_or_else(|| "An error occurred".to_string());
            notification = Some((message, Severity::Error));
        }

        ControllerEvent::Command => {
            debug!("Command echo received");
        }

        ControllerEvent::Unrecognized(tag) => {
            debug!("Ignoring unrecognized event tag: {}", tag);
        }
    }

    Transition {
        snapshot: next,
        direction: next_direction,
        notification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode;

    fn event(raw: &str) -> ControllerEvent {
        decode(raw).expect("test frame must decode")
    }

    fn apply_raw(snapshot: &Snapshot, direction: HeadDirection, raw: &str) -> Transition {
        apply(snapshot, direction, &event(raw))
    }

    #[test]
    fn test_init_replaces_rooms_and_clears_selected() {
        let mut snap = Snapshot::default();
        snap.selected = Some("Bedroom".to_string());

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"INIT","payload":{"rooms":["Kitchen","Bedroom"],"mode":"STOP"}}"#,
        );

        assert_eq!(t.snapshot.rooms, vec!["Kitchen", "Bedroom"]);
        assert_eq!(t.snapshot.mode, Mode::Stop);
        assert!(t.snapshot.selected.is_none());
        assert!(t.notification.is_none());
    }

    #[test]
    fn test_init_without_rooms_keeps_catalog() {
        let snap = Snapshot::default();
        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"INIT","payload":{"mode":"WHEELCHAIR"}}"#,
        );
        assert_eq!(t.snapshot.rooms, snap.rooms);
        assert_eq!(t.snapshot.mode, Mode::Wheelchair);
    }

    #[test]
    fn test_init_missing_mode_defaults_stop() {
        let mut snap = Snapshot::default();
        snap.mode = Mode::Place;
        let t = apply_raw(&snap, HeadDirection::Stop, r#"{"event":"INIT"}"#);
        assert_eq!(t.snapshot.mode, Mode::Stop);
    }

    #[test]
    fn test_mode_change_to_stop_clears_places() {
        let mut snap = Snapshot::default();
        snap.mode = Mode::Place;
        snap.highlight = Some("Kitchen".to_string());
        snap.selected = Some("Bedroom".to_string());

        let t = apply_raw(
            &snap,
            HeadDirection::Left,
            r#"{"event":"MODE_CHANGE","payload":{"mode":"STOP"}}"#,
        );

        assert_eq!(t.snapshot.mode, Mode::Stop);
        assert!(t.snapshot.highlight.is_none());
        assert!(t.snapshot.selected.is_none());
        assert_eq!(t.direction, HeadDirection::Stop);
        let (msg, sev) = t.notification.unwrap();
        assert_eq!(msg, "Mode changed to STOP");
        assert_eq!(sev, Severity::Info);
    }

    #[test]
    fn test_mode_change_to_place_keeps_prior_places() {
        let mut snap = Snapshot::default();
        snap.highlight = Some("Kitchen".to_string());
        snap.selected = Some("Bedroom".to_string());

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"MODE_CHANGE","payload":{"mode":"PLACE"}}"#,
        );

        // Only the transition into STOP clears highlight/selected
        assert_eq!(t.snapshot.highlight.as_deref(), Some("Kitchen"));
        assert_eq!(t.snapshot.selected.as_deref(), Some("Bedroom"));
    }

    #[test]
    fn test_mode_change_away_from_wheelchair_stops_direction() {
        let snap = Snapshot::default();
        let t = apply_raw(
            &snap,
            HeadDirection::Forward,
            r#"{"event":"MODE_CHANGE","payload":{"mode":"PLACE"}}"#,
        );
        assert_eq!(t.direction, HeadDirection::Stop);

        let t = apply_raw(
            &snap,
            HeadDirection::Forward,
            r#"{"event":"MODE_CHANGE","payload":{"mode":"WHEELCHAIR"}}"#,
        );
        assert_eq!(t.direction, HeadDirection::Forward);
    }

    #[test]
    fn test_mode_change_unknown_mode_coerces_stop() {
        let snap = Snapshot::default();
        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"MODE_CHANGE","payload":{"mode":"HOVERBOARD"}}"#,
        );
        assert_eq!(t.snapshot.mode, Mode::Stop);
    }

    #[test]
    fn test_nose_move_updates_direction_and_telemetry() {
        let mut snap = Snapshot::default();
        snap.mode = Mode::Wheelchair;

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"NOSE_MOVE","payload":{"direction":"LEFT","motor_speed":42}}"#,
        );

        assert_eq!(t.direction, HeadDirection::Left);
        assert_eq!(t.snapshot.motor_speed, 42.0);
        // Absent instantaneous fields zero out
        assert_eq!(t.snapshot.movement_intensity, 0.0);
        assert_eq!(t.snapshot.battery_percentage, 0.0);
    }

    #[test]
    fn test_nose_move_never_regresses_accumulators() {
        let mut snap = Snapshot::default();
        snap.total_distance = 120.5;
        snap.session_time = 300.0;

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"NOSE_MOVE","payload":{"direction":"FORWARD"}}"#,
        );

        assert_eq!(t.snapshot.total_distance, 120.5);
        assert_eq!(t.snapshot.session_time, 300.0);
    }

    #[test]
    fn test_place_highlight_sets_and_clears() {
        let snap = Snapshot::default();
        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"PLACE_HIGHLIGHT","payload":{"place":"Kitchen"}}"#,
        );
        assert_eq!(t.snapshot.highlight.as_deref(), Some("Kitchen"));

        let t = apply_raw(&t.snapshot, HeadDirection::Stop, r#"{"event":"PLACE_HIGHLIGHT"}"#);
        assert!(t.snapshot.highlight.is_none());
    }

    #[test]
    fn test_place_select_notifies() {
        let snap = Snapshot::default();
        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"PLACE_SELECT","payload":{"place":"Restroom"}}"#,
        );
        assert_eq!(t.snapshot.selected.as_deref(), Some("Restroom"));
        let (msg, sev) = t.notification.unwrap();
        assert_eq!(msg, "Selected: Restroom");
        assert_eq!(sev, Severity::Info);
    }

    #[test]
    fn test_system_reset_is_idempotent() {
        let mut snap = Snapshot::default();
        snap.mode = Mode::Wheelchair;
        snap.highlight = Some("Kitchen".to_string());
        snap.motor_speed = 33.0;
        snap.movement_intensity = 0.8;
        snap.total_distance = 42.0;

        let once = apply_raw(&snap, HeadDirection::Left, r#"{"event":"SYSTEM_RESET"}"#);
        let twice = apply_raw(
            &once.snapshot,
            once.direction,
            r#"{"event":"SYSTEM_RESET"}"#,
        );

        assert_eq!(once.snapshot, twice.snapshot);
        assert_eq!(once.direction, HeadDirection::Stop);
        assert_eq!(once.snapshot.mode, Mode::Stop);
        assert_eq!(once.snapshot.motor_speed, 0.0);
        // Distance survives a reset; it is cleared only by the controller
        assert_eq!(once.snapshot.total_distance, 42.0);
    }

    #[test]
    fn test_system_status_keeps_previous_on_missing_fields() {
        let mut snap = Snapshot::default();
        snap.battery_percentage = 60.0;
        snap.motor_speed = 10.0;
        snap.face_tracking = true;

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"SYSTEM_STATUS","payload":{"motor_speed":12.5}}"#,
        );

        assert_eq!(t.snapshot.battery_percentage, 60.0);
        assert_eq!(t.snapshot.motor_speed, 12.5);
        // face_tracking defaults to false when absent, unlike the others
        assert!(!t.snapshot.face_tracking);
    }

    #[test]
    fn test_tracking_lost_notifies_error() {
        let snap = Snapshot::default();
        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"TRACKING","payload":{"status":"lost"}}"#,
        );
        assert_eq!(t.snapshot, snap);
        let (msg, sev) = t.notification.unwrap();
        assert_eq!(msg, "Face tracking lost");
        assert_eq!(sev, Severity::Error);

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"TRACKING","payload":{"status":"ok"}}"#,
        );
        assert!(t.notification.is_none());
    }

    #[test]
    fn test_calibration_events_notify_success() {
        let snap = Snapshot::default();
        let t = apply_raw(&snap, HeadDirection::Stop, r#"{"event":"CALIBRATED"}"#);
        assert_eq!(
            t.notification,
            Some((
                "Head calibrated successfully".to_string(),
                Severity::Success
            ))
        );

        let t = apply_raw(&snap, HeadDirection::Stop, r#"{"event":"CALIBRATED_NOSE"}"#);
        assert_eq!(
            t.notification,
            Some((
                "Nose center calibrated successfully".to_string(),
                Severity::Success
            ))
        );
    }

    #[test]
    fn test_face_status_applies_active_flag() {
        let snap = Snapshot::default();
        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"FACE_STATUS","payload":{"active":true,"faces":2}}"#,
        );
        assert!(t.snapshot.face_tracking);

        let t = apply_raw(&t.snapshot, HeadDirection::Stop, r#"{"event":"FACE_STATUS"}"#);
        assert!(!t.snapshot.face_tracking);
    }

    #[test]
    fn test_blink_event_severity_rules() {
        let snap = Snapshot::default();

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"BLINK_EVENT","payload":{"message":"Stopping","type":"long"}}"#,
        );
        assert_eq!(t.notification.unwrap().1, Severity::Error);

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"BLINK_EVENT","payload":{"message":"Picked","type":"double","action":"select_place"}}"#,
        );
        assert_eq!(t.notification.unwrap().1, Severity::Success);

        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"BLINK_EVENT","payload":{"message":"Next","type":"single"}}"#,
        );
        assert_eq!(t.notification.unwrap().1, Severity::Info);

        // No message, no notification
        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"BLINK_EVENT","payload":{"type":"single"}}"#,
        );
        assert!(t.notification.is_none());
    }

    #[test]
    fn test_error_event_verbatim_or_generic() {
        let snap = Snapshot::default();
        let t = apply_raw(
            &snap,
            HeadDirection::Stop,
            r#"{"event":"ERROR","payload":{"message":"Motor fault"}}"#,
        );
        assert_eq!(
            t.notification,
            Some(("Motor fault".to_string(), Severity::Error))
        );

        let t = apply_raw(&snap, HeadDirection::Stop, r#"{"event":"ERROR"}"#);
        assert_eq!(
            t.notification,
            Some(("An error occurred".to_string(), Severity::Error))
        );
    }

    #[test]
    fn test_command_and_unrecognized_are_inert() {
        let snap = Snapshot::default();
        for raw in [
            r#"{"event":"COMMAND","payload":{"text":"fwd"}}"#,
            r#"{"event":"SOMETHING_NEW"}"#,
        ] {
            let t = apply_raw(&snap, HeadDirection::Left, raw);
            assert_eq!(t.snapshot, snap);
            assert_eq!(t.direction, HeadDirection::Left);
            assert!(t.notification.is_none());
        }
    }

    #[test]
    fn test_mode_change_sequences_ending_in_stop_clear_places() {
        let mut snap = Snapshot::default();
        snap.highlight = Some("Kitchen".to_string());
        snap.selected = Some("Bedroom".to_string());
        let mut direction = HeadDirection::Forward;

        for raw in [
            r#"{"event":"MODE_CHANGE","payload":{"mode":"PLACE"}}"#,
            r#"{"event":"MODE_CHANGE","payload":{"mode":"WHEELCHAIR"}}"#,
            r#"{"event":"MODE_CHANGE","payload":{"mode":"STOP"}}"#,
        ] {
            let t = apply_raw(&snap, direction, raw);
            snap = t.snapshot;
            direction = t.direction;
        }

        assert!(snap.highlight.is_none());
        assert!(snap.selected.is_none());
        assert_eq!(direction, HeadDirection::Stop);
    }
}
