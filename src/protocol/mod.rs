//! Wire protocol for the controller connection
//!
//! JSON text frames over a persistent WebSocket. Inbound frames carry a
//! tagged envelope `{event, payload?}`; outbound commands are the same
//! envelope shape, plus a separate out-of-band `camera_frame` message used
//! by the capture collaborator.
//!
//! The codec is stateless: decode maps raw text to a tagged event (or
//! nothing, for frames this layer does not own), encode is pure and total.

mod commands;
mod events;

pub use commands::{CameraFrame, Command};
pub use events::{
    decode, BlinkPayload, ControllerEvent, ErrorPayload, FaceStatusPayload, InitPayload,
    ModeChangePayload, NoseMovePayload, PlacePayload, SystemStatusPayload, TrackingPayload,
};
