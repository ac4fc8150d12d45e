mod negotiation;
mod participant;
mod room;
mod signaling;

pub use negotiation::NegotiationPayload;
pub use participant::ParticipantId;
pub use room::RoomId;
pub use signaling::{IceServerConfig, SignalMessage};
