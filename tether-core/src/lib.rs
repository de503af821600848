pub mod codec;
pub mod model;

pub use codec::{
    DEFAULT_PEER_ID, DecodeError, InboundMessage, OutboundIceCandidate, OutboundMessage,
    SIGNALING_PROTOCOL_VERSION, decode, encode,
};
pub use model::*;
