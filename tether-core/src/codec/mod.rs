//! Text encoding of the signaling vocabulary.
//!
//! Every message is a JSON object discriminated by a string `type` field.
//! Inbound text is shape-checked field by field before anything is trusted;
//! failures come back as [`DecodeError`] values, never panics.

mod constants;
mod decode_error;
mod inbound;
mod outbound;

pub use constants::*;
pub use decode_error::DecodeError;
pub use inbound::{InboundMessage, decode};
pub use outbound::{OutboundIceCandidate, OutboundMessage, encode};
