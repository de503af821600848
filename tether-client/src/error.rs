use tether_core::{DecodeError, InvalidClient};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("failed to send: {0}")]
    SendFailed(String),

    #[error("invalid signaling url `{0}`")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action}: session is not open")]
    NotOpen { action: &'static str },

    #[error("session is already connecting or open")]
    AlreadyActive,

    #[error("session is faulted")]
    Faulted,

    #[error("failed to encode outbound message: {0}")]
    Encode(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Problems reported through [`SignalingListener::on_error`](crate::SignalingListener::on_error).
/// None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalingError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid room client entry: {0}")]
    InvalidClient(#[from] InvalidClient),

    #[error("invalid makePeerCall peer id")]
    InvalidPeerId,

    #[error("invalid streamerList streamer id")]
    InvalidStreamerId,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Failure of the media negotiation with one peer. Other peers are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("negotiation with `{peer_id}` failed: {reason}")]
pub struct NegotiationError {
    pub peer_id: String,
    pub reason: String,
}

impl NegotiationError {
    pub fn new(peer_id: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            peer_id: peer_id.into(),
            reason: reason.to_string(),
        }
    }
}
