use crate::error::NegotiationError;
use crate::session::SignalingSession;
use async_trait::async_trait;
use tether_core::{IceCandidate, PeerCallAnswer, PeerCallOffer};

/// Owns the media side of every peer call.
///
/// Calls arrive one at a time, in signaling order, on a task separate from
/// the session's event handling. An `Err` is reported as a connection failure
/// for that peer only.
#[async_trait]
pub trait PeerNegotiationDelegate: Send + Sync + 'static {
    async fn receive_peer_call(
        &self,
        session: &SignalingSession,
        offer: PeerCallOffer,
    ) -> Result<(), NegotiationError>;

    async fn receive_peer_call_answer(
        &self,
        session: &SignalingSession,
        answer: PeerCallAnswer,
    ) -> Result<(), NegotiationError>;

    async fn receive_ice_candidate(
        &self,
        session: &SignalingSession,
        from_id: String,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError>;

    /// Also called when the session tears down a signaling connection.
    async fn close_all_peer_connections(&self, session: &SignalingSession);

    /// The server asked us to place a call. Ignored unless overridden.
    async fn make_peer_call(
        &self,
        _session: &SignalingSession,
        _peer_id: String,
    ) -> Result<(), NegotiationError> {
        Ok(())
    }

    async fn call_rejected(&self, _session: &SignalingSession, _from_id: String) {}
}
