use crate::error::SignalingError;
use tether_core::{Client, IceCandidate, PeerCallAnswer, PeerCallOffer};

/// Receives everything a session observes.
///
/// Callbacks run on the session's event task, one at a time and in the
/// order the events arrived. They must not block.
pub trait SignalingListener: Send + Sync {
    fn on_connection_opened(&self) {}

    fn on_connection_closed(&self) {}

    fn on_connection_error(&self, _reason: &str) {}

    /// A message was discarded or an action was refused. The session keeps going.
    fn on_error(&self, _error: &SignalingError) {}

    fn on_streamers_available(&self, _ids: &[String]) {}

    fn on_room_clients_changed(&self, _clients: &[Client]) {}

    fn on_make_peer_call(&self, _peer_id: &str) {}

    fn on_peer_call_received(&self, _offer: &PeerCallOffer) {}

    fn on_peer_call_answer_received(&self, _answer: &PeerCallAnswer) {}

    fn on_call_rejected(&self, _peer_id: &str) {}

    fn on_ice_candidate_received(&self, _peer_id: &str, _candidate: &IceCandidate) {}

    fn on_close_all_peer_connections(&self) {}

    fn on_client_connected(&self, _client: &Client) {}

    fn on_client_disconnected(&self, _client: &Client) {}

    fn on_client_connection_failed(&self, _peer_id: &str, _reason: &str) {}
}

pub struct NoopListener;

impl SignalingListener for NoopListener {}
