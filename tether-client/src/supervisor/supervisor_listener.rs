use crate::error::SignalingError;
use crate::session::SignalingListener;
use crate::supervisor::connection_supervisor::SupervisorShared;
use crate::supervisor::ConnectionState;
use std::sync::Arc;
use tether_core::{Client, IceCandidate, PeerCallAnswer, PeerCallOffer};

/// Tracks connection state for the supervisor, then hands every event on.
pub(crate) struct SupervisorListener {
    shared: Arc<SupervisorShared>,
    app: Arc<dyn SignalingListener>,
}

impl SupervisorListener {
    pub(crate) fn new(shared: Arc<SupervisorShared>, app: Arc<dyn SignalingListener>) -> Self {
        Self { shared, app }
    }
}

impl SignalingListener for SupervisorListener {
    fn on_connection_opened(&self) {
        self.shared.mark_connected();
        self.app.on_connection_opened();
    }

    fn on_connection_closed(&self) {
        self.shared.signal_loss("connection closed");
        self.app.on_connection_closed();
    }

    fn on_connection_error(&self, reason: &str) {
        self.shared.signal_loss(reason);
        self.app.on_connection_error(reason);
    }

    fn on_error(&self, error: &SignalingError) {
        self.app.on_error(error);
    }

    fn on_streamers_available(&self, ids: &[String]) {
        self.app.on_streamers_available(ids);
    }

    fn on_room_clients_changed(&self, clients: &[Client]) {
        self.app.on_room_clients_changed(clients);
    }

    fn on_make_peer_call(&self, peer_id: &str) {
        self.app.on_make_peer_call(peer_id);
    }

    fn on_peer_call_received(&self, offer: &PeerCallOffer) {
        self.app.on_peer_call_received(offer);
    }

    fn on_peer_call_answer_received(&self, answer: &PeerCallAnswer) {
        self.app.on_peer_call_answer_received(answer);
    }

    fn on_call_rejected(&self, peer_id: &str) {
        self.app.on_call_rejected(peer_id);
    }

    fn on_ice_candidate_received(&self, peer_id: &str, candidate: &IceCandidate) {
        self.app.on_ice_candidate_received(peer_id, candidate);
    }

    fn on_close_all_peer_connections(&self) {
        self.app.on_close_all_peer_connections();
    }

    fn on_client_connected(&self, client: &Client) {
        self.shared
            .client_index
            .insert(client.id.clone(), self.shared.stream_id.clone());
        {
            let mut status = self.shared.lock();
            if status.state == ConnectionState::Connecting {
                status.state = ConnectionState::Connected;
            }
        }
        self.app.on_client_connected(client);
    }

    fn on_client_disconnected(&self, client: &Client) {
        self.shared.client_index.remove(&client.id);
        self.shared.signal_loss("peer disconnected");
        self.app.on_client_disconnected(client);
    }

    fn on_client_connection_failed(&self, peer_id: &str, reason: &str) {
        self.app.on_client_connection_failed(peer_id, reason);
    }
}
