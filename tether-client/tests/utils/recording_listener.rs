use std::sync::{Arc, Mutex};
use std::time::Duration;
use tether_client::{SignalingError, SignalingListener};
use tether_core::{Client, IceCandidate, PeerCallAnswer, PeerCallOffer};

/// Event types recorded by RecordingListener.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent {
    Opened,
    Closed,
    ConnectionError(String),
    Error(SignalingError),
    StreamersAvailable(Vec<String>),
    RoomClients(Vec<Client>),
    MakePeerCall(String),
    PeerCall(PeerCallOffer),
    PeerCallAnswer(PeerCallAnswer),
    CallRejected(String),
    IceCandidate(String, IceCandidate),
    CloseAll,
    ClientConnected(String),
    ClientDisconnected(String),
    ClientConnectionFailed(String, String),
}

/// A SignalingListener that records every callback.
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<ListenerEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&ListenerEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(*e)).count()
    }

    pub fn errors(&self) -> Vec<SignalingError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ListenerEvent::Error(error) => Some(error),
                _ => None,
            })
            .collect()
    }

    /// Wait until `predicate` matches some recorded event.
    pub async fn wait_for(
        &self,
        predicate: impl Fn(&ListenerEvent) -> bool,
        timeout_ms: u64,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.count(&predicate) > 0 {
                return true;
            }
            if tokio::time::Instant::now() > deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn record(&self, event: ListenerEvent) {
        tracing::debug!("[RecordingListener] {:?}", event);
        self.events.lock().unwrap().push(event);
    }
}

impl SignalingListener for RecordingListener {
    fn on_connection_opened(&self) {
        self.record(ListenerEvent::Opened);
    }

    fn on_connection_closed(&self) {
        self.record(ListenerEvent::Closed);
    }

    fn on_connection_error(&self, reason: &str) {
        self.record(ListenerEvent::ConnectionError(reason.to_owned()));
    }

    fn on_error(&self, error: &SignalingError) {
        self.record(ListenerEvent::Error(error.clone()));
    }

    fn on_streamers_available(&self, ids: &[String]) {
        self.record(ListenerEvent::StreamersAvailable(ids.to_vec()));
    }

    fn on_room_clients_changed(&self, clients: &[Client]) {
        self.record(ListenerEvent::RoomClients(clients.to_vec()));
    }

    fn on_make_peer_call(&self, peer_id: &str) {
        self.record(ListenerEvent::MakePeerCall(peer_id.to_owned()));
    }

    fn on_peer_call_received(&self, offer: &PeerCallOffer) {
        self.record(ListenerEvent::PeerCall(offer.clone()));
    }

    fn on_peer_call_answer_received(&self, answer: &PeerCallAnswer) {
        self.record(ListenerEvent::PeerCallAnswer(answer.clone()));
    }

    fn on_call_rejected(&self, peer_id: &str) {
        self.record(ListenerEvent::CallRejected(peer_id.to_owned()));
    }

    fn on_ice_candidate_received(&self, peer_id: &str, candidate: &IceCandidate) {
        self.record(ListenerEvent::IceCandidate(
            peer_id.to_owned(),
            candidate.clone(),
        ));
    }

    fn on_close_all_peer_connections(&self) {
        self.record(ListenerEvent::CloseAll);
    }

    fn on_client_connected(&self, client: &Client) {
        self.record(ListenerEvent::ClientConnected(client.id.clone()));
    }

    fn on_client_disconnected(&self, client: &Client) {
        self.record(ListenerEvent::ClientDisconnected(client.id.clone()));
    }

    fn on_client_connection_failed(&self, peer_id: &str, reason: &str) {
        self.record(ListenerEvent::ClientConnectionFailed(
            peer_id.to_owned(),
            reason.to_owned(),
        ));
    }
}
