use crate::config::Handshake;
use crate::error::SignalingError;
use crate::negotiation::NegotiationCommand;
use crate::session::signaling_session::join_room_message;
use crate::session::{SessionState, SignalingSession};
use crate::transport::TransportEvent;
use serde_json::Value;
use tether_core::{InboundMessage, OutboundMessage, SessionId, decode};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type NegotiationSender = mpsc::UnboundedSender<NegotiationCommand>;

impl SignalingSession {
    pub(crate) async fn handle_transport_event(
        &self,
        event: TransportEvent,
        negotiation: Option<&NegotiationSender>,
    ) {
        match event {
            TransportEvent::Opened => self.on_opened(),
            TransportEvent::Closed => self.on_closed(),
            TransportEvent::Error(reason) => self.on_transport_error(&reason),
            TransportEvent::Message(text) => self.on_message(&text, negotiation).await,
        }
    }

    /// The event channel ended without a `Closed` for the live connection.
    pub(crate) fn transport_vanished(&self) {
        {
            let mut shared = self.shared();
            if !shared.state.is_active() {
                return;
            }
            shared.state = SessionState::Closed;
            shared.session_id = SessionId::empty();
        }
        let reason = "transport stopped delivering events";
        warn!("Signaling connection lost: {}", reason);
        self.inner.listener.on_connection_error(reason);
    }

    fn on_opened(&self) {
        if self.state() != SessionState::Connecting {
            debug!("Ignoring open for a connection that is no longer wanted");
            return;
        }

        match &self.inner.config.handshake {
            Handshake::StreamerList => {
                let session_id = SessionId::generate();
                {
                    let mut shared = self.shared();
                    shared.state = SessionState::Open;
                    shared.session_id = session_id.clone();
                }
                info!("Signaling session {} open", session_id);
                self.inner.listener.on_connection_opened();
                let _ = self.send_message(&OutboundMessage::ListStreamers);
            }
            Handshake::JoinRoom(join) => {
                debug!("Joining room {}", join.room);
                let message =
                    join_room_message(&join.name, join.data.clone(), &join.room, &join.password);
                let _ = self.send_message(&message);
            }
        }
    }

    fn on_closed(&self) {
        {
            let mut shared = self.shared();
            if shared.state != SessionState::Faulted {
                shared.state = SessionState::Closed;
            }
            shared.session_id = SessionId::empty();
        }
        info!("Signaling connection closed");
        self.inner.listener.on_connection_closed();
    }

    fn on_transport_error(&self, reason: &str) {
        {
            let mut shared = self.shared();
            if shared.state != SessionState::Faulted {
                shared.state = SessionState::Closed;
            }
            shared.session_id = SessionId::empty();
        }
        warn!("Signaling connection error: {}", reason);
        self.inner.listener.on_connection_error(reason);
    }

    async fn on_message(&self, text: &str, negotiation: Option<&NegotiationSender>) {
        debug!("<- {}", text);

        let message = match decode(text) {
            Ok(message) => message,
            Err(e) => {
                self.report_error(e.into());
                return;
            }
        };

        match self.state() {
            SessionState::Open => self.dispatch(message, negotiation),
            SessionState::Connecting => match message {
                InboundMessage::JoinRoomAnswer { session_id } => {
                    self.on_join_room_answer(session_id).await
                }
                other => debug!(
                    "Dropping {} received before the session opened",
                    other.message_type()
                ),
            },
            state => debug!(
                "Dropping {} received in state {:?}",
                message.message_type(),
                state
            ),
        }
    }

    async fn on_join_room_answer(&self, session_id: Value) {
        if !matches!(self.inner.config.handshake, Handshake::JoinRoom(_)) {
            warn!("Unexpected joinRoomAnswer during a streamer-list handshake");
            return;
        }

        let reason = match session_id {
            Value::String(id) if !id.is_empty() => {
                let session_id = SessionId::from(id);
                {
                    let mut shared = self.shared();
                    shared.state = SessionState::Open;
                    shared.session_id = session_id.clone();
                }
                info!("Joined room as session {}", session_id);
                self.inner.listener.on_connection_opened();
                return;
            }
            Value::String(_) => "Invalid password or invalid protocol version",
            _ => "Invalid join-room response",
        };

        warn!("Join refused: {}", reason);
        self.close().await;
        self.inner.listener.on_connection_error(reason);
    }

    fn dispatch(&self, message: InboundMessage, negotiation: Option<&NegotiationSender>) {
        let listener = &self.inner.listener;

        match message {
            InboundMessage::StreamerList { ids, rejected } => {
                for _ in 0..rejected {
                    self.report_error(SignalingError::InvalidStreamerId);
                }
                self.on_streamer_list(ids)
            }

            InboundMessage::JoinRoomAnswer { .. } => {
                debug!("Ignoring joinRoomAnswer on an open session");
            }

            InboundMessage::RoomClients { clients, rejected } => {
                for invalid in rejected {
                    self.report_error(SignalingError::InvalidClient(invalid));
                }
                listener.on_room_clients_changed(&clients);
            }

            InboundMessage::MakePeerCall { ids, rejected } => {
                for _ in 0..rejected {
                    self.report_error(SignalingError::InvalidPeerId);
                }
                for peer_id in ids {
                    listener.on_make_peer_call(&peer_id);
                    forward(negotiation, NegotiationCommand::MakePeerCall { peer_id });
                }
            }

            InboundMessage::PeerCall(offer) => {
                info!("Incoming call from {}", offer.from_id);
                listener.on_peer_call_received(&offer);
                forward(negotiation, NegotiationCommand::ReceivePeerCall(offer));
            }

            InboundMessage::PeerCallAnswer(answer) => {
                listener.on_peer_call_answer_received(&answer);
                forward(negotiation, NegotiationCommand::ReceivePeerCallAnswer(answer));
            }

            InboundMessage::CallRejected { from_id } => {
                info!("Call rejected by {}", from_id);
                listener.on_call_rejected(&from_id);
                forward(negotiation, NegotiationCommand::CallRejected { from_id });
            }

            InboundMessage::IceCandidate {
                from_id,
                candidate: None,
            } => {
                debug!("End of candidates from {}", from_id);
            }

            InboundMessage::IceCandidate {
                from_id,
                candidate: Some(candidate),
            } => {
                listener.on_ice_candidate_received(&from_id, &candidate);
                forward(
                    negotiation,
                    NegotiationCommand::ReceiveIceCandidate { from_id, candidate },
                );
            }

            InboundMessage::CloseAllPeerConnections => {
                info!("Server asked to close all peer connections");
                listener.on_close_all_peer_connections();
                forward(negotiation, NegotiationCommand::CloseAllPeerConnections);
            }
        }
    }

    fn on_streamer_list(&self, ids: Vec<String>) {
        self.shared().available_streamers = ids.clone();
        self.inner.listener.on_streamers_available(&ids);

        let targets = &self.inner.config.target_streamers;
        let chosen: Vec<&String> = if targets.is_empty() {
            ids.first().into_iter().collect()
        } else {
            targets.iter().filter(|target| ids.contains(*target)).collect()
        };

        if chosen.is_empty() {
            warn!("None of the requested streamers is available: {:?}", ids);
            return;
        }

        for streamer_id in chosen {
            info!("Subscribing to streamer {}", streamer_id);
            let _ = self.subscribe(streamer_id);
        }
    }
}

fn forward(negotiation: Option<&NegotiationSender>, command: NegotiationCommand) {
    let Some(negotiation) = negotiation else {
        return;
    };
    if negotiation.send(command).is_err() {
        warn!("Negotiation worker is gone, dropping command");
    }
}
