use crate::config::SignalingConfig;
use crate::error::{SessionError, SignalingError};
use crate::negotiation::{NegotiationWorker, PeerNegotiationDelegate};
use crate::session::{EventPump, SessionHandle, SessionState, SignalingListener};
use crate::transport::SignalingTransport;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tether_core::{
    Client, OutboundIceCandidate, OutboundMessage, SIGNALING_PROTOCOL_VERSION, SessionId, encode,
    ice_ufrag,
};
use tokio::sync::mpsc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;
const PUMP_DRAIN_GRACE: Duration = Duration::from_secs(2);

pub(crate) struct SessionShared {
    pub(crate) state: SessionState,
    pub(crate) session_id: SessionId,
    pub(crate) available_streamers: Vec<String>,
    pub(crate) username_fragment: Option<String>,
}

#[derive(Default)]
struct SessionTasks {
    pump: Option<JoinHandle<()>>,
    worker: Option<JoinHandle<()>>,
}

pub(crate) struct SessionInner {
    pub(crate) config: SignalingConfig,
    pub(crate) transport: Arc<dyn SignalingTransport>,
    pub(crate) listener: Arc<dyn SignalingListener>,
    delegate: Option<Arc<dyn PeerNegotiationDelegate>>,
    shared: Mutex<SessionShared>,
    tasks: Mutex<SessionTasks>,
}

/// One logical conversation with a signaling server.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct SignalingSession {
    pub(crate) inner: Arc<SessionInner>,
}

impl SignalingSession {
    pub fn new(
        config: SignalingConfig,
        transport: Arc<dyn SignalingTransport>,
        listener: Arc<dyn SignalingListener>,
    ) -> Self {
        Self::build(config, transport, listener, None)
    }

    /// Like [`new`](Self::new), with peer negotiation handed to `delegate`.
    pub fn with_delegate(
        config: SignalingConfig,
        transport: Arc<dyn SignalingTransport>,
        listener: Arc<dyn SignalingListener>,
        delegate: Arc<dyn PeerNegotiationDelegate>,
    ) -> Self {
        Self::build(config, transport, listener, Some(delegate))
    }

    fn build(
        config: SignalingConfig,
        transport: Arc<dyn SignalingTransport>,
        listener: Arc<dyn SignalingListener>,
        delegate: Option<Arc<dyn PeerNegotiationDelegate>>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                transport,
                listener,
                delegate,
                shared: Mutex::new(SessionShared {
                    state: SessionState::Idle,
                    session_id: SessionId::empty(),
                    available_streamers: Vec::new(),
                    username_fragment: None,
                }),
                tasks: Mutex::new(SessionTasks::default()),
            }),
        }
    }

    /// A fresh `Idle` session sharing this one's configuration and collaborators.
    pub(crate) fn renewed(&self) -> SignalingSession {
        Self::build(
            self.inner.config.clone(),
            self.inner.transport.clone(),
            self.inner.listener.clone(),
            self.inner.delegate.clone(),
        )
    }

    pub fn downgrade(&self) -> SessionHandle {
        SessionHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &SignalingConfig {
        &self.inner.config
    }

    pub fn state(&self) -> SessionState {
        self.shared().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Empty unless the session is open.
    pub fn session_id(&self) -> SessionId {
        self.shared().session_id.clone()
    }

    pub fn available_streamers(&self) -> Vec<String> {
        self.shared().available_streamers.clone()
    }

    pub fn username_fragment(&self) -> Option<String> {
        self.shared().username_fragment.clone()
    }

    pub(crate) fn shared(&self) -> MutexGuard<'_, SessionShared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn tasks(&self) -> MutexGuard<'_, SessionTasks> {
        self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a connection attempt. Allowed from `Idle` or `Closed`.
    ///
    /// The outcome arrives through the listener: `on_connection_opened`
    /// once the handshake completes, `on_connection_error` otherwise.
    pub async fn connect(&self) -> Result<(), SessionError> {
        {
            let mut shared = self.shared();
            match shared.state {
                SessionState::Faulted => return Err(SessionError::Faulted),
                SessionState::Connecting | SessionState::Open => {
                    return Err(SessionError::AlreadyActive);
                }
                SessionState::Idle | SessionState::Closed => {}
            }
            shared.state = SessionState::Connecting;
            shared.session_id = SessionId::empty();
            shared.available_streamers.clear();
            shared.username_fragment = None;
        }

        if self.abort_tasks().await {
            self.close_peers().await;
        }

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let (negotiation_tx, worker) = match self.inner.delegate.clone() {
            Some(delegate) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let worker = NegotiationWorker::new(delegate, self.downgrade(), rx);
                (Some(tx), Some(tokio::spawn(worker.run())))
            }
            None => (None, None),
        };

        let pump = EventPump::new(self.downgrade(), events_rx, negotiation_tx);
        {
            let mut tasks = self.tasks();
            tasks.pump = Some(tokio::spawn(pump.run()));
            tasks.worker = worker;
        }

        info!("Connecting to signaling server {}", self.inner.config.url);

        if let Err(e) = self
            .inner
            .transport
            .connect(&self.inner.config.url, events_tx)
            .await
        {
            warn!("Failed to start signaling connection: {}", e);
            self.mark_closed();
            self.inner.listener.on_connection_error(&e.to_string());
            return Err(e.into());
        }

        Ok(())
    }

    /// Requests the transport to close. `Closed` is entered immediately.
    pub async fn close(&self) {
        self.mark_closed();
        self.inner.transport.close().await;
    }

    /// Closes and waits until no handler is running or can start.
    ///
    /// Events the transport delivers while shutting down are still handled,
    /// in order. The delegate is then told to close its peer connections.
    /// Must not be called from inside a listener or delegate callback.
    pub async fn close_sync(&self) {
        self.mark_closed();
        self.inner.transport.shutdown().await;

        let (pump, worker) = self.take_tasks();
        let had_connection = pump.is_some();

        if let Some(mut pump) = pump {
            if tokio::time::timeout(PUMP_DRAIN_GRACE, &mut pump).await.is_err() {
                debug!("Transport kept its event channel open after shutdown");
                pump.abort();
                let _ = pump.await;
            }
        }
        if let Some(worker) = worker {
            worker.abort();
            let _ = worker.await;
        }

        if had_connection {
            self.close_peers().await;
        }
    }

    fn mark_closed(&self) {
        let mut shared = self.shared();
        if shared.state.is_active() {
            shared.state = SessionState::Closed;
        }
        shared.session_id = SessionId::empty();
    }

    fn take_tasks(&self) -> (Option<JoinHandle<()>>, Option<JoinHandle<()>>) {
        let mut tasks = self.tasks();
        (tasks.pump.take(), tasks.worker.take())
    }

    /// Returns whether a previous connection's tasks were running.
    async fn abort_tasks(&self) -> bool {
        let (pump, worker) = self.take_tasks();
        let had_connection = pump.is_some();

        for task in [pump, worker].into_iter().flatten() {
            task.abort();
            let _ = task.await;
        }
        had_connection
    }

    async fn close_peers(&self) {
        if let Some(delegate) = &self.inner.delegate {
            debug!("Closing peer connections of the previous signaling connection");
            delegate.close_all_peer_connections(self).await;
        }
    }

    pub(crate) fn fault(&self, reason: &str) {
        error!("Signaling session faulted: {}", reason);
        {
            let mut shared = self.shared();
            shared.state = SessionState::Faulted;
            shared.session_id = SessionId::empty();
        }
        self.inner.listener.on_connection_error(reason);
    }

    pub(crate) fn report_error(&self, error: SignalingError) {
        warn!("Signaling error: {}", error);
        self.inner.listener.on_error(&error);
    }

    /// Sends without checking the state. Used by the handshake.
    pub(crate) fn send_message(&self, message: &OutboundMessage) -> Result<(), SessionError> {
        let text = match encode(message) {
            Ok(text) => text,
            Err(e) => {
                self.fault("failed to encode outbound message");
                return Err(SessionError::Encode(e.to_string()));
            }
        };

        debug!("-> {}", text);
        self.inner.transport.send(text).map_err(|e| {
            warn!("Failed to send signaling message: {}", e);
            SessionError::Transport(e)
        })
    }

    fn send_when_open(
        &self,
        action: &'static str,
        message: OutboundMessage,
    ) -> Result<(), SessionError> {
        if self.state() != SessionState::Open {
            let err = SessionError::NotOpen { action };
            self.report_error(err.clone().into());
            return Err(err);
        }
        self.send_message(&message)
    }

    pub fn list_streamers(&self) -> Result<(), SessionError> {
        self.send_when_open("list streamers", OutboundMessage::ListStreamers)
    }

    pub fn subscribe(&self, streamer_id: &str) -> Result<(), SessionError> {
        self.send_when_open(
            "subscribe",
            OutboundMessage::Subscribe {
                streamer_id: streamer_id.to_owned(),
            },
        )
    }

    pub fn call_all(&self) -> Result<(), SessionError> {
        self.send_when_open("call all", OutboundMessage::CallAll)
    }

    pub fn call_ids(&self, ids: &[String]) -> Result<(), SessionError> {
        self.send_when_open(
            "call ids",
            OutboundMessage::CallIds { ids: ids.to_vec() },
        )
    }

    pub fn close_all_room_peer_connections(&self) -> Result<(), SessionError> {
        self.send_when_open(
            "close room peer connections",
            OutboundMessage::CloseAllRoomPeerConnections,
        )
    }

    /// Offers a call to `to_id`.
    pub fn call_peer(&self, to_id: &str, sdp: &str) -> Result<(), SessionError> {
        self.send_when_open(
            "call peer",
            OutboundMessage::Offer {
                to_id: to_id.to_owned(),
                sdp: sdp.to_owned(),
            },
        )
    }

    /// Answers a call from `to_id`. The answer's ICE username fragment is
    /// attached to every candidate sent afterwards.
    pub fn make_peer_call_answer(&self, to_id: &str, sdp: &str) -> Result<(), SessionError> {
        if self.state() == SessionState::Open {
            match ice_ufrag(sdp) {
                Some(ufrag) => self.shared().username_fragment = Some(ufrag.to_owned()),
                None => warn!("Failed to extract usernameFragment from answer for {}", to_id),
            }
        }

        self.send_when_open(
            "answer peer call",
            OutboundMessage::Answer {
                to_id: to_id.to_owned(),
                sdp: sdp.to_owned(),
            },
        )
    }

    pub fn reject_call(&self, to_id: &str) -> Result<(), SessionError> {
        self.send_when_open(
            "reject call",
            OutboundMessage::PeerCallAnswer {
                to_id: to_id.to_owned(),
            },
        )
    }

    pub fn send_ice_candidate(
        &self,
        to_id: &str,
        sdp_mid: &str,
        sdp_m_line_index: u16,
        candidate: &str,
    ) -> Result<(), SessionError> {
        let username_fragment = self.username_fragment();
        self.send_when_open(
            "send ice candidate",
            OutboundMessage::IceCandidate {
                to_id: to_id.to_owned(),
                candidate: OutboundIceCandidate {
                    candidate: candidate.to_owned(),
                    sdp_mid: sdp_mid.to_owned(),
                    sdp_m_line_index,
                    username_fragment,
                },
            },
        )
    }

    pub fn report_client_connected(&self, client: &Client) {
        info!("Peer {} connected", client.id);
        self.inner.listener.on_client_connected(client);
    }

    pub fn report_client_disconnected(&self, client: &Client) {
        info!("Peer {} disconnected", client.id);
        self.inner.listener.on_client_disconnected(client);
    }

    pub fn report_client_connection_failed(&self, peer_id: &str, reason: &str) {
        warn!("Peer {} failed: {}", peer_id, reason);
        self.inner
            .listener
            .on_client_connection_failed(peer_id, reason);
    }
}

pub(crate) fn join_room_message(
    name: &str,
    data: Value,
    room: &str,
    password: &str,
) -> OutboundMessage {
    OutboundMessage::JoinRoom {
        name: name.to_owned(),
        data,
        room: room.to_owned(),
        password: password.to_owned(),
        protocol_version: SIGNALING_PROTOCOL_VERSION,
    }
}
