use crate::config::SignalingConfig;
use crate::negotiation::PeerNegotiationDelegate;
use crate::session::{NoopListener, SignalingListener, SignalingSession};
use crate::supervisor::control_loop::ControlLoop;
use crate::supervisor::supervisor_listener::SupervisorListener;
use crate::supervisor::{ConnectionState, ConnectionStatus, RetryPolicy};
use crate::transport::SignalingTransport;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Client id to the id of the stream it was seen on.
pub type ClientIndex = Arc<DashMap<String, String>>;

/// Everything needed to talk to one signaling endpoint.
pub struct StreamEndpoint {
    pub config: SignalingConfig,
    pub transport: Arc<dyn SignalingTransport>,
    pub listener: Arc<dyn SignalingListener>,
    pub delegate: Option<Arc<dyn PeerNegotiationDelegate>>,
}

impl StreamEndpoint {
    pub fn new(config: SignalingConfig, transport: Arc<dyn SignalingTransport>) -> Self {
        Self {
            config,
            transport,
            listener: Arc::new(NoopListener),
            delegate: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn SignalingListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn PeerNegotiationDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }
}

pub(crate) struct SupervisorStatus {
    pub(crate) state: ConnectionState,
    pub(crate) attempt_count: u32,
    pub(crate) last_connected_time: Option<Instant>,
    pub(crate) loss_pending: bool,
    /// Set while the previous connection is being shut down before a reconnect.
    pub(crate) tearing_down: bool,
    pub(crate) running: bool,
    pub(crate) stopping: bool,
}

pub(crate) struct SupervisorShared {
    pub(crate) stream_id: String,
    pub(crate) wake: Notify,
    pub(crate) client_index: ClientIndex,
    status: Mutex<SupervisorStatus>,
}

impl SupervisorShared {
    fn new(stream_id: String, client_index: ClientIndex) -> Self {
        Self {
            stream_id,
            wake: Notify::new(),
            client_index,
            status: Mutex::new(SupervisorStatus {
                state: ConnectionState::Disconnected,
                attempt_count: 0,
                last_connected_time: None,
                loss_pending: false,
                tearing_down: false,
                running: false,
                stopping: false,
            }),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SupervisorStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> ConnectionStatus {
        let status = self.lock();
        ConnectionStatus {
            state: status.state,
            attempt_count: status.attempt_count,
            last_connected_time: status.last_connected_time,
        }
    }

    pub(crate) fn mark_connected(&self) {
        let mut status = self.lock();
        status.state = ConnectionState::Connected;
        status.attempt_count = 0;
        status.last_connected_time = Some(Instant::now());
        info!(stream = %self.stream_id, "Signaling connected");
    }

    /// Records a loss and wakes the control loop. Repeats while a retry
    /// is already pending collapse into that retry.
    pub(crate) fn signal_loss(&self, cause: &str) {
        let mut status = self.lock();
        if !status.running || status.stopping {
            return;
        }
        if status.tearing_down {
            debug!(stream = %self.stream_id, "Ignoring teardown of the previous connection: {}", cause);
            return;
        }

        match status.state {
            ConnectionState::Connected | ConnectionState::Connecting => {
                info!(stream = %self.stream_id, "Connection lost: {}", cause);
                status.state = ConnectionState::Disconnected;
                status.loss_pending = true;
                self.wake.notify_one();
            }
            ConnectionState::Disconnected | ConnectionState::Reconnecting => {
                debug!(stream = %self.stream_id, "Loss already pending: {}", cause);
            }
        }
    }
}

/// The session currently driven by a supervisor.
pub(crate) struct SessionSlot {
    session: Mutex<SignalingSession>,
}

impl SessionSlot {
    fn new(session: SignalingSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    pub(crate) fn current(&self) -> SignalingSession {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swaps in a fresh session built from the same endpoint.
    pub(crate) fn renew(&self) -> SignalingSession {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        *session = session.renewed();
        session.clone()
    }
}

/// Keeps one signaling session alive, reconnecting with backoff after every loss.
pub struct ConnectionSupervisor {
    shared: Arc<SupervisorShared>,
    session: Arc<SessionSlot>,
    policy: RetryPolicy,
    shutdown: watch::Sender<bool>,
    control: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionSupervisor {
    pub fn new(stream_id: impl Into<String>, endpoint: StreamEndpoint, policy: RetryPolicy) -> Self {
        Self::with_client_index(stream_id, endpoint, policy, Arc::new(DashMap::new()))
    }

    pub fn with_client_index(
        stream_id: impl Into<String>,
        endpoint: StreamEndpoint,
        policy: RetryPolicy,
        client_index: ClientIndex,
    ) -> Self {
        let shared = Arc::new(SupervisorShared::new(stream_id.into(), client_index));
        let listener: Arc<dyn SignalingListener> =
            Arc::new(SupervisorListener::new(shared.clone(), endpoint.listener));

        let session = match endpoint.delegate {
            Some(delegate) => SignalingSession::with_delegate(
                endpoint.config,
                endpoint.transport,
                listener,
                delegate,
            ),
            None => SignalingSession::new(endpoint.config, endpoint.transport, listener),
        };

        let (shutdown, _) = watch::channel(false);

        Self {
            shared,
            session: Arc::new(SessionSlot::new(session)),
            policy,
            shutdown,
            control: Mutex::new(None),
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.shared.stream_id
    }

    /// The session in use. A faulted session is replaced on the next reconnect.
    pub fn session(&self) -> SignalingSession {
        self.session.current()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.snapshot()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    fn control(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begins connecting and keeps reconnecting until [`stop`](Self::stop).
    /// Calling it while already running does nothing.
    pub fn start(&self) {
        {
            let mut status = self.shared.lock();
            if status.running {
                debug!(stream = %self.shared.stream_id, "Supervisor already running");
                return;
            }
            status.running = true;
            status.stopping = false;
            status.loss_pending = false;
            status.attempt_count = 0;
            status.state = ConnectionState::Connecting;
        }

        info!(stream = %self.shared.stream_id, "Starting signaling supervisor");
        self.shutdown.send_replace(false);

        let control = ControlLoop::new(
            self.shared.clone(),
            self.session.clone(),
            self.policy.clone(),
            self.shutdown.subscribe(),
        );
        *self.control() = Some(tokio::spawn(control.run()));
    }

    /// Stops reconnecting and closes the session. Safe in any state.
    pub async fn stop(&self) {
        {
            let mut status = self.shared.lock();
            status.stopping = true;
            status.loss_pending = false;
            self.shared.wake.notify_one();
        }
        self.shutdown.send_replace(true);

        let control = self.control().take();
        if let Some(control) = control {
            let _ = control.await;
        }

        self.session.current().close_sync().await;

        {
            let mut status = self.shared.lock();
            status.running = false;
            status.tearing_down = false;
            status.state = ConnectionState::Disconnected;
        }
        info!(stream = %self.shared.stream_id, "Signaling supervisor stopped");
    }
}
