use crate::session::SessionState;
use crate::supervisor::connection_supervisor::{SessionSlot, SupervisorShared};
use crate::supervisor::{ConnectionState, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub(crate) struct ControlLoop {
    shared: Arc<SupervisorShared>,
    session: Arc<SessionSlot>,
    policy: RetryPolicy,
    shutdown: watch::Receiver<bool>,
}

impl ControlLoop {
    pub(crate) fn new(
        shared: Arc<SupervisorShared>,
        session: Arc<SessionSlot>,
        policy: RetryPolicy,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            shared,
            session,
            policy,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(stream = %self.shared.stream_id, "Supervisor control loop started");

        if self.connect().await {
            while self.wait_for_loss().await {
                let (delay, long_pause) = self.schedule_retry();
                if !self.sleep(delay).await {
                    break;
                }
                if long_pause {
                    self.shared.lock().attempt_count = 0;
                }
                if !self.connect().await {
                    break;
                }
            }
        }

        debug!(stream = %self.shared.stream_id, "Supervisor control loop finished");
    }

    /// Shuts the previous connection down, then starts a new attempt.
    /// Returns `false` once shutdown is requested.
    async fn connect(&mut self) -> bool {
        {
            let mut status = self.shared.lock();
            if status.stopping {
                return false;
            }
            status.tearing_down = true;
        }

        let mut session = self.session.current();
        session.close_sync().await;

        if session.state() == SessionState::Faulted {
            error!(stream = %self.shared.stream_id, "Session faulted, replacing it");
            session = self.session.renew();
        }

        {
            let mut status = self.shared.lock();
            status.tearing_down = false;
            if status.stopping {
                return false;
            }
            status.state = ConnectionState::Connecting;
        }

        if let Err(e) = session.connect().await {
            debug!(stream = %self.shared.stream_id, "Connect attempt failed: {}", e);
        }
        true
    }

    /// Returns `false` once shutdown is requested.
    async fn wait_for_loss(&mut self) -> bool {
        loop {
            let notified = self.shared.wake.notified();
            {
                let mut status = self.shared.lock();
                if status.stopping {
                    return false;
                }
                if status.loss_pending {
                    status.loss_pending = false;
                    return true;
                }
            }

            tokio::select! {
                _ = notified => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                }
            }
        }
    }

    fn schedule_retry(&self) -> (Duration, bool) {
        let mut status = self.shared.lock();
        status.attempt_count = status.attempt_count.saturating_add(1);
        status.state = ConnectionState::Reconnecting;
        let attempt = status.attempt_count;

        if self.policy.reaches_long_pause(attempt) {
            warn!(
                stream = %self.shared.stream_id,
                "{} reconnect attempts failed, pausing for {:?}",
                attempt,
                self.policy.long_pause
            );
            (self.policy.long_pause, true)
        } else {
            let delay = self.policy.backoff_delay(attempt);
            info!(
                stream = %self.shared.stream_id,
                "Reconnect attempt {} in {:?}",
                attempt,
                delay
            );
            (delay, false)
        }
    }

    async fn sleep(&mut self, delay: Duration) -> bool {
        if *self.shutdown.borrow() {
            return false;
        }

        let slept = tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = self.shutdown.changed() => false,
        };

        slept && !self.shared.lock().stopping
    }
}
