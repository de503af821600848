use crate::session::SignalingSession;
use crate::session::signaling_session::SessionInner;
use std::sync::Weak;

/// A non-owning reference to a session, safe to keep inside peer connection callbacks.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) inner: Weak<SessionInner>,
}

impl SessionHandle {
    pub fn upgrade(&self) -> Option<SignalingSession> {
        self.inner.upgrade().map(|inner| SignalingSession { inner })
    }
}
