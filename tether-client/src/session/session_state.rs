/// Lifecycle of a [`SignalingSession`](crate::SignalingSession).
///
/// `Closed` is re-enterable through `connect`. `Faulted` is terminal and only
/// entered on a local failure, never because of the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closed,
    Faulted,
}

impl SessionState {
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Open)
    }
}
