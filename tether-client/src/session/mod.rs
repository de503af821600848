mod event_pump;
mod inbound;
mod session_handle;
mod session_state;
mod signaling_listener;
mod signaling_session;

pub(crate) use event_pump::EventPump;
pub use session_handle::SessionHandle;
pub use session_state::SessionState;
pub use signaling_listener::{NoopListener, SignalingListener};
pub use signaling_session::SignalingSession;
