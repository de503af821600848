mod negotiation_command;
mod negotiation_worker;
mod negotiator_config;
mod peer_negotiation_delegate;
mod webrtc_negotiator;

pub(crate) use negotiation_command::NegotiationCommand;
pub(crate) use negotiation_worker::NegotiationWorker;
pub use negotiator_config::NegotiatorConfig;
pub use peer_negotiation_delegate::PeerNegotiationDelegate;
pub use webrtc_negotiator::WebrtcNegotiator;
