mod signaling_transport;
mod transport_event;
mod ws_transport;

pub use signaling_transport::SignalingTransport;
pub use transport_event::TransportEvent;
pub use ws_transport::{WsTransport, WsTransportConfig};
