/// What a [`SignalingTransport`](crate::SignalingTransport) reports about its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Closed,
    Error(String),
    Message(String),
}
