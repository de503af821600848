use crate::error::TransportError;
use crate::transport::TransportEvent;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A full-duplex text channel to the signaling server.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    /// Starts connecting to `url`, replacing any previous connection.
    ///
    /// Everything that happens on the new connection is delivered to `events`
    /// in arrival order. An `Err` means the attempt could not be started at all.
    async fn connect(
        &self,
        url: &str,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<(), TransportError>;

    fn send(&self, text: String) -> Result<(), TransportError>;

    /// Requests an orderly close. `Closed` follows on the event channel.
    async fn close(&self);

    /// Closes and returns only once the connection is torn down.
    async fn shutdown(&self);
}
