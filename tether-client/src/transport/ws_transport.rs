use crate::error::TransportError;
use crate::transport::{SignalingTransport, TransportEvent};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WsTransportConfig {
    /// Keep-alive ping period while the socket is open.
    pub ping_interval: Duration,
}

impl Default for WsTransportConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(10),
        }
    }
}

struct WsConnection {
    outgoing: mpsc::UnboundedSender<Message>,
    task: JoinHandle<()>,
}

/// WebSocket transport with a keep-alive ping.
pub struct WsTransport {
    config: WsTransportConfig,
    connection: Mutex<Option<WsConnection>>,
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WsTransport {
    pub fn new() -> Self {
        Self::with_config(WsTransportConfig::default())
    }

    pub fn with_config(config: WsTransportConfig) -> Self {
        Self {
            config,
            connection: Mutex::new(None),
        }
    }

    fn connection(&self) -> MutexGuard<'_, Option<WsConnection>> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SignalingTransport for WsTransport {
    async fn connect(
        &self,
        url: &str,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<(), TransportError> {
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(TransportError::InvalidUrl(url.to_owned()));
        }

        let previous = self.connection().take();
        if let Some(previous) = previous {
            debug!("Dropping previous signaling connection");
            previous.task.abort();
        }

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(
            url.to_owned(),
            outgoing_rx,
            events,
            self.config.ping_interval,
        ));

        *self.connection() = Some(WsConnection { outgoing, task });
        Ok(())
    }

    fn send(&self, text: String) -> Result<(), TransportError> {
        let connection = self.connection();
        let Some(connection) = connection.as_ref() else {
            return Err(TransportError::NotConnected);
        };
        connection
            .outgoing
            .send(Message::Text(text))
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&self) {
        let connection = self.connection();
        if let Some(connection) = connection.as_ref() {
            let _ = connection.outgoing.send(Message::Close(None));
        }
    }

    async fn shutdown(&self) {
        let previous = self.connection().take();
        let Some(WsConnection { outgoing, mut task }) = previous else {
            return;
        };

        let _ = outgoing.send(Message::Close(None));
        drop(outgoing);

        if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            warn!("Signaling connection did not close in time, aborting");
            task.abort();
            let _ = task.await;
        }
    }
}

async fn run_connection(
    url: String,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
    events: mpsc::Sender<TransportEvent>,
    ping_interval: Duration,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            let _ = events.send(TransportEvent::Error(e.to_string())).await;
            return;
        }
    };

    info!("WebSocket connected to {}", url);
    let _ = events.send(TransportEvent::Opened).await;

    let (mut sink, mut stream) = ws_stream.split();
    let mut ping = tokio::time::interval(ping_interval);
    ping.tick().await;

    loop {
        tokio::select! {
            out = outgoing.recv() => {
                let Some(message) = out else {
                    let _ = sink.close().await;
                    let _ = events.send(TransportEvent::Closed).await;
                    break;
                };
                if let Err(e) = sink.send(message).await {
                    let _ = events.send(TransportEvent::Error(e.to_string())).await;
                    break;
                }
            }

            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let _ = events.send(TransportEvent::Message(text)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Server closed the signaling connection: {:?}", frame);
                        let _ = events.send(TransportEvent::Closed).await;
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let _ = events.send(TransportEvent::Error(e.to_string())).await;
                        break;
                    }
                    None => {
                        let _ = events.send(TransportEvent::Closed).await;
                        break;
                    }
                }
            }

            _ = ping.tick() => {
                if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                    let _ = events.send(TransportEvent::Error(e.to_string())).await;
                    break;
                }
            }
        }
    }

    debug!("WebSocket task for {} finished", url);
}
