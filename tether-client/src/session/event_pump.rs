use crate::negotiation::NegotiationCommand;
use crate::session::SessionHandle;
use crate::transport::TransportEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Drains one connection's transport events into the session, strictly in order.
pub(crate) struct EventPump {
    session: SessionHandle,
    events: mpsc::Receiver<TransportEvent>,
    negotiation: Option<mpsc::UnboundedSender<NegotiationCommand>>,
}

impl EventPump {
    pub(crate) fn new(
        session: SessionHandle,
        events: mpsc::Receiver<TransportEvent>,
        negotiation: Option<mpsc::UnboundedSender<NegotiationCommand>>,
    ) -> Self {
        Self {
            session,
            events,
            negotiation,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!("Signaling event pump started");

        while let Some(event) = self.events.recv().await {
            let Some(session) = self.session.upgrade() else {
                break;
            };
            session
                .handle_transport_event(event, self.negotiation.as_ref())
                .await;
        }

        if let Some(session) = self.session.upgrade() {
            session.transport_vanished();
        }

        debug!("Signaling event pump finished");
    }
}
