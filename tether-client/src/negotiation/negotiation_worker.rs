use crate::negotiation::{NegotiationCommand, PeerNegotiationDelegate};
use crate::session::SessionHandle;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub(crate) struct NegotiationWorker {
    delegate: Arc<dyn PeerNegotiationDelegate>,
    session: SessionHandle,
    commands: mpsc::UnboundedReceiver<NegotiationCommand>,
}

impl NegotiationWorker {
    pub(crate) fn new(
        delegate: Arc<dyn PeerNegotiationDelegate>,
        session: SessionHandle,
        commands: mpsc::UnboundedReceiver<NegotiationCommand>,
    ) -> Self {
        Self {
            delegate,
            session,
            commands,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!("Negotiation worker started");

        while let Some(command) = self.commands.recv().await {
            let Some(session) = self.session.upgrade() else {
                break;
            };

            let result = match command {
                NegotiationCommand::ReceivePeerCall(offer) => {
                    self.delegate.receive_peer_call(&session, offer).await
                }
                NegotiationCommand::ReceivePeerCallAnswer(answer) => {
                    self.delegate.receive_peer_call_answer(&session, answer).await
                }
                NegotiationCommand::ReceiveIceCandidate { from_id, candidate } => {
                    self.delegate
                        .receive_ice_candidate(&session, from_id, candidate)
                        .await
                }
                NegotiationCommand::MakePeerCall { peer_id } => {
                    self.delegate.make_peer_call(&session, peer_id).await
                }
                NegotiationCommand::CallRejected { from_id } => {
                    self.delegate.call_rejected(&session, from_id).await;
                    Ok(())
                }
                NegotiationCommand::CloseAllPeerConnections => {
                    self.delegate.close_all_peer_connections(&session).await;
                    Ok(())
                }
            };

            if let Err(e) = result {
                warn!("{}", e);
                session.report_client_connection_failed(&e.peer_id, &e.reason);
            }
        }

        debug!("Negotiation worker finished");
    }
}
