use tether_core::{IceCandidate, PeerCallAnswer, PeerCallOffer};

pub(crate) enum NegotiationCommand {
    ReceivePeerCall(PeerCallOffer),
    ReceivePeerCallAnswer(PeerCallAnswer),
    CallRejected {
        from_id: String,
    },
    ReceiveIceCandidate {
        from_id: String,
        candidate: IceCandidate,
    },
    MakePeerCall {
        peer_id: String,
    },
    CloseAllPeerConnections,
}
