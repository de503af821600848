use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    ListStreamers,
    Subscribe {
        streamer_id: String,
    },
    JoinRoom {
        name: String,
        data: Value,
        room: String,
        password: String,
        protocol_version: u32,
    },
    CallAll,
    CallIds {
        ids: Vec<String>,
    },
    CloseAllRoomPeerConnections,
    Offer {
        to_id: String,
        sdp: String,
    },
    Answer {
        to_id: String,
        sdp: String,
    },
    /// An answer without a description: the call from `to_id` is declined.
    PeerCallAnswer {
        to_id: String,
    },
    IceCandidate {
        to_id: String,
        candidate: OutboundIceCandidate,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundIceCandidate {
    pub candidate: String,
    pub sdp_mid: String,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

pub fn encode(message: &OutboundMessage) -> serde_json::Result<String> {
    serde_json::to_string(message)
}
