use serde::{Deserialize, Serialize};

/// A validated incoming call: the remote peer offers `sdp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerCallOffer {
    pub from_id: String,
    pub sdp: String,
}

/// A validated answer to a call this side placed earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerCallAnswer {
    pub from_id: String,
    pub sdp: String,
}
