use serde::Deserialize;
use serde_json::Value;

/// Where and how a [`SignalingSession`](crate::SignalingSession) connects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignalingConfig {
    pub url: String,
    /// Streamers to subscribe to once the server lists what it has.
    /// Empty means "the first one offered".
    pub target_streamers: Vec<String>,
    pub handshake: Handshake,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:80/signaling".to_owned(),
            target_streamers: Vec::new(),
            handshake: Handshake::default(),
        }
    }
}

impl SignalingConfig {
    pub fn for_streamer(url: impl Into<String>, streamer_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target_streamers: vec![streamer_id.into()],
            ..Self::default()
        }
    }
}

/// The handshake contract of the target server. Exactly one applies per session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Handshake {
    /// The session is open as soon as the transport is; the first message sent
    /// is the streamer listing request.
    #[default]
    StreamerList,
    /// The session opens only when the server acknowledges `joinRoom` with a
    /// non-empty session id.
    JoinRoom(JoinRoomConfig),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JoinRoomConfig {
    pub name: String,
    pub data: Value,
    pub room: String,
    pub password: String,
}

impl Default for JoinRoomConfig {
    fn default() -> Self {
        Self {
            name: "tether".to_owned(),
            data: Value::Object(Default::default()),
            room: "chat".to_owned(),
            password: String::new(),
        }
    }
}
