pub const TYPE_FIELD: &str = "type";

/// Peer id used when a streamer sends an offer without `fromId`.
pub const DEFAULT_PEER_ID: &str = "default";

pub const SIGNALING_PROTOCOL_VERSION: u32 = 2;

pub const STREAMER_LIST: &str = "streamerList";
pub const JOIN_ROOM_ANSWER: &str = "joinRoomAnswer";
pub const ROOM_CLIENTS: &str = "roomClients";
pub const MAKE_PEER_CALL: &str = "makePeerCall";
pub const OFFER: &str = "offer";
pub const ANSWER: &str = "answer";
pub const PEER_CALL_RECEIVED: &str = "peerCallReceived";
pub const PEER_CALL_ANSWER_RECEIVED: &str = "peerCallAnswerReceived";
pub const ICE_CANDIDATE: &str = "iceCandidate";
pub const CLOSE_ALL_PEER_CONNECTIONS: &str = "closeAllPeerConnections";
