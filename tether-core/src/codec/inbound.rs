use crate::codec::constants::*;
use crate::codec::decode_error::DecodeError;
use crate::model::{Client, IceCandidate, InvalidClient, PeerCallAnswer, PeerCallOffer, SdpType};
use serde_json::{Map, Value};

/// A decoded message whose fields have all been checked.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    StreamerList {
        ids: Vec<String>,
        rejected: usize,
    },
    /// Raw `sessionId` of a join-room acknowledgment, judged by the session.
    JoinRoomAnswer {
        session_id: Value,
    },
    RoomClients {
        clients: Vec<Client>,
        rejected: Vec<InvalidClient>,
    },
    MakePeerCall {
        ids: Vec<String>,
        rejected: usize,
    },
    PeerCall(PeerCallOffer),
    PeerCallAnswer(PeerCallAnswer),
    CallRejected {
        from_id: String,
    },
    /// `candidate: None` is the end-of-candidates marker.
    IceCandidate {
        from_id: String,
        candidate: Option<IceCandidate>,
    },
    CloseAllPeerConnections,
}

impl InboundMessage {
    pub fn message_type(&self) -> &'static str {
        match self {
            InboundMessage::StreamerList { .. } => STREAMER_LIST,
            InboundMessage::JoinRoomAnswer { .. } => JOIN_ROOM_ANSWER,
            InboundMessage::RoomClients { .. } => ROOM_CLIENTS,
            InboundMessage::MakePeerCall { .. } => MAKE_PEER_CALL,
            InboundMessage::PeerCall(_) => PEER_CALL_RECEIVED,
            InboundMessage::PeerCallAnswer(_) | InboundMessage::CallRejected { .. } => {
                PEER_CALL_ANSWER_RECEIVED
            }
            InboundMessage::IceCandidate { .. } => ICE_CANDIDATE,
            InboundMessage::CloseAllPeerConnections => CLOSE_ALL_PEER_CONNECTIONS,
        }
    }
}

pub fn decode(text: &str) -> Result<InboundMessage, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let message_type = match object.get(TYPE_FIELD) {
        None => return Err(DecodeError::MissingType),
        Some(Value::String(t)) => t.as_str(),
        Some(_) => return Err(DecodeError::TypeNotString),
    };

    match message_type {
        STREAMER_LIST => decode_streamer_list(object),
        JOIN_ROOM_ANSWER => Ok(InboundMessage::JoinRoomAnswer {
            session_id: object.get("sessionId").cloned().unwrap_or(Value::Null),
        }),
        ROOM_CLIENTS => decode_room_clients(object),
        MAKE_PEER_CALL => decode_make_peer_call(object),
        OFFER => decode_flat_offer(object),
        ANSWER => decode_flat_answer(object),
        PEER_CALL_RECEIVED => decode_peer_call(object),
        PEER_CALL_ANSWER_RECEIVED => decode_peer_call_answer(object),
        ICE_CANDIDATE => decode_ice_candidate(object),
        CLOSE_ALL_PEER_CONNECTIONS => Ok(InboundMessage::CloseAllPeerConnections),
        other => Err(DecodeError::UnknownType(other.to_owned())),
    }
}

fn malformed(message_type: &'static str, reason: &'static str) -> DecodeError {
    DecodeError::Malformed {
        message_type,
        reason,
    }
}

/// `fromId` is optional on streamer messages but must be a string when present.
fn optional_from_id(
    object: &Map<String, Value>,
    message_type: &'static str,
) -> Result<String, DecodeError> {
    match object.get("fromId") {
        None | Some(Value::Null) => Ok(DEFAULT_PEER_ID.to_owned()),
        Some(Value::String(id)) => Ok(id.clone()),
        Some(_) => Err(malformed(message_type, "fromId type")),
    }
}

fn decode_streamer_list(object: &Map<String, Value>) -> Result<InboundMessage, DecodeError> {
    let entries = object
        .get("ids")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(STREAMER_LIST, "ids is missing or not an array"))?;

    let ids: Vec<String> = entries
        .iter()
        .filter_map(|id| id.as_str().map(str::to_owned))
        .collect();
    let rejected = entries.len() - ids.len();

    Ok(InboundMessage::StreamerList { ids, rejected })
}

fn decode_room_clients(object: &Map<String, Value>) -> Result<InboundMessage, DecodeError> {
    let entries = object
        .get("clients")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(ROOM_CLIENTS, "clients is missing or not an array"))?;

    let mut clients = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    for entry in entries {
        match Client::from_value(entry) {
            Ok(client) => clients.push(client),
            Err(e) => rejected.push(e),
        }
    }

    Ok(InboundMessage::RoomClients { clients, rejected })
}

fn decode_make_peer_call(object: &Map<String, Value>) -> Result<InboundMessage, DecodeError> {
    let entries = object
        .get("ids")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(MAKE_PEER_CALL, "global type"))?;

    let ids: Vec<String> = entries
        .iter()
        .filter_map(|id| id.as_str().map(str::to_owned))
        .collect();
    let rejected = entries.len() - ids.len();

    Ok(InboundMessage::MakePeerCall { ids, rejected })
}

fn flat_sdp(object: &Map<String, Value>, message_type: &'static str) -> Result<String, DecodeError> {
    match object.get("sdp") {
        None => Err(malformed(message_type, "sdp is missing")),
        Some(Value::String(sdp)) => Ok(sdp.clone()),
        Some(_) => Err(malformed(message_type, "sdp wrong type")),
    }
}

fn decode_flat_offer(object: &Map<String, Value>) -> Result<InboundMessage, DecodeError> {
    let sdp = flat_sdp(object, OFFER)?;
    let from_id = optional_from_id(object, OFFER)?;
    Ok(InboundMessage::PeerCall(PeerCallOffer { from_id, sdp }))
}

fn decode_flat_answer(object: &Map<String, Value>) -> Result<InboundMessage, DecodeError> {
    let sdp = flat_sdp(object, ANSWER)?;
    let from_id = optional_from_id(object, ANSWER)?;
    Ok(InboundMessage::PeerCallAnswer(PeerCallAnswer { from_id, sdp }))
}

/// Checks a nested `{sdp, type}` object and returns the sdp when `type` matches.
fn nested_description(
    description: &Map<String, Value>,
    message_type: &'static str,
    expected_type: SdpType,
    wrong_type_reason: &'static str,
) -> Result<String, DecodeError> {
    let (Some(sdp), Some(sdp_type)) = (description.get("sdp"), description.get("type")) else {
        return Err(malformed(message_type, "sdp or type are missing"));
    };
    let (Value::String(sdp), Value::String(sdp_type)) = (sdp, sdp_type) else {
        return Err(malformed(message_type, "sdp or type wrong types"));
    };
    if sdp_type != expected_type.as_str() {
        return Err(DecodeError::ProtocolViolation {
            message_type,
            reason: wrong_type_reason,
        });
    }
    Ok(sdp.clone())
}

fn decode_peer_call(object: &Map<String, Value>) -> Result<InboundMessage, DecodeError> {
    let (Some(from_id), Some(offer)) = (object.get("fromId"), object.get("offer")) else {
        return Err(malformed(PEER_CALL_RECEIVED, "fromId or offer are missing"));
    };
    let (Value::String(from_id), Value::Object(offer)) = (from_id, offer) else {
        return Err(malformed(PEER_CALL_RECEIVED, "fromId or offer types"));
    };

    let sdp = nested_description(offer, PEER_CALL_RECEIVED, SdpType::Offer, "invalid offer type")?;

    Ok(InboundMessage::PeerCall(PeerCallOffer {
        from_id: from_id.clone(),
        sdp,
    }))
}

fn decode_peer_call_answer(object: &Map<String, Value>) -> Result<InboundMessage, DecodeError> {
    let Some(Value::String(from_id)) = object.get("fromId") else {
        return Err(malformed(PEER_CALL_ANSWER_RECEIVED, "fromId type"));
    };

    let Some(Value::Object(answer)) = object.get("answer") else {
        return Ok(InboundMessage::CallRejected {
            from_id: from_id.clone(),
        });
    };

    let sdp = nested_description(
        answer,
        PEER_CALL_ANSWER_RECEIVED,
        SdpType::Answer,
        "invalid answer type",
    )?;

    Ok(InboundMessage::PeerCallAnswer(PeerCallAnswer {
        from_id: from_id.clone(),
        sdp,
    }))
}

fn decode_ice_candidate(object: &Map<String, Value>) -> Result<InboundMessage, DecodeError> {
    let from_id = optional_from_id(object, ICE_CANDIDATE)?;

    let candidate = match object.get("candidate") {
        None => return Err(malformed(ICE_CANDIDATE, "candidate is missing")),
        Some(Value::Null) => {
            return Ok(InboundMessage::IceCandidate {
                from_id,
                candidate: None,
            });
        }
        Some(Value::Object(candidate)) => candidate,
        Some(_) => return Err(malformed(ICE_CANDIDATE, "candidate wrong type")),
    };

    let (Some(sdp_mid), Some(index), Some(line)) = (
        candidate.get("sdpMid"),
        candidate.get("sdpMLineIndex"),
        candidate.get("candidate"),
    ) else {
        return Err(malformed(
            ICE_CANDIDATE,
            "sdpMid, sdpMLineIndex or candidate are missing",
        ));
    };

    let index = index.as_u64().and_then(|i| u16::try_from(i).ok());
    let (Value::String(sdp_mid), Some(sdp_m_line_index), Value::String(line)) =
        (sdp_mid, index, line)
    else {
        return Err(malformed(
            ICE_CANDIDATE,
            "sdpMid, sdpMLineIndex or candidate wrong types",
        ));
    };

    Ok(InboundMessage::IceCandidate {
        from_id,
        candidate: Some(IceCandidate {
            sdp_mid: sdp_mid.clone(),
            sdp_m_line_index,
            candidate: line.clone(),
        }),
    })
}
