use serde_json::json;

use tether_client::{SessionState, SignalingError};
use tether_core::{Client, DecodeError};

use crate::integration::{init_tracing, open_session, test_config};
use crate::utils::{DelegateCall, ListenerEvent, RecordingDelegate};

#[tokio::test]
async fn test_room_update_keeps_valid_clients() {
    init_tracing();

    let (session, transport, listener) = open_session(test_config(), None).await;

    transport
        .emit_json(json!({
            "type": "roomClients",
            "clients": [
                {"id": "a", "name": "Alice", "data": {"seat": 1}},
                {"id": "b"},
                {"name": "no-id"},
                {"id": ""},
                42
            ]
        }))
        .await;

    assert!(
        listener
            .wait_for(|e| matches!(e, ListenerEvent::RoomClients(_)), 1000)
            .await
    );

    let updates: Vec<Vec<Client>> = listener
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ListenerEvent::RoomClients(clients) => Some(clients),
            _ => None,
        })
        .collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0],
        vec![
            Client::new("a", "Alice", json!({"seat": 1})),
            Client::new("b", "", serde_json::Value::Null),
        ]
    );

    let invalid = listener
        .errors()
        .into_iter()
        .filter(|e| matches!(e, SignalingError::InvalidClient(_)))
        .count();
    assert_eq!(invalid, 3);

    session.close_sync().await;
}

#[tokio::test]
async fn test_bad_messages_do_not_end_the_session() {
    init_tracing();

    let (session, transport, listener) = open_session(test_config(), None).await;

    transport
        .emit(tether_client::TransportEvent::Message("not json".into()))
        .await;
    transport.emit_json(json!({"type": 5})).await;
    transport.emit_json(json!({"type": "bogus"})).await;
    transport
        .emit_json(json!({"type": "roomClients", "clients": "nope"}))
        .await;
    transport.emit_json(json!({"type": "closeAllPeerConnections"})).await;

    assert!(listener.wait_for(|e| *e == ListenerEvent::CloseAll, 1000).await);

    let errors = listener.errors();
    assert_eq!(errors.len(), 4);
    assert!(matches!(
        errors[0],
        SignalingError::Decode(DecodeError::InvalidJson(_))
    ));
    assert_eq!(
        errors[1],
        SignalingError::Decode(DecodeError::TypeNotString)
    );
    assert_eq!(
        errors[2],
        SignalingError::Decode(DecodeError::UnknownType("bogus".into()))
    );
    assert!(matches!(
        errors[3],
        SignalingError::Decode(DecodeError::Malformed { .. })
    ));
    assert_eq!(session.state(), SessionState::Open);

    session.close_sync().await;
}

#[tokio::test]
async fn test_end_of_candidates_is_silent() {
    init_tracing();

    let delegate = RecordingDelegate::new();
    let (session, transport, listener) =
        open_session(test_config(), Some(delegate.clone())).await;

    transport
        .emit_json(json!({"type": "iceCandidate", "fromId": "streamer", "candidate": null}))
        .await;
    transport.emit_json(json!({"type": "closeAllPeerConnections"})).await;

    assert!(delegate.wait_for_calls(1, 1000).await);
    assert_eq!(delegate.calls().await, vec![DelegateCall::CloseAll]);
    assert!(listener.errors().is_empty());
    assert_eq!(
        listener.count(|e| matches!(e, ListenerEvent::IceCandidate(..))),
        0
    );

    session.close_sync().await;
}

#[tokio::test]
async fn test_candidate_with_wrong_field_types_is_reported() {
    init_tracing();

    let (session, transport, listener) = open_session(test_config(), None).await;

    transport
        .emit_json(json!({
            "type": "iceCandidate",
            "fromId": "streamer",
            "candidate": {"candidate": "c", "sdpMid": 0, "sdpMLineIndex": "0"}
        }))
        .await;

    assert!(
        listener
            .wait_for(|e| matches!(e, ListenerEvent::Error(_)), 1000)
            .await
    );
    assert_eq!(
        listener.count(|e| matches!(e, ListenerEvent::IceCandidate(..))),
        0
    );

    session.close_sync().await;
}

#[tokio::test]
async fn test_make_peer_call_skips_non_string_ids() {
    init_tracing();

    let delegate = RecordingDelegate::new();
    let (session, transport, listener) =
        open_session(test_config(), Some(delegate.clone())).await;

    transport
        .emit_json(json!({"type": "makePeerCall", "ids": ["p1", 7, "p2"]}))
        .await;

    assert!(delegate.wait_for_calls(2, 1000).await);
    assert_eq!(
        delegate.calls().await,
        vec![
            DelegateCall::MakePeerCall("p1".into()),
            DelegateCall::MakePeerCall("p2".into()),
        ]
    );
    assert_eq!(listener.errors(), vec![SignalingError::InvalidPeerId]);
    assert_eq!(
        listener.count(|e| matches!(e, ListenerEvent::MakePeerCall(_))),
        2
    );

    session.close_sync().await;
}
