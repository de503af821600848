use serde_json::json;
use std::sync::Arc;

use tether_client::{Handshake, JoinRoomConfig, SessionState, SignalingConfig, SignalingSession};

use crate::integration::{init_tracing, test_config, wait_for_state, wait_until};
use crate::utils::{ListenerEvent, MockTransport, RecordingListener, streamer_list};

fn join_room_config() -> SignalingConfig {
    SignalingConfig {
        handshake: Handshake::JoinRoom(JoinRoomConfig {
            name: "viewer".into(),
            data: json!({"role": "monitor"}),
            room: "lobby".into(),
            password: "hunter2".into(),
        }),
        ..test_config()
    }
}

async fn joining_session() -> (SignalingSession, MockTransport, RecordingListener) {
    let transport = MockTransport::opening();
    let listener = RecordingListener::new();
    let session = SignalingSession::new(
        join_room_config(),
        Arc::new(transport.clone()),
        Arc::new(listener.clone()),
    );

    session.connect().await.expect("connect failed");
    assert!(wait_until(|| !transport.sent_of_type("joinRoom").is_empty(), 1000).await);

    (session, transport, listener)
}

#[tokio::test]
async fn test_join_request_is_sent_on_open() {
    init_tracing();

    let (session, transport, listener) = joining_session().await;

    assert_eq!(
        transport.sent_of_type("joinRoom")[0],
        json!({
            "type": "joinRoom",
            "name": "viewer",
            "data": {"role": "monitor"},
            "room": "lobby",
            "password": "hunter2",
            "protocolVersion": 2
        })
    );
    assert_eq!(session.state(), SessionState::Connecting);
    assert!(session.session_id().is_empty());
    assert!(!listener.events().contains(&ListenerEvent::Opened));

    session.close_sync().await;
}

#[tokio::test]
async fn test_acknowledged_join_opens_the_session() {
    init_tracing();

    let (session, transport, listener) = joining_session().await;

    transport
        .emit_json(json!({"type": "joinRoomAnswer", "sessionId": "abc-123"}))
        .await;

    wait_for_state(&session, SessionState::Open, 1000).await;
    assert_eq!(session.session_id().as_str(), "abc-123");
    assert_eq!(listener.count(|e| *e == ListenerEvent::Opened), 1);

    session.close_sync().await;
}

#[tokio::test]
async fn test_empty_session_id_means_bad_password() {
    init_tracing();

    let (session, transport, listener) = joining_session().await;

    transport
        .emit_json(json!({"type": "joinRoomAnswer", "sessionId": ""}))
        .await;

    assert!(
        listener
            .wait_for(
                |e| *e
                    == ListenerEvent::ConnectionError(
                        "Invalid password or invalid protocol version".into()
                    ),
                1000
            )
            .await
    );
    assert_eq!(session.state(), SessionState::Closed);
    assert!(session.session_id().is_empty());

    session.close_sync().await;
}

#[tokio::test]
async fn test_non_string_session_id_is_an_invalid_response() {
    init_tracing();

    let (session, transport, listener) = joining_session().await;

    transport
        .emit_json(json!({"type": "joinRoomAnswer", "sessionId": 42}))
        .await;

    assert!(
        listener
            .wait_for(
                |e| *e == ListenerEvent::ConnectionError("Invalid join-room response".into()),
                1000
            )
            .await
    );
    assert_eq!(session.state(), SessionState::Closed);

    session.close_sync().await;
}

#[tokio::test]
async fn test_messages_before_join_are_dropped() {
    init_tracing();

    let (session, transport, listener) = joining_session().await;

    transport.emit_json(streamer_list(&["Camera01_Default"])).await;
    transport
        .emit_json(json!({"type": "joinRoomAnswer", "sessionId": "s1"}))
        .await;

    wait_for_state(&session, SessionState::Open, 1000).await;
    assert_eq!(
        listener.count(|e| matches!(e, ListenerEvent::StreamersAvailable(_))),
        0
    );
    assert!(transport.sent_of_type("subscribe").is_empty());

    session.close_sync().await;
}
