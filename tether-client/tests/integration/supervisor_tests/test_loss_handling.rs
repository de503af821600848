use serde_json::Value;
use std::time::Duration;

use tether_client::{ConnectionState, TransportEvent};
use tether_core::Client;

use crate::integration::supervisor_tests::{quick_policy, supervised};
use crate::integration::{init_tracing, wait_until};
use crate::utils::{ConnectBehavior, ListenerEvent};

#[tokio::test]
async fn test_duplicate_losses_collapse_into_one_retry() {
    init_tracing();

    let (supervisor, transport, _connects, listener) =
        supervised(ConnectBehavior::Open, quick_policy());
    supervisor.start();
    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);

    transport
        .emit(TransportEvent::Error("connection reset".into()))
        .await;
    transport.emit(TransportEvent::Closed).await;

    assert!(wait_until(|| transport.connect_count() == 2, 1000).await);
    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(transport.connect_count(), 2);
    assert_eq!(supervisor.status().attempt_count, 0);
    // the application still sees both events
    assert!(
        listener
            .events()
            .contains(&ListenerEvent::ConnectionError("connection reset".into()))
    );
    assert!(listener.events().contains(&ListenerEvent::Closed));

    supervisor.stop().await;
}

#[tokio::test]
async fn test_successful_open_resets_the_attempt_count() {
    init_tracing();

    let (supervisor, transport, mut connects, _listener) =
        supervised(ConnectBehavior::Refuse, quick_policy());
    supervisor.start();

    for _ in 0..3 {
        connects.recv().await.unwrap();
    }
    transport.set_behavior(ConnectBehavior::Open);

    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 2000).await);
    let status = supervisor.status();
    assert_eq!(status.attempt_count, 0);
    assert!(status.last_connected_time.is_some());
    assert!(supervisor.session().is_connected());

    supervisor.stop().await;
}

#[tokio::test]
async fn test_start_twice_connects_once() {
    init_tracing();

    let (supervisor, transport, _connects, _listener) =
        supervised(ConnectBehavior::Open, quick_policy());

    supervisor.start();
    supervisor.start();

    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(transport.connect_count(), 1);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_peer_disconnect_counts_as_a_loss() {
    init_tracing();

    let (supervisor, transport, _connects, listener) =
        supervised(ConnectBehavior::Open, quick_policy());
    supervisor.start();
    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);

    let peer = Client::new("streamer", "streamer", Value::Null);
    supervisor.session().report_client_connected(&peer);
    supervisor.session().report_client_disconnected(&peer);

    assert!(wait_until(|| transport.connect_count() == 2, 1000).await);
    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);
    assert!(
        listener
            .events()
            .contains(&ListenerEvent::ClientDisconnected("streamer".into()))
    );

    // closing the old connection on the way is not another loss
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(transport.connect_count(), 2);
    assert_eq!(supervisor.state(), ConnectionState::Connected);
    assert_eq!(supervisor.status().attempt_count, 0);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_each_loss_reconnects_exactly_once() {
    init_tracing();

    let (supervisor, transport, _connects, listener) =
        supervised(ConnectBehavior::Open, quick_policy());
    supervisor.start();
    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);

    for expected in 2..=4 {
        transport
            .emit(TransportEvent::Error("connection reset".into()))
            .await;
        assert!(wait_until(|| transport.connect_count() == expected, 1000).await);
        assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(transport.connect_count(), expected);
    }
    assert_eq!(listener.count(|e| *e == ListenerEvent::Opened), 4);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_vanished_transport_is_retried() {
    init_tracing();

    let (supervisor, transport, _connects, _listener) =
        supervised(ConnectBehavior::Open, quick_policy());
    supervisor.start();
    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);

    transport.vanish();

    assert!(wait_until(|| transport.connect_count() == 2, 1000).await);
    assert!(wait_until(|| supervisor.state() == ConnectionState::Connected, 1000).await);
    assert!(supervisor.session().is_connected());
    assert!(supervisor.is_running());

    supervisor.stop().await;
}
