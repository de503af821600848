//! Integration tests for tether-client.
//!
//! Tests are organized by functionality:
//! - `session_tests` - handshake, inbound validation and dispatch, outbound actions
//! - `supervisor_tests` - reconnection, backoff and shutdown

pub mod supervisor_tests;

use std::sync::Arc;
use tracing::Level;

use tether_client::{SessionState, SignalingConfig, SignalingSession};

use crate::utils::{MockTransport, RecordingDelegate, RecordingListener};

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_config() -> SignalingConfig {
    SignalingConfig::for_streamer("ws://mock/signaling", "Camera01_Default")
}

/// Connect a session over a mock transport and wait until it is open.
pub async fn open_session(
    config: SignalingConfig,
    delegate: Option<RecordingDelegate>,
) -> (SignalingSession, MockTransport, RecordingListener) {
    let transport = MockTransport::opening();
    let listener = RecordingListener::new();

    let session = match delegate {
        Some(delegate) => SignalingSession::with_delegate(
            config,
            Arc::new(transport.clone()),
            Arc::new(listener.clone()),
            Arc::new(delegate),
        ),
        None => SignalingSession::new(
            config,
            Arc::new(transport.clone()),
            Arc::new(listener.clone()),
        ),
    };

    session.connect().await.expect("connect failed");
    wait_for_state(&session, SessionState::Open, 1000).await;

    (session, transport, listener)
}

pub async fn wait_for_state(session: &SignalingSession, state: SessionState, timeout_ms: u64) {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    while session.state() != state {
        assert!(
            tokio::time::Instant::now() < deadline,
            "session stuck in {:?}, expected {:?}",
            session.state(),
            state
        );
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}

/// Poll `condition` until it holds or `timeout_ms` passes.
pub async fn wait_until(condition: impl Fn() -> bool, timeout_ms: u64) -> bool {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() > deadline {
            return false;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}
