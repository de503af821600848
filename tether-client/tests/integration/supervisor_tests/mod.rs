pub mod test_loss_handling;

use std::sync::Arc;
use std::time::Duration;

use tether_client::{ConnectionSupervisor, RetryPolicy, StreamEndpoint};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::integration::test_config;
use crate::utils::{ConnectBehavior, MockTransport, RecordingListener};

pub fn supervised(
    behavior: ConnectBehavior,
    policy: RetryPolicy,
) -> (
    ConnectionSupervisor,
    MockTransport,
    mpsc::UnboundedReceiver<Instant>,
    RecordingListener,
) {
    let (transport, connects) = MockTransport::new(behavior);
    let listener = RecordingListener::new();
    let endpoint = StreamEndpoint::new(test_config(), Arc::new(transport.clone()))
        .with_listener(Arc::new(listener.clone()));

    let supervisor = ConnectionSupervisor::new("Camera01_Default", endpoint, policy);
    (supervisor, transport, connects, listener)
}

/// Collect the gaps between the next `count` connect attempts, in milliseconds.
pub async fn connect_gaps(connects: &mut mpsc::UnboundedReceiver<Instant>, count: usize) -> Vec<u128> {
    let mut times = Vec::with_capacity(count);
    for _ in 0..count {
        times.push(connects.recv().await.expect("connect channel closed"));
    }
    times
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).as_millis())
        .collect()
}

/// Timer deadlines are rounded to the next millisecond.
pub fn assert_gaps(actual: &[u128], expected: &[u128]) {
    assert_eq!(actual.len(), expected.len(), "gaps: {:?}", actual);
    for (gap, want) in actual.iter().zip(expected) {
        assert!(
            *gap >= *want && *gap <= *want + 5,
            "gaps {:?} do not match {:?}",
            actual,
            expected
        );
    }
}

pub fn quick_policy() -> RetryPolicy {
    RetryPolicy {
        initial_delay: Duration::from_millis(20),
        max_delay: Duration::from_millis(100),
        ..RetryPolicy::default()
    }
}
