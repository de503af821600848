use crate::supervisor::{
    ClientIndex, ConnectionStatus, ConnectionSupervisor, RetryPolicy, StreamEndpoint,
};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// One supervisor per stream, plus the index of which stream each peer came from.
#[derive(Clone)]
pub struct StreamRegistry {
    streams: Arc<DashMap<String, Arc<ConnectionSupervisor>>>,
    client_index: ClientIndex,
    endpoint_factory: Arc<dyn Fn(&str) -> StreamEndpoint + Send + Sync>,
    policy: RetryPolicy,
}

impl StreamRegistry {
    pub fn new<F>(policy: RetryPolicy, endpoint_factory: F) -> Self
    where
        F: Fn(&str) -> StreamEndpoint + Send + Sync + 'static,
    {
        Self {
            streams: Arc::new(DashMap::new()),
            client_index: Arc::new(DashMap::new()),
            endpoint_factory: Arc::new(endpoint_factory),
            policy,
        }
    }

    pub fn get_or_create(&self, stream_id: &str) -> Arc<ConnectionSupervisor> {
        if let Some(supervisor) = self.streams.get(stream_id) {
            return supervisor.clone();
        }

        info!("Registering stream {}", stream_id);
        let endpoint = (self.endpoint_factory)(stream_id);
        let supervisor = Arc::new(ConnectionSupervisor::with_client_index(
            stream_id,
            endpoint,
            self.policy.clone(),
            self.client_index.clone(),
        ));

        self.streams
            .entry(stream_id.to_owned())
            .or_insert(supervisor)
            .clone()
    }

    pub fn get(&self, stream_id: &str) -> Option<Arc<ConnectionSupervisor>> {
        self.streams.get(stream_id).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn start_all(&self) {
        for supervisor in self.supervisors() {
            supervisor.start();
        }
    }

    pub async fn stop_all(&self) {
        for supervisor in self.supervisors() {
            supervisor.stop().await;
        }
    }

    /// Stops the stream's supervisor and forgets it.
    pub async fn remove(&self, stream_id: &str) -> bool {
        let Some((_, supervisor)) = self.streams.remove(stream_id) else {
            return false;
        };
        supervisor.stop().await;
        self.client_index
            .retain(|_, client_stream| client_stream.as_str() != stream_id);
        true
    }

    /// Status of every stream, ordered by stream id.
    pub fn statuses(&self) -> Vec<(String, ConnectionStatus)> {
        let mut statuses: Vec<_> = self
            .streams
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().status()))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }

    pub fn stream_for_client(&self, client_id: &str) -> Option<String> {
        self.client_index
            .get(client_id)
            .map(|entry| entry.value().clone())
    }

    fn supervisors(&self) -> Vec<Arc<ConnectionSupervisor>> {
        self.streams
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
