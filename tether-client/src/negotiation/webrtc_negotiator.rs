use crate::error::NegotiationError;
use crate::negotiation::{NegotiatorConfig, PeerNegotiationDelegate};
use crate::session::{SessionHandle, SignalingSession};
use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_core::{Client, IceCandidate, PeerCallAnswer, PeerCallOffer};
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

struct PeerEntry {
    generation: u64,
    connection: Arc<RTCPeerConnection>,
}

type PeerMap = Arc<DashMap<String, PeerEntry>>;

/// Receive-only WebRTC peer connections, one per remote peer.
pub struct WebrtcNegotiator {
    api: API,
    config: NegotiatorConfig,
    peers: PeerMap,
    next_generation: AtomicU64,
}

/// Only the connection currently registered for a peer may report on it.
fn is_current(peers: &PeerMap, peer_id: &str, generation: u64) -> bool {
    peers
        .get(peer_id)
        .is_some_and(|entry| entry.generation == generation)
}

impl WebrtcNegotiator {
    pub fn new(config: NegotiatorConfig) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self {
            api,
            config,
            peers: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        })
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    async fn open_peer(
        &self,
        peer_id: &str,
        session: SessionHandle,
    ) -> Result<Arc<RTCPeerConnection>> {
        self.close_peer(peer_id).await;

        let rtc_config = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: self.config.ice_servers.clone(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let peer_connection = Arc::new(self.api.new_peer_connection(rtc_config).await?);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let state_session = session.clone();
        let state_peer = peer_id.to_owned();
        let state_peers = self.peers.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let session = state_session.clone();
                let peer_id = state_peer.clone();
                let peers = state_peers.clone();

                Box::pin(async move {
                    debug!("Peer connection state for {}: {:?}", peer_id, s);
                    if !is_current(&peers, &peer_id, generation) {
                        return;
                    }
                    let Some(session) = session.upgrade() else {
                        return;
                    };
                    let client = Client::new(peer_id.clone(), peer_id.clone(), Value::Null);
                    match s {
                        RTCPeerConnectionState::Connected => {
                            session.report_client_connected(&client)
                        }
                        RTCPeerConnectionState::Disconnected | RTCPeerConnectionState::Closed => {
                            session.report_client_disconnected(&client)
                        }
                        RTCPeerConnectionState::Failed => session
                            .report_client_connection_failed(&peer_id, "peer connection failed"),
                        _ => {}
                    }
                })
            },
        ));

        let ice_peer = peer_id.to_owned();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let session = session.clone();
            let peer_id = ice_peer.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let Some(session) = session.upgrade() else {
                    return;
                };
                let _ = session.send_ice_candidate(
                    &peer_id,
                    init.sdp_mid.as_deref().unwrap_or_default(),
                    init.sdp_mline_index.unwrap_or_default(),
                    &init.candidate,
                );
            })
        }));

        self.peers.insert(
            peer_id.to_owned(),
            PeerEntry {
                generation,
                connection: peer_connection.clone(),
            },
        );
        Ok(peer_connection)
    }

    async fn close_peer(&self, peer_id: &str) {
        let Some((_, entry)) = self.peers.remove(peer_id) else {
            return;
        };
        if let Err(e) = entry.connection.close().await {
            warn!("Failed to close peer connection for {}: {:?}", peer_id, e);
        }
    }

    fn peer(&self, peer_id: &str) -> Result<Arc<RTCPeerConnection>> {
        self.peers
            .get(peer_id)
            .map(|entry| entry.connection.clone())
            .with_context(|| format!("no peer connection for {}", peer_id))
    }

    async fn answer_call(&self, session: &SignalingSession, offer: PeerCallOffer) -> Result<()> {
        let peer_connection = self.open_peer(&offer.from_id, session.downgrade()).await?;

        peer_connection
            .set_remote_description(RTCSessionDescription::offer(offer.sdp)?)
            .await?;
        let answer = peer_connection.create_answer(None).await?;
        peer_connection
            .set_local_description(answer.clone())
            .await?;

        session.make_peer_call_answer(&offer.from_id, &answer.sdp)?;
        Ok(())
    }

    async fn apply_answer(&self, answer: PeerCallAnswer) -> Result<()> {
        let peer_connection = self.peer(&answer.from_id)?;
        peer_connection
            .set_remote_description(RTCSessionDescription::answer(answer.sdp)?)
            .await?;
        Ok(())
    }

    async fn add_candidate(&self, from_id: &str, candidate: IceCandidate) -> Result<()> {
        let peer_connection = self.peer(from_id)?;
        peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: Some(candidate.sdp_mid),
                sdp_mline_index: Some(candidate.sdp_m_line_index),
                username_fragment: None,
            })
            .await?;
        Ok(())
    }

    async fn place_call(&self, session: &SignalingSession, peer_id: &str) -> Result<()> {
        let peer_connection = self.open_peer(peer_id, session.downgrade()).await?;

        for kind in [RTPCodecType::Video, RTPCodecType::Audio] {
            peer_connection
                .add_transceiver_from_kind(
                    kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Recvonly,
                        send_encodings: Vec::new(),
                    }),
                )
                .await?;
        }

        let offer = peer_connection.create_offer(None).await?;
        peer_connection.set_local_description(offer.clone()).await?;

        session.call_peer(peer_id, &offer.sdp)?;
        Ok(())
    }
}

#[async_trait]
impl PeerNegotiationDelegate for WebrtcNegotiator {
    async fn receive_peer_call(
        &self,
        session: &SignalingSession,
        offer: PeerCallOffer,
    ) -> Result<(), NegotiationError> {
        let peer_id = offer.from_id.clone();
        info!("Answering call from {}", peer_id);
        self.answer_call(session, offer)
            .await
            .map_err(|e| NegotiationError::new(peer_id, e))
    }

    async fn receive_peer_call_answer(
        &self,
        _session: &SignalingSession,
        answer: PeerCallAnswer,
    ) -> Result<(), NegotiationError> {
        let peer_id = answer.from_id.clone();
        self.apply_answer(answer)
            .await
            .map_err(|e| NegotiationError::new(peer_id, e))
    }

    async fn receive_ice_candidate(
        &self,
        _session: &SignalingSession,
        from_id: String,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        self.add_candidate(&from_id, candidate)
            .await
            .map_err(|e| NegotiationError::new(from_id, e))
    }

    async fn close_all_peer_connections(&self, _session: &SignalingSession) {
        let peer_ids: Vec<String> = self.peers.iter().map(|entry| entry.key().clone()).collect();
        for peer_id in peer_ids {
            self.close_peer(&peer_id).await;
        }
    }

    async fn make_peer_call(
        &self,
        session: &SignalingSession,
        peer_id: String,
    ) -> Result<(), NegotiationError> {
        info!("Calling {}", peer_id);
        self.place_call(session, &peer_id)
            .await
            .map_err(|e| NegotiationError::new(peer_id, e))
    }

    async fn call_rejected(&self, _session: &SignalingSession, from_id: String) {
        self.close_peer(&from_id).await;
    }
}
