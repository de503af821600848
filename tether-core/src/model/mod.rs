mod call;
mod client;
mod ice;
mod sdp;
mod session;

pub use call::{PeerCallAnswer, PeerCallOffer};
pub use client::{Client, InvalidClient};
pub use ice::IceCandidate;
pub use sdp::{SdpType, ice_ufrag};
pub use session::SessionId;
