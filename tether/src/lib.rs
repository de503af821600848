pub use tether_core::{Client, IceCandidate, PeerCallAnswer, PeerCallOffer, SessionId};

pub mod model {
    pub use tether_core::model::*;
}

pub mod codec {
    pub use tether_core::codec::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tether_client::*;
}
