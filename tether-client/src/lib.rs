mod config;
mod error;
mod negotiation;
mod session;
mod supervisor;
mod transport;

pub use config::*;
pub use error::*;
pub use negotiation::*;
pub use session::*;
pub use supervisor::*;
pub use transport::*;
