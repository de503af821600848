mod connection_state;
mod connection_supervisor;
mod control_loop;
mod retry_policy;
mod stream_registry;
mod supervisor_listener;

pub use connection_state::{ConnectionState, ConnectionStatus};
pub use connection_supervisor::{ClientIndex, ConnectionSupervisor, StreamEndpoint};
pub use retry_policy::RetryPolicy;
pub use stream_registry::StreamRegistry;
