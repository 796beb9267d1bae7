//! Connection lifecycle: handles, state machine, registry and session binding.

pub mod authenticator;
pub mod handle;
pub mod pool;
pub mod state;

pub use handle::{ConnectionHandle, ConnectionId};
pub use pool::ConnectionPool;
pub use state::{ConnectionState, JoinedRoom, LifecycleState};
