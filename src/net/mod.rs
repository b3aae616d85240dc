//! Wire protocol and transport seams

pub mod protocol;
pub mod transport;
pub mod ws;

pub use protocol::{PeerMsg, RelayMsg};
pub use transport::{Channel, TransportError};
