//! Tankduel - peer-to-peer turn-based artillery duel
//!
//! The crate core is the authoritative turn-based simulation and the
//! state-synchronization protocol between exactly two peers: one
//! authoritative by convention (first to accept an inbound connection),
//! one replicating snapshots wholesale. Rendering and pointer input are
//! external collaborators behind the `Frontend` trait and the session's
//! drag API.

pub mod config;
pub mod game;
pub mod net;
pub mod relay;
pub mod session;
pub mod util;
