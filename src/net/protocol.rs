//! Wire message definitions
//!
//! Two layers share this file: the peer-to-peer game protocol carried as
//! opaque frames, and the small relay protocol that moves those frames
//! between exactly two peers. The relay never inspects game payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{MatchState, Projectile};

/// Messages exchanged directly between the two peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeerMsg {
    /// Non-authoritative -> authoritative, once after channel open:
    /// requests the initial snapshot.
    ReadyRequest,

    /// Authoritative -> non-authoritative, at match start and after every
    /// resolved turn. The receiver replaces its entire local state
    /// wholesale; this is the sole source of truth for health, turn,
    /// wind and match-over status.
    FullSync { state: MatchState },

    /// Either direction; sender is the player whose turn it is. The
    /// receiver installs the payload verbatim as its speculative
    /// projectile and starts simulating immediately.
    ShotFired { shot: Projectile },

    /// Liveness probe, emitted periodically by both sides.
    Keepalive { seq: u32 },

    /// Trivial acknowledgment of a probe.
    KeepaliveAck { seq: u32 },
}

impl PeerMsg {
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_frame(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

/// Messages between a peer and the rendezvous relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMsg {
    /// Relay -> peer on connect: the identifier other peers dial.
    Assigned { peer_id: Uuid },

    /// Joiner -> relay: pair me with this host.
    Attach { host_id: Uuid },

    /// Relay -> joiner: attach succeeded, the channel is live.
    Attached,

    /// Relay -> host: a joiner attached, the channel is live.
    PeerJoined,

    /// Relay -> joiner: that host is already paired. The attach is
    /// rejected without disturbing the active session.
    Busy,

    /// Relay -> joiner: no such host id (route not found).
    NotFound,

    /// Either direction: one opaque game frame to forward verbatim.
    Frame { payload: String },

    /// Relay -> surviving peer: the other side went away. Treated as a
    /// channel close.
    PeerLeft,
}

impl RelayMsg {
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, MatchState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn peer_messages_use_snake_case_tags() {
        let json = PeerMsg::ReadyRequest.to_frame().unwrap();
        assert_eq!(json, r#"{"type":"ready_request"}"#);

        let json = PeerMsg::Keepalive { seq: 3 }.to_frame().unwrap();
        assert_eq!(json, r#"{"type":"keepalive","seq":3}"#);
    }

    #[test]
    fn full_sync_round_trips_field_for_field() {
        let cfg = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let state = MatchState::generate(&cfg, &mut rng);

        let frame = PeerMsg::FullSync {
            state: state.clone(),
        }
        .to_frame()
        .unwrap();

        match PeerMsg::from_frame(&frame).unwrap() {
            PeerMsg::FullSync { state: back } => assert_eq!(back, state),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn shot_fired_preserves_kinematics_exactly() {
        let shot = Projectile {
            x: 10.0,
            y: 20.0,
            vx: 5.0,
            vy: -3.0,
            wind_at_launch: 0.05,
        };
        let frame = PeerMsg::ShotFired { shot }.to_frame().unwrap();
        match PeerMsg::from_frame(&frame).unwrap() {
            PeerMsg::ShotFired { shot: back } => assert_eq!(back, shot),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_frames_fail_to_parse() {
        assert!(PeerMsg::from_frame(r#"{"type":"warp_drive"}"#).is_err());
        assert!(PeerMsg::from_frame("not json").is_err());
    }

    #[test]
    fn relay_attach_round_trips() {
        let id = Uuid::new_v4();
        let text = RelayMsg::Attach { host_id: id }.to_text().unwrap();
        match RelayMsg::from_text(&text).unwrap() {
            RelayMsg::Attach { host_id } => assert_eq!(host_id, id),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
