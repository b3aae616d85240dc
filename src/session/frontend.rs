//! Presentation seam
//!
//! Everything visual (canvas, particles, status text) lives behind this
//! trait. The core only ever hands it read-only state and transient
//! events; input comes back in through the session's drag API.

use crate::game::{MatchState, PlayerSide};
use tracing::info;

/// Connection phase, for status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the channel / first snapshot.
    Waiting,
    /// Channel open, match running.
    Playing,
    /// Channel gone; the client is back at the entry screen.
    Closed,
}

pub trait Frontend: Send {
    /// A new authoritative (or locally mutated) state is visible.
    fn state_changed(&mut self, state: &MatchState, local_side: PlayerSide);

    /// A flight terminated here; render the burst.
    fn impact_burst(&mut self, x: f32, y: f32, shooter: PlayerSide);

    /// Connection phase changed.
    fn phase_changed(&mut self, phase: Phase);

    /// The session is over for transport reasons; show the terminal
    /// notice and return to the entry screen.
    fn disconnected(&mut self, reason: &str);
}

/// Headless frontend that narrates the match through tracing.
#[derive(Debug, Default)]
pub struct LogFrontend;

impl Frontend for LogFrontend {
    fn state_changed(&mut self, state: &MatchState, local_side: PlayerSide) {
        if state.over {
            info!(winner = ?state.winner, "match over");
        } else {
            info!(
                hp_a = state.tank(PlayerSide::A).health,
                hp_b = state.tank(PlayerSide::B).health,
                turn = ?state.turn,
                wind = state.wind,
                mine = state.turn == local_side,
                "state updated"
            );
        }
    }

    fn impact_burst(&mut self, x: f32, y: f32, shooter: PlayerSide) {
        info!(x, y, shooter = ?shooter, "impact");
    }

    fn phase_changed(&mut self, phase: Phase) {
        info!(phase = ?phase, "connection phase");
    }

    fn disconnected(&mut self, reason: &str) {
        info!(reason, "disconnected");
    }
}

/// Test frontend that records what it was shown.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingFrontend {
    pub bursts: Vec<(f32, f32, PlayerSide)>,
    pub states_seen: usize,
    pub phases: Vec<Phase>,
    pub disconnect_reason: Option<String>,
}

#[cfg(test)]
impl Frontend for RecordingFrontend {
    fn state_changed(&mut self, _state: &MatchState, _local_side: PlayerSide) {
        self.states_seen += 1;
    }

    fn impact_burst(&mut self, x: f32, y: f32, shooter: PlayerSide) {
        self.bursts.push((x, y, shooter));
    }

    fn phase_changed(&mut self, phase: Phase) {
        self.phases.push(phase);
    }

    fn disconnected(&mut self, reason: &str) {
        self.disconnect_reason = Some(reason.to_string());
    }
}
