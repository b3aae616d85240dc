//! Timing constants for the session loop

use std::time::Duration;

/// Simulation steps per second. The integrator works in per-step units
/// (matching the display-refresh cadence the game was tuned for), so the
/// tick rate only sets real-time pacing, never trajectory shape.
pub const SIMULATION_TPS: u32 = 60;

/// Keepalive emission period.
pub const KEEPALIVE_PERIOD: Duration = Duration::from_secs(5);

/// Missed keepalive periods before the channel is declared dead.
pub const KEEPALIVE_MISSES: u32 = 3;

pub fn tick_duration() -> Duration {
    Duration::from_micros(1_000_000 / SIMULATION_TPS as u64)
}

/// Inbound silence longer than this tears the session down.
pub fn liveness_timeout() -> Duration {
    KEEPALIVE_PERIOD * KEEPALIVE_MISSES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_spans_multiple_keepalives() {
        assert!(liveness_timeout() > KEEPALIVE_PERIOD * 2);
        assert_eq!(liveness_timeout(), Duration::from_secs(15));
    }
}
