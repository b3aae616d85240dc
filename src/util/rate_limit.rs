//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified permits per second
pub fn create_limiter(per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Fire attempts per second a local frontend may emit. Turn alternation
/// gates real play; this only stops a misbehaving frontend from
/// spamming `ShotFired` frames.
pub const FIRE_RATE_LIMIT: u32 = 2;

/// Frames per second the relay forwards for one peer.
pub const RELAY_FRAME_RATE_LIMIT: u32 = 60;

/// Per-session fire gate
#[derive(Clone)]
pub struct FireGate {
    limiter: Arc<Limiter>,
}

impl FireGate {
    pub fn new() -> Self {
        Self {
            limiter: create_limiter(FIRE_RATE_LIMIT),
        }
    }

    /// Check if a fire attempt is allowed (returns true if allowed)
    pub fn check_fire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for FireGate {
    fn default() -> Self {
        Self::new()
    }
}
