//! Scripted pilot for headless peers
//!
//! Feeds the same drag API a pointer would: it picks an upward angle
//! toward the enemy and a power, then synthesizes the pull-back gesture
//! that maps to them. Used by `demo`, `host` and `join` modes, which
//! have no pointer.

use std::f32::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::input::Point;
use crate::game::{GameConfig, MatchState, PlayerSide};

pub struct Bot {
    rng: ChaCha8Rng,
    cooldown: u32,
}

/// Ticks between fire attempts, a human-ish pause at 60 TPS.
const SHOT_COOLDOWN_TICKS: u32 = 45;

impl Bot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            cooldown: SHOT_COOLDOWN_TICKS,
        }
    }

    /// Called once per tick while firing is permitted; returns a
    /// `(press, release)` gesture when the bot decides to shoot.
    pub fn plan(
        &mut self,
        state: &MatchState,
        side: PlayerSide,
        cfg: &GameConfig,
    ) -> Option<(Point, Point)> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }
        self.cooldown = SHOT_COOLDOWN_TICKS;

        let me = state.tank(side);
        let enemy = state.tank(side.opponent());

        // Elevation above the horizontal, lobbed toward the enemy.
        // Screen y grows downward, so "up" is negative.
        let elevation = self.rng.gen_range(0.5..1.2);
        let angle = if enemy.x > me.x {
            -elevation
        } else {
            elevation - PI
        };

        let power = self.rng.gen_range(12.0..cfg.power_cap);
        let drag_distance = power / cfg.power_scale;

        let release = Point { x: me.x, y: me.y };
        let press = Point {
            x: release.x + angle.cos() * drag_distance,
            y: release.y + angle.sin() * drag_distance,
        };
        Some((press, release))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::launch;

    #[test]
    fn planned_gesture_maps_to_an_upward_shot_at_the_enemy() {
        let cfg = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let state = MatchState::generate(&cfg, &mut rng);
        let mut bot = Bot::new(9);

        // Exhaust the cooldown.
        let mut gesture = None;
        for _ in 0..=SHOT_COOLDOWN_TICKS {
            gesture = bot.plan(&state, PlayerSide::A, &cfg);
        }
        let (press, release) = gesture.expect("bot should fire after cooldown");

        let tank = state.tank(PlayerSide::A);
        let shot = launch(press, release, tank, state.wind, &cfg).expect("above power threshold");
        assert!(shot.vy < 0.0, "bot shoots upward");
        assert!(shot.vx > 0.0, "side A shoots toward side B");
    }

    #[test]
    fn bot_waits_out_its_cooldown() {
        let cfg = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let state = MatchState::generate(&cfg, &mut rng);
        let mut bot = Bot::new(3);

        for _ in 0..SHOT_COOLDOWN_TICKS {
            assert!(bot.plan(&state, PlayerSide::A, &cfg).is_none());
        }
        assert!(bot.plan(&state, PlayerSide::A, &cfg).is_some());
    }
}
