//! Authoritative turn and damage resolution
//!
//! Invoked exactly once per terminated flight, and only on the
//! authoritative peer. The non-authoritative peer learns every
//! consequence here through the `FullSync` that follows.

use rand::Rng;

use super::projectile::Impact;
use super::{DamageModel, GameConfig, MatchState, PlayerSide};

/// Linear splash falloff: `max_damage` at distance zero, zero at and
/// beyond `splash_radius`.
pub fn splash_damage(distance: f32, cfg: &GameConfig) -> u32 {
    if distance >= cfg.splash_radius {
        return 0;
    }
    let scaled = cfg.max_damage as f32 * (1.0 - distance / cfg.splash_radius);
    (scaled.round() as u32).min(cfg.max_damage)
}

fn torso_distance(state: &MatchState, side: PlayerSide, impact: &Impact, cfg: &GameConfig) -> f32 {
    let tank = state.tank(side);
    let dx = impact.x - tank.x;
    let dy = impact.y - (tank.y - cfg.torso_offset);
    (dx * dx + dy * dy).sqrt()
}

/// Apply the consequences of a resolved collision to the authoritative
/// state: damage, game-over detection, turn advance, wind re-roll, and
/// clearing the in-flight projectile. The caller broadcasts the updated
/// state immediately afterwards.
pub fn resolve_impact<R: Rng>(
    state: &mut MatchState,
    impact: &Impact,
    cfg: &GameConfig,
    rng: &mut R,
) {
    let shooter = state.turn;
    let target = shooter.opponent();

    match cfg.damage_model {
        DamageModel::Threshold => {
            let dist = torso_distance(state, target, impact, cfg);
            if dist < cfg.damage_radius {
                let tank = state.tank_mut(target);
                tank.health = tank.health.saturating_sub(cfg.max_damage);
            }
        }
        DamageModel::Splash => {
            for side in [PlayerSide::A, PlayerSide::B] {
                if side == shooter && !cfg.self_damage {
                    continue;
                }
                let dist = torso_distance(state, side, impact, cfg);
                let damage = splash_damage(dist, cfg);
                let tank = state.tank_mut(side);
                tank.health = tank.health.saturating_sub(damage);
            }
        }
    }

    state.projectile = None;

    if !state.tank(target).alive() {
        // Shooter wins even if its own splash also finished it off.
        state.over = true;
        state.winner = Some(shooter);
    } else if !state.tank(shooter).alive() {
        state.over = true;
        state.winner = Some(target);
    } else {
        state.turn = target;
        state.wind = rng.gen_range(-cfg.wind_bound..cfg.wind_bound);
    }
}
