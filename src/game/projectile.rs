//! Projectile integration and flight termination

use serde::{Deserialize, Serialize};

use super::state::Tank;
use super::{GameConfig, Terrain};

/// An in-flight shot. Present in a [`super::MatchState`] iff a shot is in
/// the air. Carries the wind sampled at launch so a re-roll mid-flight
/// (which only happens on the resolving side) cannot bend the arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub wind_at_launch: f32,
}

impl Projectile {
    /// Advance one simulation step: constant wind, constant gravity.
    pub fn step(&mut self, gravity: f32) {
        self.vx += self.wind_at_launch;
        self.vy += gravity;
        self.x += self.vx;
        self.y += self.vy;
    }

    /// Distance to a tank's torso point.
    pub fn distance_to(&self, tank: &Tank, torso_offset: f32) -> f32 {
        let dx = self.x - tank.x;
        let dy = self.y - (tank.y - torso_offset);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Why a flight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactKind {
    /// Entered the hit radius around the non-firing tank's torso.
    Target,
    /// Came down on the terrain.
    Ground,
    /// Left the playfield horizontally (or exhausted the step cap).
    Wilds,
}

/// Terminal position of a flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub kind: ImpactKind,
    pub x: f32,
    pub y: f32,
}

/// Check the termination conditions for the current step. Conditions are
/// OR-ed; whichever is detected first ends the flight.
pub fn check_impact(
    p: &Projectile,
    terrain: &Terrain,
    target: &Tank,
    cfg: &GameConfig,
) -> Option<Impact> {
    let at = |kind| Impact { kind, x: p.x, y: p.y };

    if p.distance_to(target, cfg.torso_offset) < cfg.hit_radius {
        return Some(at(ImpactKind::Target));
    }
    if p.y > terrain.height_at(p.x) {
        return Some(at(ImpactKind::Ground));
    }
    if p.x < 0.0 || p.x > cfg.width {
        return Some(at(ImpactKind::Wilds));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::terrain::TerrainPoint;

    fn flat_terrain(cfg: &GameConfig, ground: f32) -> Terrain {
        Terrain::from_points(
            vec![
                TerrainPoint { x: 0.0, y: ground },
                TerrainPoint {
                    x: cfg.width + cfg.terrain_margin,
                    y: ground,
                },
            ],
            cfg.height,
        )
    }

    #[test]
    fn step_applies_wind_then_gravity_then_position() {
        let mut p = Projectile {
            x: 10.0,
            y: 20.0,
            vx: 5.0,
            vy: -3.0,
            wind_at_launch: 0.1,
        };
        p.step(0.25);
        assert!((p.vx - 5.1).abs() < 1e-6);
        assert!((p.vy - -2.75).abs() < 1e-6);
        assert!((p.x - 15.1).abs() < 1e-6);
        assert!((p.y - 17.25).abs() < 1e-6);
    }

    #[test]
    fn mid_flight_wind_reroll_does_not_bend_the_arc() {
        // The projectile integrates against its launch wind, not ambient
        // state, so two peers stepping the same payload stay in lockstep.
        let mut a = Projectile {
            x: 0.0,
            y: 0.0,
            vx: 4.0,
            vy: -4.0,
            wind_at_launch: -0.2,
        };
        let mut b = a;
        for _ in 0..100 {
            a.step(0.25);
            b.step(0.25);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn near_target_ends_flight() {
        let cfg = GameConfig::default();
        let terrain = flat_terrain(&cfg, 600.0);
        let target = Tank::new(400.0, 500.0, cfg.max_health);

        let p = Projectile {
            x: 400.0,
            y: 500.0 - cfg.torso_offset - cfg.hit_radius + 1.0,
            vx: 0.0,
            vy: 0.0,
            wind_at_launch: 0.0,
        };
        let impact = check_impact(&p, &terrain, &target, &cfg).unwrap();
        assert_eq!(impact.kind, ImpactKind::Target);
    }

    #[test]
    fn ground_hit_ends_flight() {
        let cfg = GameConfig::default();
        let terrain = flat_terrain(&cfg, 600.0);
        let target = Tank::new(1000.0, 600.0, cfg.max_health);

        let p = Projectile {
            x: 200.0,
            y: 601.0,
            vx: 0.0,
            vy: 0.0,
            wind_at_launch: 0.0,
        };
        let impact = check_impact(&p, &terrain, &target, &cfg).unwrap();
        assert_eq!(impact.kind, ImpactKind::Ground);
    }

    #[test]
    fn leaving_the_playfield_is_wilds() {
        let cfg = GameConfig::default();
        let terrain = flat_terrain(&cfg, 600.0);
        let target = Tank::new(1000.0, 600.0, cfg.max_health);

        for x in [-1.0, cfg.width + 1.0] {
            let p = Projectile {
                x,
                y: 100.0,
                vx: 0.0,
                vy: 0.0,
                wind_at_launch: 0.0,
            };
            let impact = check_impact(&p, &terrain, &target, &cfg).unwrap();
            assert_eq!(impact.kind, ImpactKind::Wilds);
        }
    }

    #[test]
    fn airborne_in_bounds_keeps_flying() {
        let cfg = GameConfig::default();
        let terrain = flat_terrain(&cfg, 600.0);
        let target = Tank::new(1000.0, 600.0, cfg.max_health);

        let p = Projectile {
            x: 300.0,
            y: 100.0,
            vx: 2.0,
            vy: 1.0,
            wind_at_launch: 0.0,
        };
        assert!(check_impact(&p, &terrain, &target, &cfg).is_none());
    }
}
