//! Authoritative match state and its replicated counterpart

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GameConfig, PlayerSide, Projectile, Terrain};

/// One tank. Position is fixed at terrain creation and never moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub x: f32,
    pub y: f32,
    pub health: u32,
    /// Barrel angle in radians, cosmetic outside of the aim preview.
    pub aim_angle: f32,
}

impl Tank {
    pub fn new(x: f32, y: f32, health: u32) -> Self {
        Self {
            x,
            y,
            health,
            aim_angle: -0.5,
        }
    }

    pub fn alive(&self) -> bool {
        self.health > 0
    }
}

/// The single authoritative snapshot, replicated verbatim to the
/// non-authoritative peer via `FullSync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub terrain: Terrain,
    /// Indexed by [`PlayerSide::index`].
    pub tanks: [Tank; 2],
    /// Whose shot it is.
    pub turn: PlayerSide,
    /// Horizontal acceleration applied to newly launched projectiles.
    pub wind: f32,
    /// Present iff a shot is in flight.
    pub projectile: Option<Projectile>,
    pub over: bool,
    /// Set only when `over` is true; stable thereafter.
    pub winner: Option<PlayerSide>,
}

impl MatchState {
    /// Fresh authoritative match: generate terrain, seat the tanks on it,
    /// roll the opening wind. Only the authoritative peer calls this.
    pub fn generate<R: Rng>(cfg: &GameConfig, rng: &mut R) -> Self {
        let terrain = Terrain::generate(cfg, rng);

        let ax = cfg.width * 0.15;
        let bx = cfg.width * 0.85;
        let tanks = [
            Tank::new(ax, terrain.height_at(ax), cfg.max_health),
            Tank::new(bx, terrain.height_at(bx), cfg.max_health),
        ];

        Self {
            terrain,
            tanks,
            turn: PlayerSide::A,
            wind: rng.gen_range(-cfg.wind_bound..cfg.wind_bound),
            projectile: None,
            over: false,
            winner: None,
        }
    }

    /// Pre-sync placeholder held by the replica until the first
    /// `FullSync` lands. Renders as an empty scene.
    pub fn placeholder(cfg: &GameConfig) -> Self {
        Self {
            terrain: Terrain::from_points(Vec::new(), cfg.height),
            tanks: [
                Tank::new(0.0, 0.0, cfg.max_health),
                Tank::new(0.0, 0.0, cfg.max_health),
            ],
            turn: PlayerSide::A,
            wind: 0.0,
            projectile: None,
            over: false,
            winner: None,
        }
    }

    pub fn tank(&self, side: PlayerSide) -> &Tank {
        &self.tanks[side.index()]
    }

    pub fn tank_mut(&mut self, side: PlayerSide) -> &mut Tank {
        &mut self.tanks[side.index()]
    }

    /// Structural sanity for inbound snapshots: a well-formed heightmap
    /// and health within bounds. Malformed snapshots are dropped by the
    /// session rather than applied.
    pub fn is_well_formed(&self, cfg: &GameConfig) -> bool {
        self.terrain.is_well_formed() && self.tanks.iter().all(|t| t.health <= cfg.max_health)
    }
}

/// The non-authoritative peer's copy. Its API is the whole point: state
/// is only ever replaced wholesale from a `FullSync`, and the only
/// locally writable pieces are the speculative projectile and the
/// cosmetic aim preview. Health, turn, wind and the over flag have no
/// mutation path here.
#[derive(Debug, Clone)]
pub struct Replica {
    state: MatchState,
    synced: bool,
}

impl Replica {
    pub fn new(cfg: &GameConfig) -> Self {
        Self {
            state: MatchState::placeholder(cfg),
            synced: false,
        }
    }

    /// Whether at least one `FullSync` has been applied.
    pub fn synced(&self) -> bool {
        self.synced
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Apply a `FullSync`: wholesale replacement, no field-level merge.
    pub fn replace(&mut self, state: MatchState) {
        self.state = state;
        self.synced = true;
    }

    /// Install a speculative projectile from a `ShotFired` (sent or
    /// received). Superseded by the next `FullSync`.
    pub fn set_speculative_shot(&mut self, shot: Projectile) {
        self.state.projectile = Some(shot);
    }

    /// Step the speculative projectile locally for smooth presentation.
    pub fn projectile_mut(&mut self) -> Option<&mut Projectile> {
        self.state.projectile.as_mut()
    }

    /// Clear the local projectile after a burst; consequences (health,
    /// turn, wind) arrive with the authoritative `FullSync`.
    pub fn clear_projectile(&mut self) {
        self.state.projectile = None;
    }

    /// Aim preview while dragging. Cosmetic; overwritten by the next
    /// `FullSync`.
    pub fn set_local_aim(&mut self, side: PlayerSide, angle: f32) {
        self.state.tank_mut(side).aim_angle = angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn cfg() -> GameConfig {
        GameConfig::default()
    }

    fn fresh_state(seed: u64) -> MatchState {
        let cfg = cfg();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        MatchState::generate(&cfg, &mut rng)
    }

    #[test]
    fn tanks_spawn_on_the_ground_at_fixed_fractions() {
        let cfg = cfg();
        let state = fresh_state(3);

        let a = state.tank(PlayerSide::A);
        let b = state.tank(PlayerSide::B);
        assert!((a.x - cfg.width * 0.15).abs() < 1e-3);
        assert!((b.x - cfg.width * 0.85).abs() < 1e-3);
        assert!((a.y - state.terrain.height_at(a.x)).abs() < 1e-3);
        assert!((b.y - state.terrain.height_at(b.x)).abs() < 1e-3);
        assert_eq!(a.health, cfg.max_health);
        assert_eq!(state.turn, PlayerSide::A);
        assert!(state.wind.abs() <= cfg.wind_bound);
        assert!(state.projectile.is_none());
        assert!(!state.over);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut state = fresh_state(11);
        state.projectile = Some(Projectile {
            x: 10.0,
            y: 20.0,
            vx: 5.0,
            vy: -3.0,
            wind_at_launch: 0.1,
        });

        let json = serde_json::to_string(&state).unwrap();
        let back: MatchState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }

    #[test]
    fn replica_only_changes_via_full_sync() {
        let cfg = cfg();
        let mut replica = Replica::new(&cfg);
        assert!(!replica.synced());

        let before = replica.state().clone();
        replica.set_speculative_shot(Projectile {
            x: 10.0,
            y: 20.0,
            vx: 5.0,
            vy: -3.0,
            wind_at_launch: 0.0,
        });

        // A ShotFired alone never touches health, turn, wind or over.
        let after = replica.state();
        assert_eq!(after.tanks, before.tanks);
        assert_eq!(after.turn, before.turn);
        assert_eq!(after.wind, before.wind);
        assert_eq!(after.over, before.over);
        assert_eq!(
            after.projectile,
            Some(Projectile {
                x: 10.0,
                y: 20.0,
                vx: 5.0,
                vy: -3.0,
                wind_at_launch: 0.0,
            })
        );

        let authoritative = fresh_state(5);
        replica.replace(authoritative.clone());
        assert!(replica.synced());
        assert_eq!(replica.state(), &authoritative);
    }

    #[test]
    fn placeholder_is_not_well_formed_but_generated_state_is() {
        let cfg = cfg();
        assert!(!MatchState::placeholder(&cfg).is_well_formed(&cfg));
        assert!(fresh_state(9).is_well_formed(&cfg));
    }
}
