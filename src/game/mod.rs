//! Game simulation modules

pub mod input;
pub mod projectile;
pub mod resolve;
pub mod state;
pub mod terrain;

pub use projectile::Projectile;
pub use state::{MatchState, Replica, Tank};
pub use terrain::Terrain;

use serde::{Deserialize, Serialize};

/// The two seats in a duel. `A` is always the authoritative peer's tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSide {
    A,
    B,
}

impl PlayerSide {
    pub fn opponent(self) -> Self {
        match self {
            PlayerSide::A => PlayerSide::B,
            PlayerSide::B => PlayerSide::A,
        }
    }

    /// Index into `MatchState::tanks`.
    pub fn index(self) -> usize {
        match self {
            PlayerSide::A => 0,
            PlayerSide::B => 1,
        }
    }
}

/// Damage model applied when a shot resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageModel {
    /// Fixed damage to the targeted tank if the impact lands inside the
    /// damage radius, zero otherwise.
    Threshold,
    /// Linear falloff with distance, applied independently to both tanks.
    Splash,
}

/// Tuning constants for the duel simulation.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Viewport width in world units.
    pub width: f32,
    /// Viewport height in world units.
    pub height: f32,

    /// Downward acceleration per simulation step.
    pub gravity: f32,
    /// Wind magnitude bound; re-rolls are uniform in `[-bound, bound]`.
    pub wind_bound: f32,

    /// Horizontal spacing between terrain samples.
    pub terrain_spacing: f32,
    /// Terrain extends this far past the right viewport edge.
    pub terrain_margin: f32,
    /// Half-width of the per-sample random walk step.
    pub terrain_step: f32,

    /// Distance to the target torso that ends a flight.
    pub hit_radius: f32,
    /// Distance within which a resolved impact deals damage. Slightly wider
    /// than `hit_radius`, so a ground hit just next to a tank still hurts.
    pub damage_radius: f32,
    /// Splash falloff reaches zero at this distance (splash model only).
    pub splash_radius: f32,
    /// Damage dealt at distance zero.
    pub max_damage: u32,
    pub max_health: u32,
    pub damage_model: DamageModel,
    /// Whether the shooter's own tank can take splash from its own blast.
    pub self_damage: bool,

    /// Torso point sits this far above the tank's ground position.
    pub torso_offset: f32,
    /// Launch origin sits this far along the aim angle from the torso point.
    pub muzzle_length: f32,
    /// Drag distance to launch power conversion.
    pub power_scale: f32,
    pub power_cap: f32,
    /// Drags weaker than this are treated as accidental and ignored.
    pub power_min: f32,

    /// Hard cap on simulation steps per flight; exceeding it counts as a
    /// shot into the wilds.
    pub max_flight_steps: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            gravity: 0.25,
            wind_bound: 0.2,
            terrain_spacing: 50.0,
            terrain_margin: 100.0,
            terrain_step: 60.0,
            hit_radius: 30.0,
            damage_radius: 40.0,
            splash_radius: 60.0,
            max_damage: 34,
            max_health: 100,
            damage_model: DamageModel::Threshold,
            self_damage: true,
            torso_offset: 15.0,
            muzzle_length: 30.0,
            power_scale: 0.15,
            power_cap: 25.0,
            power_min: 3.0,
            max_flight_steps: 4000,
        }
    }
}
