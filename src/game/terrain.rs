//! Procedural terrain and the continuous ground-height function

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::GameConfig;

/// One sample of the terrain heightmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainPoint {
    pub x: f32,
    pub y: f32,
}

/// Ordered heightmap samples spanning `[0, width + margin]`, x strictly
/// increasing. Immutable after generation; the ground is only ever read
/// through [`Terrain::height_at`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    points: Vec<TerrainPoint>,
    /// Viewport height, returned as the off-screen fallback.
    fallback: f32,
}

impl Terrain {
    /// Generate a fresh heightmap: a clamped random walk sampled at fixed
    /// spacing. Only the authoritative peer calls this; the replica
    /// consumes the distributed copy verbatim.
    pub fn generate<R: Rng>(cfg: &GameConfig, rng: &mut R) -> Self {
        let mut points = Vec::new();
        let mut y = cfg.height * 0.7;
        let mut x = 0.0;
        while x <= cfg.width + cfg.terrain_margin {
            y += rng.gen_range(-cfg.terrain_step..cfg.terrain_step);
            y = y.clamp(cfg.height * 0.4, cfg.height * 0.85);
            points.push(TerrainPoint { x, y });
            x += cfg.terrain_spacing;
        }
        Self {
            points,
            fallback: cfg.height,
        }
    }

    /// Build from explicit samples (used by tests and deserialization
    /// checks). Samples must be x-increasing with at least two points.
    pub fn from_points(points: Vec<TerrainPoint>, fallback: f32) -> Self {
        Self { points, fallback }
    }

    pub fn points(&self) -> &[TerrainPoint] {
        &self.points
    }

    /// Structural sanity used to validate inbound snapshots: at least two
    /// samples, x strictly increasing.
    pub fn is_well_formed(&self) -> bool {
        self.points.len() >= 2 && self.points.windows(2).all(|w| w[0].x < w[1].x)
    }

    /// Ground height at `x`, linearly interpolated between the bracketing
    /// samples. Outside every segment the viewport height is returned, so
    /// off-screen ground sits below everything.
    pub fn height_at(&self, x: f32) -> f32 {
        for w in self.points.windows(2) {
            let (a, b) = (w[0], w[1]);
            if x >= a.x && x <= b.x {
                let r = (x - a.x) / (b.x - a.x);
                return a.y * (1.0 - r) + b.y * r;
            }
        }
        self.fallback
    }
}
