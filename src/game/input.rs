//! Drag gesture to launch vector mapping
//!
//! Slingshot semantics: the player pulls back and releases, so the
//! launch direction points from the release point back to the press
//! point. Turn ownership and fire-rate gating live in the session; this
//! module is a pure mapping.

use super::state::Tank;
use super::{GameConfig, Projectile};

/// A pointer position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Tracks an in-progress drag between press and release.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    press: Option<Point>,
    current: Point,
}

impl Default for Point {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

impl DragTracker {
    pub fn begin(&mut self, at: Point) {
        self.press = Some(at);
        self.current = at;
    }

    pub fn active(&self) -> bool {
        self.press.is_some()
    }

    /// Update the drag and return the aim angle for the barrel preview.
    pub fn update(&mut self, at: Point) -> Option<f32> {
        let press = self.press?;
        self.current = at;
        Some(aim_angle(press, at))
    }

    /// End the drag, returning `(press, release)` if one was active.
    pub fn release(&mut self, at: Point) -> Option<(Point, Point)> {
        let press = self.press.take()?;
        Some((press, at))
    }

    pub fn cancel(&mut self) {
        self.press = None;
    }
}

/// Launch direction for a pull-back gesture.
pub fn aim_angle(press: Point, release: Point) -> f32 {
    (press.y - release.y).atan2(press.x - release.x)
}

/// Map a completed drag to a projectile launched from `tank`'s turret
/// tip. Returns `None` for micro-drags below the power threshold.
pub fn launch(
    press: Point,
    release: Point,
    tank: &Tank,
    wind: f32,
    cfg: &GameConfig,
) -> Option<Projectile> {
    let dx = press.x - release.x;
    let dy = press.y - release.y;
    let power = ((dx * dx + dy * dy).sqrt() * cfg.power_scale).min(cfg.power_cap);
    if power <= cfg.power_min {
        return None;
    }

    let angle = dy.atan2(dx);
    // Launch from the turret tip, not the torso, so the shot cannot
    // immediately collide with the firing tank's own hit radius.
    let origin_x = tank.x + angle.cos() * cfg.muzzle_length;
    let origin_y = (tank.y - cfg.torso_offset) + angle.sin() * cfg.muzzle_length;

    Some(Projectile {
        x: origin_x,
        y: origin_y,
        vx: angle.cos() * power,
        vy: angle.sin() * power,
        wind_at_launch: wind,
    })
}
