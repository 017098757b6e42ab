//! Fully resolved combat parameters of a tower.

use crate::{ColorTag, PayloadEffect};

/// Combat stats derived from a tower's attached cards for the current tick.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveStats {
    /// Targeting radius in world units.
    pub range: f32,
    /// Damage carried by each projectile before crits.
    pub damage: f32,
    /// Ticks between volleys.
    pub cooldown_frames: u32,
    /// Distance travelled by a projectile per tick.
    pub projectile_speed: f32,
    /// Extra enemies each projectile may pass through.
    pub pierce: u32,
    /// Probability in `[0, 1]` that a hit is critical.
    pub crit_chance: f32,
    /// Projectiles per volley, at least one.
    pub projectile_count: u32,
    /// Angle in radians between neighbouring projectiles of a volley.
    pub spread: f32,
    /// Colour of the projectiles.
    pub color: ColorTag,
    /// Ordered payload effects shared by every projectile of the volley.
    pub effects: Vec<PayloadEffect>,
}

impl EffectiveStats {
    /// Looks up the splash radius, if the payload splashes.
    #[must_use]
    pub fn splash_radius(&self) -> Option<f32> {
        self.effects.iter().find_map(|effect| match effect {
            PayloadEffect::Splash { radius } => Some(*radius),
            _ => None,
        })
    }
}
