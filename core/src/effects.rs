//! Payload, status and death-trigger effect descriptors.

use serde::{Deserialize, Serialize};

/// Colour tag carried by projectiles and notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    /// Default tower projectile colour.
    #[default]
    Gold,
    /// Fire projectiles and explosions.
    Red,
    /// Ice projectiles and frost particles.
    Cyan,
    /// Sniper projectiles and positive feedback.
    Green,
    /// Multishot projectiles and warnings.
    Orange,
    /// Enemy death bursts.
    Purple,
    /// Neutral feedback.
    White,
}

/// Slow applied by a projectile or a death trigger.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Fraction of movement speed removed, within `[0, 1]`.
    pub power: f32,
    /// Number of ticks the slow lasts.
    pub duration_frames: u32,
    /// Extra incoming damage fraction while slowed, within `[0, 1]`.
    pub amp_bonus: f32,
}

/// Tagged effect carried in a projectile's payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PayloadEffect {
    /// Area damage around the primary target.
    Splash {
        /// Radius around the primary target.
        radius: f32,
    },
    /// Slow applied to the primary target.
    Slow(SlowEffect),
    /// Marks the target to explode on death for a fraction of the tower damage.
    KillExplode {
        /// Fraction of the projectile damage dealt by the explosion.
        power_fraction: f32,
    },
    /// Marks the target to chill nearby enemies on death.
    KillFreeze,
}

/// Effect stored on an enemy and executed when it dies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeathEffect {
    /// Deals damage to alive enemies within the radius.
    Explode {
        /// Damage dealt to every enemy caught in the blast.
        damage: f32,
        /// Blast radius.
        radius: f32,
    },
    /// Slows alive enemies within the radius.
    Freeze {
        /// Slow applied to every enemy caught in the burst.
        slow: SlowEffect,
        /// Burst radius.
        radius: f32,
    },
}

impl DeathEffect {
    /// Whether two effects are of the same kind regardless of magnitude.
    #[must_use]
    pub fn same_kind(&self, other: &DeathEffect) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Scalar strength used to keep the strongest effect of each kind.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        match self {
            Self::Explode { damage, .. } => *damage,
            Self::Freeze { slow, .. } => slow.power,
        }
    }
}
