#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that detects projectile versus enemy contacts.
//!
//! Each active projectile is tested against every live enemy it has not hit
//! yet. Every overlap becomes a `Command::ProjectileContact`, projectile by
//! projectile and enemy by enemy in field order. The world resolves them in
//! that order and drops contacts made stale by earlier ones, so a spent
//! projectile stops at its first hit while a piercing one keeps going.

use card_defence_core::{CombatTuning, Command};
use card_defence_world::{Enemy, ProjectilePool};
use tracing::trace;

/// Collision system that queues contacts for the world to resolve.
#[derive(Debug, Default)]
pub struct CollisionResolver {
    scratch: Vec<Command>,
}

impl CollisionResolver {
    /// Creates a resolver with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::ProjectileContact` per overlapping pair.
    ///
    /// An overlap requires a distance strictly below the hit radius.
    pub fn handle(
        &mut self,
        projectiles: &ProjectilePool,
        enemies: &[Enemy],
        combat: &CombatTuning,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for (handle, projectile) in projectiles.iter_active_handles() {
            let touching = enemies.iter().filter(|enemy| {
                enemy.is_alive()
                    && !projectile.has_hit(enemy.id())
                    && enemy.position().distance(projectile.position()) < combat.hit_radius
            });
            for enemy in touching {
                trace!(enemy = enemy.id().get(), ?handle, "projectile contact");
                self.scratch.push(Command::ProjectileContact {
                    projectile: handle,
                    enemy: enemy.id(),
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
