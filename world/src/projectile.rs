//! Projectiles and the slot arena that recycles them.

use card_defence_core::{
    ColorTag, EffectiveStats, EnemyId, FieldConfig, PayloadEffect, ProjectileHandle, TowerId,
    Vec2,
};

/// Projectile in flight, owned by a [`ProjectilePool`] slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projectile {
    in_use: bool,
    active: bool,
    generation: u32,
    owner: Option<TowerId>,
    position: Vec2,
    velocity: Vec2,
    damage: f32,
    base_damage: f32,
    color: ColorTag,
    effects: Vec<PayloadEffect>,
    pierce: u32,
    crit_chance: f32,
    hit_history: Vec<EnemyId>,
    frames_remaining: u32,
}

impl Projectile {
    /// Initialises the projectile from a tower's stats and sets it flying.
    ///
    /// Velocity is fixed at launch; projectiles never home.
    pub fn launch(
        &mut self,
        owner: TowerId,
        origin: Vec2,
        angle: f32,
        stats: &EffectiveStats,
        ttl_frames: u32,
    ) {
        debug_assert!(self.in_use, "launching a projectile outside the pool");
        self.active = true;
        self.owner = Some(owner);
        self.position = origin;
        self.velocity = Vec2::new(angle.cos(), angle.sin()) * stats.projectile_speed;
        self.damage = stats.damage;
        self.base_damage = stats.damage;
        self.color = stats.color;
        self.effects.clear();
        self.effects.extend_from_slice(&stats.effects);
        self.pierce = stats.pierce;
        self.crit_chance = stats.crit_chance;
        self.hit_history.clear();
        self.frames_remaining = ttl_frames;
    }

    /// Moves the projectile one tick and expires it on TTL or out of bounds.
    pub fn advance(&mut self, field: &FieldConfig) {
        if !self.active {
            return;
        }
        self.position += self.velocity;
        self.frames_remaining = self.frames_remaining.saturating_sub(1);

        let margin = field.bounds_margin;
        let outside = self.position.x < -margin
            || self.position.y < -margin
            || self.position.x > field.width() + margin
            || self.position.y > field.height() + margin;
        if self.frames_remaining == 0 || outside {
            self.active = false;
        }
    }

    /// Whether the projectile is still flying.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Tower that fired the projectile.
    #[must_use]
    pub const fn owner(&self) -> Option<TowerId> {
        self.owner
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Displacement per tick.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Damage of the next hit before crits.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Damage at launch, unaffected by pierce falloff.
    #[must_use]
    pub const fn base_damage(&self) -> f32 {
        self.base_damage
    }

    /// Colour tag of the projectile.
    #[must_use]
    pub const fn color(&self) -> ColorTag {
        self.color
    }

    /// Ordered payload effects.
    #[must_use]
    pub fn effects(&self) -> &[PayloadEffect] {
        &self.effects
    }

    /// Extra hits left before the projectile is spent.
    #[must_use]
    pub const fn pierce(&self) -> u32 {
        self.pierce
    }

    /// Probability that a hit is critical.
    #[must_use]
    pub const fn crit_chance(&self) -> f32 {
        self.crit_chance
    }

    /// Ticks left before the projectile fizzles.
    #[must_use]
    pub const fn frames_remaining(&self) -> u32 {
        self.frames_remaining
    }

    /// Whether the projectile already hit the enemy.
    #[must_use]
    pub fn has_hit(&self, enemy: EnemyId) -> bool {
        self.hit_history.contains(&enemy)
    }

    /// Spends one point of pierce after hitting `enemy`.
    ///
    /// Returns `false` and deactivates the projectile when no pierce is left;
    /// otherwise remembers the enemy and scales the damage by `falloff`.
    pub fn pierce_through(&mut self, enemy: EnemyId, falloff: f32) -> bool {
        if self.pierce == 0 {
            self.active = false;
            return false;
        }
        self.pierce -= 1;
        self.damage *= falloff;
        self.hit_history.push(enemy);
        true
    }

    fn reset(&mut self) {
        self.in_use = false;
        self.active = false;
        self.owner = None;
        self.hit_history.clear();
        self.effects.clear();
        self.pierce = 0;
        self.damage = 0.0;
        self.base_damage = 0.0;
        self.frames_remaining = 0;
    }
}

/// Growable slot arena that hands out reset projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    free: Vec<usize>,
}

impl ProjectilePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a reset projectile, reusing a released slot when possible.
    pub fn obtain(&mut self) -> ProjectileHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Projectile::default());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        debug_assert!(!slot.in_use, "free list handed out a live slot");
        slot.in_use = true;
        ProjectileHandle::new(index, slot.generation)
    }

    /// Projectile behind a handle.
    ///
    /// # Panics
    ///
    /// Panics when the handle was released, since that is a logic defect.
    #[must_use]
    pub fn get(&self, handle: ProjectileHandle) -> &Projectile {
        let slot = &self.slots[handle.index()];
        assert!(
            slot.in_use && slot.generation == handle.generation(),
            "projectile used after release"
        );
        slot
    }

    /// Mutable projectile behind a handle.
    ///
    /// # Panics
    ///
    /// Panics when the handle was released, since that is a logic defect.
    pub fn get_mut(&mut self, handle: ProjectileHandle) -> &mut Projectile {
        let slot = &mut self.slots[handle.index()];
        assert!(
            slot.in_use && slot.generation == handle.generation(),
            "projectile used after release"
        );
        slot
    }

    /// Mutable projectile behind a handle, or `None` once it was released.
    pub fn find_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Projectile> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.in_use && slot.generation == handle.generation())
    }

    /// Returns a projectile to the pool, clearing its hit history and owner.
    pub fn free(&mut self, handle: ProjectileHandle) {
        let _ = self.get(handle);
        self.release_slot(handle.index());
    }

    /// Releases every projectile that stopped flying and returns how many.
    pub fn release_spent(&mut self) -> usize {
        let mut released = 0;
        for index in 0..self.slots.len() {
            let slot = &self.slots[index];
            if slot.in_use && !slot.active {
                self.release_slot(index);
                released += 1;
            }
        }
        released
    }

    fn release_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.reset();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }

    /// Iterates over flying projectiles.
    pub fn iter_active(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().filter(|slot| slot.in_use && slot.active)
    }

    /// Iterates over flying projectiles together with their handles.
    pub fn iter_active_handles(&self) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.in_use && slot.active)
            .map(|(index, slot)| (ProjectileHandle::new(index, slot.generation), slot))
    }

    /// Iterates mutably over flying projectiles.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.slots
            .iter_mut()
            .filter(|slot| slot.in_use && slot.active)
    }

    /// Number of slots handed out and not yet released.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of slots ever allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
