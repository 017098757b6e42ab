//! Enemy state: damage intake, status decay, path movement and boss summons.

use card_defence_core::{
    Archetype, BossTuning, Command, DeathEffect, EnemyId, EnemyKind, EnemyTuning, Path,
    SlowEffect, SpawnOrigin, Vec2,
};
use rand::Rng;

use crate::status::{StatusEffect, StatusEffects};

/// Enemy walking the path.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    wave: u32,
    max_health: f32,
    health: f32,
    base_speed: f32,
    armor: f32,
    reward: u32,
    position: Vec2,
    lane_offset: Vec2,
    path_index: usize,
    finished: bool,
    statuses: StatusEffects,
    death_effects: Vec<DeathEffect>,
    ability_timer: u32,
}

impl Enemy {
    /// Creates an enemy with full health at the provided location.
    ///
    /// `path_index` names the next waypoint the enemy walks toward and
    /// `lane_offset` is added to every waypoint it targets.
    #[must_use]
    pub fn new(
        id: EnemyId,
        kind: EnemyKind,
        wave: u32,
        archetype: &Archetype,
        max_health: f32,
        position: Vec2,
        path_index: usize,
        lane_offset: Vec2,
    ) -> Self {
        debug_assert!(max_health > 0.0, "enemies spawn alive");
        Self {
            id,
            kind,
            wave,
            max_health,
            health: max_health,
            base_speed: archetype.speed,
            armor: archetype.armor,
            reward: archetype.reward,
            position,
            lane_offset,
            path_index,
            finished: false,
            statuses: StatusEffects::new(),
            death_effects: Vec::new(),
            ability_timer: 0,
        }
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Archetype tag of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Wave that released the enemy.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health at spawn.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Current health as a fraction of maximum health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        self.health / self.max_health
    }

    /// Unscaled movement speed in world units per tick.
    #[must_use]
    pub const fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Flat damage mitigation per hit.
    #[must_use]
    pub const fn armor(&self) -> f32 {
        self.armor
    }

    /// Money credited when the enemy dies.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Index of the next waypoint.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Whether the enemy still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Whether the enemy walked past the final waypoint.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Active statuses.
    #[must_use]
    pub const fn statuses(&self) -> &StatusEffects {
        &self.statuses
    }

    /// Effects executed when the enemy dies.
    #[must_use]
    pub fn death_effects(&self) -> &[DeathEffect] {
        &self.death_effects
    }

    /// Ticks since the last boss summon.
    #[must_use]
    pub const fn ability_timer(&self) -> u32 {
        self.ability_timer
    }

    /// Applies incoming damage and returns the health actually removed.
    ///
    /// Armor is subtracted first with a floor of one point, then an active
    /// slow's amplification multiplies the result.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        debug_assert!(amount >= 0.0, "negative damage {amount}");
        let mitigated = (amount - self.armor).max(1.0);
        let amplified = mitigated * (1.0 + self.statuses.amp_bonus());
        let removed = amplified.min(self.health);
        self.health -= removed;
        debug_assert!(
            (0.0..=self.max_health).contains(&self.health),
            "health {} out of range",
            self.health
        );
        removed
    }

    /// Applies or refreshes a slow.
    pub fn apply_slow(&mut self, slow: SlowEffect) {
        self.statuses.apply(StatusEffect::Slow(slow));
    }

    /// Queues an effect for execution on death.
    ///
    /// Only the strongest effect of each kind is kept.
    pub fn add_death_effect(&mut self, effect: DeathEffect) {
        match self
            .death_effects
            .iter_mut()
            .find(|existing| existing.same_kind(&effect))
        {
            Some(existing) => {
                if effect.magnitude() > existing.magnitude() {
                    *existing = effect;
                }
            }
            None => self.death_effects.push(effect),
        }
    }

    /// Speed multiplier for this tick, floored at zero.
    ///
    /// `global_slow` is a field-wide hazard supplied by the caller.
    #[must_use]
    pub fn speed_multiplier(&self, global_slow: f32, tuning: &EnemyTuning) -> f32 {
        let mut multiplier = (1.0 - self.statuses.slow_power() - global_slow).max(0.0);
        if self.kind == EnemyKind::Scout && self.health_fraction() < tuning.panic_threshold {
            multiplier *= tuning.panic_multiplier;
        }
        multiplier
    }

    /// Runs one tick of status decay, boss ability and movement.
    ///
    /// Summon requests are pushed into `out` for the world to apply.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        path: &Path,
        global_slow: f32,
        tuning: &EnemyTuning,
        boss: &BossTuning,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        self.statuses.decay();
        let speed = self.base_speed * self.speed_multiplier(global_slow, tuning);

        if self.kind == EnemyKind::Boss {
            self.run_boss_ability(boss, rng, out);
        }

        self.walk(path, speed);
    }

    fn run_boss_ability<R: Rng + ?Sized>(
        &mut self,
        boss: &BossTuning,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        self.ability_timer = self.ability_timer.saturating_add(1);

        let (interval, summons, minion) = if self.health_fraction() > boss.phase_threshold {
            (boss.calm_interval, boss.calm_summons, boss.calm_minion)
        } else {
            (boss.rage_interval, boss.rage_summons, boss.rage_minion)
        };
        if self.ability_timer <= interval {
            return;
        }

        self.ability_timer = 0;
        for _ in 0..summons {
            out.push(Command::SpawnEnemy {
                kind: minion,
                wave: self.wave,
                origin: Some(SpawnOrigin {
                    position: self.position + jitter(rng, boss.summon_jitter),
                    path_index: self.path_index,
                }),
            });
        }
    }

    fn walk(&mut self, path: &Path, speed: f32) {
        let Some(waypoint) = path.waypoint(self.path_index) else {
            self.finished = true;
            return;
        };

        let target = waypoint + self.lane_offset;
        let to_target = target - self.position;
        let distance = to_target.length();
        if distance <= speed {
            self.position = target;
            self.path_index += 1;
            if self.path_index >= path.len() {
                self.finished = true;
            }
        } else {
            self.position += to_target / distance * speed;
        }
    }
}

/// Uniform offset in `[-span / 2, span / 2]` on both axes.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, span: f32) -> Vec2 {
    let x = (rng.gen::<f32>() - 0.5) * span;
    let y = (rng.gen::<f32>() - 0.5) * span;
    Vec2::new(x, y)
}
