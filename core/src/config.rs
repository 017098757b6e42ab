//! Static balance tables consumed by the simulation.
//!
//! Every section carries `#[serde(default)]`, so a TOML override file only
//! needs to mention the knobs it changes. Map-valued entries such as the
//! archetype table replace the default map wholesale when present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Card, CardKind, ColorTag, ConfigurationError, EnemyKind, SlowEffect};

/// Aggregated balance configuration covering every tunable constant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Playfield dimensions and projectile bounds.
    pub field: FieldConfig,
    /// Base tower stats and clamps.
    pub tower: TowerTuning,
    /// Per-card-type, per-level modifier rules.
    pub cards: CardTuning,
    /// Hit resolution constants.
    pub combat: CombatTuning,
    /// Enemy scaling and archetype table.
    pub enemies: EnemyTuning,
    /// Boss summon cadence.
    pub boss: BossTuning,
    /// Wave pacing and the ordered wave table.
    pub waves: WaveTuning,
    /// Player ledger constants.
    pub economy: EconomyTuning,
}

impl BalanceConfig {
    /// Checks the cross-references the simulation relies on.
    ///
    /// At least one wave must exist, every group must release at least one
    /// enemy, and every enemy kind that can be spawned (including boss
    /// minions) must have an archetype. Health scaling must be positive so
    /// no enemy spawns dead.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.waves.waves.is_empty() {
            return Err(ConfigurationError::NoWaves);
        }
        self.enemies.validate_health()?;

        let mut boss_referenced = false;
        for (wave_index, wave) in self.waves.waves.iter().enumerate() {
            for (group_index, group) in wave.groups.iter().enumerate() {
                if group.count == 0 {
                    return Err(ConfigurationError::EmptyGroup {
                        wave: wave_index,
                        group: group_index,
                    });
                }
                let _ = self.enemies.archetype(group.kind)?;
                boss_referenced |= group.kind == EnemyKind::Boss;
            }
        }

        if boss_referenced {
            let _ = self.enemies.archetype(self.boss.calm_minion)?;
            let _ = self.enemies.archetype(self.boss.rage_minion)?;
        }

        Ok(())
    }
}

/// Playfield dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Edge length of a square tile in world units.
    pub tile_size: f32,
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Distance outside the field a projectile may travel before it is culled.
    pub bounds_margin: f32,
}

impl FieldConfig {
    /// Total width of the field in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Total height of the field in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            columns: 20,
            rows: 12,
            bounds_margin: 50.0,
        }
    }
}

/// Base tower stats before any card is applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerTuning {
    /// Targeting radius of a bare tower.
    pub base_range: f32,
    /// Projectile damage of a bare tower.
    pub base_damage: f32,
    /// Ticks between volleys of a bare tower.
    pub base_cooldown: u32,
    /// Projectile speed of a bare tower in world units per tick.
    pub base_projectile_speed: f32,
    /// Lower clamp applied to the derived range.
    pub min_range: f32,
    /// Lower clamp applied to the derived cooldown.
    pub min_cooldown: u32,
    /// Ticks a freshly placed tower spends under construction.
    pub build_frames: u32,
    /// Maximum number of cards a tower holds.
    pub max_cards: usize,
    /// Projectile colour of a bare tower.
    pub base_color: ColorTag,
}

impl Default for TowerTuning {
    fn default() -> Self {
        Self {
            base_range: 120.0,
            base_damage: 5.0,
            base_cooldown: 45,
            base_projectile_speed: 8.0,
            min_range: 40.0,
            min_cooldown: 10,
            build_frames: 60,
            max_cards: 3,
            base_color: ColorTag::Gold,
        }
    }
}

/// Modifier rules for every card kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTuning {
    /// Fire card tiers.
    pub fire: FireTuning,
    /// Ice card tiers.
    pub ice: IceTuning,
    /// Sniper card rules.
    pub sniper: SniperTuning,
    /// Multishot card rules.
    pub multishot: MultishotTuning,
}

/// Fire card tiers, indexed by `level - 1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireTuning {
    /// Bonus projectile damage per tier.
    pub damage: [f32; 3],
    /// Splash radius per tier.
    pub splash_radius: [f32; 3],
    /// Cooldown penalty per tier; the top tier does not raise it further.
    pub cooldown_penalty: [u32; 3],
    /// Fraction of projectile damage dealt by the level-three death explosion.
    pub explode_fraction: f32,
}

impl Default for FireTuning {
    fn default() -> Self {
        Self {
            damage: [6.0, 14.0, 26.0],
            splash_radius: [50.0, 70.0, 90.0],
            cooldown_penalty: [10, 20, 20],
            explode_fraction: 0.5,
        }
    }
}

/// Ice card tiers, indexed by `level - 1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceTuning {
    /// Flat range reduction per ice card.
    pub range_penalty: f32,
    /// Bonus damage per card level.
    pub damage_per_level: f32,
    /// Cooldown reduction per card level.
    pub cooldown_reduction_per_level: u32,
    /// Slow power per tier.
    pub slow_power: [f32; 3],
    /// Slow duration per tier in ticks.
    pub slow_duration: [u32; 3],
    /// Incoming damage amplification per tier.
    pub amp_bonus: [f32; 3],
}

impl Default for IceTuning {
    fn default() -> Self {
        Self {
            range_penalty: 20.0,
            damage_per_level: 3.0,
            cooldown_reduction_per_level: 2,
            slow_power: [0.4, 0.5, 0.6],
            slow_duration: [70, 100, 130],
            amp_bonus: [0.0, 0.15, 0.3],
        }
    }
}

/// Sniper card rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SniperTuning {
    /// Range bonus per card level.
    pub range_per_level: f32,
    /// Damage bonus per card level.
    pub damage_per_level: f32,
    /// Crit chance bonus per card level.
    pub crit_per_level: f32,
    /// Projectile speed forced by any sniper card.
    pub projectile_speed: f32,
    /// Cooldown penalty per sniper card.
    pub cooldown_penalty: u32,
    /// Minimum level that grants one point of pierce.
    pub pierce_level: u8,
}

impl Default for SniperTuning {
    fn default() -> Self {
        Self {
            range_per_level: 60.0,
            damage_per_level: 8.0,
            crit_per_level: 0.1,
            projectile_speed: 15.0,
            cooldown_penalty: 10,
            pierce_level: 3,
        }
    }
}

/// Multishot card rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultishotTuning {
    /// Damage multiplier applied once when any multishot card is present.
    pub damage_multiplier: f32,
    /// Angle in radians between neighbouring projectiles.
    pub spread: f32,
}

impl Default for MultishotTuning {
    fn default() -> Self {
        Self {
            damage_multiplier: 0.6,
            spread: 0.2,
        }
    }
}

/// Hit resolution constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Distance below which a projectile hits an enemy.
    pub hit_radius: f32,
    /// Damage multiplier of a critical hit.
    pub crit_multiplier: f32,
    /// Damage multiplier applied each time a projectile pierces.
    pub pierce_falloff: f32,
    /// Fraction of the hit damage dealt to splash neighbours.
    pub splash_fraction: f32,
    /// Ticks a projectile lives before it fizzles.
    pub projectile_ttl: u32,
    /// Radius of death explosions.
    pub explode_radius: f32,
    /// Radius of death freezes.
    pub freeze_radius: f32,
    /// Slow applied by a death freeze.
    pub freeze_slow: SlowEffect,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            hit_radius: 20.0,
            crit_multiplier: 2.0,
            pierce_falloff: 0.85,
            splash_fraction: 0.7,
            projectile_ttl: 120,
            explode_radius: 60.0,
            freeze_radius: 80.0,
            freeze_slow: SlowEffect {
                power: 0.5,
                duration_frames: 60,
                amp_bonus: 0.0,
            },
        }
    }
}

/// Per-archetype enemy stats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Multiplier applied to the wave-scaled base health.
    pub hp_mod: f32,
    /// Movement speed in world units per tick.
    pub speed: f32,
    /// Money credited when the enemy dies.
    pub reward: u32,
    /// Flat damage mitigation per hit.
    #[serde(default)]
    pub armor: f32,
}

/// Enemy scaling rules and archetype table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Health of a grunt in the first wave.
    pub base_health: f32,
    /// Multiplicative health growth per wave.
    pub health_growth: f32,
    /// Width of the random lane offset given to each spawned enemy.
    pub spawn_jitter: f32,
    /// Health fraction below which scouts panic.
    pub panic_threshold: f32,
    /// Speed multiplier of a panicking scout.
    pub panic_multiplier: f32,
    /// Stats per enemy kind.
    pub archetypes: BTreeMap<EnemyKind, Archetype>,
}

impl EnemyTuning {
    /// Looks up the archetype of an enemy kind.
    pub fn archetype(&self, kind: EnemyKind) -> Result<&Archetype, ConfigurationError> {
        self.archetypes
            .get(&kind)
            .ok_or(ConfigurationError::MissingArchetype(kind))
    }

    /// Rejects health constants that would spawn enemies without health.
    pub fn validate_health(&self) -> Result<(), ConfigurationError> {
        if !(self.base_health > 0.0) {
            return Err(ConfigurationError::NonPositiveScaling("enemies.base_health"));
        }
        if !(self.health_growth > 0.0) {
            return Err(ConfigurationError::NonPositiveScaling("enemies.health_growth"));
        }
        match self
            .archetypes
            .iter()
            .find(|(_, archetype)| !(archetype.hp_mod > 0.0))
        {
            Some((kind, _)) => Err(ConfigurationError::NonPositiveHealth(*kind)),
            None => Ok(()),
        }
    }

    /// Health of an enemy with the provided archetype in the provided wave.
    #[must_use]
    pub fn scaled_health(&self, archetype: &Archetype, wave: u32) -> f32 {
        let exponent = i32::try_from(wave.saturating_sub(1)).unwrap_or(i32::MAX);
        self.base_health * archetype.hp_mod * self.health_growth.powi(exponent)
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        let archetypes = [
            (EnemyKind::Grunt, 1.0, 1.5, 5, 0.0),
            (EnemyKind::Scout, 0.5, 3.5, 3, 0.0),
            (EnemyKind::Tank, 3.0, 1.0, 12, 2.0),
            (EnemyKind::Boss, 20.0, 0.5, 200, 0.0),
        ]
        .into_iter()
        .map(|(kind, hp_mod, speed, reward, armor)| {
            (
                kind,
                Archetype {
                    hp_mod,
                    speed,
                    reward,
                    armor,
                },
            )
        })
        .collect();

        Self {
            base_health: 25.0,
            health_growth: 1.2,
            spawn_jitter: 20.0,
            panic_threshold: 0.5,
            panic_multiplier: 2.0,
            archetypes,
        }
    }
}

/// Boss minion-summon cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Health fraction separating the calm and rage phases.
    pub phase_threshold: f32,
    /// Ticks between summons while above the threshold.
    pub calm_interval: u32,
    /// Minions per summon while above the threshold.
    pub calm_summons: u32,
    /// Minion kind summoned while above the threshold.
    pub calm_minion: EnemyKind,
    /// Ticks between summons at or below the threshold.
    pub rage_interval: u32,
    /// Minions per summon at or below the threshold.
    pub rage_summons: u32,
    /// Minion kind summoned at or below the threshold.
    pub rage_minion: EnemyKind,
    /// Width of the random offset around the boss for each minion.
    pub summon_jitter: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            phase_threshold: 0.5,
            calm_interval: 120,
            calm_summons: 2,
            calm_minion: EnemyKind::Grunt,
            rage_interval: 300,
            rage_summons: 1,
            rage_minion: EnemyKind::Scout,
            summon_jitter: 40.0,
        }
    }
}

/// One sub-batch of a single enemy type within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Enemy kind released by the group.
    pub kind: EnemyKind,
    /// Number of enemies released.
    pub count: u32,
    /// Ticks between consecutive releases inside the group.
    pub interval: u32,
}

/// Ordered groups released by one wave.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Groups in release order.
    pub groups: Vec<SpawnGroup>,
}

impl WaveDefinition {
    /// Total number of enemies released by the wave.
    #[must_use]
    pub fn total_enemies(&self) -> u32 {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Wave pacing and the static wave table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Ticks between starting a wave and its first spawn.
    pub lead_in_frames: u32,
    /// Multiplier applied to the next group's interval to separate groups.
    pub group_pause_factor: u32,
    /// Money granted for calling a wave while enemies remain.
    pub early_call_bonus: u32,
    /// Money granted when a wave is cleared.
    pub clear_reward: u32,
    /// Waves in order; the table repeats once exhausted.
    pub waves: Vec<WaveDefinition>,
}

impl Default for WaveTuning {
    fn default() -> Self {
        let group = |kind, count, interval| SpawnGroup {
            kind,
            count,
            interval,
        };
        let waves = vec![
            vec![group(EnemyKind::Grunt, 10, 90)],
            vec![group(EnemyKind::Scout, 10, 40)],
            vec![
                group(EnemyKind::Grunt, 15, 30),
                group(EnemyKind::Tank, 2, 150),
            ],
            vec![
                group(EnemyKind::Tank, 5, 100),
                group(EnemyKind::Scout, 15, 20),
            ],
            vec![
                group(EnemyKind::Grunt, 30, 20),
                group(EnemyKind::Boss, 1, 300),
            ],
        ];

        Self {
            lead_in_frames: 60,
            group_pause_factor: 5,
            early_call_bonus: 30,
            clear_reward: 20,
            waves: waves
                .into_iter()
                .map(|groups| WaveDefinition { groups })
                .collect(),
        }
    }
}

/// Player ledger constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Money at the start of a session.
    pub start_money: u32,
    /// Lives at the start of a session.
    pub start_lives: u32,
    /// Maximum number of cards in the hand.
    pub hand_limit: usize,
    /// Price of a tower.
    pub tower_cost: u32,
    /// Price of forging two cards.
    pub forge_cost: u32,
    /// Probability that a kill drops a random card.
    pub drop_chance: f64,
    /// Cards in the hand at the start of a session.
    pub starting_hand: Vec<Card>,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            start_money: 150,
            start_lives: 20,
            hand_limit: 10,
            tower_cost: 55,
            forge_cost: 50,
            drop_chance: 0.15,
            starting_hand: vec![
                Card::basic(CardKind::Fire),
                Card::basic(CardKind::Ice),
                Card::basic(CardKind::Sniper),
            ],
        }
    }
}
