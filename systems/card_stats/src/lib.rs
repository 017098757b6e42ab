#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure fold from a tower's attached cards to its effective combat stats.
//!
//! Cards are folded in canonical `(kind, level)` order so the result does not
//! depend on the order in which cards were attached. Overriding rules such as
//! the splash radius therefore always resolve to the highest-level card.

use card_defence_core::{
    Card, CardKind, CardLevel, CardTuning, ColorTag, EffectiveStats, PayloadEffect, SlowEffect,
    TowerTuning,
};

/// Derives the effective stats of a tower holding the provided cards.
#[must_use]
pub fn compute_stats(
    cards: &[Card],
    tower: &TowerTuning,
    tuning: &CardTuning,
) -> EffectiveStats {
    let mut ordered = cards.to_vec();
    ordered.sort_unstable();

    let mut fold = Fold::new(tower);
    for card in &ordered {
        fold.apply(*card, tuning);
    }
    fold.finish(tower, tuning)
}

struct Fold {
    range: f32,
    damage: f32,
    cooldown: i64,
    projectile_speed: f32,
    pierce: u32,
    crit_chance: f32,
    color: Option<(CardLevel, ColorTag)>,
    splash: Option<f32>,
    slow: Option<SlowEffect>,
    explode: Option<f32>,
    freeze: bool,
    multishot: Option<CardLevel>,
}

impl Fold {
    fn new(tower: &TowerTuning) -> Self {
        Self {
            range: tower.base_range,
            damage: tower.base_damage,
            cooldown: i64::from(tower.base_cooldown),
            projectile_speed: tower.base_projectile_speed,
            pierce: 0,
            crit_chance: 0.0,
            color: None,
            splash: None,
            slow: None,
            explode: None,
            freeze: false,
            multishot: None,
        }
    }

    fn apply(&mut self, card: Card, tuning: &CardTuning) {
        let level = card.level();
        let tier = level.tier();
        let scale = f32::from(level.get());
        let top_tier = level >= CardLevel::MAX;

        match card.kind() {
            CardKind::Fire => {
                let fire = &tuning.fire;
                self.damage += fire.damage[tier];
                self.cooldown += i64::from(fire.cooldown_penalty[tier]);
                self.splash = Some(fire.splash_radius[tier]);
                if top_tier {
                    self.explode = Some(fire.explode_fraction);
                }
            }
            CardKind::Ice => {
                let ice = &tuning.ice;
                self.range -= ice.range_penalty;
                self.damage += ice.damage_per_level * scale;
                self.cooldown -= i64::from(ice.cooldown_reduction_per_level) * i64::from(level.get());
                self.slow = Some(SlowEffect {
                    power: ice.slow_power[tier],
                    duration_frames: ice.slow_duration[tier],
                    amp_bonus: ice.amp_bonus[tier],
                });
                if top_tier {
                    self.freeze = true;
                }
            }
            CardKind::Sniper => {
                let sniper = &tuning.sniper;
                self.range += sniper.range_per_level * scale;
                self.damage += sniper.damage_per_level * scale;
                self.crit_chance += sniper.crit_per_level * scale;
                self.projectile_speed = sniper.projectile_speed;
                self.cooldown += i64::from(sniper.cooldown_penalty);
                if level.get() >= sniper.pierce_level {
                    self.pierce += 1;
                }
            }
            CardKind::Multishot => {
                self.multishot = Some(self.multishot.map_or(level, |seen| seen.max(level)));
            }
        }

        // Strictly greater keeps the earliest kind on level ties.
        if self.color.map_or(true, |(seen, _)| level > seen) {
            self.color = Some((level, card.kind().color()));
        }
    }

    fn finish(self, tower: &TowerTuning, tuning: &CardTuning) -> EffectiveStats {
        let mut damage = self.damage;
        let mut projectile_count = 1;
        let mut spread = 0.0;
        if let Some(level) = self.multishot {
            projectile_count += u32::from(level.get());
            damage *= tuning.multishot.damage_multiplier;
            spread = tuning.multishot.spread;
        }

        let mut effects = Vec::new();
        if let Some(radius) = self.splash {
            effects.push(PayloadEffect::Splash { radius });
        }
        if let Some(slow) = self.slow {
            effects.push(PayloadEffect::Slow(slow));
        }
        if let Some(power_fraction) = self.explode {
            effects.push(PayloadEffect::KillExplode { power_fraction });
        }
        if self.freeze {
            effects.push(PayloadEffect::KillFreeze);
        }

        let cooldown = self.cooldown.max(i64::from(tower.min_cooldown));

        EffectiveStats {
            range: self.range.max(tower.min_range),
            damage,
            cooldown_frames: u32::try_from(cooldown).unwrap_or(u32::MAX),
            projectile_speed: self.projectile_speed,
            pierce: self.pierce,
            crit_chance: self.crit_chance.clamp(0.0, 1.0),
            projectile_count,
            spread,
            color: self.color.map_or(tower.base_color, |(_, color)| color),
            effects,
        }
    }
}
