#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Card Defence.
//!
//! The world owns enemies, towers, the projectile pool and the player
//! ledger. Mutations requested by systems arrive as [`Command`] values through
//! [`apply`], including every shot fired and every projectile contact. The
//! per-tick stages that only advance timers and motion are exposed as free
//! functions so the session can interleave them with the pure systems.

mod enemy;
mod projectile;
mod status;
mod tower;

pub use enemy::Enemy;
pub use projectile::{Projectile, ProjectilePool};
pub use status::{StatusEffect, StatusEffects};
pub use tower::Tower;

use card_defence_core::{
    derive_stream_seed, AttachError, BalanceConfig, Card, CardKind, ColorTag, Command,
    ConfigurationError, DeathEffect, EffectSink, EnemyId, EnemyKind, Event, ForgeError,
    Notification, Path, PayloadEffect, PlacementError, ProjectileHandle, SpawnOrigin, TileCoord,
    TowerId, Vec2,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

/// Represents the authoritative Card Defence world state.
#[derive(Debug)]
pub struct World {
    config: BalanceConfig,
    path: Path,
    enemies: Vec<Enemy>,
    towers: Vec<Tower>,
    projectiles: ProjectilePool,
    ledger: Ledger,
    next_enemy_id: u32,
    next_tower_id: u32,
    wave: u32,
    game_over: bool,
    spawn_rng: ChaCha8Rng,
    loot_rng: ChaCha8Rng,
    crit_rng: ChaCha8Rng,
}

#[derive(Debug)]
struct Ledger {
    money: u32,
    lives: u32,
    hand: Vec<Card>,
}

impl World {
    /// Creates a world with a fresh ledger for the provided balance and path.
    ///
    /// `seed` drives spawn jitter, loot rolls and crit draws through
    /// independent streams.
    #[must_use]
    pub fn new(config: BalanceConfig, path: Path, seed: u64) -> Self {
        let mut hand = config.economy.starting_hand.clone();
        hand.truncate(config.economy.hand_limit);
        let ledger = Ledger {
            money: config.economy.start_money,
            lives: config.economy.start_lives,
            hand,
        };

        Self {
            path,
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: ProjectilePool::new(),
            ledger,
            next_enemy_id: 0,
            next_tower_id: 0,
            wave: 0,
            game_over: false,
            spawn_rng: ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, "spawn")),
            loot_rng: ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, "loot")),
            crit_rng: ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, "crit")),
            config,
        }
    }

    fn tower_mut(&mut self, tower: TowerId) -> Option<&mut Tower> {
        self.towers.iter_mut().find(|candidate| candidate.id() == tower)
    }

    fn grant_card(&mut self, card: Card, out_events: &mut Vec<Event>) {
        if self.ledger.hand.len() < self.config.economy.hand_limit {
            self.ledger.hand.push(card);
            out_events.push(Event::CardGranted { card });
        } else {
            debug!(%card, "hand full, card discarded");
            out_events.push(Event::CardDiscarded { card });
        }
    }

    fn random_card(&mut self) -> Card {
        let index = self.loot_rng.gen_range(0..CardKind::ALL.len());
        Card::basic(CardKind::ALL[index])
    }

    fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        wave: u32,
        origin: Option<SpawnOrigin>,
        out_events: &mut Vec<Event>,
    ) {
        let archetype = match self.config.enemies.archetype(kind) {
            Ok(archetype) => *archetype,
            Err(reason) => {
                warn!(%reason, "spawn request dropped");
                out_events.push(Event::SpawnRejected { kind, reason });
                return;
            }
        };

        let health = self.config.enemies.scaled_health(&archetype, wave);
        if !(health > 0.0 && health.is_finite()) {
            let reason = ConfigurationError::NonPositiveHealth(kind);
            warn!(%reason, wave, health, "spawn request dropped");
            out_events.push(Event::SpawnRejected { kind, reason });
            return;
        }
        let lane_offset = enemy::jitter(&mut self.spawn_rng, self.config.enemies.spawn_jitter);
        let (position, path_index) = match origin {
            Some(origin) => (origin.position, origin.path_index),
            None => (self.path.start().unwrap_or(Vec2::ZERO) + lane_offset, 1),
        };

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        self.wave = self.wave.max(wave);
        self.enemies.push(Enemy::new(
            id,
            kind,
            wave,
            &archetype,
            health,
            position,
            path_index,
            lane_offset,
        ));
        debug!(enemy = id.get(), kind = kind.key(), wave, health, "enemy spawned");
        out_events.push(Event::EnemySpawned { enemy: id, kind });
    }

    fn place_tower(&mut self, tile: TileCoord) -> Result<TowerId, PlacementError> {
        let field = &self.config.field;
        if tile.column() >= field.columns || tile.row() >= field.rows {
            return Err(PlacementError::OutOfBounds);
        }
        if self.path.contains_tile(tile) {
            return Err(PlacementError::OnPath);
        }
        if self.towers.iter().any(|tower| tower.tile() == tile) {
            return Err(PlacementError::Occupied);
        }
        let cost = self.config.economy.tower_cost;
        if self.ledger.money < cost {
            return Err(PlacementError::InsufficientFunds);
        }

        self.ledger.money -= cost;
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.wrapping_add(1);
        self.towers.push(Tower::new(
            id,
            tile,
            field.tile_size,
            self.config.tower.build_frames,
        ));
        Ok(id)
    }

    fn attach_card(&mut self, tower: TowerId, card: Card) -> Result<(), AttachError> {
        let max_cards = self.config.tower.max_cards;
        self.tower_mut(tower)
            .ok_or(AttachError::MissingTower)?
            .attach(card, max_cards)
    }

    fn fire_projectile(&mut self, tower: TowerId, angle: f32) {
        let Some(shooter) = self
            .towers
            .iter_mut()
            .find(|candidate| candidate.id() == tower)
        else {
            debug!(tower = tower.get(), "shot from a missing tower ignored");
            return;
        };
        if shooter.is_building() {
            return;
        }
        let stats = shooter.stats(&self.config);
        let handle = self.projectiles.obtain();
        self.projectiles.get_mut(handle).launch(
            tower,
            shooter.position(),
            angle,
            &stats,
            self.config.combat.projectile_ttl,
        );
        shooter.reset_cooldown(stats.cooldown_frames);
    }

    fn forge_cards(&mut self, first: usize, second: usize) -> Result<Card, ForgeError> {
        if first == second {
            return Err(ForgeError::MissingCard);
        }
        let hand = &self.ledger.hand;
        let (Some(&a), Some(&b)) = (hand.get(first), hand.get(second)) else {
            return Err(ForgeError::MissingCard);
        };
        let forged = a.forge(b)?;
        let cost = self.config.economy.forge_cost;
        if self.ledger.money < cost {
            return Err(ForgeError::InsufficientFunds);
        }

        self.ledger.money -= cost;
        let _ = self.ledger.hand.remove(first.max(second));
        let _ = self.ledger.hand.remove(first.min(second));
        self.ledger.hand.push(forged);
        Ok(forged)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply<S: EffectSink + ?Sized>(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
    sink: &mut S,
) {
    match command {
        Command::SpawnEnemy { kind, wave, origin } => {
            world.spawn_enemy(kind, wave, origin, out_events);
        }
        Command::GrantMoney { amount } => {
            world.ledger.money = world.ledger.money.saturating_add(amount);
        }
        Command::GrantRandomCard => {
            let card = world.random_card();
            world.grant_card(card, out_events);
        }
        Command::PlaceTower { tile } => match world.place_tower(tile) {
            Ok(tower) => {
                debug!(tower = tower.get(), ?tile, "tower placed");
                sink.notify(Notification::text(
                    "Building...",
                    tile.center(world.config.field.tile_size),
                    ColorTag::White,
                ));
                out_events.push(Event::TowerPlaced { tower, tile });
            }
            Err(reason) => {
                debug!(?tile, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { tile, reason });
            }
        },
        Command::AttachCard { tower, card } => match world.attach_card(tower, card) {
            Ok(()) => out_events.push(Event::CardAttached { tower, card }),
            Err(reason) => out_events.push(Event::CardAttachRejected {
                tower,
                card: Some(card),
                reason,
            }),
        },
        Command::PlayCard { tower, hand_index } => {
            let Some(&card) = world.ledger.hand.get(hand_index) else {
                out_events.push(Event::CardAttachRejected {
                    tower,
                    card: None,
                    reason: AttachError::MissingCard,
                });
                return;
            };
            match world.attach_card(tower, card) {
                Ok(()) => {
                    let _ = world.ledger.hand.remove(hand_index);
                    out_events.push(Event::CardAttached { tower, card });
                }
                Err(reason) => out_events.push(Event::CardAttachRejected {
                    tower,
                    card: Some(card),
                    reason,
                }),
            }
        }
        Command::ForgeCards { first, second } => match world.forge_cards(first, second) {
            Ok(card) => {
                debug!(%card, "cards forged");
                out_events.push(Event::CardsForged { card });
            }
            Err(reason) => out_events.push(Event::ForgeRejected { reason }),
        },
        Command::AimTower { tower, target } => {
            if let Some(tower) = world.tower_mut(tower) {
                tower.face(target);
            }
        }
        Command::FireProjectile { tower, angle } => world.fire_projectile(tower, angle),
        Command::ProjectileContact { projectile, enemy } => {
            resolve_contact(world, projectile, enemy, out_events, sink);
        }
    }
}

/// Resolves one projectile touching one enemy.
///
/// Contacts with spent projectiles, dead enemies or enemies the projectile
/// already pierced are ignored, so a tick's contacts can be applied in order
/// after earlier ones killed or stopped something. A resolved contact rolls
/// one crit draw, damages the enemy, runs the payload effects in order,
/// credits the owning tower and finally spends pierce.
fn resolve_contact<S: EffectSink + ?Sized>(
    world: &mut World,
    handle: ProjectileHandle,
    target: EnemyId,
    out_events: &mut Vec<Event>,
    sink: &mut S,
) {
    let World {
        config,
        enemies,
        towers,
        projectiles,
        crit_rng,
        ..
    } = world;
    let combat = &config.combat;

    let Some(projectile) = projectiles.find_mut(handle) else {
        debug!(?handle, "contact with a released projectile ignored");
        return;
    };
    if !projectile.is_active() || projectile.has_hit(target) {
        return;
    }
    let Some(index) = enemies
        .iter()
        .position(|enemy| enemy.id() == target && enemy.is_alive())
    else {
        return;
    };

    let critical = crit_rng.gen::<f32>() < projectile.crit_chance();
    let multiplier = if critical { combat.crit_multiplier } else { 1.0 };
    let final_damage = projectile.damage() * multiplier;
    let owner = projectile.owner();

    let primary = &mut enemies[index];
    let mut dealt = primary.take_damage(final_damage);
    let impact = primary.position();
    trace!(enemy = target.get(), removed = dealt, critical, "projectile hit");
    sink.notify(Notification::particle(impact, projectile.color()));
    if critical {
        sink.notify(Notification::text("CRIT!", impact, ColorTag::Orange));
    }
    if let Some(tower) = owner {
        out_events.push(Event::EnemyHit {
            tower,
            enemy: target,
            damage: dealt,
            critical,
            splash: false,
        });
    }

    for effect in projectile.effects() {
        match *effect {
            PayloadEffect::Splash { radius } => {
                sink.notify(Notification::explosion(impact, radius, projectile.color()));
                let splash_damage = final_damage * combat.splash_fraction;
                for (other_index, other) in enemies.iter_mut().enumerate() {
                    if other_index == index
                        || !other.is_alive()
                        || other.position().distance(impact) > radius
                    {
                        continue;
                    }
                    let removed = other.take_damage(splash_damage);
                    dealt += removed;
                    if let Some(tower) = owner {
                        out_events.push(Event::EnemyHit {
                            tower,
                            enemy: other.id(),
                            damage: removed,
                            critical,
                            splash: true,
                        });
                    }
                }
            }
            PayloadEffect::Slow(slow) => enemies[index].apply_slow(slow),
            PayloadEffect::KillExplode { power_fraction } => {
                enemies[index].add_death_effect(DeathEffect::Explode {
                    damage: projectile.base_damage() * power_fraction,
                    radius: combat.explode_radius,
                });
            }
            PayloadEffect::KillFreeze => {
                enemies[index].add_death_effect(DeathEffect::Freeze {
                    slow: combat.freeze_slow,
                    radius: combat.freeze_radius,
                });
            }
        }
    }

    let shooter = owner.and_then(|owner| towers.iter_mut().find(|tower| tower.id() == owner));
    if let Some(shooter) = shooter {
        shooter.credit_damage(dealt);
    }
    let _ = projectile.pierce_through(target, combat.pierce_falloff);
}

/// Counts down construction and firing cooldowns for every tower.
///
/// Emits `Event::TowerReady` for each tower whose construction finished this
/// tick. Towers still under construction keep their cooldown untouched.
pub fn advance_towers(world: &mut World, out_events: &mut Vec<Event>) {
    for tower in &mut world.towers {
        if tower.is_building() {
            if tower.tick_build() {
                debug!(tower = tower.id().get(), "tower ready");
                out_events.push(Event::TowerReady { tower: tower.id() });
            }
            continue;
        }
        tower.tick_cooldown();
    }
}

/// Moves every flying projectile one tick.
pub fn advance_projectiles(world: &mut World) {
    let field = &world.config.field;
    for projectile in world.projectiles.iter_active_mut() {
        projectile.advance(field);
    }
}

/// Returns spent projectiles to the pool and reports how many were released.
pub fn release_spent_projectiles(world: &mut World) -> usize {
    world.projectiles.release_spent()
}

/// Runs status decay, boss abilities and movement for every live enemy.
///
/// Boss summons are pushed into `out` so the caller can apply them.
pub fn advance_enemies(world: &mut World, global_slow: f32, out: &mut Vec<Command>) {
    let World {
        config,
        path,
        enemies,
        spawn_rng,
        ..
    } = world;
    for enemy in enemies
        .iter_mut()
        .filter(|enemy| enemy.is_alive() && !enemy.is_finished())
    {
        enemy.advance(path, global_slow, &config.enemies, &config.boss, spawn_rng, out);
    }
}

/// Removes dead and escaped enemies and settles the ledger.
///
/// Deaths run first: each dead enemy pays its reward, may drop a card and
/// executes its death effects, which can kill further enemies in the same
/// pass. Escapes then cost one life each.
pub fn reconcile<S: EffectSink + ?Sized>(
    world: &mut World,
    out_events: &mut Vec<Event>,
    sink: &mut S,
) {
    while let Some(index) = world.enemies.iter().position(|enemy| !enemy.is_alive()) {
        let dead = world.enemies.remove(index);
        settle_kill(world, &dead, out_events, sink);
        for effect in dead.death_effects() {
            execute_death_effect(world, dead.position(), *effect, sink);
        }
    }

    let mut index = 0;
    while index < world.enemies.len() {
        if !world.enemies[index].is_finished() {
            index += 1;
            continue;
        }
        let escaped = world.enemies.remove(index);
        world.ledger.lives = world.ledger.lives.saturating_sub(1);
        debug!(
            enemy = escaped.id().get(),
            lives = world.ledger.lives,
            "enemy escaped"
        );
        sink.notify(Notification::text("-1", escaped.position(), ColorTag::Red));
        out_events.push(Event::EnemyEscaped {
            enemy: escaped.id(),
            kind: escaped.kind(),
        });
    }

    if world.ledger.lives == 0 && !world.game_over {
        world.game_over = true;
        info!(wave = world.wave, "game over");
        out_events.push(Event::GameOver { wave: world.wave });
    }
}

fn settle_kill<S: EffectSink + ?Sized>(
    world: &mut World,
    dead: &Enemy,
    out_events: &mut Vec<Event>,
    sink: &mut S,
) {
    let reward = dead.reward();
    world.ledger.money = world.ledger.money.saturating_add(reward);
    sink.notify(Notification::text(
        format!("+{reward}"),
        dead.position(),
        ColorTag::Gold,
    ));
    sink.notify(Notification::particle(dead.position(), ColorTag::Purple));
    out_events.push(Event::EnemyKilled {
        enemy: dead.id(),
        kind: dead.kind(),
        reward,
        position: dead.position(),
    });

    let chance = world.config.economy.drop_chance.clamp(0.0, 1.0);
    if world.loot_rng.gen_bool(chance) {
        let card = world.random_card();
        sink.notify(Notification::text(
            format!("{card} dropped"),
            dead.position(),
            ColorTag::Green,
        ));
        world.grant_card(card, out_events);
    }
}

fn execute_death_effect<S: EffectSink + ?Sized>(
    world: &mut World,
    origin: Vec2,
    effect: DeathEffect,
    sink: &mut S,
) {
    let (radius, color) = match effect {
        DeathEffect::Explode { radius, .. } => (radius, ColorTag::Red),
        DeathEffect::Freeze { radius, .. } => (radius, ColorTag::Cyan),
    };
    sink.notify(Notification::explosion(origin, radius, color));

    for enemy in world
        .enemies
        .iter_mut()
        .filter(|enemy| enemy.is_alive() && enemy.position().distance(origin) <= radius)
    {
        match effect {
            DeathEffect::Explode { damage, .. } => {
                let _ = enemy.take_damage(damage);
            }
            DeathEffect::Freeze { slow, .. } => enemy.apply_slow(slow),
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use card_defence_core::{BalanceConfig, Card, EnemyId, Path, TowerId};

    use super::{Enemy, ProjectilePool, Tower, World};

    /// Balance tables the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &BalanceConfig {
        &world.config
    }

    /// Path every enemy walks.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Enemies on the field in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Enemy with the provided identifier, if it is still on the field.
    #[must_use]
    pub fn enemy(world: &World, enemy: EnemyId) -> Option<&Enemy> {
        world.enemies.iter().find(|candidate| candidate.id() == enemy)
    }

    /// Number of enemies on the field.
    #[must_use]
    pub fn enemies_on_field(world: &World) -> usize {
        world.enemies.len()
    }

    /// Placed towers in placement order.
    #[must_use]
    pub fn towers(world: &World) -> &[Tower] {
        &world.towers
    }

    /// Tower with the provided identifier.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<&Tower> {
        world.towers.iter().find(|candidate| candidate.id() == tower)
    }

    /// Projectile arena.
    #[must_use]
    pub fn projectiles(world: &World) -> &ProjectilePool {
        &world.projectiles
    }

    /// Money available to the player.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.ledger.money
    }

    /// Lives left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.ledger.lives
    }

    /// Cards in the player's hand.
    #[must_use]
    pub fn hand(world: &World) -> &[Card] {
        &world.ledger.hand
    }

    /// Highest wave number that released an enemy.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_defence_core::{CombatTuning, EffectiveStats, NotificationKind, SlowEffect};

    fn quiet_config() -> BalanceConfig {
        let mut config = BalanceConfig::default();
        config.enemies.spawn_jitter = 0.0;
        config.economy.drop_chance = 0.0;
        config
    }

    fn straight_path() -> Path {
        Path::from_tiles(
            (0..10).map(|column| TileCoord::new(column, 5)).collect(),
            64.0,
        )
    }

    fn world() -> World {
        World::new(quiet_config(), straight_path(), 11)
    }

    fn spawn_at(world: &mut World, kind: EnemyKind, position: Vec2) -> EnemyId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                kind,
                wave: 1,
                origin: Some(SpawnOrigin {
                    position,
                    path_index: 1,
                }),
            },
            &mut events,
            &mut (),
        );
        match events.as_slice() {
            [Event::EnemySpawned { enemy, .. }] => *enemy,
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn new_world_starts_with_the_configured_ledger() {
        let world = world();
        assert_eq!(query::money(&world), 150);
        assert_eq!(query::lives(&world), 20);
        assert_eq!(query::hand(&world).len(), 3);
        assert_eq!(query::enemies_on_field(&world), 0);
    }

    #[test]
    fn spawns_start_at_the_path_origin_with_scaled_health() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Tank,
                wave: 2,
                origin: None,
            },
            &mut events,
            &mut (),
        );

        let tank = &query::enemies(&world)[0];
        assert_eq!(tank.position(), Vec2::new(32.0, 352.0));
        assert_eq!(tank.path_index(), 1);
        assert!((tank.max_health() - 90.0).abs() < 1e-4);
        assert_eq!(query::wave(&world), 2);
    }

    #[test]
    fn unknown_archetypes_are_rejected_without_side_effects() {
        let mut config = quiet_config();
        let _ = config.enemies.archetypes.remove(&EnemyKind::Tank);
        let mut world = World::new(config, straight_path(), 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Tank,
                wave: 1,
                origin: None,
            },
            &mut events,
            &mut (),
        );
        assert!(matches!(events.as_slice(), [Event::SpawnRejected { .. }]));
        assert_eq!(query::enemies_on_field(&world), 0);
    }

    #[test]
    fn spawns_without_health_are_rejected() {
        let mut config = quiet_config();
        if let Some(scout) = config.enemies.archetypes.get_mut(&EnemyKind::Scout) {
            scout.hp_mod = 0.0;
        }
        let mut world = World::new(config, straight_path(), 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Scout,
                wave: 4,
                origin: None,
            },
            &mut events,
            &mut (),
        );
        assert_eq!(
            events,
            vec![Event::SpawnRejected {
                kind: EnemyKind::Scout,
                reason: ConfigurationError::NonPositiveHealth(EnemyKind::Scout),
            }],
        );
        assert_eq!(query::enemies_on_field(&world), 0);
        assert_eq!(query::wave(&world), 0);
    }

    #[test]
    fn placement_checks_bounds_path_occupancy_and_funds() {
        let mut world = world();
        let mut events = Vec::new();
        for tile in [
            TileCoord::new(20, 0),
            TileCoord::new(3, 5),
            TileCoord::new(1, 1),
            TileCoord::new(1, 1),
            TileCoord::new(2, 1),
            TileCoord::new(3, 1),
        ] {
            apply(&mut world, Command::PlaceTower { tile }, &mut events, &mut ());
        }

        let outcomes: Vec<_> = events
            .iter()
            .map(|event| match event {
                Event::TowerPlaced { .. } => None,
                Event::TowerPlacementRejected { reason, .. } => Some(*reason),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(
            outcomes,
            vec![
                Some(PlacementError::OutOfBounds),
                Some(PlacementError::OnPath),
                None,
                Some(PlacementError::Occupied),
                None,
                Some(PlacementError::InsufficientFunds),
            ],
        );
        assert_eq!(query::money(&world), 40);
        assert!(query::towers(&world)[0].is_building());
    }

    #[test]
    fn playing_a_card_moves_it_from_hand_to_tower() {
        let mut config = quiet_config();
        config.tower.build_frames = 0;
        let mut world = World::new(config, straight_path(), 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                tile: TileCoord::new(1, 1),
            },
            &mut events,
            &mut (),
        );
        apply(
            &mut world,
            Command::PlayCard {
                tower: TowerId::new(0),
                hand_index: 1,
            },
            &mut events,
            &mut (),
        );
        apply(
            &mut world,
            Command::PlayCard {
                tower: TowerId::new(0),
                hand_index: 9,
            },
            &mut events,
            &mut (),
        );

        assert_eq!(
            events[1],
            Event::CardAttached {
                tower: TowerId::new(0),
                card: Card::basic(CardKind::Ice),
            },
        );
        assert!(matches!(
            events[2],
            Event::CardAttachRejected {
                card: None,
                reason: AttachError::MissingCard,
                ..
            }
        ));
        assert_eq!(query::hand(&world).len(), 2);
        assert_eq!(
            query::tower(&world, TowerId::new(0)).map(|tower| tower.cards().len()),
            Some(1),
        );
    }

    #[test]
    fn forging_merges_matching_cards_for_a_fee() {
        let mut config = quiet_config();
        config.economy.starting_hand = vec![
            Card::basic(CardKind::Fire),
            Card::basic(CardKind::Ice),
            Card::basic(CardKind::Fire),
        ];
        let mut world = World::new(config, straight_path(), 1);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ForgeCards { first: 0, second: 1 },
            &mut events,
            &mut (),
        );
        apply(
            &mut world,
            Command::ForgeCards { first: 2, second: 0 },
            &mut events,
            &mut (),
        );

        assert_eq!(
            events[0],
            Event::ForgeRejected {
                reason: ForgeError::KindMismatch,
            },
        );
        let forged = "fire:2".parse::<Card>().expect("card");
        assert_eq!(events[1], Event::CardsForged { card: forged });
        assert_eq!(query::hand(&world), &[Card::basic(CardKind::Ice), forged]);
        assert_eq!(query::money(&world), 100);
    }

    #[test]
    fn full_hands_discard_granted_cards() {
        let mut config = quiet_config();
        config.economy.hand_limit = 3;
        let mut world = World::new(config, straight_path(), 1);
        let mut events = Vec::new();
        apply(&mut world, Command::GrantRandomCard, &mut events, &mut ());
        assert!(matches!(events.as_slice(), [Event::CardDiscarded { .. }]));
        assert_eq!(query::hand(&world).len(), 3);
    }

    #[test]
    fn reconcile_pays_rewards_and_cascades_death_effects() {
        let mut world = world();
        let first = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(300.0, 100.0));
        let second = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(330.0, 100.0));
        let far = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(600.0, 100.0));

        let victim = &mut world.enemies[0];
        victim.add_death_effect(DeathEffect::Explode {
            damage: 100.0,
            radius: 60.0,
        });
        let _ = victim.take_damage(100.0);

        let mut events = Vec::new();
        let mut notifications: Vec<Notification> = Vec::new();
        reconcile(&mut world, &mut events, &mut notifications);

        let killed: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::EnemyKilled { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .collect();
        assert_eq!(killed, vec![first, second]);
        assert_eq!(query::money(&world), 160);
        assert!(query::enemy(&world, far).is_some());
        assert!(!notifications.is_empty());
    }

    #[test]
    fn freeze_death_effects_slow_neighbours() {
        let mut world = world();
        let _ = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(300.0, 100.0));
        let neighbour = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(350.0, 100.0));
        world.enemies[0].add_death_effect(DeathEffect::Freeze {
            slow: SlowEffect {
                power: 0.5,
                duration_frames: 60,
                amp_bonus: 0.0,
            },
            radius: 80.0,
        });
        let _ = world.enemies[0].take_damage(100.0);

        reconcile(&mut world, &mut Vec::new(), &mut ());
        let slowed = query::enemy(&world, neighbour).expect("neighbour survives");
        assert_eq!(slowed.statuses().slow_power(), 0.5);
    }

    #[test]
    fn escapes_cost_lives_until_game_over() {
        let mut config = quiet_config();
        config.economy.start_lives = 2;
        let path = Path::new(vec![Vec2::ZERO]);
        let mut world = World::new(config, path, 1);
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    kind: EnemyKind::Scout,
                    wave: 3,
                    origin: None,
                },
                &mut events,
                &mut (),
            );
        }

        let mut summons = Vec::new();
        advance_enemies(&mut world, 0.0, &mut summons);
        events.clear();
        reconcile(&mut world, &mut events, &mut ());

        let escaped = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyEscaped { .. }))
            .count();
        assert_eq!(escaped, 2);
        assert_eq!(events.last(), Some(&Event::GameOver { wave: 3 }));
        assert_eq!(query::lives(&world), 0);
        assert!(query::is_game_over(&world));
    }

    fn card(text: &str) -> Card {
        text.parse().expect("card")
    }

    /// World with one finished tower at tile 1,1 and grunts worth 500 health.
    fn armed_world(cards: &[Card]) -> World {
        let mut config = quiet_config();
        config.tower.build_frames = 0;
        config.cards.sniper.crit_per_level = 0.0;
        if let Some(grunt) = config.enemies.archetypes.get_mut(&EnemyKind::Grunt) {
            grunt.hp_mod = 20.0;
        }
        let mut world = World::new(config, straight_path(), 7);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                tile: TileCoord::new(1, 1),
            },
            &mut events,
            &mut (),
        );
        for card in cards {
            apply(
                &mut world,
                Command::AttachCard {
                    tower: TowerId::new(0),
                    card: *card,
                },
                &mut events,
                &mut (),
            );
        }
        assert_eq!(query::towers(&world)[0].cards().len(), cards.len());
        world
    }

    fn fire(world: &mut World) -> ProjectileHandle {
        apply(
            world,
            Command::FireProjectile {
                tower: TowerId::new(0),
                angle: 0.0,
            },
            &mut Vec::new(),
            &mut (),
        );
        query::projectiles(world)
            .iter_active_handles()
            .map(|(handle, _)| handle)
            .last()
            .expect("projectile launched")
    }

    fn contact(world: &mut World, projectile: ProjectileHandle, enemy: EnemyId) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::ProjectileContact { projectile, enemy },
            &mut events,
            &mut (),
        );
        events
    }

    fn hit_damage(events: &[Event]) -> Vec<(EnemyId, f32, bool)> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::EnemyHit {
                    enemy,
                    damage,
                    splash,
                    ..
                } => Some((*enemy, *damage, *splash)),
                _ => None,
            })
            .collect()
    }

    fn tower_stats(world: &World) -> EffectiveStats {
        query::tower(world, TowerId::new(0))
            .map(|tower| tower.stats(query::config(world)))
            .expect("tower")
    }

    #[test]
    fn towers_count_down_construction_then_cooldown() {
        let mut config = quiet_config();
        config.tower.build_frames = 2;
        let mut world = World::new(config, straight_path(), 1);
        apply(
            &mut world,
            Command::PlaceTower {
                tile: TileCoord::new(1, 1),
            },
            &mut Vec::new(),
            &mut (),
        );

        let mut events = Vec::new();
        advance_towers(&mut world, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::towers(&world)[0].build_remaining(), 1);

        for tower in [TowerId::new(0), TowerId::new(9)] {
            apply(
                &mut world,
                Command::FireProjectile { tower, angle: 0.0 },
                &mut events,
                &mut (),
            );
        }
        assert_eq!(query::projectiles(&world).in_use(), 0);

        advance_towers(&mut world, &mut events);
        assert_eq!(
            events,
            vec![Event::TowerReady {
                tower: TowerId::new(0)
            }],
        );

        let _ = fire(&mut world);
        assert_eq!(query::towers(&world)[0].cooldown(), 45);
        advance_towers(&mut world, &mut events);
        assert_eq!(query::towers(&world)[0].cooldown(), 44);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn aiming_turns_the_tower_toward_its_target() {
        let mut world = armed_world(&[]);
        apply(
            &mut world,
            Command::AimTower {
                tower: TowerId::new(0),
                target: Vec2::new(96.0, 196.0),
            },
            &mut Vec::new(),
            &mut (),
        );
        let facing = query::towers(&world)[0].facing();
        assert!((facing - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn piercing_contacts_decay_until_the_projectile_is_spent() {
        let mut world = armed_world(&[card("sniper:3"), card("sniper:3")]);
        let targets = [
            spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(96.0, 96.0)),
            spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(100.0, 96.0)),
            spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(104.0, 96.0)),
        ];
        let damage = tower_stats(&world).damage;
        let projectile = fire(&mut world);

        let mut events = Vec::new();
        for target in targets {
            events.extend(contact(&mut world, projectile, target));
        }

        let dealt: Vec<f32> = hit_damage(&events)
            .into_iter()
            .map(|(_, dealt, _)| dealt)
            .collect();
        assert_eq!(dealt.len(), 3);
        let expected = [damage, damage * 0.85, damage * 0.85 * 0.85];
        for (dealt, expected) in dealt.iter().zip(expected) {
            assert!((dealt - expected).abs() < 1e-3, "{dealt} vs {expected}");
        }
        assert!(!query::projectiles(&world).get(projectile).is_active());
        let credited = query::towers(&world)[0].cumulative_damage();
        assert!((credited - dealt.iter().sum::<f32>()).abs() < 1e-3);
    }

    #[test]
    fn spent_projectiles_ignore_later_contacts() {
        let mut world = armed_world(&[]);
        let first = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(96.0, 96.0));
        let second = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(100.0, 96.0));
        let projectile = fire(&mut world);

        let mut events = contact(&mut world, projectile, first);
        events.extend(contact(&mut world, projectile, second));

        assert_eq!(hit_damage(&events), vec![(first, 5.0, false)]);
        assert_eq!(query::enemy(&world, second).map(Enemy::health), Some(500.0));
        assert!(!query::projectiles(&world).get(projectile).is_active());
        assert_eq!(release_spent_projectiles(&mut world), 1);
        assert!(contact(&mut world, projectile, second).is_empty());
    }

    #[test]
    fn dead_enemies_are_not_hit() {
        let mut world = armed_world(&[]);
        let corpse = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(96.0, 96.0));
        let _ = world.enemies[0].take_damage(1_000.0);
        let projectile = fire(&mut world);

        assert!(contact(&mut world, projectile, corpse).is_empty());
        assert!(query::projectiles(&world).get(projectile).is_active());
    }

    #[test]
    fn splash_hits_neighbours_for_a_fraction() {
        let mut config = quiet_config();
        config.tower.build_frames = 0;
        let mut world = World::new(config, straight_path(), 3);
        apply(
            &mut world,
            Command::PlaceTower {
                tile: TileCoord::new(1, 1),
            },
            &mut Vec::new(),
            &mut (),
        );
        apply(
            &mut world,
            Command::AttachCard {
                tower: TowerId::new(0),
                card: card("fire:1"),
            },
            &mut Vec::new(),
            &mut (),
        );
        let primary = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(96.0, 96.0));
        let below = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(106.0, 126.0));
        let above = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(106.0, 66.0));
        let far = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(240.0, 96.0));
        let projectile = fire(&mut world);

        let mut notifications: Vec<Notification> = Vec::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ProjectileContact {
                projectile,
                enemy: primary,
            },
            &mut events,
            &mut notifications,
        );

        let health = |enemy| query::enemy(&world, enemy).map(Enemy::health).unwrap_or(0.0);
        assert!((health(primary) - 14.0).abs() < 1e-4);
        assert!((health(below) - 17.3).abs() < 1e-4);
        assert!((health(above) - 17.3).abs() < 1e-4);
        assert_eq!(health(far), 25.0);
        let splashed = hit_damage(&events).iter().filter(|(_, _, splash)| *splash).count();
        assert_eq!(splashed, 2);
        assert!(notifications
            .iter()
            .any(|notification| matches!(notification.kind, NotificationKind::Explosion { .. })));
        let credited = query::towers(&world)[0].cumulative_damage();
        assert!((credited - 26.4).abs() < 1e-3);
    }

    #[test]
    fn certain_crits_double_damage() {
        let mut world = armed_world(&[]);
        world.config.cards.sniper.crit_per_level = 1.0;
        world
            .tower_mut(TowerId::new(0))
            .expect("tower")
            .attach(card("sniper:1"), 3)
            .expect("attach");
        let target = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(96.0, 96.0));
        let projectile = fire(&mut world);

        let events = contact(&mut world, projectile, target);
        assert!(matches!(
            events.as_slice(),
            [Event::EnemyHit {
                critical: true,
                ..
            }]
        ));
        assert_eq!(hit_damage(&events), vec![(target, 26.0, false)]);
    }

    #[test]
    fn ice_and_fire_payloads_slow_and_mark_for_death() {
        let mut world = armed_world(&[card("fire:3"), card("ice:3")]);
        let target = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(96.0, 96.0));
        let stats = tower_stats(&world);
        let projectile = fire(&mut world);

        let _ = contact(&mut world, projectile, target);

        let combat = CombatTuning::default();
        let marked = query::enemy(&world, target).expect("target survives");
        assert_eq!(marked.statuses().slow_power(), 0.6);
        assert_eq!(marked.statuses().amp_bonus(), 0.3);
        assert_eq!(
            marked.death_effects(),
            &[
                DeathEffect::Explode {
                    damage: stats.damage * 0.5,
                    radius: 60.0,
                },
                DeathEffect::Freeze {
                    slow: combat.freeze_slow,
                    radius: 80.0,
                },
            ],
        );
    }

    #[test]
    fn explode_marks_use_the_launch_damage_after_piercing() {
        let mut world = armed_world(&[card("fire:3"), card("sniper:3")]);
        let first = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(96.0, 96.0));
        let second = spawn_at(&mut world, EnemyKind::Grunt, Vec2::new(100.0, 96.0));
        let stats = tower_stats(&world);
        let projectile = fire(&mut world);

        let _ = contact(&mut world, projectile, first);
        let events = contact(&mut world, projectile, second);

        let direct: Vec<EnemyId> = hit_damage(&events)
            .into_iter()
            .filter(|(_, _, splash)| !splash)
            .map(|(enemy, _, _)| enemy)
            .collect();
        assert_eq!(direct, vec![second]);
        let pierced = query::enemy(&world, second).expect("second survives");
        assert_eq!(
            pierced.death_effects(),
            &[DeathEffect::Explode {
                damage: stats.damage * 0.5,
                radius: 60.0,
            }],
        );
    }
}
