#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-stepped driver that runs the simulation stages in a fixed order.
//!
//! Each [`Session::tick`] runs, in order: the wave scheduler, tower build and
//! cooldown timers, tower targeting and firing, projectile motion, collision,
//! projectile release, enemy status decay and movement, and finally
//! reconciliation of deaths and escapes. Systems only read the world and push
//! commands; the session applies each batch before the next stage runs, so
//! later stages always observe the effects of earlier ones within the tick.

use card_defence_core::{
    AttachError, BalanceConfig, Card, ColorTag, Command, ConfigurationError,
    EffectiveStats, EnemyId, EnemyKind, Event, ForgeError, Notification, Path, PlacementError,
    SpawnOrigin, TileCoord, TowerId, Vec2,
};
use card_defence_system_collision::CollisionResolver;
use card_defence_system_tower_combat::TowerCombat;
use card_defence_system_waves::{WaveCall, WaveScheduler};
use card_defence_world::{self as world, query, World};
use tracing::debug;

/// One game session: world state, systems and buffers.
#[derive(Debug)]
pub struct Session {
    world: World,
    waves: WaveScheduler,
    tower_combat: TowerCombat,
    collision: CollisionResolver,
    seed: u64,
    frame: u64,
    global_slow: f32,
    commands: Vec<Command>,
    events: Vec<Event>,
    notifications: Vec<Notification>,
}

impl Session {
    /// Creates a session after validating the balance tables.
    pub fn new(config: BalanceConfig, path: Path, seed: u64) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            world: World::new(config, path, seed),
            waves: WaveScheduler::new(),
            tower_combat: TowerCombat::new(),
            collision: CollisionResolver::new(),
            seed,
            frame: 0,
            global_slow: 0.0,
            commands: Vec::new(),
            events: Vec::new(),
            notifications: Vec::new(),
        })
    }

    /// Advances the simulation by one frame and returns the events it produced.
    ///
    /// Does nothing once the game is over.
    pub fn tick(&mut self) -> &[Event] {
        self.events.clear();
        if query::is_game_over(&self.world) {
            return &self.events;
        }
        self.frame += 1;

        self.waves.handle(
            self.frame,
            query::enemies_on_field(&self.world),
            &query::config(&self.world).waves,
            &mut self.commands,
            &mut self.events,
        );
        self.flush_commands();

        world::advance_towers(&mut self.world, &mut self.events);
        self.tower_combat.handle(
            query::towers(&self.world),
            query::enemies(&self.world),
            query::config(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        world::advance_projectiles(&mut self.world);

        self.collision.handle(
            query::projectiles(&self.world),
            query::enemies(&self.world),
            &query::config(&self.world).combat,
            &mut self.commands,
        );
        self.flush_commands();

        let _ = world::release_spent_projectiles(&mut self.world);

        world::advance_enemies(&mut self.world, self.global_slow, &mut self.commands);
        self.flush_commands();

        world::reconcile(&mut self.world, &mut self.events, &mut self.notifications);
        self.announce(0);

        &self.events
    }

    /// Calls the next wave, or pays the early-call bonus while one is running.
    pub fn start_next_wave(&mut self) -> WaveCall {
        let from = self.events.len();
        let call = self.waves.start_next_wave(
            self.frame,
            query::enemies_on_field(&self.world),
            &query::config(&self.world).waves,
            &mut self.commands,
            &mut self.events,
        );
        self.flush_commands();
        self.announce(from);
        call
    }

    /// Places a tower on the tile, paying its cost.
    pub fn place_tower(&mut self, tile: TileCoord) -> Result<TowerId, PlacementError> {
        let from = self.apply(Command::PlaceTower { tile });
        self.events[from..]
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::OutOfBounds))
    }

    /// Moves the card at `hand_index` from the hand onto the tower.
    pub fn play_card(&mut self, tower: TowerId, hand_index: usize) -> Result<Card, AttachError> {
        let from = self.apply(Command::PlayCard { tower, hand_index });
        self.attach_outcome(from)
    }

    /// Attaches a card that does not come from the hand.
    pub fn attach_card(&mut self, tower: TowerId, card: Card) -> Result<Card, AttachError> {
        let from = self.apply(Command::AttachCard { tower, card });
        self.attach_outcome(from)
    }

    /// Merges two hand cards of the same kind and level.
    pub fn forge(&mut self, first: usize, second: usize) -> Result<Card, ForgeError> {
        let from = self.apply(Command::ForgeCards { first, second });
        self.events[from..]
            .iter()
            .find_map(|event| match event {
                Event::CardsForged { card } => Some(Ok(*card)),
                Event::ForgeRejected { reason } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(ForgeError::MissingCard))
    }

    /// Requests a spawn outside the wave schedule, for scripted scenarios.
    pub fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        wave: u32,
        origin: Option<SpawnOrigin>,
    ) -> Result<EnemyId, ConfigurationError> {
        let from = self.apply(Command::SpawnEnemy { kind, wave, origin });
        self.events[from..]
            .iter()
            .find_map(|event| match event {
                Event::EnemySpawned { enemy, .. } => Some(Ok(*enemy)),
                Event::SpawnRejected { reason, .. } => Some(Err(reason.clone())),
                _ => None,
            })
            .unwrap_or(Err(ConfigurationError::MissingArchetype(kind)))
    }

    /// Current stats of a tower.
    #[must_use]
    pub fn tower_stats(&self, tower: TowerId) -> Option<EffectiveStats> {
        query::tower(&self.world, tower).map(|tower| tower.stats(query::config(&self.world)))
    }

    /// Stats a tower would have with `card` attached, without attaching it.
    #[must_use]
    pub fn preview_stats(&self, tower: TowerId, card: Card) -> Option<EffectiveStats> {
        query::tower(&self.world, tower)
            .map(|tower| tower.preview_stats(card, query::config(&self.world)))
    }

    /// Sets the field-wide slow applied to every enemy, clamped to `[0, 1]`.
    pub fn set_global_slow(&mut self, factor: f32) {
        self.global_slow = factor.clamp(0.0, 1.0);
    }

    /// Field-wide slow applied to every enemy.
    #[must_use]
    pub const fn global_slow(&self) -> f32 {
        self.global_slow
    }

    /// Resets the world, the scheduler and the frame counter.
    pub fn restart(&mut self) {
        let config = query::config(&self.world).clone();
        let path = query::path(&self.world).clone();
        self.world = World::new(config, path, self.seed);
        self.waves.reset();
        self.tower_combat = TowerCombat::new();
        self.collision = CollisionResolver::new();
        self.frame = 0;
        self.commands.clear();
        self.events.clear();
        self.notifications.clear();
        debug!(seed = self.seed, "session restarted");
    }

    /// Takes every notification produced since the last call.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Read-only world state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Wave scheduler state.
    #[must_use]
    pub const fn waves(&self) -> &WaveScheduler {
        &self.waves
    }

    /// Frames simulated since the session started or restarted.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Seed the session was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        query::is_game_over(&self.world)
    }

    fn apply(&mut self, command: Command) -> usize {
        let from = self.events.len();
        world::apply(
            &mut self.world,
            command,
            &mut self.events,
            &mut self.notifications,
        );
        from
    }

    fn attach_outcome(&self, from: usize) -> Result<Card, AttachError> {
        self.events[from..]
            .iter()
            .find_map(|event| match event {
                Event::CardAttached { card, .. } => Some(Ok(*card)),
                Event::CardAttachRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(AttachError::MissingTower))
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(
                &mut self.world,
                command,
                &mut self.events,
                &mut self.notifications,
            );
        }
    }

    fn announce(&mut self, from: usize) {
        let field = &query::config(&self.world).field;
        let center = Vec2::new(field.width() / 2.0, field.height() / 2.0);
        for event in &self.events[from..] {
            let notification = match event {
                Event::WaveStarted { wave } => {
                    Notification::text(format!("Wave {wave}"), center, ColorTag::White)
                }
                Event::WaveCleared { wave } => {
                    Notification::text(format!("Wave {wave} cleared!"), center, ColorTag::Green)
                }
                Event::EarlyCallBonus { amount, .. } => {
                    Notification::text(format!("+{amount} early call"), center, ColorTag::Gold)
                }
                Event::GameOver { .. } => Notification::text("Game over", center, ColorTag::Red),
                _ => continue,
            };
            self.notifications.push(notification);
        }
    }
}
