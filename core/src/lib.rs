#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the card defence simulation.
//!
//! This crate defines the message surface that connects the session driver,
//! the authoritative world, and pure systems. Systems push [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that callers may
//! react to. Balance data lives in [`BalanceConfig`] and is consumed, never
//! computed, by the simulation.

mod cards;
mod config;
mod effects;
mod error;
mod notify;
mod path;
mod seed;
mod stats;

pub use cards::{Card, CardKind, CardLevel};
pub use config::{
    Archetype, BalanceConfig, BossTuning, CardTuning, CombatTuning, EconomyTuning, EnemyTuning,
    FieldConfig, FireTuning, IceTuning, MultishotTuning, SniperTuning, SpawnGroup, TowerTuning,
    WaveDefinition, WaveTuning,
};
pub use effects::{ColorTag, DeathEffect, PayloadEffect, SlowEffect};
pub use error::{AttachError, ConfigurationError, ForgeError, PlacementError};
pub use glam::Vec2;
pub use notify::{EffectSink, Notification, NotificationKind};
pub use path::Path;
pub use seed::derive_stream_seed;
pub use stats::EffectiveStats;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that a new enemy enter the field.
    SpawnEnemy {
        /// Archetype of the enemy to create.
        kind: EnemyKind,
        /// Wave number used to scale the enemy's health.
        wave: u32,
        /// Explicit spawn location; `None` spawns at the start of the path.
        origin: Option<SpawnOrigin>,
    },
    /// Credits money to the player ledger.
    GrantMoney {
        /// Amount of money to add.
        amount: u32,
    },
    /// Grants one random level-one card to the player's hand.
    GrantRandomCard,
    /// Requests construction of a tower on the provided tile.
    PlaceTower {
        /// Tile that will host the tower.
        tile: TileCoord,
    },
    /// Requests that a card be attached to an existing tower.
    AttachCard {
        /// Tower receiving the card.
        tower: TowerId,
        /// Card being attached.
        card: Card,
    },
    /// Moves a card from the player's hand onto a tower.
    PlayCard {
        /// Tower receiving the card.
        tower: TowerId,
        /// Zero-based index of the card in the hand.
        hand_index: usize,
    },
    /// Merges two matching hand cards into one card of the next level.
    ForgeCards {
        /// Zero-based index of the first card in the hand.
        first: usize,
        /// Zero-based index of the second card in the hand.
        second: usize,
    },
    /// Turns a finished tower toward the enemy it targets.
    AimTower {
        /// Tower that acquired a target.
        tower: TowerId,
        /// World position of the target.
        target: Vec2,
    },
    /// Launches one projectile from a tower and restarts its cooldown.
    FireProjectile {
        /// Tower firing the shot.
        tower: TowerId,
        /// Flight direction in radians.
        angle: f32,
    },
    /// Reports that a projectile overlaps an enemy and should resolve a hit.
    ProjectileContact {
        /// Projectile touching the enemy.
        projectile: ProjectileHandle,
        /// Enemy inside the hit radius.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world and systems after processing a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a new wave began spawning.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Announces that every enemy of a wave was spawned and removed.
    WaveCleared {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Reports that the next wave was called while enemies remained on the field.
    EarlyCallBonus {
        /// Wave that was active when the call happened.
        wave: u32,
        /// Money granted for taking the risk.
        amount: u32,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
    /// Reports that a spawn request was dropped.
    SpawnRejected {
        /// Archetype that was requested.
        kind: EnemyKind,
        /// Reason the request failed.
        reason: ConfigurationError,
    },
    /// Reports damage dealt to an enemy by a tower's projectile.
    EnemyHit {
        /// Tower that owns the projectile.
        tower: TowerId,
        /// Enemy that received the damage.
        enemy: EnemyId,
        /// Health actually removed from the enemy.
        damage: f32,
        /// Whether the hit rolled a critical strike.
        critical: bool,
        /// Whether the damage came from splash rather than a direct hit.
        splash: bool,
    },
    /// Confirms that an enemy died and was removed.
    EnemyKilled {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Money credited for the kill.
        reward: u32,
        /// Position where the enemy died.
        position: Vec2,
    },
    /// Confirms that an enemy reached the end of the path.
    EnemyEscaped {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
    /// Confirms that a tower was placed and started construction.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Tile hosting the tower.
        tile: TileCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Tile provided in the placement request.
        tile: TileCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that a tower finished construction.
    TowerReady {
        /// Identifier of the tower.
        tower: TowerId,
    },
    /// Confirms that a card was attached to a tower.
    CardAttached {
        /// Tower that received the card.
        tower: TowerId,
        /// Card that was attached.
        card: Card,
    },
    /// Reports that a card could not be attached.
    CardAttachRejected {
        /// Tower targeted by the request.
        tower: TowerId,
        /// Card that was offered, if the request named one.
        card: Option<Card>,
        /// Specific reason the attachment failed.
        reason: AttachError,
    },
    /// Confirms that a card was added to the player's hand.
    CardGranted {
        /// Card that was added.
        card: Card,
    },
    /// Confirms that two hand cards were merged.
    CardsForged {
        /// Card produced by the merge.
        card: Card,
    },
    /// Reports that a forge request was rejected.
    ForgeRejected {
        /// Specific reason the merge failed.
        reason: ForgeError,
    },
    /// Reports that a granted card was lost because the hand was full.
    CardDiscarded {
        /// Card that was discarded.
        card: Card,
    },
    /// Announces that the player ran out of lives.
    GameOver {
        /// Wave number reached.
        wave: u32,
    },
}

/// Explicit placement for an enemy that does not start at the path origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnOrigin {
    /// World position of the new enemy.
    pub position: Vec2,
    /// Index of the next waypoint the enemy walks toward.
    pub path_index: usize,
}

/// Archetypes of enemies that can walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline walker.
    Grunt,
    /// Fast, fragile walker that panics when wounded.
    Scout,
    /// Slow, armored walker.
    Tank,
    /// Boss that periodically summons minions.
    Boss,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 4] = [Self::Grunt, Self::Scout, Self::Tank, Self::Boss];

    /// Lowercase key used in configuration files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Grunt => "grunt",
            Self::Scout => "scout",
            Self::Tank => "tank",
            Self::Boss => "boss",
        }
    }
}

impl std::str::FromStr for EnemyKind {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ConfigurationError::UnknownEnemyKind(value.to_owned()))
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Stable reference to a projectile pool slot.
///
/// The generation changes every time the slot is released, so handles kept
/// past a release no longer resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileHandle {
    index: usize,
    generation: u32,
}

impl ProjectileHandle {
    /// Creates a handle for the slot at `index` in its `generation`.
    #[must_use]
    pub const fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the pool.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Location of a single map tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World-space centre of the tile for the provided tile edge length.
    #[must_use]
    pub fn center(self, tile_size: f32) -> Vec2 {
        Vec2::new(
            self.column as f32 * tile_size + tile_size / 2.0,
            self.row as f32 * tile_size + tile_size / 2.0,
        )
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}
