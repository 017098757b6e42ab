//! Error taxonomy for configuration faults and rejected requests.

use thiserror::Error;

use crate::EnemyKind;

/// Invalid configuration or unknown type keys passed to a lookup.
///
/// These errors are non-fatal: the request that produced them is dropped and
/// the rest of the simulation keeps running.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A card kind key did not match any known card.
    #[error("unknown card type `{0}`")]
    UnknownCardKind(String),
    /// An enemy kind key did not match any known archetype.
    #[error("unknown enemy type `{0}`")]
    UnknownEnemyKind(String),
    /// A card level outside the supported range was requested.
    #[error("card level {0} is outside 1..=3")]
    InvalidCardLevel(u8),
    /// The archetype table has no entry for the requested enemy kind.
    #[error("no archetype configured for enemy type `{}`", .0.key())]
    MissingArchetype(EnemyKind),
    /// A health scaling constant is zero, negative or not a number.
    #[error("`{0}` must be a positive number")]
    NonPositiveScaling(&'static str),
    /// Enemies of this kind would spawn with no health.
    #[error("enemy type `{}` would spawn without health", .0.key())]
    NonPositiveHealth(EnemyKind),
    /// The wave table is empty.
    #[error("no waves are configured")]
    NoWaves,
    /// A spawn group would never release an enemy.
    #[error("wave {wave} group {group} has a zero enemy count")]
    EmptyGroup {
        /// Zero-based wave index.
        wave: usize,
        /// Zero-based group index within the wave.
        group: usize,
    },
}

/// Reasons two cards cannot be forged together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// The cards are of different kinds.
    #[error("cards must share a kind")]
    KindMismatch,
    /// The cards are of different levels.
    #[error("cards must share a level")]
    LevelMismatch,
    /// The cards are already at the highest level.
    #[error("cards are already at the maximum level")]
    MaxLevel,
    /// One of the referenced hand slots is empty or both name the same slot.
    #[error("forge requires two distinct cards from the hand")]
    MissingCard,
    /// The player cannot pay the forge cost.
    #[error("not enough money to forge")]
    InsufficientFunds,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// The requested tile lies outside the playfield.
    #[error("tile is outside the playfield")]
    OutOfBounds,
    /// The requested tile is part of the enemy path.
    #[error("tile is part of the path")]
    OnPath,
    /// Another tower already occupies the tile.
    #[error("tile already holds a tower")]
    Occupied,
    /// The player cannot pay the tower cost.
    #[error("not enough money for a tower")]
    InsufficientFunds,
}

/// Reasons a card cannot be attached to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum AttachError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The tower is still under construction.
    #[error("tower is still being built")]
    StillBuilding,
    /// The tower already holds the maximum number of cards.
    #[error("tower has no free card slot")]
    Full,
    /// The referenced hand slot is empty.
    #[error("no card in that hand slot")]
    MissingCard,
}
