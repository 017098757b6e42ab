//! Authoritative tower state.

use card_defence_core::{
    AttachError, BalanceConfig, Card, EffectiveStats, TileCoord, TowerId, Vec2,
};
use card_defence_system_card_stats::compute_stats;

/// Tower placed on a tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    id: TowerId,
    tile: TileCoord,
    position: Vec2,
    cards: Vec<Card>,
    cooldown: u32,
    facing: f32,
    cumulative_damage: f32,
    build_remaining: u32,
}

impl Tower {
    /// Creates a tower that spends `build_frames` ticks under construction.
    #[must_use]
    pub fn new(id: TowerId, tile: TileCoord, tile_size: f32, build_frames: u32) -> Self {
        Self {
            id,
            tile,
            position: tile.center(tile_size),
            cards: Vec::new(),
            cooldown: 0,
            facing: 0.0,
            cumulative_damage: 0.0,
            build_remaining: build_frames,
        }
    }

    /// Identifier of the tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Tile hosting the tower.
    #[must_use]
    pub const fn tile(&self) -> TileCoord {
        self.tile
    }

    /// World position of the tower's centre.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Attached cards in attachment order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Ticks until the tower may fire again.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Angle in radians toward the last target.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.facing
    }

    /// Total health removed by the tower's projectiles.
    #[must_use]
    pub const fn cumulative_damage(&self) -> f32 {
        self.cumulative_damage
    }

    /// Whether the tower is still under construction.
    #[must_use]
    pub const fn is_building(&self) -> bool {
        self.build_remaining > 0
    }

    /// Ticks of construction left.
    #[must_use]
    pub const fn build_remaining(&self) -> u32 {
        self.build_remaining
    }

    /// Current effective stats derived from the attached cards.
    #[must_use]
    pub fn stats(&self, config: &BalanceConfig) -> EffectiveStats {
        compute_stats(&self.cards, &config.tower, &config.cards)
    }

    /// Stats the tower would have with `extra` attached, without attaching it.
    #[must_use]
    pub fn preview_stats(&self, extra: Card, config: &BalanceConfig) -> EffectiveStats {
        let mut cards = self.cards.clone();
        cards.push(extra);
        compute_stats(&cards, &config.tower, &config.cards)
    }

    /// Appends a card. Cards are never removed once attached.
    pub fn attach(&mut self, card: Card, max_cards: usize) -> Result<(), AttachError> {
        if self.is_building() {
            return Err(AttachError::StillBuilding);
        }
        if self.cards.len() >= max_cards {
            return Err(AttachError::Full);
        }
        self.cards.push(card);
        Ok(())
    }

    /// Advances construction by one tick and reports whether it just finished.
    pub fn tick_build(&mut self) -> bool {
        if self.build_remaining == 0 {
            return false;
        }
        self.build_remaining -= 1;
        self.build_remaining == 0
    }

    /// Decrements the firing cooldown if it is positive.
    pub fn tick_cooldown(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Angle in radians from the tower's centre toward `target`.
    #[must_use]
    pub fn bearing_to(&self, target: Vec2) -> f32 {
        let delta = target - self.position;
        delta.y.atan2(delta.x)
    }

    /// Turns the tower toward `target`.
    pub fn face(&mut self, target: Vec2) {
        self.facing = self.bearing_to(target);
    }

    /// Restarts the cooldown after a volley.
    pub fn reset_cooldown(&mut self, frames: u32) {
        self.cooldown = frames;
    }

    /// Adds health removed by one of the tower's projectiles.
    pub fn credit_damage(&mut self, amount: f32) {
        self.cumulative_damage += amount;
    }
}
