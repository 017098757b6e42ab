//! Typed, leveled modifier cards.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{effects::ColorTag, ConfigurationError, ForgeError};

/// Kinds of modifier cards that can be attached to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Mortar card: heavy damage with splash.
    Fire,
    /// Control card: slows and amplifies damage taken.
    Ice,
    /// Long range card with crits and pierce.
    Sniper,
    /// Fires a fan of projectiles at reduced damage.
    Multishot,
}

impl CardKind {
    /// Every card kind in declaration order.
    pub const ALL: [CardKind; 4] = [Self::Fire, Self::Ice, Self::Sniper, Self::Multishot];

    /// Lowercase key used in configuration files and command-line arguments.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Ice => "ice",
            Self::Sniper => "sniper",
            Self::Multishot => "multishot",
        }
    }

    /// Projectile colour associated with the card kind.
    #[must_use]
    pub const fn color(self) -> ColorTag {
        match self {
            Self::Fire => ColorTag::Red,
            Self::Ice => ColorTag::Cyan,
            Self::Sniper => ColorTag::Green,
            Self::Multishot => ColorTag::Orange,
        }
    }
}

impl FromStr for CardKind {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("multi") {
            return Ok(Self::Multishot);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigurationError::UnknownCardKind(value.to_owned()))
    }
}

/// Level of a card, always within `1..=CardLevel::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CardLevel(u8);

impl CardLevel {
    /// Lowest card level.
    pub const MIN: CardLevel = CardLevel(1);
    /// Highest card level reachable through forging.
    pub const MAX: CardLevel = CardLevel(3);

    /// Creates a level, rejecting zero and values above [`CardLevel::MAX`].
    pub fn new(value: u8) -> Result<Self, ConfigurationError> {
        if value < Self::MIN.0 || value > Self::MAX.0 {
            return Err(ConfigurationError::InvalidCardLevel(value));
        }
        Ok(Self(value))
    }

    /// Numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into per-level tier tables.
    #[must_use]
    pub const fn tier(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u8> for CardLevel {
    type Error = ConfigurationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CardLevel> for u8 {
    fn from(level: CardLevel) -> Self {
        level.0
    }
}

/// A modifier card. Only kind and level matter to the simulation.
///
/// The derived ordering sorts by kind first and level second, which is the
/// canonical order used when folding a tower's cards into stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    kind: CardKind,
    level: CardLevel,
}

impl Card {
    /// Creates a card of the provided kind and level.
    #[must_use]
    pub const fn new(kind: CardKind, level: CardLevel) -> Self {
        Self { kind, level }
    }

    /// Creates a level-one card of the provided kind.
    #[must_use]
    pub const fn basic(kind: CardKind) -> Self {
        Self::new(kind, CardLevel::MIN)
    }

    /// Kind of the card.
    #[must_use]
    pub const fn kind(&self) -> CardKind {
        self.kind
    }

    /// Level of the card.
    #[must_use]
    pub const fn level(&self) -> CardLevel {
        self.level
    }

    /// Merges two identical cards into one card of the next level.
    pub fn forge(self, other: Card) -> Result<Card, ForgeError> {
        if self.kind != other.kind {
            return Err(ForgeError::KindMismatch);
        }
        if self.level != other.level {
            return Err(ForgeError::LevelMismatch);
        }
        if self.level >= CardLevel::MAX {
            return Err(ForgeError::MaxLevel);
        }
        Ok(Card::new(self.kind, CardLevel(self.level.0 + 1)))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.key(), self.level.get())
    }
}

/// Parses `kind` or `kind:level`, for example `fire:2`.
impl FromStr for Card {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, level) = match value.split_once(':') {
            Some((kind, level)) => {
                let level = level
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| ConfigurationError::UnknownCardKind(value.to_owned()))?;
                (kind, CardLevel::new(level)?)
            }
            None => (value, CardLevel::MIN),
        };
        Ok(Card::new(kind.parse()?, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(kind: CardKind, level: u8) -> Card {
        Card::new(kind, CardLevel::new(level).expect("valid level"))
    }

    #[test]
    fn level_rejects_zero_and_overflow() {
        assert_eq!(CardLevel::new(0), Err(ConfigurationError::InvalidCardLevel(0)));
        assert_eq!(CardLevel::new(4), Err(ConfigurationError::InvalidCardLevel(4)));
        assert_eq!(CardLevel::new(3).map(CardLevel::tier), Ok(2));
    }

    #[test]
    fn forging_matching_cards_raises_level() {
        let merged = card(CardKind::Fire, 1).forge(card(CardKind::Fire, 1));
        assert_eq!(merged, Ok(card(CardKind::Fire, 2)));
    }

    #[test]
    fn forging_rejects_mismatches_and_max_level() {
        assert_eq!(
            card(CardKind::Fire, 1).forge(card(CardKind::Ice, 1)),
            Err(ForgeError::KindMismatch),
        );
        assert_eq!(
            card(CardKind::Ice, 1).forge(card(CardKind::Ice, 2)),
            Err(ForgeError::LevelMismatch),
        );
        assert_eq!(
            card(CardKind::Sniper, 3).forge(card(CardKind::Sniper, 3)),
            Err(ForgeError::MaxLevel),
        );
    }

    #[test]
    fn cards_parse_from_command_line_form() {
        assert_eq!("fire".parse::<Card>(), Ok(card(CardKind::Fire, 1)));
        assert_eq!("multi:2".parse::<Card>(), Ok(card(CardKind::Multishot, 2)));
        assert_eq!(
            "lightning:1".parse::<Card>(),
            Err(ConfigurationError::UnknownCardKind("lightning".to_owned())),
        );
        assert_eq!(
            "ice:7".parse::<Card>(),
            Err(ConfigurationError::InvalidCardLevel(7))
        );
    }

    #[test]
    fn canonical_order_sorts_by_kind_then_level() {
        let mut cards = vec![
            card(CardKind::Multishot, 1),
            card(CardKind::Fire, 3),
            card(CardKind::Fire, 1),
        ];
        cards.sort();
        assert_eq!(
            cards,
            vec![
                card(CardKind::Fire, 1),
                card(CardKind::Fire, 3),
                card(CardKind::Multishot, 1),
            ],
        );
    }
}
