use std::{error::Error, fmt, str::FromStr};

use card_defence_core::{Card, ConfigurationError, TileCoord};

/// Separates the tile from the card list.
const CARD_LIST_DELIMITER: char = '=';
/// Separates cards within the card list.
const CARD_DELIMITER: char = '+';

/// Scripted tower placement of the form `col,row=fire:1+ice:2`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerSpec {
    /// Tile the tower is placed on.
    pub(crate) tile: TileCoord,
    /// Cards attached once construction finishes, in order.
    pub(crate) cards: Vec<Card>,
}

impl FromStr for TowerSpec {
    type Err = TowerSpecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TowerSpecError::Empty);
        }

        let (tile, cards) = match trimmed.split_once(CARD_LIST_DELIMITER) {
            Some((tile, cards)) => (tile, Some(cards)),
            None => (trimmed, None),
        };
        let tile = parse_tile(tile)?;
        let cards = match cards {
            Some(list) => list
                .split(CARD_DELIMITER)
                .map(|card| card.trim().parse::<Card>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(TowerSpecError::InvalidCard)?,
            None => Vec::new(),
        };

        Ok(Self { tile, cards })
    }
}

/// Errors that can occur while parsing a tower placement argument.
#[derive(Debug)]
pub(crate) enum TowerSpecError {
    /// The argument was empty or contained only whitespace.
    Empty,
    /// The tile segment was not a `column,row` pair of integers.
    InvalidTile(String),
    /// One of the cards could not be parsed.
    InvalidCard(ConfigurationError),
}

impl fmt::Display for TowerSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "tower argument was empty"),
            Self::InvalidTile(tile) => {
                write!(f, "could not parse tile '{tile}', expected COLUMN,ROW")
            }
            Self::InvalidCard(error) => write!(f, "could not parse card: {error}"),
        }
    }
}

impl Error for TowerSpecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCard(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_tile(tile: &str) -> Result<TileCoord, TowerSpecError> {
    let (column, row) = tile
        .split_once(',')
        .ok_or_else(|| TowerSpecError::InvalidTile(tile.to_owned()))?;

    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|_| TowerSpecError::InvalidTile(tile.to_owned()))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|_| TowerSpecError::InvalidTile(tile.to_owned()))?;

    Ok(TileCoord::new(column, row))
}
