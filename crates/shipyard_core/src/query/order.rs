//! Ship ordering.

use crate::model::ship::{Ship, UnknownVariant};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Sort key for ship listings. Ordering is always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipOrder {
    Id,
    Date,
    Speed,
    Rating,
}

impl ShipOrder {
    /// Name of the ship field this key sorts by.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Date => "production_date",
            Self::Speed => "speed",
            Self::Rating => "rating",
        }
    }

    /// Compares two ships by this key.
    ///
    /// Unsaved ships (no id) order before saved ones; floats use IEEE total
    /// ordering.
    pub fn compare(self, left: &Ship, right: &Ship) -> Ordering {
        match self {
            Self::Id => left.id().cmp(&right.id()),
            Self::Date => left.production_date().cmp(&right.production_date()),
            Self::Speed => left.speed().total_cmp(&right.speed()),
            Self::Rating => left.rating().total_cmp(&right.rating()),
        }
    }
}

impl FromStr for ShipOrder {
    type Err = UnknownVariant;

    /// Accepts `ID|DATE|SPEED|RATING`, case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ID" => Ok(Self::Id),
            "DATE" => Ok(Self::Date),
            "SPEED" => Ok(Self::Speed),
            "RATING" => Ok(Self::Rating),
            _ => Err(UnknownVariant::new("ship order", value)),
        }
    }
}

/// Sorts ships ascending by `order`; returns the input untouched when unset.
///
/// The sort is stable, so ties keep their input order.
pub fn sort_ships(mut ships: Vec<Ship>, order: Option<ShipOrder>) -> Vec<Ship> {
    if let Some(order) = order {
        ships.sort_by(|left, right| order.compare(left, right));
    }
    ships
}
