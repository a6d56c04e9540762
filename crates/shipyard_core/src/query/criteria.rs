//! Ship filter criteria.
//!
//! All supplied criteria are AND-combined. Text criteria match substrings,
//! numeric and date bounds are inclusive on both ends.

use crate::model::ship::{date_from_epoch_millis, Ship, ShipType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Optional filters for ship lookup. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipCriteria {
    /// Substring of `name`.
    pub name: Option<String>,
    /// Substring of `planet`.
    pub planet: Option<String>,
    pub ship_type: Option<ShipType>,
    /// Inclusive lower bound on production date, as Unix epoch milliseconds.
    pub after: Option<i64>,
    /// Inclusive upper bound on production date, as Unix epoch milliseconds.
    pub before: Option<i64>,
    pub used: Option<bool>,
    pub min_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub min_crew_size: Option<i32>,
    pub max_crew_size: Option<i32>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
}

/// A timestamp criterion could not be mapped to a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTimestamp(pub i64);

impl Display for InvalidTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "timestamp {}ms is outside the supported date range", self.0)
    }
}

impl Error for InvalidTimestamp {}

/// Criteria with date bounds resolved, ready to test ships.
#[derive(Debug, Clone)]
pub struct ShipFilter<'a> {
    criteria: &'a ShipCriteria,
    produced_from: Option<NaiveDate>,
    produced_until: Option<NaiveDate>,
}

impl ShipCriteria {
    /// Returns `true` when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Resolves timestamp bounds into UTC calendar dates.
    pub fn compile(&self) -> Result<ShipFilter<'_>, InvalidTimestamp> {
        Ok(ShipFilter {
            criteria: self,
            produced_from: self.after.map(resolve_date).transpose()?,
            produced_until: self.before.map(resolve_date).transpose()?,
        })
    }
}

impl ShipFilter<'_> {
    pub fn matches(&self, ship: &Ship) -> bool {
        let criteria = self.criteria;

        contains(ship.name(), criteria.name.as_deref())
            && contains(ship.planet(), criteria.planet.as_deref())
            && criteria
                .ship_type
                .map_or(true, |ship_type| ship.ship_type() == ship_type)
            && within(
                ship.production_date(),
                self.produced_from,
                self.produced_until,
            )
            && criteria.used.map_or(true, |used| ship.is_used() == used)
            && within(ship.speed(), criteria.min_speed, criteria.max_speed)
            && within(
                ship.crew_size(),
                criteria.min_crew_size,
                criteria.max_crew_size,
            )
            && within(ship.rating(), criteria.min_rating, criteria.max_rating)
    }

    /// Keeps matching ships in their original order.
    pub fn retain(&self, ships: Vec<Ship>) -> Vec<Ship> {
        ships.into_iter().filter(|ship| self.matches(ship)).collect()
    }
}

fn resolve_date(millis: i64) -> Result<NaiveDate, InvalidTimestamp> {
    date_from_epoch_millis(millis).ok_or(InvalidTimestamp(millis))
}

fn contains(value: &str, needle: Option<&str>) -> bool {
    needle.map_or(true, |needle| value.contains(needle))
}

fn within<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    if let Some(min) = min {
        if value < min {
            return false;
        }
    }
    if let Some(max) = max {
        if value > max {
            return false;
        }
    }
    true
}
