//! Ship domain model.
//!
//! # Responsibility
//! - Define the persisted `Ship` record plus `ShipDraft` (create input) and
//!   `ShipPatch` (partial update input).
//! - Validate individual fields and compute the derived rating.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one and is immutable afterwards.
//! - `rating` is never supplied by callers; it is recomputed whenever
//!   production date, used flag or speed changes.
//! - Production year must satisfy `min_production_year <= year < reference_year`.

use crate::config::ShipRules;
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned ship identifier.
pub type ShipId = i64;

/// Maximum length of `name` and `planet`, in characters.
pub const MAX_TEXT_CHARS: usize = 50;
/// Lowest accepted speed (inclusive).
pub const MIN_SPEED: f64 = 0.01;
/// Highest accepted speed (inclusive).
pub const MAX_SPEED: f64 = 0.99;
/// Smallest accepted crew (inclusive).
pub const MIN_CREW_SIZE: i32 = 1;
/// Largest accepted crew (inclusive).
pub const MAX_CREW_SIZE: i32 = 9999;

const RATING_SCALE: f64 = 80.0;
const USED_RATING_FACTOR: f64 = 0.5;
const NEW_RATING_FACTOR: f64 = 1.0;

/// Ship category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipType {
    Transport,
    Military,
    Merchant,
}

impl ShipType {
    /// Every ship type, in declaration order.
    pub const ALL: [ShipType; 3] = [Self::Transport, Self::Military, Self::Merchant];

    /// Lowercase name used by the storage layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Military => "military",
            Self::Merchant => "merchant",
        }
    }

    /// Parses the lowercase storage name.
    pub fn from_storage(value: &str) -> Option<Self> {
        match value {
            "transport" => Some(Self::Transport),
            "military" => Some(Self::Military),
            "merchant" => Some(Self::Merchant),
            _ => None,
        }
    }
}

impl Display for ShipType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipType {
    type Err = UnknownVariant;

    /// Accepts `TRANSPORT|MILITARY|MERCHANT`, case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_storage(value.trim().to_ascii_lowercase().as_str())
            .ok_or_else(|| UnknownVariant::new("ship type", value))
    }
}

/// Error returned when parsing a closed enumeration from text fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }

    /// Human-readable name of the enumeration that failed to parse.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Rejected input text.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: `{}`", self.kind, self.value)
    }
}

impl Error for UnknownVariant {}

/// Field-level validation failures for ship input.
#[derive(Debug, Clone, PartialEq)]
pub enum ShipValidationError {
    EmptyName,
    NameTooLong { chars: usize },
    EmptyPlanet,
    PlanetTooLong { chars: usize },
    SpeedOutOfRange(f64),
    CrewSizeOutOfRange(i32),
    ProductionYearOutOfRange {
        year: i32,
        min_year: i32,
        max_year_exclusive: i32,
    },
    /// Rating denominator `reference_year - production_year + 1` is not positive.
    RatingUndefined {
        production_year: i32,
        reference_year: i32,
    },
}

impl Display for ShipValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "ship name must not be empty"),
            Self::NameTooLong { chars } => write!(
                f,
                "ship name has {chars} characters; at most {MAX_TEXT_CHARS} allowed"
            ),
            Self::EmptyPlanet => write!(f, "ship planet must not be empty"),
            Self::PlanetTooLong { chars } => write!(
                f,
                "ship planet has {chars} characters; at most {MAX_TEXT_CHARS} allowed"
            ),
            Self::SpeedOutOfRange(speed) => write!(
                f,
                "ship speed {speed} is outside [{MIN_SPEED}, {MAX_SPEED}]"
            ),
            Self::CrewSizeOutOfRange(crew_size) => write!(
                f,
                "ship crew size {crew_size} is outside [{MIN_CREW_SIZE}, {MAX_CREW_SIZE}]"
            ),
            Self::ProductionYearOutOfRange {
                year,
                min_year,
                max_year_exclusive,
            } => write!(
                f,
                "production year {year} is outside [{min_year}, {max_year_exclusive})"
            ),
            Self::RatingUndefined {
                production_year,
                reference_year,
            } => write!(
                f,
                "rating is undefined for production year {production_year} with reference year {reference_year}"
            ),
        }
    }
}

impl Error for ShipValidationError {}

/// Persisted ship record.
///
/// Fields are read through accessors; mutation goes through [`Ship::apply`]
/// so the rating can never drift from its inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ship {
    id: Option<ShipId>,
    name: String,
    planet: String,
    ship_type: ShipType,
    production_date: NaiveDate,
    used: bool,
    speed: f64,
    crew_size: i32,
    rating: f64,
}

/// Create input: every required field, no identifier and no rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipDraft {
    pub name: String,
    pub planet: String,
    pub ship_type: ShipType,
    pub production_date: NaiveDate,
    /// Omitted input means a new (unused) ship.
    #[serde(default)]
    pub used: bool,
    pub speed: f64,
    pub crew_size: i32,
}

/// Partial update input. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipPatch {
    pub name: Option<String>,
    pub planet: Option<String>,
    pub ship_type: Option<ShipType>,
    pub production_date: Option<NaiveDate>,
    pub used: Option<bool>,
    pub speed: Option<f64>,
    pub crew_size: Option<i32>,
}

impl ShipDraft {
    /// Validates every field of the draft against `rules`.
    pub fn check(&self, rules: &ShipRules) -> Result<(), ShipValidationError> {
        check_name(&self.name)?;
        check_planet(&self.planet)?;
        check_speed(self.speed)?;
        check_crew_size(self.crew_size)?;
        check_production_date(self.production_date, rules)
    }
}

impl ShipPatch {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.planet.is_none()
            && self.ship_type.is_none()
            && self.production_date.is_none()
            && self.used.is_none()
            && self.speed.is_none()
            && self.crew_size.is_none()
    }

    /// Returns `true` when the patch touches an input of the rating formula.
    pub fn affects_rating(&self) -> bool {
        self.production_date.is_some() || self.used.is_some() || self.speed.is_some()
    }

    /// Validates every present field; absent fields are not checked.
    pub fn check(&self, rules: &ShipRules) -> Result<(), ShipValidationError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(planet) = &self.planet {
            check_planet(planet)?;
        }
        if let Some(production_date) = self.production_date {
            check_production_date(production_date, rules)?;
        }
        if let Some(speed) = self.speed {
            check_speed(speed)?;
        }
        if let Some(crew_size) = self.crew_size {
            check_crew_size(crew_size)?;
        }
        Ok(())
    }
}

impl Ship {
    /// Builds an unsaved ship from a validated draft and computes its rating.
    ///
    /// # Errors
    /// - Returns the first failing field rule of the draft.
    pub fn from_draft(draft: ShipDraft, rules: &ShipRules) -> Result<Self, ShipValidationError> {
        draft.check(rules)?;
        let rating = compute_rating(draft.speed, draft.used, draft.production_date, rules)?;
        Ok(Self::from_parts(None, draft, rating))
    }

    /// Rebuilds a ship read back from storage.
    pub(crate) fn from_stored(id: ShipId, fields: ShipDraft, rating: f64) -> Self {
        Self::from_parts(Some(id), fields, rating)
    }

    fn from_parts(id: Option<ShipId>, fields: ShipDraft, rating: f64) -> Self {
        Self {
            id,
            name: fields.name,
            planet: fields.planet,
            ship_type: fields.ship_type,
            production_date: fields.production_date,
            used: fields.used,
            speed: fields.speed,
            crew_size: fields.crew_size,
            rating,
        }
    }

    /// Attaches the identifier assigned by the store on first save.
    pub(crate) fn with_id(mut self, id: ShipId) -> Self {
        debug_assert!(self.id.is_none(), "ship identifier is immutable");
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<ShipId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn planet(&self) -> &str {
        &self.planet
    }

    pub fn ship_type(&self) -> ShipType {
        self.ship_type
    }

    pub fn production_date(&self) -> NaiveDate {
        self.production_date
    }

    /// Calendar year of [`Ship::production_date`].
    pub fn production_year(&self) -> i32 {
        production_year(self.production_date)
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn crew_size(&self) -> i32 {
        self.crew_size
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// Checks the rules that do not depend on configuration: text lengths,
    /// speed and crew size.
    pub fn check_fields(&self) -> Result<(), ShipValidationError> {
        check_name(&self.name)?;
        check_planet(&self.planet)?;
        check_speed(self.speed)?;
        check_crew_size(self.crew_size)
    }

    /// Checks every field rule, including the production year window.
    pub fn check(&self, rules: &ShipRules) -> Result<(), ShipValidationError> {
        self.check_fields()?;
        check_production_date(self.production_date, rules)
    }

    /// Applies a partial update.
    ///
    /// All present fields are validated before any of them is written, so a
    /// failing patch leaves the ship untouched. Returns whether the rating
    /// was recomputed.
    pub fn apply(
        &mut self,
        patch: &ShipPatch,
        rules: &ShipRules,
    ) -> Result<bool, ShipValidationError> {
        patch.check(rules)?;

        let next_rating = if patch.affects_rating() {
            Some(compute_rating(
                patch.speed.unwrap_or(self.speed),
                patch.used.unwrap_or(self.used),
                patch.production_date.unwrap_or(self.production_date),
                rules,
            )?)
        } else {
            None
        };

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(planet) = &patch.planet {
            self.planet = planet.clone();
        }
        if let Some(ship_type) = patch.ship_type {
            self.ship_type = ship_type;
        }
        if let Some(production_date) = patch.production_date {
            self.production_date = production_date;
        }
        if let Some(used) = patch.used {
            self.used = used;
        }
        if let Some(speed) = patch.speed {
            self.speed = speed;
        }
        if let Some(crew_size) = patch.crew_size {
            self.crew_size = crew_size;
        }

        match next_rating {
            Some(rating) => {
                self.rating = rating;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub fn check_name(value: &str) -> Result<(), ShipValidationError> {
    match char_count(value) {
        0 => Err(ShipValidationError::EmptyName),
        chars if chars > MAX_TEXT_CHARS => Err(ShipValidationError::NameTooLong { chars }),
        _ => Ok(()),
    }
}

pub fn check_planet(value: &str) -> Result<(), ShipValidationError> {
    match char_count(value) {
        0 => Err(ShipValidationError::EmptyPlanet),
        chars if chars > MAX_TEXT_CHARS => Err(ShipValidationError::PlanetTooLong { chars }),
        _ => Ok(()),
    }
}

/// Rejects NaN as well as values outside the inclusive range.
pub fn check_speed(value: f64) -> Result<(), ShipValidationError> {
    if (MIN_SPEED..=MAX_SPEED).contains(&value) {
        Ok(())
    } else {
        Err(ShipValidationError::SpeedOutOfRange(value))
    }
}

pub fn check_crew_size(value: i32) -> Result<(), ShipValidationError> {
    if (MIN_CREW_SIZE..=MAX_CREW_SIZE).contains(&value) {
        Ok(())
    } else {
        Err(ShipValidationError::CrewSizeOutOfRange(value))
    }
}

/// Accepts dates whose calendar year lies in
/// `[rules.min_production_year, rules.reference_year)`.
pub fn check_production_date(
    value: NaiveDate,
    rules: &ShipRules,
) -> Result<(), ShipValidationError> {
    let year = production_year(value);
    if (rules.min_production_year..rules.reference_year).contains(&year) {
        Ok(())
    } else {
        Err(ShipValidationError::ProductionYearOutOfRange {
            year,
            min_year: rules.min_production_year,
            max_year_exclusive: rules.reference_year,
        })
    }
}

/// Calendar year of a production date.
pub fn production_year(date: NaiveDate) -> i32 {
    date.year()
}

/// Converts a Unix epoch millisecond timestamp into its UTC calendar date.
///
/// Returns `None` when the timestamp is outside the supported date range.
pub fn date_from_epoch_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|instant| instant.date_naive())
}

/// Derived ship rating.
///
/// `80 * speed * k / (reference_year - production_year + 1)` with `k = 0.5`
/// for used ships and `1.0` otherwise, rounded half away from zero to two
/// decimals.
pub fn compute_rating(
    speed: f64,
    used: bool,
    production_date: NaiveDate,
    rules: &ShipRules,
) -> Result<f64, ShipValidationError> {
    let production_year = production_year(production_date);
    let age = i64::from(rules.reference_year) - i64::from(production_year) + 1;
    if age <= 0 {
        return Err(ShipValidationError::RatingUndefined {
            production_year,
            reference_year: rules.reference_year,
        });
    }

    let factor = if used {
        USED_RATING_FACTOR
    } else {
        NEW_RATING_FACTOR
    };
    let rating = RATING_SCALE * speed * factor / age as f64;
    Ok(round_to_hundredths(rating))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn char_count(value: &str) -> usize {
    value.chars().count()
}
