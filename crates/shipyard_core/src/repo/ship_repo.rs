//! Ship store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide find-all / find-by-id / save / delete over the `ships` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save` assigns an identifier on first insert and never changes it.
//! - Write paths call `Ship::check_fields()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `find_all` returns rows in ascending id order.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::ship::{Ship, ShipDraft, ShipId, ShipType, ShipValidationError};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SHIP_SELECT_SQL: &str = "SELECT
    id,
    name,
    planet,
    ship_type,
    prod_date,
    is_used,
    speed,
    crew_size,
    rating
FROM ships";

const SHIPS_TABLE: &str = "ships";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for ship persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ShipValidationError),
    Db(DbError),
    NotFound(ShipId),
    /// Operation needs a stored ship but the ship has no identifier yet.
    Unsaved,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "ship not found: {id}"),
            Self::Unsaved => write!(f, "ship has not been saved yet"),
            Self::InvalidData(message) => write!(f, "invalid persisted ship data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShipValidationError> for RepoError {
    fn from(value: ShipValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store interface consumed by the ship service.
///
/// Calls are synchronous and return fully materialized results.
pub trait ShipRepository {
    fn find_all(&self) -> RepoResult<Vec<Ship>>;
    fn find_by_id(&self, id: ShipId) -> RepoResult<Option<Ship>>;
    /// Inserts an unsaved ship (assigning its id) or updates a stored one.
    fn save(&self, ship: &Ship) -> RepoResult<Ship>;
    fn delete(&self, ship: &Ship) -> RepoResult<()>;
}

/// SQLite-backed ship repository.
pub struct SqliteShipRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShipRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when the `ships` table is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn insert(&self, ship: &Ship) -> RepoResult<Ship> {
        self.conn.execute(
            "INSERT INTO ships (
                name,
                planet,
                ship_type,
                prod_date,
                is_used,
                speed,
                crew_size,
                rating
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                ship.name(),
                ship.planet(),
                ship.ship_type().as_str(),
                ship.production_date(),
                bool_to_int(ship.is_used()),
                ship.speed(),
                ship.crew_size(),
                ship.rating(),
            ],
        )?;

        Ok(ship.clone().with_id(self.conn.last_insert_rowid()))
    }

    fn update(&self, id: ShipId, ship: &Ship) -> RepoResult<Ship> {
        let changed = self.conn.execute(
            "UPDATE ships
             SET
                name = ?1,
                planet = ?2,
                ship_type = ?3,
                prod_date = ?4,
                is_used = ?5,
                speed = ?6,
                crew_size = ?7,
                rating = ?8
             WHERE id = ?9;",
            params![
                ship.name(),
                ship.planet(),
                ship.ship_type().as_str(),
                ship.production_date(),
                bool_to_int(ship.is_used()),
                ship.speed(),
                ship.crew_size(),
                ship.rating(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(ship.clone())
    }
}

impl ShipRepository for SqliteShipRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<Ship>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SHIP_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut ships = Vec::new();

        while let Some(row) = rows.next()? {
            ships.push(parse_ship_row(row)?);
        }

        Ok(ships)
    }

    fn find_by_id(&self, id: ShipId) -> RepoResult<Option<Ship>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SHIP_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_ship_row(row)?));
        }

        Ok(None)
    }

    fn save(&self, ship: &Ship) -> RepoResult<Ship> {
        ship.check_fields()?;

        match ship.id() {
            Some(id) => self.update(id, ship),
            None => self.insert(ship),
        }
    }

    fn delete(&self, ship: &Ship) -> RepoResult<()> {
        let id = ship.id().ok_or(RepoError::Unsaved)?;
        let changed = self.conn.execute("DELETE FROM ships WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [SHIPS_TABLE],
            |row| row.get(0),
        )
        .optional()?;
    if table.is_none() {
        return Err(RepoError::MissingRequiredTable(SHIPS_TABLE));
    }

    Ok(())
}

fn parse_ship_row(row: &Row<'_>) -> RepoResult<Ship> {
    let id: ShipId = row.get("id")?;

    let type_text: String = row.get("ship_type")?;
    let ship_type = ShipType::from_storage(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid ship type `{type_text}` in ships.ship_type"))
    })?;

    let production_date: NaiveDate = row.get("prod_date").map_err(|err| {
        RepoError::InvalidData(format!("invalid date in ships.prod_date for id {id}: {err}"))
    })?;

    let used = match row.get::<_, i64>("is_used")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_used value `{other}` in ships.is_used"
            )));
        }
    };

    let fields = ShipDraft {
        name: row.get("name")?,
        planet: row.get("planet")?,
        ship_type,
        production_date,
        used,
        speed: row.get("speed")?,
        crew_size: row.get("crew_size")?,
    };
    let ship = Ship::from_stored(id, fields, row.get("rating")?);
    ship.check_fields()?;
    Ok(ship)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
