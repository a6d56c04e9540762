//! Ship use-case service.
//!
//! # Responsibility
//! - Query ships through filter, sort and pagination stages.
//! - Validate create/update input and keep the derived rating current.
//! - Delegate persistence to a `ShipRepository`.
//!
//! # Invariants
//! - Every ship this service persists passes `ShipRules` validation and
//!   carries a rating computed from its current speed, used flag and
//!   production year.
//! - Updates validate every supplied field before writing any of them.
//! - Lookups by id report absence as `None`, not as an error.

use crate::config::ShipRules;
use crate::model::ship::{self, Ship, ShipDraft, ShipId, ShipPatch, ShipValidationError};
use crate::query::{
    paginate, sort_ships, InvalidTimestamp, PageOutOfRange, PageRequest, ShipCriteria, ShipOrder,
};
use crate::repo::ship_repo::{RepoError, ShipRepository};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ShipServiceResult<T> = Result<T, ShipServiceError>;

/// Service error for ship use-cases.
#[derive(Debug)]
pub enum ShipServiceError {
    /// Create/update input or rating input breaks a field rule.
    InvalidArgument(ShipValidationError),
    /// A date criterion timestamp cannot be mapped to a calendar date.
    InvalidTimestamp(i64),
    /// Requested page starts past the end of the result set.
    PageOutOfRange(PageOutOfRange),
    /// Target ship does not exist.
    NotFound(ShipId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ShipServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "invalid argument: {err}"),
            Self::InvalidTimestamp(millis) => {
                write!(f, "invalid argument: {}", InvalidTimestamp(*millis))
            }
            Self::PageOutOfRange(err) => write!(f, "out of range: {err}"),
            Self::NotFound(id) => write!(f, "ship not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ShipServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::PageOutOfRange(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InvalidTimestamp(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for ShipServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::InvalidArgument(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ShipValidationError> for ShipServiceError {
    fn from(value: ShipValidationError) -> Self {
        Self::InvalidArgument(value)
    }
}

impl From<InvalidTimestamp> for ShipServiceError {
    fn from(value: InvalidTimestamp) -> Self {
        Self::InvalidTimestamp(value.0)
    }
}

impl From<PageOutOfRange> for ShipServiceError {
    fn from(value: PageOutOfRange) -> Self {
        Self::PageOutOfRange(value)
    }
}

/// Ship service facade over a store implementation.
pub struct ShipService<R: ShipRepository> {
    repo: R,
    rules: ShipRules,
}

impl<R: ShipRepository> ShipService<R> {
    /// Creates a service with default [`ShipRules`].
    pub fn new(repo: R) -> Self {
        Self::with_rules(repo, ShipRules::default())
    }

    pub fn with_rules(repo: R, rules: ShipRules) -> Self {
        Self { repo, rules }
    }

    pub fn rules(&self) -> &ShipRules {
        &self.rules
    }

    /// Returns every stored ship matching all supplied criteria, in store order.
    pub fn find(&self, criteria: &ShipCriteria) -> ShipServiceResult<Vec<Ship>> {
        let started_at = Instant::now();
        let filter = criteria.compile().map_err(|err| {
            warn!(
                "event=ship_find module=service status=error error_code=invalid_timestamp timestamp_ms={}",
                err.0
            );
            err
        })?;

        let snapshot = self.repo.find_all()?;
        let total = snapshot.len();
        let matched = filter.retain(snapshot);

        debug!(
            "event=ship_find module=service status=ok total={} matched={} duration_ms={}",
            total,
            matched.len(),
            started_at.elapsed().as_millis()
        );
        Ok(matched)
    }

    /// Number of ships [`ShipService::find`] would return.
    pub fn count(&self, criteria: &ShipCriteria) -> ShipServiceResult<usize> {
        Ok(self.find(criteria)?.len())
    }

    /// Sorts ascending by `order`; unset order returns the input unchanged.
    pub fn sort(&self, ships: Vec<Ship>, order: Option<ShipOrder>) -> Vec<Ship> {
        sort_ships(ships, order)
    }

    /// Slices one page; unset size falls back to `rules.default_page_size`.
    pub fn paginate(&self, ships: Vec<Ship>, page: PageRequest) -> ShipServiceResult<Vec<Ship>> {
        paginate(ships, page, self.rules.default_page_size).map_err(|err| {
            warn!(
                "event=ship_paginate module=service status=error error_code=page_out_of_range page_number={} page_size={} len={}",
                err.page_number, err.page_size, err.len
            );
            err.into()
        })
    }

    /// Runs find, sort and paginate in sequence.
    pub fn find_page(
        &self,
        criteria: &ShipCriteria,
        order: Option<ShipOrder>,
        page: PageRequest,
    ) -> ShipServiceResult<Vec<Ship>> {
        let matched = self.find(criteria)?;
        self.paginate(self.sort(matched, order), page)
    }

    pub fn get_by_id(&self, id: ShipId) -> ShipServiceResult<Option<Ship>> {
        Ok(self.repo.find_by_id(id)?)
    }

    /// Validates the draft, computes its rating and persists it.
    ///
    /// Returns the stored ship with its store-assigned id.
    pub fn create(&self, draft: ShipDraft) -> ShipServiceResult<Ship> {
        let ship = Ship::from_draft(draft, &self.rules).map_err(|err| {
            warn!("event=ship_create module=service status=error error_code=invalid_argument");
            err
        })?;
        let stored = self.repo.save(&ship)?;

        info!(
            "event=ship_create module=service status=ok id={} rating={}",
            stored.id().unwrap_or_default(),
            stored.rating()
        );
        Ok(stored)
    }

    /// Applies a partial update to `old` and persists the result.
    ///
    /// Present fields are validated first; when any is invalid the call fails
    /// with `InvalidArgument` and nothing is applied or saved. The rating is
    /// recomputed when production date, used flag or speed is present.
    pub fn update(&self, mut old: Ship, patch: &ShipPatch) -> ShipServiceResult<Ship> {
        let id = old.id().unwrap_or_default();
        let rating_changed = old.apply(patch, &self.rules).map_err(|err| {
            warn!(
                "event=ship_update module=service status=error error_code=invalid_argument id={id}"
            );
            err
        })?;
        let stored = self.repo.save(&old)?;

        info!(
            "event=ship_update module=service status=ok id={} rating_changed={}",
            stored.id().unwrap_or_default(),
            rating_changed
        );
        Ok(stored)
    }

    /// Loads a ship by id and applies [`ShipService::update`].
    pub fn update_by_id(&self, id: ShipId, patch: &ShipPatch) -> ShipServiceResult<Ship> {
        let old = self
            .repo
            .find_by_id(id)?
            .ok_or(ShipServiceError::NotFound(id))?;
        self.update(old, patch)
    }

    /// Returns whether `ship` satisfies every field rule.
    pub fn validate(&self, ship: &Ship) -> bool {
        self.check(ship).is_ok()
    }

    /// Like [`ShipService::validate`], naming the first failing rule.
    pub fn check(&self, ship: &Ship) -> Result<(), ShipValidationError> {
        ship.check(&self.rules)
    }

    /// Rating for the given inputs under this service's reference year.
    pub fn compute_rating(
        &self,
        speed: f64,
        used: bool,
        production_date: NaiveDate,
    ) -> ShipServiceResult<f64> {
        Ok(ship::compute_rating(
            speed,
            used,
            production_date,
            &self.rules,
        )?)
    }

    pub fn delete(&self, ship: &Ship) -> ShipServiceResult<()> {
        self.repo.delete(ship)?;
        info!(
            "event=ship_delete module=service status=ok id={}",
            ship.id().unwrap_or_default()
        );
        Ok(())
    }

    /// Loads a ship by id and deletes it.
    pub fn delete_by_id(&self, id: ShipId) -> ShipServiceResult<()> {
        let ship = self
            .repo
            .find_by_id(id)?
            .ok_or(ShipServiceError::NotFound(id))?;
        self.delete(&ship)
    }
}
