//! Core domain logic for the ship registry.
//! This crate is the single source of truth for ship business rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, LoggingConfig, ShipRules};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::ship::{
    compute_rating, production_year, Ship, ShipDraft, ShipId, ShipPatch, ShipType,
    ShipValidationError, UnknownVariant,
};
pub use query::{PageOutOfRange, PageRequest, ShipCriteria, ShipOrder};
pub use repo::ship_repo::{RepoError, RepoResult, ShipRepository, SqliteShipRepository};
pub use service::ship_service::{ShipService, ShipServiceError, ShipServiceResult};
