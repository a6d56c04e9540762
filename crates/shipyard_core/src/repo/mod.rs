//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract the ship service depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths check field rules before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod ship_repo;
