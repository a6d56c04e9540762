//! Ship domain model and field rules.
//!
//! # Responsibility
//! - Define the canonical ship record and its create/update input shapes.
//! - Own per-field validity rules and the derived rating formula.
//!
//! # Invariants
//! - A `Ship` can only be built from validated input; its rating is derived.
//! - Identifiers are assigned by the store and never changed afterwards.

pub mod ship;
