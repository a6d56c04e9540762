//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls and query stages into use-case level APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod ship_service;
