//! Store abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the narrow persistence contracts the resolver and services use.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Event writes enforce `Event::validate()` before persistence.
//! - Store APIs return semantic errors (`NotFound`, `Duplicate`) in addition
//!   to DB transport errors.

pub mod event_repo;
pub mod registration_repo;
