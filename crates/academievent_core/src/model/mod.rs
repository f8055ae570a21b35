//! Domain model for schedules, marketplace registrations and users.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Normalize loosely typed input (categories, statuses) at the boundary.
//!
//! # Invariants
//! - Every event is owned by exactly one user schedule.
//! - Conflicts are never persisted; they are computed per registration.

pub mod event;
pub mod registration;
pub mod user;
