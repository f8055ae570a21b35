//! Schedule conflict detection and registration resolution.
//!
//! # Responsibility
//! - Detect slot conflicts between a candidate event and a schedule snapshot.
//! - Decide block / reschedule / commit and perform the commit side effects.
//!
//! # Invariants
//! - Conflict detection is a pure read over the snapshot passed in.
//! - Academic conflicts always block; they are never auto-resolved.

pub mod conflict;
pub mod prompt;
pub mod resolver;
