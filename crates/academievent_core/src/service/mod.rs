//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep UI layers decoupled from storage details.

pub mod analytics;
pub mod event_service;
pub mod marketplace_service;
